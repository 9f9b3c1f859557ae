//! Story structures, beats and the beat sheet editor rules.
//!
//! A [`BeatSheet`] is the ordered list of beats for one project. Preset
//! structures have a fixed beat list; a custom structure can be edited as
//! long as at least one beat remains.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ordering::move_item;
use crate::types::{DbId, Timestamp};
use crate::validation::{validate_key, validate_name};

// ---------------------------------------------------------------------------
// Act and dramatic intensity
// ---------------------------------------------------------------------------

/// Act a beat belongs to. Serialized as the act number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Act {
    One = 1,
    Two = 2,
    Three = 3,
}

impl TryFrom<u8> for Act {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Act::One),
            2 => Ok(Act::Two),
            3 => Ok(Act::Three),
            other => Err(CoreError::Validation(format!(
                "act must be between 1 and 3, got {other}"
            ))),
        }
    }
}

impl From<Act> for u8 {
    fn from(act: Act) -> Self {
        act as u8
    }
}

/// Dramatic intensity of a beat on a 1–3 scale. Serialized as the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DramaticIntensity {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl TryFrom<u8> for DramaticIntensity {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DramaticIntensity::Low),
            2 => Ok(DramaticIntensity::Medium),
            3 => Ok(DramaticIntensity::High),
            other => Err(CoreError::Validation(format!(
                "dramatic intensity must be between 1 and 3, got {other}"
            ))),
        }
    }
}

impl From<DramaticIntensity> for u8 {
    fn from(level: DramaticIntensity) -> Self {
        level as u8
    }
}

// ---------------------------------------------------------------------------
// Structures and presets
// ---------------------------------------------------------------------------

/// Static description of a beat in a preset structure.
#[derive(Debug, Clone, Copy)]
pub struct BeatTemplate {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub act: Act,
}

const fn tpl(key: &'static str, label: &'static str, description: &'static str, act: Act) -> BeatTemplate {
    BeatTemplate {
        key,
        label,
        description,
        act,
    }
}

const SAVE_THE_CAT: &[BeatTemplate] = &[
    tpl("opening_image", "Opening Image", "A snapshot of the hero's world before the story begins.", Act::One),
    tpl("theme_stated", "Theme Stated", "Someone states the lesson the hero will learn.", Act::One),
    tpl("set_up", "Set-Up", "The hero's status quo and what is missing from it.", Act::One),
    tpl("catalyst", "Catalyst", "The life-changing event that sets the story in motion.", Act::One),
    tpl("debate", "Debate", "The hero hesitates over the road ahead.", Act::One),
    tpl("break_into_two", "Break into Two", "The hero chooses to act and enters a new world.", Act::Two),
    tpl("b_story", "B Story", "A secondary story, often a relationship, carrying the theme.", Act::Two),
    tpl("fun_and_games", "Fun and Games", "The promise of the premise is explored.", Act::Two),
    tpl("midpoint", "Midpoint", "A false victory or false defeat raises the stakes.", Act::Two),
    tpl("bad_guys_close_in", "Bad Guys Close In", "Doubt and external pressure tighten around the hero.", Act::Two),
    tpl("all_is_lost", "All Is Lost", "The lowest point; something or someone is lost.", Act::Two),
    tpl("dark_night_of_the_soul", "Dark Night of the Soul", "The hero wallows before finding the answer.", Act::Two),
    tpl("break_into_three", "Break into Three", "The solution is found, combining A and B stories.", Act::Three),
    tpl("finale", "Finale", "The hero applies the lesson and defeats the antagonist.", Act::Three),
    tpl("final_image", "Final Image", "A mirror of the opening image showing change.", Act::Three),
];

const HEROS_JOURNEY: &[BeatTemplate] = &[
    tpl("ordinary_world", "Ordinary World", "The hero at home, unaware of the adventure.", Act::One),
    tpl("call_to_adventure", "Call to Adventure", "A challenge or quest presents itself.", Act::One),
    tpl("refusal_of_the_call", "Refusal of the Call", "Fear or duty holds the hero back.", Act::One),
    tpl("meeting_the_mentor", "Meeting the Mentor", "A guide offers advice, training or a gift.", Act::One),
    tpl("crossing_the_threshold", "Crossing the Threshold", "The hero commits and leaves the ordinary world.", Act::Two),
    tpl("tests_allies_enemies", "Tests, Allies, Enemies", "The hero learns the rules of the special world.", Act::Two),
    tpl("approach", "Approach to the Inmost Cave", "Preparation for the central ordeal.", Act::Two),
    tpl("ordeal", "The Ordeal", "The hero faces the greatest challenge so far.", Act::Two),
    tpl("reward", "Reward", "The hero seizes the prize after surviving the ordeal.", Act::Two),
    tpl("the_road_back", "The Road Back", "The hero turns for home, often pursued.", Act::Three),
    tpl("resurrection", "Resurrection", "A final test where everything is at stake.", Act::Three),
    tpl("return_with_elixir", "Return with the Elixir", "The hero returns transformed, bearing something of value.", Act::Three),
];

const THREE_ACT: &[BeatTemplate] = &[
    tpl("setup", "Setup", "Characters, world and stakes are introduced.", Act::One),
    tpl("inciting_incident", "Inciting Incident", "The event that disrupts the status quo.", Act::One),
    tpl("first_plot_point", "First Plot Point", "The protagonist commits to the central conflict.", Act::One),
    tpl("rising_action", "Rising Action", "Obstacles escalate and complications mount.", Act::Two),
    tpl("midpoint", "Midpoint", "A reversal that changes the direction of the story.", Act::Two),
    tpl("second_plot_point", "Second Plot Point", "A crisis forces the final confrontation.", Act::Two),
    tpl("climax", "Climax", "The central conflict comes to a head.", Act::Three),
    tpl("resolution", "Resolution", "Loose ends are tied and a new normal emerges.", Act::Three),
];

/// The structure a beat sheet follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStructure {
    SaveTheCat,
    HerosJourney,
    ThreeAct,
    Custom,
}

impl StoryStructure {
    /// Preset beats for this structure. Empty for [`StoryStructure::Custom`].
    pub fn templates(self) -> &'static [BeatTemplate] {
        match self {
            StoryStructure::SaveTheCat => SAVE_THE_CAT,
            StoryStructure::HerosJourney => HEROS_JOURNEY,
            StoryStructure::ThreeAct => THREE_ACT,
            StoryStructure::Custom => &[],
        }
    }

    /// Whether the beat list is fixed by the preset.
    pub fn is_fixed(self) -> bool {
        !matches!(self, StoryStructure::Custom)
    }
}

// ---------------------------------------------------------------------------
// Beat
// ---------------------------------------------------------------------------

/// A narrative unit within a story structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub act: Act,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dramatic_intensity: Option<DramaticIntensity>,
    /// Names of the characters associated with this beat.
    #[serde(default)]
    pub characters: BTreeSet<String>,
}

impl Beat {
    /// Create an empty beat.
    pub fn new(key: impl Into<String>, label: impl Into<String>, act: Act) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: String::new(),
            act,
            content: String::new(),
            dramatic_intensity: None,
            characters: BTreeSet::new(),
        }
    }

    fn from_template(template: &BeatTemplate) -> Self {
        let mut beat = Beat::new(template.key, template.label, template.act);
        beat.description = template.description.to_string();
        beat
    }
}

// ---------------------------------------------------------------------------
// BeatSheet
// ---------------------------------------------------------------------------

/// Ordered beats of a project together with the structure they follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatSheet {
    pub structure: StoryStructure,
    pub beats: Vec<Beat>,
}

impl BeatSheet {
    /// Build a fresh sheet for `structure`.
    ///
    /// Custom sheets start with a single empty beat, the minimum allowed.
    pub fn from_structure(structure: StoryStructure) -> Self {
        let beats = if structure.is_fixed() {
            structure.templates().iter().map(Beat::from_template).collect()
        } else {
            vec![Beat::new("beat_1", "Beat 1", Act::One)]
        };
        Self { structure, beats }
    }

    pub fn get(&self, key: &str) -> Option<&Beat> {
        self.beats.iter().find(|b| b.key == key)
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    fn position(&self, key: &str) -> Result<usize, CoreError> {
        self.beats
            .iter()
            .position(|b| b.key == key)
            .ok_or_else(|| CoreError::UnknownBeat(key.to_string()))
    }

    fn beat_mut(&mut self, key: &str) -> Result<&mut Beat, CoreError> {
        let idx = self.position(key)?;
        Ok(&mut self.beats[idx])
    }

    /// Replace the content of one beat. Every other beat is left untouched.
    pub fn update_beat(&mut self, key: &str, content: impl Into<String>) -> Result<(), CoreError> {
        self.beat_mut(key)?.content = content.into();
        Ok(())
    }

    /// Add `character` to the beat if absent, remove it if present.
    ///
    /// Returns `true` when the character is associated after the call.
    pub fn toggle_character(&mut self, key: &str, character: &str) -> Result<bool, CoreError> {
        let beat = self.beat_mut(key)?;
        if beat.characters.remove(character) {
            Ok(false)
        } else {
            beat.characters.insert(character.to_string());
            Ok(true)
        }
    }

    /// Set or clear the dramatic intensity of a beat.
    ///
    /// Returns `true` when the stored value actually changed.
    pub fn set_intensity(
        &mut self,
        key: &str,
        level: Option<DramaticIntensity>,
    ) -> Result<bool, CoreError> {
        let beat = self.beat_mut(key)?;
        if beat.dramatic_intensity == level {
            return Ok(false);
        }
        beat.dramatic_intensity = level;
        Ok(true)
    }

    /// Current intensity of each named beat, `None` where it is cleared.
    /// Keys that name no beat are skipped.
    pub fn intensities_of(&self, keys: &[String]) -> BTreeMap<String, Option<DramaticIntensity>> {
        keys.iter()
            .filter_map(|key| self.get(key).map(|b| (key.clone(), b.dramatic_intensity)))
            .collect()
    }

    // -- Custom structure editing --------------------------------------------

    fn ensure_editable(&self) -> Result<(), CoreError> {
        if self.structure.is_fixed() {
            return Err(CoreError::Conflict(format!(
                "beats of the {:?} structure cannot be added, removed or moved",
                self.structure
            )));
        }
        Ok(())
    }

    /// Append a new beat to a custom sheet and return its generated key.
    pub fn add_beat(&mut self, label: &str, act: Act) -> Result<String, CoreError> {
        self.ensure_editable()?;
        validate_name("label", label)?;

        let mut n = self.beats.len() + 1;
        let key = loop {
            let candidate = format!("beat_{n}");
            if self.get(&candidate).is_none() {
                break candidate;
            }
            n += 1;
        };

        self.beats.push(Beat::new(key.clone(), label.trim(), act));
        Ok(key)
    }

    /// Remove a beat from a custom sheet. The last beat cannot be removed.
    pub fn remove_beat(&mut self, key: &str) -> Result<Beat, CoreError> {
        self.ensure_editable()?;
        let idx = self.position(key)?;
        if self.beats.len() == 1 {
            return Err(CoreError::Validation(
                "a custom structure must keep at least one beat".to_string(),
            ));
        }
        Ok(self.beats.remove(idx))
    }

    /// Rename a beat of a custom sheet.
    pub fn rename_beat(&mut self, key: &str, label: &str) -> Result<(), CoreError> {
        self.ensure_editable()?;
        validate_name("label", label)?;
        self.beat_mut(key)?.label = label.trim().to_string();
        Ok(())
    }

    /// Move a beat of a custom sheet from one position to another.
    pub fn move_beat(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        self.ensure_editable()?;
        move_item(&mut self.beats, from, to)
    }

    /// Check the structural rules of a sheet received from outside.
    ///
    /// - at least one beat, unique keys, non-empty labels
    /// - a preset sheet carries exactly the preset's keys in preset order
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.beats.is_empty() {
            return Err(CoreError::Validation(
                "a beat sheet must contain at least one beat".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for beat in &self.beats {
            validate_key("key", &beat.key)?;
            validate_name("label", &beat.label)?;
            if !seen.insert(beat.key.as_str()) {
                return Err(CoreError::Validation(format!(
                    "duplicate beat key '{}'",
                    beat.key
                )));
            }
        }

        if self.structure.is_fixed() {
            let expected: Vec<&str> = self.structure.templates().iter().map(|t| t.key).collect();
            let actual: Vec<&str> = self.beats.iter().map(|b| b.key.as_str()).collect();
            if expected != actual {
                return Err(CoreError::Validation(format!(
                    "beats do not match the {:?} structure",
                    self.structure
                )));
            }
        }
        Ok(())
    }
}

/// The stored beat sheet of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryArc {
    pub project_id: DbId,
    #[serde(flatten)]
    pub sheet: BeatSheet,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Intensity change tracking
// ---------------------------------------------------------------------------

/// Beats whose intensity changed locally and still await regeneration.
///
/// Cleared only after a successful regeneration; a failed one leaves the
/// keys pending so the user can retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntensityChanges {
    changed: BTreeSet<String>,
}

impl IntensityChanges {
    pub fn record(&mut self, key: impl Into<String>) {
        self.changed.insert(key.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.changed.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Pending keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.changed.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.changed.clear();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn presets_have_expected_beat_counts() {
        assert_eq!(BeatSheet::from_structure(StoryStructure::SaveTheCat).len(), 15);
        assert_eq!(BeatSheet::from_structure(StoryStructure::HerosJourney).len(), 12);
        assert_eq!(BeatSheet::from_structure(StoryStructure::ThreeAct).len(), 8);
        assert_eq!(BeatSheet::from_structure(StoryStructure::Custom).len(), 1);
    }

    #[test]
    fn presets_validate() {
        for structure in [
            StoryStructure::SaveTheCat,
            StoryStructure::HerosJourney,
            StoryStructure::ThreeAct,
            StoryStructure::Custom,
        ] {
            assert!(BeatSheet::from_structure(structure).validate().is_ok());
        }
    }

    #[test]
    fn update_beat_leaves_other_beats_unchanged() {
        let original = BeatSheet::from_structure(StoryStructure::SaveTheCat);
        let mut sheet = original.clone();
        sheet.update_beat("catalyst", "The letter arrives").unwrap();

        for (before, after) in original.beats.iter().zip(&sheet.beats) {
            if before.key == "catalyst" {
                assert_eq!(after.content, "The letter arrives");
                assert_eq!(after.label, before.label);
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn update_unknown_beat_fails() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::ThreeAct);
        assert_matches!(
            sheet.update_beat("nope", "x"),
            Err(CoreError::UnknownBeat(key)) if key == "nope"
        );
    }

    #[test]
    fn double_toggle_restores_characters() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::ThreeAct);
        sheet.toggle_character("setup", "Mira").unwrap();
        let before = sheet.get("setup").unwrap().characters.clone();

        assert!(sheet.toggle_character("setup", "Jonah").unwrap());
        assert!(!sheet.toggle_character("setup", "Jonah").unwrap());
        assert_eq!(sheet.get("setup").unwrap().characters, before);

        assert!(!sheet.toggle_character("setup", "Mira").unwrap());
        assert!(sheet.toggle_character("setup", "Mira").unwrap());
        assert_eq!(sheet.get("setup").unwrap().characters, before);
    }

    #[test]
    fn set_intensity_reports_change() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::ThreeAct);
        assert!(sheet.set_intensity("climax", Some(DramaticIntensity::High)).unwrap());
        assert!(!sheet.set_intensity("climax", Some(DramaticIntensity::High)).unwrap());

        assert!(sheet.set_intensity("setup", Some(DramaticIntensity::Low)).unwrap());
        assert!(sheet.set_intensity("setup", None).unwrap());

        let keys = vec!["climax".to_string(), "setup".to_string(), "epilogue".to_string()];
        let map = sheet.intensities_of(&keys);
        assert_eq!(map.len(), 2);
        assert_eq!(map["climax"], Some(DramaticIntensity::High));
        assert_eq!(map["setup"], None);
    }

    #[test]
    fn fixed_structure_rejects_editing() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::HerosJourney);
        assert_matches!(sheet.add_beat("Extra", Act::Two), Err(CoreError::Conflict(_)));
        assert_matches!(sheet.remove_beat("ordeal"), Err(CoreError::Conflict(_)));
        assert_matches!(sheet.move_beat(0, 1), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn custom_structure_keeps_at_least_one_beat() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::Custom);
        assert_matches!(sheet.remove_beat("beat_1"), Err(CoreError::Validation(_)));

        let key = sheet.add_beat("Twist", Act::Two).unwrap();
        assert_eq!(key, "beat_2");
        sheet.remove_beat("beat_1").unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.beats[0].label, "Twist");
    }

    #[test]
    fn custom_keys_stay_unique_after_removal() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::Custom);
        sheet.add_beat("Two", Act::Two).unwrap();
        sheet.add_beat("Three", Act::Three).unwrap();
        sheet.remove_beat("beat_2").unwrap();
        let key = sheet.add_beat("Four", Act::Three).unwrap();
        assert_eq!(key, "beat_4");
        assert!(sheet.validate().is_ok());
    }

    #[test]
    fn custom_move_beat_reorders() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::Custom);
        sheet.add_beat("Two", Act::Two).unwrap();
        sheet.add_beat("Three", Act::Three).unwrap();
        sheet.move_beat(2, 0).unwrap();
        let keys: Vec<_> = sheet.beats.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, ["beat_3", "beat_1", "beat_2"]);
    }

    #[test]
    fn failed_move_keeps_beats() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::Custom);
        sheet.add_beat("Two", Act::Two).unwrap();
        assert!(sheet.move_beat(0, 5).is_err());
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn validate_rejects_reordered_preset() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::ThreeAct);
        sheet.beats.swap(0, 1);
        assert!(sheet.validate().is_err());
    }

    #[test]
    fn validate_rejects_keys_unfit_for_urls() {
        let mut sheet = BeatSheet::from_structure(StoryStructure::Custom);
        sheet.beats[0].key = "act 1/open".to_string();
        assert_matches!(sheet.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn intensity_serializes_as_number() {
        let json = serde_json::to_value(DramaticIntensity::Medium).unwrap();
        assert_eq!(json, serde_json::json!(2));
        let parsed: Result<DramaticIntensity, _> = serde_json::from_value(serde_json::json!(4));
        assert!(parsed.is_err());
    }

    #[test]
    fn intensity_changes_track_pending_keys() {
        let mut changes = IntensityChanges::default();
        changes.record("midpoint");
        changes.record("climax");
        changes.record("midpoint");
        assert_eq!(changes.keys(), ["climax", "midpoint"]);
        changes.clear();
        assert!(changes.is_empty());
    }
}
