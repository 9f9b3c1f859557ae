//! Scene plot entity, DTOs and the scene status progression.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::{validate_name, validate_ordinal};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Production status of a scene.
///
/// Status only moves forward: `empty → plotted → shot_listed → scripted →
/// complete`. Steps may be skipped but never undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneStatus {
    #[default]
    Empty,
    Plotted,
    ShotListed,
    Scripted,
    Complete,
}

impl SceneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneStatus::Empty => "empty",
            SceneStatus::Plotted => "plotted",
            SceneStatus::ShotListed => "shot_listed",
            SceneStatus::Scripted => "scripted",
            SceneStatus::Complete => "complete",
        }
    }

    /// Whether moving from `self` to `to` keeps the status monotonic.
    pub fn can_transition(self, to: SceneStatus) -> bool {
        to >= self
    }

    /// Validate a requested transition, naming both ends on failure.
    pub fn validate_transition(self, to: SceneStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "scene status cannot move back from {} to {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }

    /// The later of the two statuses. Used when applying generation results
    /// so a scene that is already further along is never pulled back.
    pub fn advance(self, to: SceneStatus) -> SceneStatus {
        self.max(to)
    }
}

// ---------------------------------------------------------------------------
// Entity and DTOs
// ---------------------------------------------------------------------------

/// A character appearing in a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    #[serde(default)]
    pub id: Option<DbId>,
    pub name: String,
}

/// A concrete scene derived from a beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePlot {
    pub id: DbId,
    pub project_id: DbId,
    pub scene_number: i32,
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub location: Option<String>,
    pub time_of_day: Option<String>,
    /// Key of the owning beat, if any.
    pub story_beat_id: Option<String>,
    /// Estimated length in seconds.
    pub estimated_duration: Option<i32>,
    #[serde(default)]
    pub characters_involved: Vec<CharacterRef>,
    pub status: SceneStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ScenePlot {
    /// Copy generated content onto this scene and mark it plotted.
    pub fn apply_generated(&mut self, generated: &GeneratedScenePlot) {
        self.title = Some(generated.title.clone());
        self.synopsis = Some(generated.synopsis.clone());
        self.location = generated.location.clone();
        self.time_of_day = generated.time_of_day.clone();
        self.estimated_duration = generated.estimated_duration;
        self.characters_involved = generated.characters_involved.clone();
        self.status = self.status.advance(SceneStatus::Plotted);
    }
}

/// DTO for one placeholder row of a batch create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateScenePlot {
    pub scene_number: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_beat_id: Option<String>,
    #[serde(default)]
    pub status: SceneStatus,
}

impl CreateScenePlot {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_ordinal("scene_number", self.scene_number)
    }
}

/// DTO for editing a scene. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateScenePlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_beat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters_involved: Option<Vec<CharacterRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SceneStatus>,
}

impl UpdateScenePlot {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(title) = &self.title {
            validate_name("title", title)?;
        }
        if let Some(duration) = self.estimated_duration {
            if duration < 0 {
                return Err(CoreError::Validation(format!(
                    "estimated_duration must be >= 0, got {duration}"
                )));
            }
        }
        Ok(())
    }

    /// Apply the present fields onto `scene`, enforcing forward-only status.
    pub fn apply_to(&self, scene: &mut ScenePlot) -> Result<(), CoreError> {
        if let Some(status) = self.status {
            scene.status.validate_transition(status)?;
        }
        if let Some(v) = &self.title {
            scene.title = Some(v.clone());
        }
        if let Some(v) = &self.synopsis {
            scene.synopsis = Some(v.clone());
        }
        if let Some(v) = &self.location {
            scene.location = Some(v.clone());
        }
        if let Some(v) = &self.time_of_day {
            scene.time_of_day = Some(v.clone());
        }
        if let Some(v) = &self.story_beat_id {
            scene.story_beat_id = Some(v.clone());
        }
        if let Some(v) = self.estimated_duration {
            scene.estimated_duration = Some(v);
        }
        if let Some(v) = &self.characters_involved {
            scene.characters_involved = v.clone();
        }
        if let Some(v) = self.status {
            scene.status = v;
        }
        Ok(())
    }
}

/// Scene content produced by the generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedScenePlot {
    pub scene_number: i32,
    pub title: String,
    pub synopsis: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub estimated_duration: Option<i32>,
    #[serde(default)]
    pub characters_involved: Vec<CharacterRef>,
}

/// Scene numbers of scenes that still need a plot, in ascending order.
pub fn empty_scene_numbers(scenes: &[ScenePlot]) -> Vec<i32> {
    let mut numbers: Vec<i32> = scenes
        .iter()
        .filter(|s| s.status == SceneStatus::Empty)
        .map(|s| s.scene_number)
        .collect();
    numbers.sort_unstable();
    numbers
}
