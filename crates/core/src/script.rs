//! Script versions of a scene.
//!
//! A scene may hold many script versions; at most one is active. Versions
//! are numbered per scene starting at 1.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// A stored script version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptVersion {
    pub id: DbId,
    pub scene_id: DbId,
    pub version_number: i32,
    pub content: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The active version, if any.
pub fn active_version(versions: &[ScriptVersion]) -> Option<&ScriptVersion> {
    versions.iter().find(|v| v.is_active)
}

/// Next version number for a scene (max existing + 1, or 1 if none).
pub fn next_version_number(versions: &[ScriptVersion]) -> i32 {
    versions.iter().map(|v| v.version_number).max().unwrap_or(0) + 1
}

/// Make `id` the only active version among `versions`.
pub fn activate(versions: &mut [ScriptVersion], id: DbId) -> Result<(), CoreError> {
    if !versions.iter().any(|v| v.id == id) {
        return Err(CoreError::NotFound {
            entity: "ScriptVersion",
            id,
        });
    }
    for version in versions.iter_mut() {
        version.is_active = version.id == id;
    }
    Ok(())
}

/// Local editing state of the script text area.
///
/// Tracks which version the text came from and whether it was edited
/// since the last load or save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptDraft {
    version_id: Option<DbId>,
    saved: String,
    content: String,
}

impl ScriptDraft {
    pub fn from_version(version: &ScriptVersion) -> Self {
        Self {
            version_id: Some(version.id),
            saved: version.content.clone(),
            content: version.content.clone(),
        }
    }

    pub fn version_id(&self) -> Option<DbId> {
        self.version_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn edit(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Whether the text differs from what was loaded or last saved.
    pub fn is_edited(&self) -> bool {
        self.content != self.saved
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn version(id: DbId, number: i32, active: bool) -> ScriptVersion {
        let now = chrono::Utc::now();
        ScriptVersion {
            id,
            scene_id: 1,
            version_number: number,
            content: format!("INT. KITCHEN - v{number}"),
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn activate_leaves_exactly_one_active() {
        let mut versions = vec![version(1, 1, true), version(2, 2, false), version(3, 3, false)];
        activate(&mut versions, 3).unwrap();
        let active: Vec<DbId> = versions.iter().filter(|v| v.is_active).map(|v| v.id).collect();
        assert_eq!(active, [3]);
        assert_eq!(active_version(&versions).map(|v| v.id), Some(3));
    }

    #[test]
    fn activate_unknown_version_fails() {
        let mut versions = vec![version(1, 1, true)];
        assert_matches!(
            activate(&mut versions, 9),
            Err(CoreError::NotFound { entity: "ScriptVersion", id: 9 })
        );
        assert!(versions[0].is_active);
    }

    #[test]
    fn next_version_number_counts_from_max() {
        assert_eq!(next_version_number(&[]), 1);
        assert_eq!(next_version_number(&[version(1, 1, false), version(2, 4, false)]), 5);
    }

    #[test]
    fn draft_tracks_edits() {
        let v = version(7, 1, true);
        let mut draft = ScriptDraft::from_version(&v);
        assert!(!draft.is_edited());
        assert_eq!(draft.version_id(), Some(7));

        draft.edit("EXT. ROOFTOP - NIGHT");
        assert!(draft.is_edited());

        draft.edit(v.content.clone());
        assert!(!draft.is_edited());
    }
}
