//! Key actions: visual-reference artefacts attached to a beat.
//!
//! Key actions belong to the moodboard of a beat and are independent of the
//! scene and shot chain.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::validate_required;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAction {
    pub id: DbId,
    pub project_id: DbId,
    pub beat_key: String,
    /// 0-based position within the beat's moodboard.
    pub index: i32,
    pub description: String,
    #[serde(default)]
    pub characters_involved: Vec<String>,
    pub has_prompt: bool,
    pub has_image: bool,
    pub created_at: Timestamp,
}

/// DTO for adding a key action to a beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyAction {
    pub description: String,
    #[serde(default)]
    pub characters_involved: Vec<String>,
}

impl CreateKeyAction {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_required("description", &self.description)
    }
}

/// Rewrite indices sequentially from 0, in the current order.
pub fn reindex(actions: &mut [KeyAction]) {
    for (idx, action) in actions.iter_mut().enumerate() {
        action.index = idx as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reindex_closes_gaps() {
        let now = chrono::Utc::now();
        let mut actions: Vec<KeyAction> = [0, 2, 5]
            .into_iter()
            .map(|index| KeyAction {
                id: index as DbId + 100,
                project_id: 1,
                beat_key: "catalyst".into(),
                index,
                description: "The letter burns".into(),
                characters_involved: vec!["Mira".into()],
                has_prompt: false,
                has_image: false,
                created_at: now,
            })
            .collect();
        reindex(&mut actions);
        let indices: Vec<i32> = actions.iter().map(|a| a.index).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn create_requires_description() {
        let input = CreateKeyAction {
            description: "  ".into(),
            characters_involved: Vec::new(),
        };
        assert!(input.validate().is_err());
    }
}
