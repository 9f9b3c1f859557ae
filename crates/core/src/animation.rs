//! Animation sessions of a project.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::validate_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationStatus {
    #[default]
    Draft,
    Rendering,
    Complete,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub status: AnimationStatus,
    /// Scene the animation session was started from, if any.
    #[serde(default)]
    pub scene_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for starting an animation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimation {
    pub user_id: DbId,
    pub title: String,
    #[serde(default)]
    pub scene_id: Option<DbId>,
}

impl CreateAnimation {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("title", &self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_as_snake_case() {
        let parsed: AnimationStatus = serde_json::from_value(serde_json::json!("rendering")).unwrap();
        assert_eq!(parsed, AnimationStatus::Rendering);
    }

    #[test]
    fn create_requires_title() {
        let input = CreateAnimation {
            user_id: 1,
            title: String::new(),
            scene_id: None,
        };
        assert!(input.validate().is_err());
    }
}
