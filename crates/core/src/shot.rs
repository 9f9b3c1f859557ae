//! Shot entity and DTOs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::{validate_duration_secs, validate_required};

/// A single camera setup within a scene. `shot_number` defines the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: DbId,
    pub scene_id: DbId,
    pub shot_number: i32,
    pub camera_type: String,
    pub camera_angle: String,
    pub camera_movement: String,
    pub duration_seconds: f64,
    pub action: String,
    #[serde(default)]
    pub dialogue: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a shot produced by generation, before it has an id or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateShot {
    pub camera_type: String,
    pub camera_angle: String,
    pub camera_movement: String,
    pub duration_seconds: f64,
    pub action: String,
    #[serde(default)]
    pub dialogue: Option<String>,
}

impl CreateShot {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_required("camera_type", &self.camera_type)?;
        validate_duration_secs("duration_seconds", self.duration_seconds)?;
        Ok(())
    }
}

/// DTO for editing a shot. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateShot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_movement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue: Option<String>,
}

impl UpdateShot {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(camera_type) = &self.camera_type {
            validate_required("camera_type", camera_type)?;
        }
        if let Some(duration) = self.duration_seconds {
            validate_duration_secs("duration_seconds", duration)?;
        }
        Ok(())
    }

    /// Apply the present fields onto `shot`.
    pub fn apply_to(&self, shot: &mut Shot) {
        if let Some(v) = &self.camera_type {
            shot.camera_type = v.clone();
        }
        if let Some(v) = &self.camera_angle {
            shot.camera_angle = v.clone();
        }
        if let Some(v) = &self.camera_movement {
            shot.camera_movement = v.clone();
        }
        if let Some(v) = self.duration_seconds {
            shot.duration_seconds = v;
        }
        if let Some(v) = &self.action {
            shot.action = v.clone();
        }
        if let Some(v) = &self.dialogue {
            shot.dialogue = Some(v.clone());
        }
    }
}

/// Sum of shot durations in seconds.
pub fn total_duration_secs(shots: &[Shot]) -> f64 {
    shots.iter().map(|s| s.duration_seconds).sum()
}
