//! Scene distribution: which scene numbers belong to which beat.
//!
//! A distribution is produced by generation and creates no scenes by
//! itself; [`SceneDistribution::placeholder_rows`] turns it into the
//! `empty` rows of a batch create.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scene_plot::{CreateScenePlot, SceneStatus};

/// Scene numbers assigned to one beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatSceneRange {
    pub beat_id: String,
    pub beat_name: String,
    pub scene_numbers: Vec<i32>,
    pub scene_count: usize,
}

/// Beat → scene-number ranges for a whole project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDistribution {
    pub distribution: Vec<BeatSceneRange>,
    pub total_scenes: usize,
}

impl SceneDistribution {
    /// Check internal consistency.
    ///
    /// Scene numbers must be positive and unique across beats, each
    /// `scene_count` must match its list and `total_scenes` the overall sum.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.distribution.is_empty() {
            return Err(CoreError::Validation(
                "distribution must assign scenes to at least one beat".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for range in &self.distribution {
            if range.scene_count != range.scene_numbers.len() {
                return Err(CoreError::Validation(format!(
                    "beat '{}' declares {} scenes but lists {}",
                    range.beat_id,
                    range.scene_count,
                    range.scene_numbers.len()
                )));
            }
            for &n in &range.scene_numbers {
                if n < 1 {
                    return Err(CoreError::Validation(format!(
                        "scene number must be >= 1, got {n}"
                    )));
                }
                if !seen.insert(n) {
                    return Err(CoreError::Validation(format!(
                        "scene {n} is assigned to more than one beat"
                    )));
                }
            }
        }

        if seen.len() != self.total_scenes {
            return Err(CoreError::Validation(format!(
                "total_scenes is {} but {} scenes are assigned",
                self.total_scenes,
                seen.len()
            )));
        }
        Ok(())
    }

    /// One `empty` placeholder row per scene number, tagged with its beat,
    /// in ascending scene order.
    pub fn placeholder_rows(&self) -> Vec<CreateScenePlot> {
        let mut rows: Vec<CreateScenePlot> = self
            .distribution
            .iter()
            .flat_map(|range| {
                range.scene_numbers.iter().map(move |&n| CreateScenePlot {
                    scene_number: n,
                    story_beat_id: Some(range.beat_id.clone()),
                    status: SceneStatus::Empty,
                })
            })
            .collect();
        rows.sort_by_key(|r| r.scene_number);
        rows
    }

    /// Beat key that owns `scene_number`, if any.
    pub fn beat_for_scene(&self, scene_number: i32) -> Option<&str> {
        self.distribution
            .iter()
            .find(|r| r.scene_numbers.contains(&scene_number))
            .map(|r| r.beat_id.as_str())
    }
}
