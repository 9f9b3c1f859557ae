//! Generation backend abstraction.
//!
//! Every AI-backed step (scene distribution, scene plots, shot lists,
//! scripts, beat regeneration) goes through [`ContentGenerator`]. The
//! service ships [`remote::RemoteGenerator`], which forwards to an opaque
//! HTTP backend; tests plug in their own implementation.

pub mod remote;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use plotline_core::beats::{Beat, BeatSheet};
use plotline_core::distribution::SceneDistribution;
use plotline_core::scene_plot::{CharacterRef, GeneratedScenePlot, ScenePlot};
use plotline_core::shot::{CreateShot, Shot};
use plotline_core::types::DbId;

/// Errors from the generation layer.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Generation backend error ({status}): {body}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend answered but the content breaks a model rule.
    #[error("Generation backend returned invalid output: {0}")]
    InvalidOutput(String),
}

/// Request body of `POST /api/scene-plots/generate-distribution`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DistributionInput {
    pub project_id: DbId,
    pub user_id: DbId,
    #[validate(length(min = 1, message = "synopsis is required"))]
    pub synopsis: String,
    #[validate(length(min = 1, message = "at least one story beat is required"))]
    pub story_beats: Vec<Beat>,
    /// Target running time in minutes.
    #[serde(default)]
    #[validate(range(min = 1, message = "targetDuration must be positive"))]
    pub target_duration: Option<u32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

/// Request body of `POST /api/scene-plots/generate-batch`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlotBatchInput {
    pub project_id: DbId,
    pub user_id: DbId,
    #[validate(length(min = 1, message = "sceneNumbers must not be empty"))]
    pub scene_numbers: Vec<i32>,
    #[validate(length(min = 1, message = "synopsis is required"))]
    pub synopsis: String,
    #[serde(default)]
    pub story_beats: Vec<Beat>,
    #[serde(default)]
    pub previous_scenes_summary: Option<String>,
    #[serde(default)]
    pub characters: Vec<CharacterRef>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

/// The AI-backed content producer behind the generation endpoints.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Assign scene numbers to beats.
    async fn distribute_scenes(
        &self,
        input: &DistributionInput,
    ) -> Result<SceneDistribution, GenerationError>;

    /// Plot the scenes named in `input.scene_numbers`.
    async fn plot_scenes(
        &self,
        input: &PlotBatchInput,
    ) -> Result<Vec<GeneratedScenePlot>, GenerationError>;

    /// Break a plotted scene into shots, in shooting order.
    async fn shot_list(&self, scene: &ScenePlot) -> Result<Vec<CreateShot>, GenerationError>;

    /// Write a script for a scene from its plot and shots.
    async fn script(&self, scene: &ScenePlot, shots: &[Shot]) -> Result<String, GenerationError>;

    /// Rewrite the content of the beats named in `keys`, honouring the
    /// intensities stored on the sheet. Returns new content keyed by beat.
    async fn regenerate_beats(
        &self,
        sheet: &BeatSheet,
        keys: &[String],
    ) -> Result<BTreeMap<String, String>, GenerationError>;
}
