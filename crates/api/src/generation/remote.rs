//! HTTP client for the generation backend.
//!
//! Wraps the backend's JSON endpoints using [`reqwest`]. The backend is
//! opaque to the service: it only has to honour the request and response
//! shapes below.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use plotline_core::beats::BeatSheet;
use plotline_core::distribution::SceneDistribution;
use plotline_core::scene_plot::{GeneratedScenePlot, ScenePlot};
use plotline_core::shot::{CreateShot, Shot};

use super::{ContentGenerator, DistributionInput, GenerationError, PlotBatchInput};

/// Generator that forwards every call to a remote backend.
pub struct RemoteGenerator {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DistributionResponse {
    distribution: SceneDistribution,
}

#[derive(Debug, Deserialize)]
struct ScenesResponse {
    scenes: Vec<GeneratedScenePlot>,
}

#[derive(Debug, Deserialize)]
struct ShotsResponse {
    shots: Vec<CreateShot>,
}

#[derive(Debug, Deserialize)]
struct ScriptResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct BeatsResponse {
    beats: BTreeMap<String, String>,
}

impl RemoteGenerator {
    /// Create a generator for the backend at `base_url`, e.g. `http://host:8100`.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a generator reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, GenerationError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "Calling generation backend");

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ContentGenerator for RemoteGenerator {
    async fn distribute_scenes(
        &self,
        input: &DistributionInput,
    ) -> Result<SceneDistribution, GenerationError> {
        let body = serde_json::to_value(input)
            .map_err(|e| GenerationError::InvalidOutput(e.to_string()))?;
        let response: DistributionResponse = self.post("/distribute", &body).await?;
        Ok(response.distribution)
    }

    async fn plot_scenes(
        &self,
        input: &PlotBatchInput,
    ) -> Result<Vec<GeneratedScenePlot>, GenerationError> {
        let body = serde_json::to_value(input)
            .map_err(|e| GenerationError::InvalidOutput(e.to_string()))?;
        let response: ScenesResponse = self.post("/plot-scenes", &body).await?;
        Ok(response.scenes)
    }

    async fn shot_list(&self, scene: &ScenePlot) -> Result<Vec<CreateShot>, GenerationError> {
        let body = serde_json::json!({ "scene": scene });
        let response: ShotsResponse = self.post("/shot-list", &body).await?;
        Ok(response.shots)
    }

    async fn script(&self, scene: &ScenePlot, shots: &[Shot]) -> Result<String, GenerationError> {
        let body = serde_json::json!({ "scene": scene, "shots": shots });
        let response: ScriptResponse = self.post("/script", &body).await?;
        Ok(response.content)
    }

    async fn regenerate_beats(
        &self,
        sheet: &BeatSheet,
        keys: &[String],
    ) -> Result<BTreeMap<String, String>, GenerationError> {
        let body = serde_json::json!({ "sheet": sheet, "beatKeys": keys });
        let response: BeatsResponse = self.post("/regenerate-beats", &body).await?;
        Ok(response.beats)
    }
}
