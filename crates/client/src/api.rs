//! REST client for the Plotline service.
//!
//! Wraps every endpoint of the service using [`reqwest`]. Each method maps
//! one request; reload-after-mutation is the job of the workflow layer.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use plotline_core::animation::{Animation, CreateAnimation};
use plotline_core::beats::{Beat, BeatSheet, DramaticIntensity, StoryArc};
use plotline_core::distribution::SceneDistribution;
use plotline_core::key_action::{CreateKeyAction, KeyAction};
use plotline_core::ordering::{SceneOrder, ShotOrder};
use plotline_core::scene_plot::{CharacterRef, CreateScenePlot, ScenePlot, UpdateScenePlot};
use plotline_core::script::ScriptVersion;
use plotline_core::shot::{Shot, UpdateShot};
use plotline_core::types::DbId;

use crate::error::ApiError;

/// HTTP client for one Plotline service.
#[derive(Debug, Clone)]
pub struct StudioApi {
    client: reqwest::Client,
    base_url: String,
}

/// Body of `POST /api/scene-plots/generate-distribution`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRequest {
    pub project_id: DbId,
    pub user_id: DbId,
    pub synopsis: String,
    pub story_beats: Vec<Beat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// Body of `POST /api/scene-plots/generate-batch`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotBatchRequest {
    pub project_id: DbId,
    pub user_id: DbId,
    pub scene_numbers: Vec<i32>,
    pub synopsis: String,
    pub story_beats: Vec<Beat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_scenes_summary: Option<String>,
    pub characters: Vec<CharacterRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoryArcBody {
    story_arc: StoryArc,
}

#[derive(Deserialize)]
struct DistributionBody {
    distribution: SceneDistribution,
}

#[derive(Deserialize)]
struct ScenesBody {
    scenes: Vec<ScenePlot>,
}

#[derive(Deserialize)]
struct SceneBody {
    scene: ScenePlot,
}

#[derive(Deserialize)]
struct ShotsBody {
    shots: Vec<Shot>,
}

#[derive(Deserialize)]
struct ShotBody {
    shot: Shot,
}

#[derive(Deserialize)]
struct ScriptsBody {
    scripts: Vec<ScriptVersion>,
}

#[derive(Deserialize)]
struct ScriptBody {
    script: ScriptVersion,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyActionsBody {
    key_actions: Vec<KeyAction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyActionBody {
    key_action: KeyAction,
}

#[derive(Deserialize)]
struct AnimationsBody {
    animations: Vec<Animation>,
}

#[derive(Deserialize)]
struct AnimationBody {
    animation: Animation,
}

impl StudioApi {
    /// Create a client for the service at `base_url`, e.g. `http://host:3000`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/projects/{id}/beats/{key}/key-actions` with the beat key
    /// percent-encoded as a single path segment.
    fn key_actions_url(&self, project_id: DbId, beat_key: &str) -> Result<reqwest::Url, ApiError> {
        let base = self.url(&format!("/api/projects/{project_id}/beats"));
        let mut url =
            reqwest::Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(base.clone()))?
            .push(beat_key)
            .push("key-actions");
        Ok(url)
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.client.get(self.url("/health")).send().await?;
        Self::parse_response(response).await
    }

    // ---- story arc ----

    /// GET /api/projects/{id}/story-arc. `None` when the project has none yet.
    pub async fn get_story_arc(&self, project_id: DbId) -> Result<Option<StoryArc>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/projects/{project_id}/story-arc")))
            .send()
            .await?;
        match Self::parse_response::<StoryArcBody>(response).await {
            Ok(body) => Ok(Some(body.story_arc)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// PUT /api/projects/{id}/story-arc
    pub async fn put_story_arc(
        &self,
        project_id: DbId,
        sheet: &BeatSheet,
    ) -> Result<StoryArc, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/api/projects/{project_id}/story-arc")))
            .json(sheet)
            .send()
            .await?;
        Ok(Self::parse_response::<StoryArcBody>(response).await?.story_arc)
    }

    /// POST /api/projects/{id}/story-arc/regenerate
    pub async fn regenerate_story_arc(
        &self,
        project_id: DbId,
        user_id: DbId,
        beat_keys: &[String],
        intensities: &BTreeMap<String, Option<DramaticIntensity>>,
    ) -> Result<StoryArc, ApiError> {
        let body = serde_json::json!({
            "userId": user_id,
            "beatKeys": beat_keys,
            "intensities": intensities,
        });
        let response = self
            .client
            .post(self.url(&format!("/api/projects/{project_id}/story-arc/regenerate")))
            .json(&body)
            .send()
            .await?;
        Ok(Self::parse_response::<StoryArcBody>(response).await?.story_arc)
    }

    // ---- key actions ----

    /// GET /api/projects/{id}/beats/{key}/key-actions
    pub async fn list_key_actions(
        &self,
        project_id: DbId,
        beat_key: &str,
    ) -> Result<Vec<KeyAction>, ApiError> {
        let response = self
            .client
            .get(self.key_actions_url(project_id, beat_key)?)
            .send()
            .await?;
        Ok(Self::parse_response::<KeyActionsBody>(response).await?.key_actions)
    }

    /// POST /api/projects/{id}/beats/{key}/key-actions
    pub async fn create_key_action(
        &self,
        project_id: DbId,
        beat_key: &str,
        input: &CreateKeyAction,
    ) -> Result<KeyAction, ApiError> {
        let response = self
            .client
            .post(self.key_actions_url(project_id, beat_key)?)
            .json(input)
            .send()
            .await?;
        Ok(Self::parse_response::<KeyActionBody>(response).await?.key_action)
    }

    /// DELETE /api/projects/{id}/key-actions/{key_action_id}
    pub async fn delete_key_action(&self, project_id: DbId, id: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/projects/{project_id}/key-actions/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- animations ----

    /// GET /api/projects/{id}/animations?userId=
    pub async fn list_animations(
        &self,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<Animation>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/projects/{project_id}/animations")))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        Ok(Self::parse_response::<AnimationsBody>(response).await?.animations)
    }

    /// POST /api/projects/{id}/animations
    pub async fn create_animation(
        &self,
        project_id: DbId,
        input: &CreateAnimation,
    ) -> Result<Animation, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/projects/{project_id}/animations")))
            .json(input)
            .send()
            .await?;
        Ok(Self::parse_response::<AnimationBody>(response).await?.animation)
    }

    // ---- scene plots ----

    /// POST /api/scene-plots/generate-distribution
    pub async fn generate_distribution(
        &self,
        request: &DistributionRequest,
    ) -> Result<SceneDistribution, ApiError> {
        let response = self
            .client
            .post(self.url("/api/scene-plots/generate-distribution"))
            .json(request)
            .send()
            .await?;
        Ok(Self::parse_response::<DistributionBody>(response).await?.distribution)
    }

    /// POST /api/scene-plots/batch
    pub async fn create_scene_batch(
        &self,
        project_id: DbId,
        scenes: &[CreateScenePlot],
    ) -> Result<Vec<ScenePlot>, ApiError> {
        let body = serde_json::json!({ "projectId": project_id, "scenes": scenes });
        let response = self
            .client
            .post(self.url("/api/scene-plots/batch"))
            .json(&body)
            .send()
            .await?;
        Ok(Self::parse_response::<ScenesBody>(response).await?.scenes)
    }

    /// POST /api/scene-plots/generate-batch
    pub async fn generate_scene_batch(
        &self,
        request: &PlotBatchRequest,
    ) -> Result<Vec<ScenePlot>, ApiError> {
        let response = self
            .client
            .post(self.url("/api/scene-plots/generate-batch"))
            .json(request)
            .send()
            .await?;
        Ok(Self::parse_response::<ScenesBody>(response).await?.scenes)
    }

    /// GET /api/scene-plots?projectId=
    pub async fn list_scenes(&self, project_id: DbId) -> Result<Vec<ScenePlot>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/scene-plots"))
            .query(&[("projectId", project_id)])
            .send()
            .await?;
        Ok(Self::parse_response::<ScenesBody>(response).await?.scenes)
    }

    /// PATCH /api/scene-plots/{id}
    pub async fn update_scene(
        &self,
        id: DbId,
        input: &UpdateScenePlot,
    ) -> Result<ScenePlot, ApiError> {
        let response = self
            .client
            .patch(self.url(&format!("/api/scene-plots/{id}")))
            .json(input)
            .send()
            .await?;
        Ok(Self::parse_response::<SceneBody>(response).await?.scene)
    }

    /// DELETE /api/scene-plots/{id}
    pub async fn delete_scene(&self, id: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/scene-plots/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// POST /api/scene-plots/reorder
    pub async fn reorder_scenes(
        &self,
        project_id: DbId,
        orders: &[SceneOrder],
    ) -> Result<Vec<ScenePlot>, ApiError> {
        let body = serde_json::json!({ "projectId": project_id, "sceneOrders": orders });
        let response = self
            .client
            .post(self.url("/api/scene-plots/reorder"))
            .json(&body)
            .send()
            .await?;
        Ok(Self::parse_response::<ScenesBody>(response).await?.scenes)
    }

    // ---- shots ----

    /// GET /api/scene-shots?sceneId=
    pub async fn list_shots(&self, scene_id: DbId) -> Result<Vec<Shot>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/scene-shots"))
            .query(&[("sceneId", scene_id)])
            .send()
            .await?;
        Ok(Self::parse_response::<ShotsBody>(response).await?.shots)
    }

    /// POST /api/scene-shots/generate
    pub async fn generate_shots(&self, scene_id: DbId, user_id: DbId) -> Result<Vec<Shot>, ApiError> {
        let body = serde_json::json!({ "sceneId": scene_id, "userId": user_id });
        let response = self
            .client
            .post(self.url("/api/scene-shots/generate"))
            .json(&body)
            .send()
            .await?;
        Ok(Self::parse_response::<ShotsBody>(response).await?.shots)
    }

    /// PATCH /api/scene-shots/{id}
    pub async fn update_shot(&self, id: DbId, input: &UpdateShot) -> Result<Shot, ApiError> {
        let response = self
            .client
            .patch(self.url(&format!("/api/scene-shots/{id}")))
            .json(input)
            .send()
            .await?;
        Ok(Self::parse_response::<ShotBody>(response).await?.shot)
    }

    /// DELETE /api/scene-shots/{id}
    pub async fn delete_shot(&self, id: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/scene-shots/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// POST /api/scene-shots/reorder
    pub async fn reorder_shots(&self, orders: &[ShotOrder]) -> Result<Vec<Shot>, ApiError> {
        let body = serde_json::json!({ "shotOrders": orders });
        let response = self
            .client
            .post(self.url("/api/scene-shots/reorder"))
            .json(&body)
            .send()
            .await?;
        Ok(Self::parse_response::<ShotsBody>(response).await?.shots)
    }

    // ---- scripts ----

    /// GET /api/scene-scripts?sceneId=
    pub async fn list_scripts(&self, scene_id: DbId) -> Result<Vec<ScriptVersion>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/scene-scripts"))
            .query(&[("sceneId", scene_id)])
            .send()
            .await?;
        Ok(Self::parse_response::<ScriptsBody>(response).await?.scripts)
    }

    /// POST /api/scene-scripts
    pub async fn create_script(
        &self,
        scene_id: DbId,
        content: &str,
        is_active: bool,
    ) -> Result<ScriptVersion, ApiError> {
        let body = serde_json::json!({
            "sceneId": scene_id,
            "content": content,
            "isActive": is_active,
        });
        let response = self
            .client
            .post(self.url("/api/scene-scripts"))
            .json(&body)
            .send()
            .await?;
        Ok(Self::parse_response::<ScriptBody>(response).await?.script)
    }

    /// POST /api/scene-scripts/generate
    pub async fn generate_script(
        &self,
        scene_id: DbId,
        user_id: DbId,
    ) -> Result<ScriptVersion, ApiError> {
        let body = serde_json::json!({ "sceneId": scene_id, "userId": user_id });
        let response = self
            .client
            .post(self.url("/api/scene-scripts/generate"))
            .json(&body)
            .send()
            .await?;
        Ok(Self::parse_response::<ScriptBody>(response).await?.script)
    }

    /// PATCH /api/scene-scripts/{id}
    pub async fn update_script(&self, id: DbId, content: &str) -> Result<ScriptVersion, ApiError> {
        let body = serde_json::json!({ "content": content });
        let response = self
            .client
            .patch(self.url(&format!("/api/scene-scripts/{id}")))
            .json(&body)
            .send()
            .await?;
        Ok(Self::parse_response::<ScriptBody>(response).await?.script)
    }

    /// POST /api/scene-scripts/{id}/activate
    pub async fn activate_script(&self, id: DbId) -> Result<ScriptVersion, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/scene-scripts/{id}/activate")))
            .send()
            .await?;
        Ok(Self::parse_response::<ScriptBody>(response).await?.script)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. On failure the
    /// `error` field of the JSON body becomes the message, falling back to
    /// the raw body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
