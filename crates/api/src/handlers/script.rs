//! Handlers for the `/scene-scripts` resource.
//!
//! A scene holds numbered script versions with at most one active. Creating
//! an active version or activating one demotes the previous active version.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use plotline_core::error::CoreError;
use plotline_core::scene_plot::SceneStatus;
use plotline_core::script::ScriptVersion;
use plotline_core::types::DbId;
use plotline_core::validation::validate_required;

use crate::error::{AppError, AppResult};
use crate::repositories::{ScenePlotRepo, ScriptRepo, ShotRepo};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneQuery {
    pub scene_id: DbId,
}

/// Request body for `POST /scene-scripts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScriptRequest {
    pub scene_id: DbId,
    pub content: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Request body for `POST /scene-scripts/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScriptRequest {
    pub scene_id: DbId,
    pub user_id: DbId,
}

/// Request body for `PATCH /scene-scripts/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateScriptRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ScriptsResponse {
    pub scripts: Vec<ScriptVersion>,
}

#[derive(Debug, Serialize)]
pub struct ScriptResponse {
    pub script: ScriptVersion,
}

/// GET /api/scene-scripts?sceneId=
///
/// Versions ordered by version number descending.
pub async fn list_by_scene(
    State(state): State<AppState>,
    Query(query): Query<SceneQuery>,
) -> AppResult<Json<ScriptsResponse>> {
    let scripts = ScriptRepo::list_by_scene(&state.pool, query.scene_id).await;
    Ok(Json(ScriptsResponse { scripts }))
}

/// POST /api/scene-scripts
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateScriptRequest>,
) -> AppResult<(StatusCode, Json<ScriptResponse>)> {
    validate_required("content", &input.content)?;

    let script =
        ScriptRepo::create(&state.pool, input.scene_id, &input.content, input.is_active).await?;
    tracing::info!(
        scene_id = input.scene_id,
        version = script.version_number,
        is_active = script.is_active,
        "Script version created"
    );
    Ok((StatusCode::CREATED, Json(ScriptResponse { script })))
}

/// POST /api/scene-scripts/generate
///
/// Write a script from the scene's plot and shots and store it as the new
/// active version.
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateScriptRequest>,
) -> AppResult<(StatusCode, Json<ScriptResponse>)> {
    let scene = ScenePlotRepo::find_by_id(&state.pool, input.scene_id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ScenePlot",
            id: input.scene_id,
        }))?;
    let shots = ShotRepo::list_by_scene(&state.pool, scene.id).await;

    tracing::info!(
        scene_id = scene.id,
        user_id = input.user_id,
        shots = shots.len(),
        "Generating script"
    );

    let content = state.generator.script(&scene, &shots).await?;
    let script = ScriptRepo::create(&state.pool, scene.id, &content, true).await?;
    ScenePlotRepo::advance_status(&state.pool, scene.id, SceneStatus::Scripted).await;

    Ok((StatusCode::CREATED, Json(ScriptResponse { script })))
}

/// PATCH /api/scene-scripts/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateScriptRequest>,
) -> AppResult<Json<ScriptResponse>> {
    let script = ScriptRepo::update_content(&state.pool, id, &input.content).await?;
    Ok(Json(ScriptResponse { script }))
}

/// POST /api/scene-scripts/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ScriptResponse>> {
    let script = ScriptRepo::activate(&state.pool, id).await?;
    tracing::info!(
        script_id = id,
        scene_id = script.scene_id,
        version = script.version_number,
        "Script version activated"
    );
    Ok(Json(ScriptResponse { script }))
}
