//! Handlers for the `/scene-shots` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use plotline_core::error::CoreError;
use plotline_core::ordering::ShotOrder;
use plotline_core::scene_plot::SceneStatus;
use plotline_core::shot::{Shot, UpdateShot};
use plotline_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::generation::GenerationError;
use crate::repositories::{ScenePlotRepo, ShotRepo};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneQuery {
    pub scene_id: DbId,
}

/// Request body for `POST /scene-shots/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateShotsRequest {
    pub scene_id: DbId,
    pub user_id: DbId,
}

/// Request body for `POST /scene-shots/reorder`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShotReorderRequest {
    #[validate(length(min = 1, message = "shotOrders must not be empty"))]
    pub shot_orders: Vec<ShotOrder>,
}

#[derive(Debug, Serialize)]
pub struct ShotsResponse {
    pub shots: Vec<Shot>,
}

#[derive(Debug, Serialize)]
pub struct ShotResponse {
    pub shot: Shot,
}

/// GET /api/scene-shots?sceneId=
pub async fn list_by_scene(
    State(state): State<AppState>,
    Query(query): Query<SceneQuery>,
) -> AppResult<Json<ShotsResponse>> {
    let shots = ShotRepo::list_by_scene(&state.pool, query.scene_id).await;
    Ok(Json(ShotsResponse { shots }))
}

/// POST /api/scene-shots/generate
///
/// Replace the scene's shot list with a freshly generated one and mark the
/// scene shot-listed.
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateShotsRequest>,
) -> AppResult<Json<ShotsResponse>> {
    let scene = ScenePlotRepo::find_by_id(&state.pool, input.scene_id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ScenePlot",
            id: input.scene_id,
        }))?;

    tracing::info!(
        scene_id = scene.id,
        user_id = input.user_id,
        "Generating shot list"
    );

    let generated = state.generator.shot_list(&scene).await?;
    for shot in &generated {
        shot.validate()
            .map_err(|e| GenerationError::InvalidOutput(e.to_string()))?;
    }

    let shots = ShotRepo::replace_for_scene(&state.pool, scene.id, &generated).await?;
    ScenePlotRepo::advance_status(&state.pool, scene.id, SceneStatus::ShotListed).await;

    tracing::debug!(scene_id = scene.id, count = shots.len(), "Shot list stored");
    Ok(Json(ShotsResponse { shots }))
}

/// PATCH /api/scene-shots/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateShot>,
) -> AppResult<Json<ShotResponse>> {
    input.validate()?;
    let shot = ShotRepo::update(&state.pool, id, &input).await?;
    Ok(Json(ShotResponse { shot }))
}

/// DELETE /api/scene-shots/{id}
///
/// Remaining shots of the scene are renumbered 1..N.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    match ShotRepo::delete(&state.pool, id).await {
        Some(scene_id) => {
            tracing::info!(shot_id = id, scene_id, "Shot deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(AppError::Core(CoreError::NotFound { entity: "Shot", id })),
    }
}

/// POST /api/scene-shots/reorder
///
/// Persist a full ordering of one scene's shots.
pub async fn reorder(
    State(state): State<AppState>,
    Json(input): Json<ShotReorderRequest>,
) -> AppResult<Json<ShotsResponse>> {
    input.validate()?;
    let shots = ShotRepo::reorder(&state.pool, &input.shot_orders).await?;
    tracing::debug!(count = shots.len(), "Shots reordered");
    Ok(Json(ShotsResponse { shots }))
}
