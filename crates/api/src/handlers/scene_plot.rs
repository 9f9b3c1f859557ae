//! Handlers for the `/scene-plots` resource.
//!
//! Covers the distribution step, placeholder creation, batched plot
//! generation and manual editing of scenes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use plotline_core::distribution::SceneDistribution;
use plotline_core::error::CoreError;
use plotline_core::ordering::SceneOrder;
use plotline_core::scene_plot::{CreateScenePlot, ScenePlot, UpdateScenePlot};
use plotline_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::generation::{DistributionInput, GenerationError, PlotBatchInput};
use crate::repositories::ScenePlotRepo;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    pub project_id: DbId,
}

/// Request body for `POST /scene-plots/batch`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateRequest {
    pub project_id: DbId,
    #[validate(length(min = 1, message = "scenes must not be empty"))]
    pub scenes: Vec<CreateScenePlot>,
}

/// Request body for `POST /scene-plots/reorder`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SceneReorderRequest {
    pub project_id: DbId,
    #[validate(length(min = 1, message = "sceneOrders must not be empty"))]
    pub scene_orders: Vec<SceneOrder>,
}

#[derive(Debug, Serialize)]
pub struct DistributionResponse {
    pub distribution: SceneDistribution,
}

#[derive(Debug, Serialize)]
pub struct ScenesResponse {
    pub scenes: Vec<ScenePlot>,
}

#[derive(Debug, Serialize)]
pub struct SceneResponse {
    pub scene: ScenePlot,
}

/// POST /api/scene-plots/generate-distribution
///
/// Ask the generator how many scenes each beat gets. Creates no rows.
pub async fn generate_distribution(
    State(state): State<AppState>,
    Json(input): Json<DistributionInput>,
) -> AppResult<Json<DistributionResponse>> {
    input.validate()?;

    tracing::info!(
        project_id = input.project_id,
        beats = input.story_beats.len(),
        "Generating scene distribution"
    );

    let distribution = state.generator.distribute_scenes(&input).await?;
    distribution
        .validate()
        .map_err(|e| GenerationError::InvalidOutput(e.to_string()))?;

    tracing::debug!(
        project_id = input.project_id,
        total_scenes = distribution.total_scenes,
        "Scene distribution generated"
    );
    Ok(Json(DistributionResponse { distribution }))
}

/// POST /api/scene-plots/batch
///
/// Create placeholder rows in one step. Returns 201 with the created rows.
pub async fn create_batch(
    State(state): State<AppState>,
    Json(input): Json<BatchCreateRequest>,
) -> AppResult<(StatusCode, Json<ScenesResponse>)> {
    input.validate()?;
    for row in &input.scenes {
        row.validate()?;
    }

    let scenes = ScenePlotRepo::create_batch(&state.pool, input.project_id, &input.scenes).await?;
    tracing::info!(
        project_id = input.project_id,
        count = scenes.len(),
        "Scene placeholders created"
    );
    Ok((StatusCode::CREATED, Json(ScenesResponse { scenes })))
}

/// POST /api/scene-plots/generate-batch
///
/// Generate plots for a handful of existing scenes and store them.
pub async fn generate_batch(
    State(state): State<AppState>,
    Json(input): Json<PlotBatchInput>,
) -> AppResult<Json<ScenesResponse>> {
    input.validate()?;

    let existing = ScenePlotRepo::list_by_project(&state.pool, input.project_id).await;
    if let Some(missing) = input
        .scene_numbers
        .iter()
        .find(|n| !existing.iter().any(|s| s.scene_number == **n))
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "scene {missing} has not been initialized for project {}",
            input.project_id
        ))));
    }

    tracing::info!(
        project_id = input.project_id,
        scene_numbers = ?input.scene_numbers,
        has_continuity = input.previous_scenes_summary.is_some(),
        "Generating scene plots"
    );

    let generated = state.generator.plot_scenes(&input).await?;
    let scenes = ScenePlotRepo::apply_generated(
        &state.pool,
        input.project_id,
        &input.scene_numbers,
        &generated,
    )
    .await?;
    Ok(Json(ScenesResponse { scenes }))
}

/// GET /api/scene-plots?projectId=
pub async fn list_by_project(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> AppResult<Json<ScenesResponse>> {
    let scenes = ScenePlotRepo::list_by_project(&state.pool, query.project_id).await;
    Ok(Json(ScenesResponse { scenes }))
}

/// PATCH /api/scene-plots/{id}
///
/// Partial update. Returns 409 if the status would move backwards.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateScenePlot>,
) -> AppResult<Json<SceneResponse>> {
    input.validate()?;
    let scene = ScenePlotRepo::update(&state.pool, id, &input).await?;
    Ok(Json(SceneResponse { scene }))
}

/// DELETE /api/scene-plots/{id}
///
/// Removes the scene with its shots and script versions.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ScenePlotRepo::delete(&state.pool, id).await {
        tracing::info!(scene_id = id, "Scene deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "ScenePlot",
            id,
        }))
    }
}

/// POST /api/scene-plots/reorder
///
/// Rewrite all scene numbers of a project from a full ordering.
pub async fn reorder(
    State(state): State<AppState>,
    Json(input): Json<SceneReorderRequest>,
) -> AppResult<Json<ScenesResponse>> {
    input.validate()?;
    let scenes = ScenePlotRepo::reorder(&state.pool, input.project_id, &input.scene_orders).await?;
    Ok(Json(ScenesResponse { scenes }))
}
