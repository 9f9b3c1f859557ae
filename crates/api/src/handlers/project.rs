//! Handlers for project-scoped resources: story arc, key actions and
//! animations.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use plotline_core::animation::{Animation, CreateAnimation};
use plotline_core::beats::{BeatSheet, DramaticIntensity, StoryArc};
use plotline_core::error::CoreError;
use plotline_core::key_action::{CreateKeyAction, KeyAction};
use plotline_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::repositories::{AnimationRepo, KeyActionRepo, StoryArcRepo};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Story arc
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryArcResponse {
    pub story_arc: StoryArc,
}

/// Request body for `POST /projects/{id}/story-arc/regenerate`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    pub user_id: DbId,
    #[validate(length(min = 1, message = "beatKeys must not be empty"))]
    pub beat_keys: Vec<String>,
    /// New level per beat; `null` clears it.
    #[serde(default)]
    pub intensities: BTreeMap<String, Option<DramaticIntensity>>,
}

fn story_arc_not_found(project_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "StoryArc",
        id: project_id,
    })
}

/// GET /api/projects/{id}/story-arc
pub async fn get_story_arc(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<StoryArcResponse>> {
    let story_arc = StoryArcRepo::get(&state.pool, project_id)
        .await
        .ok_or_else(|| story_arc_not_found(project_id))?;
    Ok(Json(StoryArcResponse { story_arc }))
}

/// PUT /api/projects/{id}/story-arc
///
/// Replace the whole beat sheet of a project.
pub async fn put_story_arc(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(sheet): Json<BeatSheet>,
) -> AppResult<Json<StoryArcResponse>> {
    sheet.validate()?;
    let story_arc = StoryArcRepo::upsert(&state.pool, project_id, sheet).await;
    tracing::info!(
        project_id,
        beats = story_arc.sheet.len(),
        "Story arc saved"
    );
    Ok(Json(StoryArcResponse { story_arc }))
}

/// POST /api/projects/{id}/story-arc/regenerate
///
/// Store the submitted intensities and rewrite the content of the named
/// beats. Content for beats that were not requested is discarded.
pub async fn regenerate_story_arc(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<RegenerateRequest>,
) -> AppResult<Json<StoryArcResponse>> {
    input.validate()?;

    let current = StoryArcRepo::get(&state.pool, project_id)
        .await
        .ok_or_else(|| story_arc_not_found(project_id))?;

    let mut sheet = current.sheet;
    for (key, level) in &input.intensities {
        sheet.set_intensity(key, *level)?;
    }
    for key in &input.beat_keys {
        if sheet.get(key).is_none() {
            return Err(AppError::Core(CoreError::UnknownBeat(key.clone())));
        }
    }

    tracing::info!(
        project_id,
        user_id = input.user_id,
        beats = ?input.beat_keys,
        "Regenerating beats"
    );

    let mut content = state
        .generator
        .regenerate_beats(&sheet, &input.beat_keys)
        .await?;
    content.retain(|key, _| {
        let requested = input.beat_keys.contains(key);
        if !requested {
            tracing::warn!(project_id, beat = %key, "Discarding content for unrequested beat");
        }
        requested
    });

    let story_arc =
        StoryArcRepo::apply_regeneration(&state.pool, project_id, &input.intensities, &content)
            .await?;
    Ok(Json(StoryArcResponse { story_arc }))
}

// ---------------------------------------------------------------------------
// Key actions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyActionsResponse {
    pub key_actions: Vec<KeyAction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyActionResponse {
    pub key_action: KeyAction,
}

/// GET /api/projects/{id}/beats/{key}/key-actions
pub async fn list_key_actions(
    State(state): State<AppState>,
    Path((project_id, beat_key)): Path<(DbId, String)>,
) -> AppResult<Json<KeyActionsResponse>> {
    let key_actions = KeyActionRepo::list_by_beat(&state.pool, project_id, &beat_key).await;
    Ok(Json(KeyActionsResponse { key_actions }))
}

/// POST /api/projects/{id}/beats/{key}/key-actions
pub async fn create_key_action(
    State(state): State<AppState>,
    Path((project_id, beat_key)): Path<(DbId, String)>,
    Json(input): Json<CreateKeyAction>,
) -> AppResult<(StatusCode, Json<KeyActionResponse>)> {
    input.validate()?;
    let key_action = KeyActionRepo::create(&state.pool, project_id, &beat_key, &input).await;
    Ok((StatusCode::CREATED, Json(KeyActionResponse { key_action })))
}

/// DELETE /api/projects/{id}/key-actions/{key_action_id}
pub async fn delete_key_action(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if KeyActionRepo::delete(&state.pool, project_id, id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "KeyAction",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Animations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct AnimationsResponse {
    pub animations: Vec<Animation>,
}

#[derive(Debug, Serialize)]
pub struct AnimationResponse {
    pub animation: Animation,
}

/// GET /api/projects/{id}/animations?userId=
pub async fn list_animations(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<AnimationsResponse>> {
    let animations =
        AnimationRepo::list_by_project_user(&state.pool, project_id, query.user_id).await;
    Ok(Json(AnimationsResponse { animations }))
}

/// POST /api/projects/{id}/animations
pub async fn create_animation(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateAnimation>,
) -> AppResult<(StatusCode, Json<AnimationResponse>)> {
    input.validate()?;
    let animation = AnimationRepo::create(&state.pool, project_id, &input).await;
    tracing::info!(
        project_id,
        animation_id = animation.id,
        user_id = animation.user_id,
        "Animation created"
    );
    Ok((StatusCode::CREATED, Json(AnimationResponse { animation })))
}
