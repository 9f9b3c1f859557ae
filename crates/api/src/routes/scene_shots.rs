use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::shot;
use crate::state::AppState;

/// Routes mounted at `/scene-shots`.
///
/// ```text
/// GET    /             list_by_scene (?sceneId)
/// POST   /generate     generate
/// POST   /reorder      reorder
/// PATCH  /{id}         update
/// DELETE /{id}         delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(shot::list_by_scene))
        .route("/generate", post(shot::generate))
        .route("/reorder", post(shot::reorder))
        .route("/{id}", patch(shot::update).delete(shot::delete))
}
