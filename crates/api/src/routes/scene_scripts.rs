use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::script;
use crate::state::AppState;

/// Routes mounted at `/scene-scripts`.
///
/// ```text
/// GET    /                 list_by_scene (?sceneId)
/// POST   /                 create
/// POST   /generate         generate
/// PATCH  /{id}             update
/// POST   /{id}/activate    activate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(script::list_by_scene).post(script::create))
        .route("/generate", post(script::generate))
        .route("/{id}", patch(script::update))
        .route("/{id}/activate", post(script::activate))
}
