use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::scene_plot;
use crate::state::AppState;

/// Routes mounted at `/scene-plots`.
///
/// ```text
/// GET    /                          list_by_project (?projectId)
/// POST   /generate-distribution     generate_distribution
/// POST   /batch                     create_batch
/// POST   /generate-batch            generate_batch
/// POST   /reorder                   reorder
/// PATCH  /{id}                      update
/// DELETE /{id}                      delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scene_plot::list_by_project))
        .route(
            "/generate-distribution",
            post(scene_plot::generate_distribution),
        )
        .route("/batch", post(scene_plot::create_batch))
        .route("/generate-batch", post(scene_plot::generate_batch))
        .route("/reorder", post(scene_plot::reorder))
        .route(
            "/{id}",
            patch(scene_plot::update).delete(scene_plot::delete),
        )
}
