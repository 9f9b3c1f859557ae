//! Route definitions for project-scoped resources.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /{id}/story-arc                      get_story_arc
/// PUT    /{id}/story-arc                      put_story_arc
/// POST   /{id}/story-arc/regenerate           regenerate_story_arc
/// GET    /{id}/beats/{key}/key-actions        list_key_actions
/// POST   /{id}/beats/{key}/key-actions        create_key_action
/// DELETE /{id}/key-actions/{key_action_id}    delete_key_action
/// GET    /{id}/animations                     list_animations
/// POST   /{id}/animations                     create_animation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/story-arc",
            get(project::get_story_arc).put(project::put_story_arc),
        )
        .route(
            "/{id}/story-arc/regenerate",
            post(project::regenerate_story_arc),
        )
        .route(
            "/{id}/beats/{key}/key-actions",
            get(project::list_key_actions).post(project::create_key_action),
        )
        .route(
            "/{id}/key-actions/{key_action_id}",
            delete(project::delete_key_action),
        )
        .route(
            "/{id}/animations",
            get(project::list_animations).post(project::create_animation),
        )
}
