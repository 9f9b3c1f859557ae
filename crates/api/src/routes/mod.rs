pub mod health;
pub mod projects;
pub mod scene_plots;
pub mod scene_scripts;
pub mod scene_shots;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects/{id}/story-arc                         get, replace (GET, PUT)
/// /projects/{id}/story-arc/regenerate              regenerate beats (POST)
/// /projects/{id}/beats/{key}/key-actions           list, create (GET, POST)
/// /projects/{id}/key-actions/{key_action_id}       delete (DELETE)
/// /projects/{id}/animations                        list (?userId), create
///
/// /scene-plots                                     list (?projectId)
/// /scene-plots/generate-distribution               distribution (POST)
/// /scene-plots/batch                               create placeholders (POST)
/// /scene-plots/generate-batch                      generate plots (POST)
/// /scene-plots/reorder                             reorder scenes (POST)
/// /scene-plots/{id}                                update, delete
///
/// /scene-shots                                     list (?sceneId)
/// /scene-shots/generate                            generate shot list (POST)
/// /scene-shots/reorder                             reorder shots (POST)
/// /scene-shots/{id}                                update, delete
///
/// /scene-scripts                                   list (?sceneId), create
/// /scene-scripts/generate                          generate script (POST)
/// /scene-scripts/{id}                              update content (PATCH)
/// /scene-scripts/{id}/activate                     activate (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", projects::router())
        .nest("/scene-plots", scene_plots::router())
        .nest("/scene-shots", scene_shots::router())
        .nest("/scene-scripts", scene_scripts::router())
}
