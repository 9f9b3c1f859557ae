//! Repository for scene plots.

use std::collections::BTreeSet;

use plotline_core::error::CoreError;
use plotline_core::ordering::{validate_full_reorder, SceneOrder};
use plotline_core::scene_plot::{CreateScenePlot, GeneratedScenePlot, ScenePlot, SceneStatus, UpdateScenePlot};
use plotline_core::types::DbId;

use crate::store::{Store, Tables};

/// Provides CRUD, batch and ordering operations for scene plots.
pub struct ScenePlotRepo;

impl ScenePlotRepo {
    /// Insert placeholder rows for a project in one step.
    ///
    /// Fails with `Conflict` if any scene number is repeated in the batch or
    /// already used in the project; nothing is inserted in that case.
    pub async fn create_batch(
        store: &Store,
        project_id: DbId,
        rows: &[CreateScenePlot],
    ) -> Result<Vec<ScenePlot>, CoreError> {
        let mut tables = store.write().await;

        let mut taken: BTreeSet<i32> = tables
            .scene_plots
            .values()
            .filter(|s| s.project_id == project_id)
            .map(|s| s.scene_number)
            .collect();
        for row in rows {
            if !taken.insert(row.scene_number) {
                return Err(CoreError::Conflict(format!(
                    "scene {} already exists in project {project_id}",
                    row.scene_number
                )));
            }
        }

        let now = chrono::Utc::now();
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let scene = ScenePlot {
                id: tables.next_id(),
                project_id,
                scene_number: row.scene_number,
                title: None,
                synopsis: None,
                location: None,
                time_of_day: None,
                story_beat_id: row.story_beat_id.clone(),
                estimated_duration: None,
                characters_involved: Vec::new(),
                status: row.status,
                created_at: now,
                updated_at: now,
            };
            tables.scene_plots.insert(scene.id, scene.clone());
            created.push(scene);
        }
        created.sort_by_key(|s| s.scene_number);
        Ok(created)
    }

    pub async fn find_by_id(store: &Store, id: DbId) -> Option<ScenePlot> {
        store.read().await.scene_plots.get(&id).cloned()
    }

    /// List all scenes of a project ordered by scene number.
    pub async fn list_by_project(store: &Store, project_id: DbId) -> Vec<ScenePlot> {
        let tables = store.read().await;
        Self::project_scenes(&tables, project_id)
    }

    fn project_scenes(tables: &Tables, project_id: DbId) -> Vec<ScenePlot> {
        let mut scenes: Vec<ScenePlot> = tables
            .scene_plots
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        scenes.sort_by_key(|s| s.scene_number);
        scenes
    }

    /// Apply generated content to existing rows of a project.
    ///
    /// Every requested scene number must already exist. Generated entries
    /// for numbers outside `scene_numbers` are ignored.
    pub async fn apply_generated(
        store: &Store,
        project_id: DbId,
        scene_numbers: &[i32],
        generated: &[GeneratedScenePlot],
    ) -> Result<Vec<ScenePlot>, CoreError> {
        let mut tables = store.write().await;

        let mut ids = Vec::with_capacity(scene_numbers.len());
        for &number in scene_numbers {
            let id = tables
                .scene_plots
                .values()
                .find(|s| s.project_id == project_id && s.scene_number == number)
                .map(|s| s.id)
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "scene {number} has not been initialized for project {project_id}"
                    ))
                })?;
            ids.push((number, id));
        }

        let now = chrono::Utc::now();
        let mut updated = Vec::new();
        for (number, id) in ids {
            let Some(content) = generated.iter().find(|g| g.scene_number == number) else {
                tracing::warn!(project_id, scene_number = number, "Generation skipped a scene");
                continue;
            };
            if let Some(scene) = tables.scene_plots.get_mut(&id) {
                scene.apply_generated(content);
                scene.updated_at = now;
                updated.push(scene.clone());
            }
        }
        Ok(updated)
    }

    /// Update a scene. Only present fields are applied; status may only
    /// move forward.
    pub async fn update(
        store: &Store,
        id: DbId,
        input: &UpdateScenePlot,
    ) -> Result<ScenePlot, CoreError> {
        let mut tables = store.write().await;
        let scene = tables
            .scene_plots
            .get_mut(&id)
            .ok_or(CoreError::NotFound {
                entity: "ScenePlot",
                id,
            })?;
        input.apply_to(scene)?;
        scene.updated_at = chrono::Utc::now();
        Ok(scene.clone())
    }

    /// Raise a scene's status to at least `status`.
    pub async fn advance_status(
        store: &Store,
        id: DbId,
        status: SceneStatus,
    ) -> Option<ScenePlot> {
        let mut tables = store.write().await;
        let scene = tables.scene_plots.get_mut(&id)?;
        let next = scene.status.advance(status);
        if next != scene.status {
            scene.status = next;
            scene.updated_at = chrono::Utc::now();
        }
        Some(scene.clone())
    }

    /// Delete a scene together with its shots and script versions.
    /// Returns `true` if the scene existed.
    pub async fn delete(store: &Store, id: DbId) -> bool {
        let mut tables = store.write().await;
        if tables.scene_plots.remove(&id).is_none() {
            return false;
        }
        tables.shots.retain(|_, shot| shot.scene_id != id);
        tables.scripts.retain(|_, script| script.scene_id != id);
        true
    }

    /// Rewrite scene numbers of a whole project from a full ordering.
    pub async fn reorder(
        store: &Store,
        project_id: DbId,
        orders: &[SceneOrder],
    ) -> Result<Vec<ScenePlot>, CoreError> {
        let mut tables = store.write().await;

        let existing: BTreeSet<DbId> = tables
            .scene_plots
            .values()
            .filter(|s| s.project_id == project_id)
            .map(|s| s.id)
            .collect();
        let requested: Vec<(DbId, i32)> = orders.iter().map(|o| (o.id, o.scene_number)).collect();
        validate_full_reorder(&requested, &existing)?;

        let now = chrono::Utc::now();
        for order in orders {
            if let Some(scene) = tables.scene_plots.get_mut(&order.id) {
                if scene.scene_number != order.scene_number {
                    scene.scene_number = order.scene_number;
                    scene.updated_at = now;
                }
            }
        }
        Ok(Self::project_scenes(&tables, project_id))
    }
}
