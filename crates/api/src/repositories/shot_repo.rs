//! Repository for scene shots.

use std::collections::BTreeSet;

use plotline_core::error::CoreError;
use plotline_core::ordering::{renumber, validate_full_reorder, ShotOrder};
use plotline_core::shot::{CreateShot, Shot, UpdateShot};
use plotline_core::types::DbId;

use crate::store::{Store, Tables};

/// Provides CRUD and ordering operations for shots.
pub struct ShotRepo;

impl ShotRepo {
    /// List the shots of a scene ordered by shot number.
    pub async fn list_by_scene(store: &Store, scene_id: DbId) -> Vec<Shot> {
        let tables = store.read().await;
        Self::scene_shots(&tables, scene_id)
    }

    fn scene_shots(tables: &Tables, scene_id: DbId) -> Vec<Shot> {
        let mut shots: Vec<Shot> = tables
            .shots
            .values()
            .filter(|s| s.scene_id == scene_id)
            .cloned()
            .collect();
        shots.sort_by_key(|s| s.shot_number);
        shots
    }

    pub async fn find_by_id(store: &Store, id: DbId) -> Option<Shot> {
        store.read().await.shots.get(&id).cloned()
    }

    /// Replace every shot of a scene with `inputs`, numbered 1..N in order.
    ///
    /// Fails with `NotFound` if the scene is gone by the time the lock is
    /// taken, so no shots outlive a deleted scene.
    pub async fn replace_for_scene(
        store: &Store,
        scene_id: DbId,
        inputs: &[CreateShot],
    ) -> Result<Vec<Shot>, CoreError> {
        let mut tables = store.write().await;
        if !tables.scene_plots.contains_key(&scene_id) {
            return Err(CoreError::NotFound {
                entity: "ScenePlot",
                id: scene_id,
            });
        }
        tables.shots.retain(|_, shot| shot.scene_id != scene_id);

        let now = chrono::Utc::now();
        let mut created = Vec::with_capacity(inputs.len());
        for (idx, input) in inputs.iter().enumerate() {
            let shot = Shot {
                id: tables.next_id(),
                scene_id,
                shot_number: idx as i32 + 1,
                camera_type: input.camera_type.clone(),
                camera_angle: input.camera_angle.clone(),
                camera_movement: input.camera_movement.clone(),
                duration_seconds: input.duration_seconds,
                action: input.action.clone(),
                dialogue: input.dialogue.clone(),
                created_at: now,
                updated_at: now,
            };
            tables.shots.insert(shot.id, shot.clone());
            created.push(shot);
        }
        Ok(created)
    }

    /// Update a shot. Only present fields are applied.
    pub async fn update(store: &Store, id: DbId, input: &UpdateShot) -> Result<Shot, CoreError> {
        let mut tables = store.write().await;
        let shot = tables
            .shots
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "Shot", id })?;
        input.apply_to(shot);
        shot.updated_at = chrono::Utc::now();
        Ok(shot.clone())
    }

    /// Delete a shot and close the gap in its scene's numbering.
    ///
    /// Returns the scene id of the deleted shot, or `None` if it did not exist.
    pub async fn delete(store: &Store, id: DbId) -> Option<DbId> {
        let mut tables = store.write().await;
        let removed = tables.shots.remove(&id)?;

        let mut remaining = Self::scene_shots(&tables, removed.scene_id);
        renumber(&mut remaining);
        for shot in remaining {
            if let Some(row) = tables.shots.get_mut(&shot.id) {
                row.shot_number = shot.shot_number;
            }
        }
        Some(removed.scene_id)
    }

    /// Apply a full reorder of one scene's shots.
    ///
    /// Every id must exist and belong to the same scene, and the request must
    /// cover all shots of that scene with numbers 1..N.
    pub async fn reorder(store: &Store, orders: &[ShotOrder]) -> Result<Vec<Shot>, CoreError> {
        let first = orders
            .first()
            .ok_or_else(|| CoreError::Validation("shotOrders must not be empty".to_string()))?;

        let mut tables = store.write().await;

        let scene_id = tables
            .shots
            .get(&first.id)
            .map(|s| s.scene_id)
            .ok_or(CoreError::NotFound {
                entity: "Shot",
                id: first.id,
            })?;

        for order in orders {
            match tables.shots.get(&order.id) {
                None => {
                    return Err(CoreError::NotFound {
                        entity: "Shot",
                        id: order.id,
                    })
                }
                Some(shot) if shot.scene_id != scene_id => {
                    return Err(CoreError::Validation(
                        "all shots in a reorder must belong to the same scene".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }

        let existing: BTreeSet<DbId> = tables
            .shots
            .values()
            .filter(|s| s.scene_id == scene_id)
            .map(|s| s.id)
            .collect();
        let requested: Vec<(DbId, i32)> = orders.iter().map(|o| (o.id, o.shot_number)).collect();
        validate_full_reorder(&requested, &existing)?;

        let now = chrono::Utc::now();
        for order in orders {
            if let Some(shot) = tables.shots.get_mut(&order.id) {
                if shot.shot_number != order.shot_number {
                    shot.shot_number = order.shot_number;
                    shot.updated_at = now;
                }
            }
        }
        Ok(Self::scene_shots(&tables, scene_id))
    }
}
