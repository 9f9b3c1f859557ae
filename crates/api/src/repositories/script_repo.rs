//! Repository for script versions.

use plotline_core::error::CoreError;
use plotline_core::script::{activate, next_version_number, ScriptVersion};
use plotline_core::types::DbId;

use crate::store::{Store, Tables};

/// Provides version-aware operations on scene scripts.
pub struct ScriptRepo;

impl ScriptRepo {
    /// List every version of a scene, newest first.
    pub async fn list_by_scene(store: &Store, scene_id: DbId) -> Vec<ScriptVersion> {
        let tables = store.read().await;
        let mut versions = Self::scene_versions(&tables, scene_id);
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        versions
    }

    fn scene_versions(tables: &Tables, scene_id: DbId) -> Vec<ScriptVersion> {
        tables
            .scripts
            .values()
            .filter(|v| v.scene_id == scene_id)
            .cloned()
            .collect()
    }

    pub async fn find_by_id(store: &Store, id: DbId) -> Option<ScriptVersion> {
        store.read().await.scripts.get(&id).cloned()
    }

    /// Store a new version with the next version number.
    ///
    /// When `is_active` is set every other version of the scene is
    /// demoted under the same lock. The scene must still exist.
    pub async fn create(
        store: &Store,
        scene_id: DbId,
        content: &str,
        is_active: bool,
    ) -> Result<ScriptVersion, CoreError> {
        let mut tables = store.write().await;
        if !tables.scene_plots.contains_key(&scene_id) {
            return Err(CoreError::NotFound {
                entity: "ScenePlot",
                id: scene_id,
            });
        }
        let existing = Self::scene_versions(&tables, scene_id);
        let version_number = next_version_number(&existing);

        let now = chrono::Utc::now();
        if is_active {
            for version in tables.scripts.values_mut() {
                if version.scene_id == scene_id && version.is_active {
                    version.is_active = false;
                    version.updated_at = now;
                }
            }
        }

        let version = ScriptVersion {
            id: tables.next_id(),
            scene_id,
            version_number,
            content: content.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        };
        tables.scripts.insert(version.id, version.clone());
        Ok(version)
    }

    /// Overwrite the content of an existing version.
    pub async fn update_content(
        store: &Store,
        id: DbId,
        content: &str,
    ) -> Result<ScriptVersion, CoreError> {
        let mut tables = store.write().await;
        let version = tables.scripts.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "ScriptVersion",
            id,
        })?;
        version.content = content.to_string();
        version.updated_at = chrono::Utc::now();
        Ok(version.clone())
    }

    /// Make `id` the single active version of its scene.
    pub async fn activate(store: &Store, id: DbId) -> Result<ScriptVersion, CoreError> {
        let mut tables = store.write().await;
        let scene_id = tables
            .scripts
            .get(&id)
            .map(|v| v.scene_id)
            .ok_or(CoreError::NotFound {
                entity: "ScriptVersion",
                id,
            })?;

        let mut versions = Self::scene_versions(&tables, scene_id);
        activate(&mut versions, id)?;

        let now = chrono::Utc::now();
        let mut activated = None;
        for version in versions {
            if let Some(row) = tables.scripts.get_mut(&version.id) {
                if row.is_active != version.is_active {
                    row.is_active = version.is_active;
                    row.updated_at = now;
                }
                if row.id == id {
                    activated = Some(row.clone());
                }
            }
        }
        activated.ok_or(CoreError::NotFound {
            entity: "ScriptVersion",
            id,
        })
    }
}
