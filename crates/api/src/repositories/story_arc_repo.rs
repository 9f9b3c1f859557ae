//! Repository for project story arcs.

use std::collections::BTreeMap;

use plotline_core::beats::{BeatSheet, DramaticIntensity, StoryArc};
use plotline_core::error::CoreError;
use plotline_core::types::DbId;

use crate::store::Store;

/// One story arc per project.
pub struct StoryArcRepo;

impl StoryArcRepo {
    pub async fn get(store: &Store, project_id: DbId) -> Option<StoryArc> {
        store.read().await.story_arcs.get(&project_id).cloned()
    }

    /// Create or replace the arc of a project.
    pub async fn upsert(store: &Store, project_id: DbId, sheet: BeatSheet) -> StoryArc {
        let arc = StoryArc {
            project_id,
            sheet,
            updated_at: chrono::Utc::now(),
        };
        store
            .write()
            .await
            .story_arcs
            .insert(project_id, arc.clone());
        arc
    }

    /// Persist intensities and regenerated beat content in one step.
    ///
    /// Keys in `content` that do not name a beat are rejected and nothing
    /// is written.
    pub async fn apply_regeneration(
        store: &Store,
        project_id: DbId,
        intensities: &BTreeMap<String, Option<DramaticIntensity>>,
        content: &BTreeMap<String, String>,
    ) -> Result<StoryArc, CoreError> {
        let mut tables = store.write().await;
        let arc = tables.story_arcs.get(&project_id).ok_or(CoreError::NotFound {
            entity: "StoryArc",
            id: project_id,
        })?;

        let mut sheet = arc.sheet.clone();
        for (key, level) in intensities {
            sheet.set_intensity(key, *level)?;
        }
        for (key, text) in content {
            sheet.update_beat(key, text.as_str())?;
        }

        let updated = StoryArc {
            project_id,
            sheet,
            updated_at: chrono::Utc::now(),
        };
        tables.story_arcs.insert(project_id, updated.clone());
        Ok(updated)
    }
}
