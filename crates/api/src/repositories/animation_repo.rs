//! Repository for animation sessions.

use plotline_core::animation::{Animation, AnimationStatus, CreateAnimation};
use plotline_core::types::DbId;

use crate::store::Store;

pub struct AnimationRepo;

impl AnimationRepo {
    /// Animations a user created in a project, newest first.
    pub async fn list_by_project_user(
        store: &Store,
        project_id: DbId,
        user_id: DbId,
    ) -> Vec<Animation> {
        let tables = store.read().await;
        let mut animations: Vec<Animation> = tables
            .animations
            .values()
            .filter(|a| a.project_id == project_id && a.user_id == user_id)
            .cloned()
            .collect();
        animations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        animations
    }

    pub async fn create(store: &Store, project_id: DbId, input: &CreateAnimation) -> Animation {
        let mut tables = store.write().await;
        let animation = Animation {
            id: tables.next_id(),
            project_id,
            user_id: input.user_id,
            title: input.title.clone(),
            status: AnimationStatus::Draft,
            scene_id: input.scene_id,
            created_at: chrono::Utc::now(),
        };
        tables.animations.insert(animation.id, animation.clone());
        animation
    }
}
