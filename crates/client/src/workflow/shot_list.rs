//! Per-scene shot lists: lazy loading, manual reorder and generation.

use plotline_core::ordering::{reorder, shot_orders};
use plotline_core::shot::{Shot, UpdateShot};
use plotline_core::types::DbId;

use super::{reconcile, WorkflowContext};
use crate::error::{ClientError, ClientResult};
use crate::queue::{BatchQueue, BatchReport};

/// Shot lists of any number of scenes, cached in the shared store.
pub struct ShotListController {
    ctx: WorkflowContext,
}

impl ShotListController {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Shots of a scene, fetched only the first time it is expanded.
    pub async fn expand(&self, scene_id: DbId) -> ClientResult<Vec<Shot>> {
        if let Some(shots) = self.ctx.store.shots(scene_id).await {
            return Ok(shots);
        }
        self.reload(scene_id).await
    }

    /// Re-fetch a scene's shots from the service.
    pub async fn reload(&self, scene_id: DbId) -> ClientResult<Vec<Shot>> {
        let shots = self.ctx.api.list_shots(scene_id).await?;
        self.ctx.store.replace_shots(scene_id, shots.clone()).await;
        Ok(shots)
    }

    async fn reconcile_scene(&self, scene_id: DbId) -> ClientResult<()> {
        self.reload(scene_id).await.map(|_| ())
    }

    /// Move the shot at `from` to `to` within a scene.
    ///
    /// All shots are renumbered 1..N in the store before the full order is
    /// sent. The scene is reloaded afterwards even if the request failed,
    /// which undoes the local change.
    pub async fn move_shot(&self, scene_id: DbId, from: usize, to: usize) -> ClientResult<()> {
        let mut shots = self.expand(scene_id).await?;
        reorder(&mut shots, from, to)?;
        if from == to {
            return Ok(());
        }

        let orders = shot_orders(&shots);
        self.ctx.store.replace_shots(scene_id, shots).await;
        tracing::debug!(scene_id, from, to, "Shot moved locally");

        let persisted = self
            .ctx
            .api
            .reorder_shots(&orders)
            .await
            .map(|_| ())
            .map_err(ClientError::from);
        reconcile("reorder_shots", persisted, self.reconcile_scene(scene_id)).await
    }

    /// Generate the shot list of one scene, replacing any existing shots.
    pub async fn generate(&self, scene_id: DbId) -> ClientResult<Vec<Shot>> {
        let generated = self
            .ctx
            .api
            .generate_shots(scene_id, self.ctx.user_id)
            .await
            .map_err(ClientError::from);
        reconcile("generate_shots", generated, self.reconcile_scene(scene_id)).await
    }

    /// Generate shot lists for several scenes, one request at a time with
    /// the configured pause in between.
    pub async fn generate_all_shot_lists(&self, scene_ids: Vec<DbId>) -> BatchReport {
        let queue = BatchQueue::with_cancel(self.ctx.queue.clone(), self.ctx.cancel.child_token());
        queue
            .run("shot_lists", scene_ids, move |scene_id| async move {
                let shots = self.ctx.api.generate_shots(scene_id, self.ctx.user_id).await?;
                self.ctx.store.replace_shots(scene_id, shots).await;
                Ok::<_, ClientError>(())
            })
            .await
    }

    pub async fn update_shot(
        &self,
        scene_id: DbId,
        id: DbId,
        input: &UpdateShot,
    ) -> ClientResult<Shot> {
        input.validate()?;
        let updated = self
            .ctx
            .api
            .update_shot(id, input)
            .await
            .map_err(ClientError::from);
        reconcile("update_shot", updated, self.reconcile_scene(scene_id)).await
    }

    /// Delete a shot. The service renumbers the remaining shots.
    pub async fn delete_shot(&self, scene_id: DbId, id: DbId) -> ClientResult<()> {
        let deleted = self.ctx.api.delete_shot(id).await.map_err(ClientError::from);
        reconcile("delete_shot", deleted, self.reconcile_scene(scene_id)).await
    }
}
