//! Scene distribution, placeholder scenes, batched plot generation and
//! scene ordering.

use std::time::Duration;

use tokio::sync::Mutex;

use plotline_core::animation::{Animation, CreateAnimation};
use plotline_core::beats::Beat;
use plotline_core::distribution::SceneDistribution;
use plotline_core::error::CoreError;
use plotline_core::ordering::{reorder, scene_orders};
use plotline_core::plot_batch::{continuity_summary, plan_batches, PLOT_BATCH_SIZE};
use plotline_core::scene_plot::{empty_scene_numbers, CharacterRef, ScenePlot, UpdateScenePlot};
use plotline_core::types::DbId;
use plotline_core::validation::validate_required;

use super::{reconcile, WorkflowContext};
use crate::api::{DistributionRequest, PlotBatchRequest};
use crate::error::{ClientError, ClientResult};
use crate::queue::{BatchQueue, BatchReport, QueueConfig};

/// Story-level inputs shared by distribution and plot generation.
#[derive(Debug, Clone, Default)]
pub struct StoryContext {
    pub synopsis: String,
    pub beats: Vec<Beat>,
    pub characters: Vec<CharacterRef>,
    /// Target running time in minutes.
    pub target_duration: Option<u32>,
    pub genre: Option<String>,
    pub tone: Option<String>,
}

impl StoryContext {
    fn validate(&self) -> Result<(), CoreError> {
        validate_required("synopsis", &self.synopsis)?;
        if self.beats.is_empty() {
            return Err(CoreError::Validation(
                "at least one story beat is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scene-level workflow of one project.
pub struct ScenePlotWorkflow {
    ctx: WorkflowContext,
    project_id: DbId,
}

impl ScenePlotWorkflow {
    pub fn new(ctx: WorkflowContext, project_id: DbId) -> Self {
        Self { ctx, project_id }
    }

    /// Fetch the project's scenes into the store.
    pub async fn load_scenes(&self) -> ClientResult<Vec<ScenePlot>> {
        let scenes = self.ctx.api.list_scenes(self.project_id).await?;
        self.ctx.store.replace_scenes(self.project_id, scenes).await;
        Ok(self.ctx.store.scenes(self.project_id).await)
    }

    async fn reload_scenes(&self) -> ClientResult<()> {
        self.load_scenes().await.map(|_| ())
    }

    /// Ask the service how many scenes each beat should get.
    ///
    /// Creates no scenes. Nothing is sent when the synopsis is blank or
    /// there are no beats.
    pub async fn generate_distribution(&self, story: &StoryContext) -> ClientResult<SceneDistribution> {
        story.validate()?;

        let request = DistributionRequest {
            project_id: self.project_id,
            user_id: self.ctx.user_id,
            synopsis: story.synopsis.clone(),
            story_beats: story.beats.clone(),
            target_duration: story.target_duration,
            genre: story.genre.clone(),
            tone: story.tone.clone(),
        };
        let distribution = self.ctx.api.generate_distribution(&request).await?;
        distribution.validate()?;

        tracing::info!(
            project_id = self.project_id,
            total_scenes = distribution.total_scenes,
            "Scene distribution generated"
        );
        self.ctx
            .store
            .set_distribution(self.project_id, distribution.clone())
            .await;
        Ok(distribution)
    }

    /// Create one `empty` scene per number of the current distribution.
    pub async fn initialize_scenes(&self) -> ClientResult<Vec<ScenePlot>> {
        let distribution = self.ctx.store.distribution(self.project_id).await.ok_or_else(|| {
            CoreError::Validation("generate a scene distribution first".to_string())
        })?;

        let rows = distribution.placeholder_rows();
        let created = self
            .ctx
            .api
            .create_scene_batch(self.project_id, &rows)
            .await?;
        tracing::info!(project_id = self.project_id, count = created.len(), "Scenes initialized");

        self.load_scenes().await
    }

    /// Plot every `empty` scene in batches of [`PLOT_BATCH_SIZE`].
    ///
    /// Batches run one after another. Each carries a summary of the scenes
    /// just before it, including ones plotted by earlier batches of this
    /// run. A failed batch is logged and the rest still run. Scenes are
    /// reloaded once at the end.
    pub async fn generate_all_plots(&self, story: &StoryContext) -> ClientResult<BatchReport> {
        let scenes = self.ctx.store.scenes(self.project_id).await;
        let batches = plan_batches(&empty_scene_numbers(&scenes), PLOT_BATCH_SIZE);
        if batches.is_empty() {
            tracing::info!(project_id = self.project_id, "No empty scenes to plot");
            return Ok(BatchReport::default());
        }

        let queue = BatchQueue::with_cancel(
            QueueConfig {
                delay: Duration::ZERO,
                ..self.ctx.queue.clone()
            },
            self.ctx.cancel.child_token(),
        );

        // Scenes as known to this run, updated with each batch result.
        let known = Mutex::new(scenes);
        let known = &known;

        let report = queue
            .run("scene_plots", batches, move |scene_numbers| async move {
                let first = scene_numbers.first().copied().unwrap_or(1);
                let summary = continuity_summary(&known.lock().await, first);

                let request = PlotBatchRequest {
                    project_id: self.project_id,
                    user_id: self.ctx.user_id,
                    scene_numbers,
                    synopsis: story.synopsis.clone(),
                    story_beats: story.beats.clone(),
                    previous_scenes_summary: summary,
                    characters: story.characters.clone(),
                    genre: story.genre.clone(),
                    tone: story.tone.clone(),
                };
                let plotted = self.ctx.api.generate_scene_batch(&request).await?;

                let mut known = known.lock().await;
                for scene in plotted {
                    match known.iter_mut().find(|s| s.id == scene.id) {
                        Some(existing) => *existing = scene,
                        None => known.push(scene),
                    }
                }
                Ok::<_, ClientError>(())
            })
            .await;

        self.reload_scenes().await?;
        Ok(report)
    }

    /// Move a scene from one position to another.
    ///
    /// The new order is applied to the store at once, then persisted, then
    /// reloaded from the service whatever the outcome.
    pub async fn move_scene(&self, from: usize, to: usize) -> ClientResult<()> {
        let mut scenes = self.ctx.store.scenes(self.project_id).await;
        reorder(&mut scenes, from, to)?;
        if from == to {
            return Ok(());
        }

        let orders = scene_orders(&scenes);
        self.ctx.store.replace_scenes(self.project_id, scenes).await;

        let persisted = self
            .ctx
            .api
            .reorder_scenes(self.project_id, &orders)
            .await
            .map(|_| ())
            .map_err(ClientError::from);
        reconcile("reorder_scenes", persisted, self.reload_scenes()).await
    }

    pub async fn update_scene(&self, id: DbId, input: &UpdateScenePlot) -> ClientResult<ScenePlot> {
        input.validate()?;
        let updated = self
            .ctx
            .api
            .update_scene(id, input)
            .await
            .map_err(ClientError::from);
        reconcile("update_scene", updated, self.reload_scenes()).await
    }

    pub async fn delete_scene(&self, id: DbId) -> ClientResult<()> {
        let deleted = self.ctx.api.delete_scene(id).await.map_err(ClientError::from);
        reconcile("delete_scene", deleted, self.reload_scenes()).await
    }

    // ---- animations ----

    pub async fn load_animations(&self) -> ClientResult<Vec<Animation>> {
        let animations = self
            .ctx
            .api
            .list_animations(self.project_id, self.ctx.user_id)
            .await?;
        self.ctx
            .store
            .replace_animations(self.project_id, animations)
            .await;
        Ok(self.ctx.store.animations(self.project_id).await)
    }

    /// Start an animation session, optionally from one scene.
    pub async fn create_animation(
        &self,
        title: &str,
        scene_id: Option<DbId>,
    ) -> ClientResult<Animation> {
        let input = CreateAnimation {
            user_id: self.ctx.user_id,
            title: title.to_string(),
            scene_id,
        };
        input.validate()?;
        let created = self
            .ctx
            .api
            .create_animation(self.project_id, &input)
            .await
            .map_err(ClientError::from);
        reconcile(
            "create_animation",
            created,
            async { self.load_animations().await.map(|_| ()) },
        )
        .await
    }
}
