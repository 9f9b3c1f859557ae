//! Editing workflows on top of [`StudioApi`] and [`StudioStore`].
//!
//! Every mutation is followed by a reload of the affected collection from
//! the service, whether the mutation succeeded or not, so the store always
//! converges on the server's view.

pub mod beats;
pub mod scene_plot;
pub mod script;
pub mod shot_list;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use plotline_core::types::DbId;

use crate::api::StudioApi;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::queue::QueueConfig;
use crate::store::StudioStore;

pub use beats::BeatEditor;
pub use scene_plot::{ScenePlotWorkflow, StoryContext};
pub use script::ScriptEditor;
pub use shot_list::ShotListController;

/// Everything a workflow needs to talk to the service.
#[derive(Clone)]
pub struct WorkflowContext {
    pub api: StudioApi,
    pub store: Arc<StudioStore>,
    pub user_id: DbId,
    pub queue: QueueConfig,
    /// Parent token of every batch run started from this context.
    pub cancel: CancellationToken,
}

/// Entry point bundling the API client, the shared store and the
/// per-area workflows.
pub struct Studio {
    ctx: WorkflowContext,
}

impl Studio {
    /// Build a studio from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let api = StudioApi::new(&config.api_url, config.request_timeout())?;
        Ok(Self::with_api(api, config))
    }

    /// Build a studio around an existing API client.
    pub fn with_api(api: StudioApi, config: &ClientConfig) -> Self {
        Self {
            ctx: WorkflowContext {
                api,
                store: Arc::new(StudioStore::default()),
                user_id: config.user_id,
                queue: QueueConfig::from_client(config),
                cancel: CancellationToken::new(),
            },
        }
    }

    pub fn api(&self) -> &StudioApi {
        &self.ctx.api
    }

    pub fn store(&self) -> Arc<StudioStore> {
        Arc::clone(&self.ctx.store)
    }

    /// Cancel every batch run in flight.
    pub fn cancel_all(&self) {
        self.ctx.cancel.cancel();
    }

    pub fn beats(&self, project_id: DbId) -> BeatEditor {
        BeatEditor::new(self.ctx.clone(), project_id)
    }

    pub fn scene_plots(&self, project_id: DbId) -> ScenePlotWorkflow {
        ScenePlotWorkflow::new(self.ctx.clone(), project_id)
    }

    pub fn shot_list(&self) -> ShotListController {
        ShotListController::new(self.ctx.clone())
    }

    pub fn scripts(&self, scene_id: DbId) -> ScriptEditor {
        ScriptEditor::new(self.ctx.clone(), scene_id)
    }
}

/// Reload after a mutation regardless of its outcome.
///
/// The mutation's error takes precedence; a reload error is returned only
/// when the mutation itself succeeded.
pub(crate) async fn reconcile<T, R>(label: &str, result: ClientResult<T>, reload: R) -> ClientResult<T>
where
    R: Future<Output = ClientResult<()>>,
{
    let reloaded = reload.await;
    match (result, reloaded) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(reload_err)) => {
            tracing::warn!(label, error = %reload_err, "Reload after mutation failed");
            Err(reload_err)
        }
        (Err(err), Ok(())) => {
            tracing::warn!(label, error = %err, "Mutation failed, state reloaded from server");
            Err(err)
        }
        (Err(err), Err(reload_err)) => {
            tracing::warn!(
                label,
                error = %err,
                reload_error = %reload_err,
                "Mutation failed and reload failed",
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use plotline_core::error::CoreError;

    use super::*;
    use crate::error::ClientError;

    fn fail(msg: &str) -> ClientError {
        ClientError::Core(CoreError::Internal(msg.to_string()))
    }

    #[tokio::test]
    async fn mutation_error_wins_over_reload_error() {
        let result: ClientResult<()> =
            reconcile("test", Err(fail("mutation")), async { Err(fail("reload")) }).await;
        assert_matches!(result, Err(ClientError::Core(CoreError::Internal(msg))) if msg == "mutation");
    }

    #[tokio::test]
    async fn reload_error_surfaces_after_success() {
        let result = reconcile("test", Ok(7), async { Err(fail("reload")) }).await;
        assert_matches!(result, Err(ClientError::Core(CoreError::Internal(msg))) if msg == "reload");
    }

    #[tokio::test]
    async fn reload_runs_even_when_mutation_fails() {
        let mut reloaded = false;
        let result: ClientResult<()> = reconcile("test", Err(fail("mutation")), async {
            reloaded = true;
            Ok(())
        })
        .await;
        assert!(result.is_err());
        assert!(reloaded);
    }
}
