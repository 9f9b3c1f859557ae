//! Script versions of one scene and the text being edited.

use plotline_core::error::CoreError;
use plotline_core::script::{active_version, ScriptDraft, ScriptVersion};
use plotline_core::types::DbId;
use plotline_core::validation::validate_required;

use super::{reconcile, WorkflowContext};
use crate::error::{ClientError, ClientResult};

pub struct ScriptEditor {
    ctx: WorkflowContext,
    scene_id: DbId,
    draft: ScriptDraft,
}

impl ScriptEditor {
    pub fn new(ctx: WorkflowContext, scene_id: DbId) -> Self {
        Self {
            ctx,
            scene_id,
            draft: ScriptDraft::default(),
        }
    }

    pub fn draft(&self) -> &ScriptDraft {
        &self.draft
    }

    /// Whether the text was edited since it was loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.draft.is_edited()
    }

    /// Versions of the scene, newest first.
    pub async fn versions(&self) -> Vec<ScriptVersion> {
        self.ctx.store.scripts(self.scene_id).await
    }

    /// Load the versions and select the active one, or the newest.
    pub async fn load(&mut self) -> ClientResult<()> {
        self.reload().await?;
        let versions = self.versions().await;
        let selected = active_version(&versions).or_else(|| versions.first());
        self.draft = selected.map(ScriptDraft::from_version).unwrap_or_default();
        Ok(())
    }

    async fn reload(&self) -> ClientResult<()> {
        let versions = self.ctx.api.list_scripts(self.scene_id).await?;
        self.ctx.store.replace_scripts(self.scene_id, versions).await;
        Ok(())
    }

    /// Put a stored version's text in the editor, discarding local edits.
    pub async fn select(&mut self, id: DbId) -> ClientResult<()> {
        let versions = self.versions().await;
        let version = versions
            .iter()
            .find(|v| v.id == id)
            .ok_or(CoreError::NotFound {
                entity: "ScriptVersion",
                id,
            })?;
        self.draft = ScriptDraft::from_version(version);
        Ok(())
    }

    pub fn edit(&mut self, content: impl Into<String>) {
        self.draft.edit(content);
    }

    /// Overwrite the selected version with the edited text.
    pub async fn save(&mut self) -> ClientResult<ScriptVersion> {
        let id = self.draft.version_id().ok_or_else(|| {
            CoreError::Validation("no script version is selected".to_string())
        })?;
        let saved = self
            .ctx
            .api
            .update_script(id, self.draft.content())
            .await
            .map_err(ClientError::from);
        let version = reconcile("update_script", saved, self.reload()).await?;
        self.draft = ScriptDraft::from_version(&version);
        Ok(version)
    }

    /// Store the edited text as a new version and make it active.
    pub async fn save_as_new_version(&mut self) -> ClientResult<ScriptVersion> {
        validate_required("content", self.draft.content())?;
        let created = self
            .ctx
            .api
            .create_script(self.scene_id, self.draft.content(), true)
            .await
            .map_err(ClientError::from);
        let version = reconcile("create_script", created, self.reload()).await?;
        self.draft = ScriptDraft::from_version(&version);
        Ok(version)
    }

    /// Make `id` the scene's only active version.
    pub async fn set_active(&self, id: DbId) -> ClientResult<ScriptVersion> {
        let activated = self
            .ctx
            .api
            .activate_script(id)
            .await
            .map_err(ClientError::from);
        reconcile("activate_script", activated, self.reload()).await
    }

    /// Generate a new active version from the scene's shots and select it.
    pub async fn generate(&mut self) -> ClientResult<ScriptVersion> {
        let generated = self
            .ctx
            .api
            .generate_script(self.scene_id, self.ctx.user_id)
            .await
            .map_err(ClientError::from);
        let version = reconcile("generate_script", generated, self.reload()).await?;
        self.draft = ScriptDraft::from_version(&version);
        Ok(version)
    }
}
