//! Beat sheet editing, intensity regeneration and key actions.

use plotline_core::beats::{BeatSheet, DramaticIntensity, IntensityChanges, StoryStructure};
use plotline_core::error::CoreError;
use plotline_core::key_action::{CreateKeyAction, KeyAction};
use plotline_core::types::DbId;

use super::{reconcile, WorkflowContext};
use crate::error::{ClientError, ClientResult};

/// Working copy of a project's beat sheet.
///
/// Content and character edits stay local until [`BeatEditor::save`].
/// Intensity edits are tracked separately and sent through the regenerate
/// endpoint by [`BeatEditor::apply_intensity_changes`].
pub struct BeatEditor {
    ctx: WorkflowContext,
    project_id: DbId,
    sheet: BeatSheet,
    changes: IntensityChanges,
}

impl BeatEditor {
    /// Start with an empty three-act sheet until [`BeatEditor::load`] runs.
    pub fn new(ctx: WorkflowContext, project_id: DbId) -> Self {
        Self {
            ctx,
            project_id,
            sheet: BeatSheet::from_structure(StoryStructure::ThreeAct),
            changes: IntensityChanges::default(),
        }
    }

    pub fn sheet(&self) -> &BeatSheet {
        &self.sheet
    }

    /// Beats whose intensity changed and still await regeneration.
    pub fn pending_intensity_changes(&self) -> &IntensityChanges {
        &self.changes
    }

    /// Load the stored sheet, or start a fresh one for `structure` when the
    /// project has none yet.
    pub async fn load(&mut self, structure: StoryStructure) -> ClientResult<()> {
        match self.ctx.api.get_story_arc(self.project_id).await? {
            Some(arc) => {
                self.sheet = arc.sheet.clone();
                self.ctx.store.set_story_arc(self.project_id, Some(arc)).await;
            }
            None => {
                tracing::debug!(project_id = self.project_id, ?structure, "No story arc yet");
                self.sheet = BeatSheet::from_structure(structure);
                self.ctx.store.set_story_arc(self.project_id, None).await;
            }
        }
        Ok(())
    }

    /// Refresh the store from the service without touching the working copy.
    async fn reload(&self) -> ClientResult<()> {
        let arc = self.ctx.api.get_story_arc(self.project_id).await?;
        self.ctx.store.set_story_arc(self.project_id, arc).await;
        Ok(())
    }

    pub fn update_beat(&mut self, key: &str, content: impl Into<String>) -> ClientResult<()> {
        Ok(self.sheet.update_beat(key, content)?)
    }

    /// Returns whether the character is associated after the toggle.
    pub fn toggle_character(&mut self, key: &str, character: &str) -> ClientResult<bool> {
        Ok(self.sheet.toggle_character(key, character)?)
    }

    /// Set a beat's intensity locally and mark it for regeneration.
    pub fn set_intensity(&mut self, key: &str, level: Option<DramaticIntensity>) -> ClientResult<()> {
        if self.sheet.set_intensity(key, level)? {
            self.changes.record(key);
        }
        Ok(())
    }

    /// Persist the working sheet, then adopt what the service stored.
    pub async fn save(&mut self) -> ClientResult<()> {
        self.sheet.validate()?;
        let saved = self
            .ctx
            .api
            .put_story_arc(self.project_id, &self.sheet)
            .await
            .map_err(ClientError::from);
        reconcile("save_story_arc", saved, self.reload()).await?;

        if let Some(arc) = self.ctx.store.story_arc(self.project_id).await {
            self.sheet = arc.sheet;
        }
        Ok(())
    }

    /// Regenerate the content of every beat whose intensity changed.
    ///
    /// On success the pending set is cleared and the working sheet replaced
    /// by the regenerated one. On failure the pending keys and the local
    /// intensity values are kept so the call can be retried.
    pub async fn apply_intensity_changes(&mut self) -> ClientResult<()> {
        if self.changes.is_empty() {
            return Ok(());
        }

        let keys = self.changes.keys();
        let levels = self.sheet.intensities_of(&keys);
        tracing::info!(project_id = self.project_id, beats = ?keys, "Regenerating beats");

        let regenerated = self
            .ctx
            .api
            .regenerate_story_arc(
                self.project_id,
                self.ctx.user_id,
                &keys,
                &levels,
            )
            .await
            .map_err(ClientError::from);
        let arc = reconcile("regenerate_story_arc", regenerated, self.reload()).await?;

        self.changes.clear();
        self.sheet = arc.sheet;
        Ok(())
    }

    // ---- key actions ----

    pub async fn load_key_actions(&self, beat_key: &str) -> ClientResult<Vec<KeyAction>> {
        let actions = self.ctx.api.list_key_actions(self.project_id, beat_key).await?;
        self.ctx
            .store
            .replace_key_actions(self.project_id, beat_key, actions.clone())
            .await;
        Ok(actions)
    }

    async fn reload_key_actions(&self, beat_key: &str) -> ClientResult<()> {
        self.load_key_actions(beat_key).await.map(|_| ())
    }

    pub async fn add_key_action(
        &self,
        beat_key: &str,
        input: &CreateKeyAction,
    ) -> ClientResult<KeyAction> {
        input.validate()?;
        if self.sheet.get(beat_key).is_none() {
            return Err(CoreError::UnknownBeat(beat_key.to_string()).into());
        }
        let created = self
            .ctx
            .api
            .create_key_action(self.project_id, beat_key, input)
            .await
            .map_err(ClientError::from);
        reconcile("create_key_action", created, self.reload_key_actions(beat_key)).await
    }

    pub async fn delete_key_action(&self, beat_key: &str, id: DbId) -> ClientResult<()> {
        let deleted = self
            .ctx
            .api
            .delete_key_action(self.project_id, id)
            .await
            .map_err(ClientError::from);
        reconcile("delete_key_action", deleted, self.reload_key_actions(beat_key)).await
    }
}
