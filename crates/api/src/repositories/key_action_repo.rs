//! Repository for beat key actions.

use plotline_core::key_action::{reindex, CreateKeyAction, KeyAction};
use plotline_core::types::DbId;

use crate::store::{Store, Tables};

pub struct KeyActionRepo;

impl KeyActionRepo {
    /// Key actions of one beat, ordered by index.
    pub async fn list_by_beat(store: &Store, project_id: DbId, beat_key: &str) -> Vec<KeyAction> {
        let tables = store.read().await;
        Self::beat_actions(&tables, project_id, beat_key)
    }

    fn beat_actions(tables: &Tables, project_id: DbId, beat_key: &str) -> Vec<KeyAction> {
        let mut actions: Vec<KeyAction> = tables
            .key_actions
            .values()
            .filter(|a| a.project_id == project_id && a.beat_key == beat_key)
            .cloned()
            .collect();
        actions.sort_by_key(|a| a.index);
        actions
    }

    /// Append a key action at the end of the beat's moodboard.
    pub async fn create(
        store: &Store,
        project_id: DbId,
        beat_key: &str,
        input: &CreateKeyAction,
    ) -> KeyAction {
        let mut tables = store.write().await;
        let index = Self::beat_actions(&tables, project_id, beat_key).len() as i32;
        let action = KeyAction {
            id: tables.next_id(),
            project_id,
            beat_key: beat_key.to_string(),
            index,
            description: input.description.clone(),
            characters_involved: input.characters_involved.clone(),
            has_prompt: false,
            has_image: false,
            created_at: chrono::Utc::now(),
        };
        tables.key_actions.insert(action.id, action.clone());
        action
    }

    /// Delete a key action and compact the indices of its beat.
    /// Returns `true` if it existed.
    pub async fn delete(store: &Store, project_id: DbId, id: DbId) -> bool {
        let mut tables = store.write().await;
        let Some(removed) = tables.key_actions.get(&id).cloned() else {
            return false;
        };
        if removed.project_id != project_id {
            return false;
        }
        tables.key_actions.remove(&id);

        let mut remaining = Self::beat_actions(&tables, project_id, &removed.beat_key);
        reindex(&mut remaining);
        for action in remaining {
            if let Some(row) = tables.key_actions.get_mut(&action.id) {
                row.index = action.index;
            }
        }
        true
    }
}
