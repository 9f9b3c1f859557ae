//! Client-side store of everything loaded from the service.
//!
//! Entities are kept normalized by id, and project-level data is partitioned
//! by project id so workflows for different projects can share one store.
//! Collections are only ever replaced wholesale by a reload, except for the short-lived optimistic edits the
//! workflows apply before persisting. Every change is announced on a
//! `tokio::sync::broadcast` channel.

use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::{broadcast, RwLock};

use plotline_core::animation::Animation;
use plotline_core::beats::StoryArc;
use plotline_core::distribution::SceneDistribution;
use plotline_core::key_action::KeyAction;
use plotline_core::scene_plot::ScenePlot;
use plotline_core::script::ScriptVersion;
use plotline_core::shot::Shot;
use plotline_core::types::DbId;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Change notification published by [`StudioStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    StoryArcChanged { project_id: DbId },
    DistributionChanged { project_id: DbId },
    ScenesChanged { project_id: DbId },
    ShotsChanged { scene_id: DbId },
    ScriptsChanged { scene_id: DbId },
    KeyActionsChanged { project_id: DbId, beat_key: String },
    AnimationsChanged { project_id: DbId },
}

#[derive(Debug, Default)]
struct StoreState {
    /// Keyed by project id.
    story_arcs: BTreeMap<DbId, StoryArc>,
    /// Keyed by project id.
    distributions: BTreeMap<DbId, SceneDistribution>,
    scenes: BTreeMap<DbId, ScenePlot>,
    shots: BTreeMap<DbId, Shot>,
    /// Scenes whose shots have been loaded at least once.
    loaded_shot_scenes: BTreeSet<DbId>,
    scripts: BTreeMap<DbId, ScriptVersion>,
    key_actions: BTreeMap<DbId, KeyAction>,
    animations: BTreeMap<DbId, Animation>,
}

/// Shared, subscribable client store.
///
/// Intended to be shared via `Arc<StudioStore>` across workflows.
pub struct StudioStore {
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for StudioStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl StudioStore {
    /// Create a store whose event channel buffers `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            state: RwLock::new(StoreState::default()),
            events,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: StoreEvent) {
        // A send error only means nobody is listening.
        let _ = self.events.send(event);
    }

    // ---- story arc and distribution ----

    pub async fn story_arc(&self, project_id: DbId) -> Option<StoryArc> {
        self.state.read().await.story_arcs.get(&project_id).cloned()
    }

    /// Store or forget the story arc of a project.
    pub async fn set_story_arc(&self, project_id: DbId, arc: Option<StoryArc>) {
        {
            let mut state = self.state.write().await;
            match arc {
                Some(arc) => {
                    state.story_arcs.insert(project_id, arc);
                }
                None => {
                    state.story_arcs.remove(&project_id);
                }
            }
        }
        self.publish(StoreEvent::StoryArcChanged { project_id });
    }

    pub async fn distribution(&self, project_id: DbId) -> Option<SceneDistribution> {
        self.state.read().await.distributions.get(&project_id).cloned()
    }

    pub async fn set_distribution(&self, project_id: DbId, distribution: SceneDistribution) {
        self.state
            .write()
            .await
            .distributions
            .insert(project_id, distribution);
        self.publish(StoreEvent::DistributionChanged { project_id });
    }

    // ---- scenes ----

    /// Scenes of a project ordered by scene number.
    pub async fn scenes(&self, project_id: DbId) -> Vec<ScenePlot> {
        let state = self.state.read().await;
        let mut scenes: Vec<ScenePlot> = state
            .scenes
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        scenes.sort_by_key(|s| s.scene_number);
        scenes
    }

    pub async fn scene(&self, id: DbId) -> Option<ScenePlot> {
        self.state.read().await.scenes.get(&id).cloned()
    }

    /// Replace the scenes of one project. Cached shots and scripts of that
    /// project's scenes that are gone are dropped too. Other projects are
    /// left alone.
    pub async fn replace_scenes(&self, project_id: DbId, scenes: Vec<ScenePlot>) {
        {
            let mut state = self.state.write().await;
            let kept: BTreeSet<DbId> = scenes.iter().map(|s| s.id).collect();
            let gone: BTreeSet<DbId> = state
                .scenes
                .values()
                .filter(|s| s.project_id == project_id && !kept.contains(&s.id))
                .map(|s| s.id)
                .collect();

            state.scenes.retain(|id, _| !gone.contains(id));
            for scene in scenes {
                state.scenes.insert(scene.id, scene);
            }
            state.shots.retain(|_, shot| !gone.contains(&shot.scene_id));
            state.scripts.retain(|_, v| !gone.contains(&v.scene_id));
            state.loaded_shot_scenes.retain(|id| !gone.contains(id));
        }
        self.publish(StoreEvent::ScenesChanged { project_id });
    }

    // ---- shots ----

    /// Whether the shots of `scene_id` have been loaded.
    pub async fn has_shots(&self, scene_id: DbId) -> bool {
        self.state.read().await.loaded_shot_scenes.contains(&scene_id)
    }

    /// Cached shots of a scene ordered by shot number, or `None` if the
    /// scene was never loaded.
    pub async fn shots(&self, scene_id: DbId) -> Option<Vec<Shot>> {
        let state = self.state.read().await;
        if !state.loaded_shot_scenes.contains(&scene_id) {
            return None;
        }
        let mut shots: Vec<Shot> = state
            .shots
            .values()
            .filter(|s| s.scene_id == scene_id)
            .cloned()
            .collect();
        shots.sort_by_key(|s| s.shot_number);
        Some(shots)
    }

    /// Replace the cached shots of one scene.
    pub async fn replace_shots(&self, scene_id: DbId, shots: Vec<Shot>) {
        {
            let mut state = self.state.write().await;
            state.shots.retain(|_, shot| shot.scene_id != scene_id);
            for shot in shots {
                state.shots.insert(shot.id, shot);
            }
            state.loaded_shot_scenes.insert(scene_id);
        }
        self.publish(StoreEvent::ShotsChanged { scene_id });
    }

    // ---- scripts ----

    /// Cached versions of a scene, newest first.
    pub async fn scripts(&self, scene_id: DbId) -> Vec<ScriptVersion> {
        let state = self.state.read().await;
        let mut versions: Vec<ScriptVersion> = state
            .scripts
            .values()
            .filter(|v| v.scene_id == scene_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        versions
    }

    pub async fn replace_scripts(&self, scene_id: DbId, versions: Vec<ScriptVersion>) {
        {
            let mut state = self.state.write().await;
            state.scripts.retain(|_, v| v.scene_id != scene_id);
            for version in versions {
                state.scripts.insert(version.id, version);
            }
        }
        self.publish(StoreEvent::ScriptsChanged { scene_id });
    }

    // ---- key actions ----

    /// Cached key actions of one project's beat ordered by index.
    pub async fn key_actions(&self, project_id: DbId, beat_key: &str) -> Vec<KeyAction> {
        let state = self.state.read().await;
        let mut actions: Vec<KeyAction> = state
            .key_actions
            .values()
            .filter(|a| a.project_id == project_id && a.beat_key == beat_key)
            .cloned()
            .collect();
        actions.sort_by_key(|a| a.index);
        actions
    }

    pub async fn replace_key_actions(
        &self,
        project_id: DbId,
        beat_key: &str,
        actions: Vec<KeyAction>,
    ) {
        {
            let mut state = self.state.write().await;
            state
                .key_actions
                .retain(|_, a| a.project_id != project_id || a.beat_key != beat_key);
            for action in actions {
                state.key_actions.insert(action.id, action);
            }
        }
        self.publish(StoreEvent::KeyActionsChanged {
            project_id,
            beat_key: beat_key.to_string(),
        });
    }

    // ---- animations ----

    /// Cached animations of a project, newest first.
    pub async fn animations(&self, project_id: DbId) -> Vec<Animation> {
        let state = self.state.read().await;
        let mut animations: Vec<Animation> = state
            .animations
            .values()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect();
        animations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        animations
    }

    pub async fn replace_animations(&self, project_id: DbId, animations: Vec<Animation>) {
        {
            let mut state = self.state.write().await;
            state.animations.retain(|_, a| a.project_id != project_id);
            for animation in animations {
                state.animations.insert(animation.id, animation);
            }
        }
        self.publish(StoreEvent::AnimationsChanged { project_id });
    }
}
