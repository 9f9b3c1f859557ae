//! In-process table store backing the repositories.
//!
//! All tables sit behind one `RwLock`, so a repository method that touches
//! several rows (batch create, reorder, activate) sees and writes a
//! consistent snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use plotline_core::animation::Animation;
use plotline_core::beats::StoryArc;
use plotline_core::key_action::KeyAction;
use plotline_core::scene_plot::ScenePlot;
use plotline_core::script::ScriptVersion;
use plotline_core::shot::Shot;
use plotline_core::types::DbId;

/// Shared handle to the store, cloned into every request.
pub type DbPool = Arc<Store>;

/// Rows of every entity, keyed by id.
#[derive(Debug, Default)]
pub struct Tables {
    last_id: DbId,
    /// Story arcs keyed by project id.
    pub story_arcs: HashMap<DbId, StoryArc>,
    pub scene_plots: BTreeMap<DbId, ScenePlot>,
    pub shots: BTreeMap<DbId, Shot>,
    pub scripts: BTreeMap<DbId, ScriptVersion>,
    pub key_actions: BTreeMap<DbId, KeyAction>,
    pub animations: BTreeMap<DbId, Animation>,
}

impl Tables {
    /// Allocate the next id. Ids are unique across all tables.
    pub fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shareable pool handle.
    pub fn pool() -> DbPool {
        Arc::new(Self::new())
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}
