//! Manual ordering of shots and scenes.
//!
//! Reordering is a stable splice-and-reinsert followed by a total
//! renumbering 1..N, so the resulting numbers never have gaps or
//! duplicates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scene_plot::ScenePlot;
use crate::shot::Shot;
use crate::types::DbId;

/// An entity whose position is a 1-based number.
pub trait Numbered {
    fn id(&self) -> DbId;
    fn number(&self) -> i32;
    fn set_number(&mut self, number: i32);
}

impl Numbered for Shot {
    fn id(&self) -> DbId {
        self.id
    }
    fn number(&self) -> i32 {
        self.shot_number
    }
    fn set_number(&mut self, number: i32) {
        self.shot_number = number;
    }
}

impl Numbered for ScenePlot {
    fn id(&self) -> DbId {
        self.id
    }
    fn number(&self) -> i32 {
        self.scene_number
    }
    fn set_number(&mut self, number: i32) {
        self.scene_number = number;
    }
}

/// Wire form of one entry of a shot reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotOrder {
    pub id: DbId,
    pub shot_number: i32,
}

/// Wire form of one entry of a scene reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneOrder {
    pub id: DbId,
    pub scene_number: i32,
}

/// Move the element at `from` so that it ends up at index `to`.
///
/// Both indices must be within bounds; the vector is untouched on error.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), CoreError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(CoreError::Validation(format!(
            "move from {from} to {to} is out of bounds for {len} items"
        )));
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Rewrite every number sequentially by position, starting at 1.
pub fn renumber<T: Numbered>(items: &mut [T]) {
    for (idx, item) in items.iter_mut().enumerate() {
        item.set_number(idx as i32 + 1);
    }
}

/// Move one item and renumber the whole list.
pub fn reorder<T: Numbered>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), CoreError> {
    move_item(items, from, to)?;
    renumber(items);
    Ok(())
}

/// Current `{id, shot_number}` list for a reorder request.
pub fn shot_orders(shots: &[Shot]) -> Vec<ShotOrder> {
    shots
        .iter()
        .map(|s| ShotOrder {
            id: s.id,
            shot_number: s.shot_number,
        })
        .collect()
}

/// Current `{id, scene_number}` list for a reorder request.
pub fn scene_orders(scenes: &[ScenePlot]) -> Vec<SceneOrder> {
    scenes
        .iter()
        .map(|s| SceneOrder {
            id: s.id,
            scene_number: s.scene_number,
        })
        .collect()
}

/// Whether `numbers` is a permutation of `1..=numbers.len()`.
pub fn is_contiguous(numbers: impl IntoIterator<Item = i32>) -> bool {
    let mut sorted: Vec<i32> = numbers.into_iter().collect();
    sorted.sort_unstable();
    sorted.iter().enumerate().all(|(idx, n)| *n == idx as i32 + 1)
}

/// Validate a full reorder request against the ids currently stored.
///
/// The request must name every existing id exactly once and the numbers
/// must form 1..N.
pub fn validate_full_reorder(
    requested: &[(DbId, i32)],
    existing_ids: &BTreeSet<DbId>,
) -> Result<(), CoreError> {
    let requested_ids: BTreeSet<DbId> = requested.iter().map(|(id, _)| *id).collect();
    if requested_ids.len() != requested.len() {
        return Err(CoreError::Validation(
            "reorder request contains duplicate ids".to_string(),
        ));
    }
    if &requested_ids != existing_ids {
        return Err(CoreError::Validation(
            "reorder request must include every item exactly once".to_string(),
        ));
    }
    if !is_contiguous(requested.iter().map(|(_, n)| *n)) {
        return Err(CoreError::Validation(
            "numbers must be contiguous starting at 1".to_string(),
        ));
    }
    Ok(())
}
