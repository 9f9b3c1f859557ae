//! Batch planning for scene plot generation.
//!
//! Empty scenes are plotted in fixed-size batches. Each batch request
//! carries a short summary of the scenes just before it so the generated
//! plots stay continuous.

use crate::scene_plot::ScenePlot;

/// Number of scenes sent per plot generation request.
pub const PLOT_BATCH_SIZE: usize = 3;

/// Number of preceding scenes included as continuity context.
pub const CONTINUITY_SCENE_COUNT: usize = 3;

/// Maximum characters kept from each preceding synopsis.
pub const CONTINUITY_SYNOPSIS_CHARS: usize = 100;

/// Split scene numbers into consecutive batches of at most `size`.
///
/// A `size` of zero is treated as one.
pub fn plan_batches(scene_numbers: &[i32], size: usize) -> Vec<Vec<i32>> {
    scene_numbers
        .chunks(size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Continuity context for a batch starting at `first_scene_number`.
///
/// Uses the last [`CONTINUITY_SCENE_COUNT`] scenes numbered below the batch
/// that already have a synopsis, each cut to
/// [`CONTINUITY_SYNOPSIS_CHARS`] characters, one `Scene N: ...` per line.
/// Returns `None` when there is nothing to summarise.
pub fn continuity_summary(scenes: &[ScenePlot], first_scene_number: i32) -> Option<String> {
    let mut prior: Vec<(i32, &str)> = scenes
        .iter()
        .filter(|s| s.scene_number < first_scene_number)
        .filter_map(|s| {
            s.synopsis
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(|text| (s.scene_number, text))
        })
        .collect();

    if prior.is_empty() {
        return None;
    }

    prior.sort_by_key(|(n, _)| *n);
    let start = prior.len().saturating_sub(CONTINUITY_SCENE_COUNT);

    let lines: Vec<String> = prior[start..]
        .iter()
        .map(|(n, text)| format!("Scene {n}: {}", truncate_chars(text, CONTINUITY_SYNOPSIS_CHARS)))
        .collect();
    Some(lines.join("\n"))
}
