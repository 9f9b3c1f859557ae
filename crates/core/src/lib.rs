//! Plotline content model.
//!
//! Types and pure rules for the beat → scene → shot hierarchy, script
//! versions and key actions. No I/O lives here, so the service and the
//! client share exactly the same behaviour.

pub mod animation;
pub mod beats;
pub mod distribution;
pub mod error;
pub mod key_action;
pub mod ordering;
pub mod plot_batch;
pub mod scene_plot;
pub mod script;
pub mod shot;
pub mod types;
pub mod validation;
