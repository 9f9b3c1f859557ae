//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in [`crate::repositories`] and to
//! the generator in [`crate::state::AppState`], mapping errors via
//! [`crate::error::AppError`].

pub mod project;
pub mod scene_plot;
pub mod script;
pub mod shot;
