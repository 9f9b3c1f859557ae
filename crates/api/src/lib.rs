//! Plotline API server library.
//!
//! Exposes the building blocks (config, state, store, error handling,
//! generation backend, routes) so integration tests and the binary
//! entrypoint can both access them.

pub mod config;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod repositories;
pub mod router;
pub mod routes;
pub mod state;
pub mod store;
