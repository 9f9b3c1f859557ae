//! Plotline client.
//!
//! [`api::StudioApi`] maps the REST endpoints one to one. The
//! [`workflow`] controllers build the editing flows on top of it, keeping a
//! shared [`store::StudioStore`] in step with the service and running
//! generation loops through [`queue::BatchQueue`].

pub mod api;
pub mod config;
pub mod error;
pub mod queue;
pub mod store;
pub mod workflow;

pub use api::StudioApi;
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, ClientResult};
pub use workflow::Studio;
