//! Mixbuild: builds the update content a content server publishes for one OS version.
//!
//! Manifests are materialized by an external service, then signed, archived and
//! fanned out through bounded worker pools; fullfiles and zero packs follow.

pub mod engine;
pub mod pipeline;
pub mod services;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use pipeline::{BuildContext, build_update_content, run_pool};
pub use services::Services;

/// Result alias used by the public mixbuild API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
