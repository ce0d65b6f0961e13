//! Pipeline components: build context, worker pool, stage sequencing, zero packs.

pub mod context;
pub mod orchestrator;
pub mod pool;
pub mod zero_pack;

pub use context::BuildContext;
pub use orchestrator::{archive_bundle_manifests, build_update_content};
pub use pool::run_pool;
pub use zero_pack::{create_zero_packs, zero_pack_exists};
