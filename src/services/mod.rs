//! Collaborators the pipeline calls but does not implement: manifest materialization,
//! fullfile generation, pack construction and metadata files.

pub mod external;
pub mod meta;
pub mod mom;

use anyhow::{Result, bail};
use std::fmt;
use std::path::Path;

use crate::{FullfileReport, MomResult, PackReport};

pub use external::{ExternalFullfiles, ExternalManifests, ExternalPacks, ToolCommand};
pub use meta::FsMetadataWriter;
pub use mom::read_mom;

/// Arguments for manifest materialization.
#[derive(Clone, Copy, Debug)]
pub struct ManifestRequest<'a> {
    pub version: u32,
    pub previous: u32,
    pub min_version: u32,
    pub format: u32,
    pub state_dir: &'a Path,
    pub workers: usize,
}

/// Arguments for fullfile generation.
#[derive(Clone, Copy, Debug)]
pub struct FullfileRequest<'a> {
    pub full_manifest: &'a Path,
    pub chroot: &'a Path,
    pub output_dir: &'a Path,
    pub workers: usize,
    pub compression: &'a [String],
}

/// Arguments for building one pack.
#[derive(Clone, Copy, Debug)]
pub struct PackRequest<'a> {
    pub bundle: &'a str,
    pub from: u32,
    pub to: u32,
    pub output_dir: &'a Path,
    pub content_dir: &'a Path,
}

pub trait ManifestService: Send + Sync {
    fn materialize(&self, req: &ManifestRequest<'_>) -> Result<MomResult>;
}

pub trait FullfileService: Send + Sync {
    fn generate(&self, req: &FullfileRequest<'_>) -> Result<FullfileReport>;
}

/// Called concurrently from zero-pack workers.
pub trait PackService: Send + Sync {
    fn build_pack(&self, req: &PackRequest<'_>) -> Result<PackReport>;
}

pub trait MetadataWriter: Send + Sync {
    fn write_meta_files(&self, version_dir: &Path, format: u32, tool_version: &str) -> Result<()>;
}

/// The set of collaborators one pipeline run uses.
pub struct Services {
    pub manifests: Box<dyn ManifestService>,
    pub fullfiles: Box<dyn FullfileService>,
    pub packs: Box<dyn PackService>,
    pub metadata: Box<dyn MetadataWriter>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Stand-in for a tool that is not configured. Fails only if its stage actually runs.
#[derive(Clone, Copy, Debug)]
pub struct MissingTool(pub &'static str);

impl FullfileService for MissingTool {
    fn generate(&self, _req: &FullfileRequest<'_>) -> Result<FullfileReport> {
        bail!("no {} tool configured ([tools.{}])", self.0, self.0)
    }
}

impl PackService for MissingTool {
    fn build_pack(&self, _req: &PackRequest<'_>) -> Result<PackReport> {
        bail!("no {} tool configured ([tools.{}])", self.0, self.0)
    }
}
