//! Public types shared by the pipeline, the services and the CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Parse a version or format string as a non-negative u32 ordinal.
pub fn parse_version(s: &str) -> Result<u32> {
    s.trim()
        .parse::<u32>()
        .with_context(|| format!("invalid version number {:?}", s))
}

/// A bundle listed in a Manifest-of-Manifests: only name and version are read here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleRef {
    pub name: String,
    pub version: u32,
}

/// Result of manifest materialization for one build.
///
/// `files` lists every bundle in the MoM; `updated_bundles` is the subset whose
/// manifest was (re)written for this version. The full manifest never appears in the MoM.
#[derive(Clone, Debug, Default)]
pub struct MomResult {
    /// Version recorded in the MoM header.
    pub version: u32,
    pub files: Vec<BundleRef>,
    pub updated_bundles: Vec<BundleRef>,
    /// Path of the materialized `Manifest.full`.
    pub full_manifest: PathBuf,
}

/// Counts reported by fullfile generation.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FullfileReport {
    /// Fullfiles already present from an earlier run.
    pub skipped: u64,
    pub not_compressed: u64,
    /// Codec name → number of fullfiles compressed with it.
    pub compressed_counts: BTreeMap<String, u64>,
}

impl FullfileReport {
    pub fn total(&self) -> u64 {
        self.skipped + self.not_compressed + self.compressed_counts.values().sum::<u64>()
    }
}

/// Outcome of building one pack.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackReport {
    pub warnings: Vec<String>,
    pub fullfile_count: u64,
    pub delta_count: u64,
}

/// Worker counts per stage. Each stage creates its own pool of this size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerCounts {
    pub bundle: usize,
    pub fullfile: usize,
    pub delta: usize,
}

impl Default for WorkerCounts {
    fn default() -> Self {
        let n = rayon::current_num_threads();
        Self {
            bundle: n,
            fullfile: n,
            delta: n,
        }
    }
}

/// Which optional stages to skip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkipFlags {
    /// Do not sign Manifest.MoM; its archive then holds only the MoM.
    pub signing: bool,
    pub fullfiles: bool,
    pub packs: bool,
}

/// Counts from the zero-pack stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZeroPackSummary {
    pub built: usize,
    /// Packs already on disk at their canonical path.
    pub skipped: usize,
}

/// What a pipeline run produced. `None` means the stage was skipped.
#[derive(Clone, Debug, Default)]
pub struct BuildSummary {
    pub mom_version: u32,
    pub updated_bundles: usize,
    pub fullfiles: Option<FullfileReport>,
    pub zero_packs: Option<ZeroPackSummary>,
}
