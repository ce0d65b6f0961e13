//! Build context: versions, directories and tuning threaded through every stage.

use anyhow::{Result, bail};
use std::path::PathBuf;

use crate::engine::archive::Archiver;
use crate::engine::signing::Signer;
use crate::engine::tools;
use crate::{SkipFlags, WorkerCounts};

/// Everything a pipeline run needs. Built once by the caller (CLI or lib user) and
/// borrowed by each stage; nothing is read from process-wide state.
#[derive(Clone, Debug)]
pub struct BuildContext {
    /// Root of the server state tree (`www/`, `image/`).
    pub state_dir: PathBuf,
    pub version: u32,
    pub previous: u32,
    pub min_version: u32,
    /// Manifest schema format, passed through to manifest materialization.
    pub format: u32,
    pub workers: WorkerCounts,
    pub skip: SkipFlags,
    /// Codec names forwarded to fullfile generation.
    pub compression: Vec<String>,
    pub archiver: Archiver,
    pub signer: Signer,
}

impl BuildContext {
    /// Check the invariants the stages rely on.
    pub fn validate(&self) -> Result<()> {
        if self.version <= self.previous {
            bail!(
                "build version {} must be greater than previous version {}",
                self.version,
                self.previous
            );
        }
        for (name, n) in [
            ("bundle", self.workers.bundle),
            ("fullfile", self.workers.fullfile),
            ("delta", self.workers.delta),
        ] {
            if n == 0 {
                bail!("{} worker count must be at least 1", name);
            }
        }
        Ok(())
    }

    /// `<state_dir>/www`
    pub fn www_dir(&self) -> PathBuf {
        tools::www_dir(&self.state_dir)
    }

    /// `<state_dir>/www/<version>`
    pub fn version_dir(&self) -> PathBuf {
        tools::version_dir(&self.www_dir(), self.version)
    }

    /// `<state_dir>/www/<version>/files`
    pub fn fullfiles_dir(&self) -> PathBuf {
        self.version_dir().join("files")
    }

    /// `<state_dir>/image`: per-bundle content consumed by pack construction.
    pub fn image_dir(&self) -> PathBuf {
        self.state_dir.join("image")
    }

    /// `<state_dir>/image/<version>/full`: the materialized chroot.
    pub fn full_chroot(&self) -> PathBuf {
        self.image_dir().join(self.version.to_string()).join("full")
    }
}
