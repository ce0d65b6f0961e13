use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::config::PackagePaths;

/// Build update content (manifests, fullfiles, zero packs) for a content server.
#[derive(Clone, Parser)]
#[command(name = "mixbuild", version)]
pub struct Cli {
    /// Verbose output.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Run the whole update pipeline for one version.
    Build(BuildArgs),
    /// Create an xz-compressed tar archive of regular files.
    Archive {
        /// Archive to write (overwritten if present).
        dst: PathBuf,
        /// Files to include, in order.
        #[arg(required = true)]
        srcs: Vec<PathBuf>,
    },
    /// Write a detached DER signature to FILE.sig.
    Sign {
        file: PathBuf,
        /// Signing certificate; private.pem must sit next to it.
        #[arg(long)]
        cert: PathBuf,
    },
}

#[derive(Clone, Debug, Default, Args)]
pub struct BuildArgs {
    /// Config file. Default: builder.toml in the current directory.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Version being built.
    #[arg(long)]
    pub build_version: Option<String>,

    /// Version this build is based on (0 for a first build).
    #[arg(long)]
    pub previous: Option<String>,

    /// Oldest version clients may update from.
    #[arg(long)]
    pub min_version: Option<String>,

    /// Manifest format.
    #[arg(long)]
    pub format: Option<String>,

    /// Server state directory holding www/ and image/.
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Signing certificate.
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Do not sign Manifest.MoM.
    #[arg(long)]
    pub skip_signing: bool,

    /// Do not generate fullfiles.
    #[arg(long)]
    pub skip_fullfiles: bool,

    /// Do not generate zero packs.
    #[arg(long)]
    pub skip_packs: bool,

    #[arg(long)]
    pub bundle_workers: Option<usize>,

    #[arg(long)]
    pub fullfile_workers: Option<usize>,

    #[arg(long)]
    pub delta_workers: Option<usize>,
}

impl BuildArgs {
    /// Config path, defaulting to the package config filename in the current directory.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(PackagePaths::get().config_filename()))
    }
}
