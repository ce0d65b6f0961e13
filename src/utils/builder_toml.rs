//! `builder.toml`: server layout, mix versions, workers and external tools.
//! Values given on the command line win over the file.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::engine::archive::Archiver;
use crate::engine::arg_parser::BuildArgs;
use crate::engine::compress::Compressor;
use crate::engine::signing::Signer;
use crate::pipeline::BuildContext;
use crate::services::{
    ExternalFullfiles, ExternalManifests, ExternalPacks, FsMetadataWriter, MissingTool, Services,
    ToolCommand,
};
use crate::types::parse_version;
use crate::utils::config::{DEFAULT_COMPRESSION, DEFAULT_FORMAT};
use crate::{SkipFlags, WorkerCounts};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuilderToml {
    #[serde(default)]
    pub builder: BuilderSection,
    #[serde(default)]
    pub mix: MixSection,
    #[serde(default)]
    pub swupd: SwupdSection,
    #[serde(default)]
    pub workers: WorkersSection,
    #[serde(default)]
    pub tools: ToolsSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct BuilderSection {
    pub server_state_dir: Option<PathBuf>,
    pub cert: Option<PathBuf>,
}

/// Versions are strings so they go through the same validation as CLI input.
#[derive(Debug, Default, Deserialize)]
pub struct MixSection {
    pub version: Option<String>,
    pub previous_version: Option<String>,
    pub min_version: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SwupdSection {
    pub compression: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkersSection {
    pub bundle: Option<usize>,
    pub fullfile: Option<usize>,
    pub delta: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolsSection {
    pub compressor: Option<ToolCommand>,
    pub signer: Option<String>,
    pub manifests: Option<ToolCommand>,
    pub fullfiles: Option<ToolCommand>,
    pub packs: Option<ToolCommand>,
}

pub fn parse_builder_toml(s: &str) -> Result<BuilderToml> {
    Ok(toml::from_str(s)?)
}

/// Load `path`. A missing file yields defaults (everything must then come from the CLI).
pub fn load_builder_toml(path: &Path) -> Result<BuilderToml> {
    match std::fs::read_to_string(path) {
        Ok(s) => parse_builder_toml(&s).with_context(|| format!("parse {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("{} not found, using command line only", path.display());
            Ok(BuilderToml::default())
        }
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}

fn version_opt(cli: &Option<String>, file: &Option<String>, key: &str) -> Result<Option<u32>> {
    cli.as_ref()
        .or(file.as_ref())
        .map(|s| parse_version(s).with_context(|| format!("invalid {}", key)))
        .transpose()
}

/// Merge file and CLI into a validated context plus the services it will call.
pub fn resolve(file: BuilderToml, args: &BuildArgs) -> Result<(BuildContext, Services)> {
    let Some(version) = version_opt(&args.build_version, &file.mix.version, "version")? else {
        bail!("no build version given (--build-version or [mix] version)");
    };
    let previous =
        version_opt(&args.previous, &file.mix.previous_version, "previous_version")?.unwrap_or(0);
    let min_version =
        version_opt(&args.min_version, &file.mix.min_version, "min_version")?.unwrap_or(0);
    let format = version_opt(&args.format, &file.mix.format, "format")?.unwrap_or(DEFAULT_FORMAT);

    let Some(state_dir) = args
        .state_dir
        .clone()
        .or(file.builder.server_state_dir)
    else {
        bail!("no server state directory given (--state-dir or [builder] server_state_dir)");
    };

    let defaults = WorkerCounts::default();
    let workers = WorkerCounts {
        bundle: args.bundle_workers.or(file.workers.bundle).unwrap_or(defaults.bundle),
        fullfile: args
            .fullfile_workers
            .or(file.workers.fullfile)
            .unwrap_or(defaults.fullfile),
        delta: args.delta_workers.or(file.workers.delta).unwrap_or(defaults.delta),
    };
    let skip = SkipFlags {
        signing: args.skip_signing,
        fullfiles: args.skip_fullfiles,
        packs: args.skip_packs,
    };

    let cert = args.cert.clone().or(file.builder.cert);
    if !skip.signing && cert.is_none() {
        bail!("signing needs a certificate (--cert or [builder] cert), or pass --skip-signing");
    }
    let mut signer = Signer::new(cert.unwrap_or_default());
    if let Some(program) = file.tools.signer {
        signer.program = program;
    }
    let archiver = Archiver::new(
        file.tools
            .compressor
            .map(|c| Compressor {
                program: c.program,
                args: c.args,
            })
            .unwrap_or_default(),
    );

    let ctx = BuildContext {
        state_dir,
        version,
        previous,
        min_version,
        format,
        workers,
        skip,
        compression: file.swupd.compression.unwrap_or_else(|| {
            DEFAULT_COMPRESSION.iter().map(|s| s.to_string()).collect()
        }),
        archiver,
        signer,
    };
    ctx.validate()?;

    let services = Services {
        manifests: Box::new(ExternalManifests {
            command: file.tools.manifests,
        }),
        fullfiles: match file.tools.fullfiles {
            Some(command) => Box::new(ExternalFullfiles { command }),
            None => Box::new(MissingTool("fullfiles")),
        },
        packs: match file.tools.packs {
            Some(command) => Box::new(ExternalPacks { command }),
            None => Box::new(MissingTool("packs")),
        },
        metadata: Box::new(FsMetadataWriter),
    };
    Ok((ctx, services))
}
