//! Collaborators backed by external tools.
//!
//! Each tool is a [`ToolCommand`] whose arguments may contain `{placeholders}`; they are
//! filled per call. Fullfile and pack tools may print a JSON report on stdout.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use super::{
    FullfileRequest, FullfileService, ManifestRequest, ManifestService, PackRequest, PackService,
    read_mom,
};
use crate::engine::tools::{manifest_path, www_dir};
use crate::{FullfileReport, MomResult, PackReport};

/// An external program plus templated arguments, e.g. `["--statedir", "{state_dir}"]`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Substitute `{key}` occurrences in each argument.
    pub fn render(&self, vars: &HashMap<&str, String>) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (k, v)| {
                    acc.replace(&format!("{{{k}}}"), v)
                })
            })
            .collect()
    }

    /// Run with substituted arguments and return stdout. Non-zero exit is an error
    /// carrying all of stdout followed by all of stderr. The streams are captured
    /// apart because stdout alone holds the JSON report.
    pub fn run(&self, vars: &HashMap<&str, String>) -> Result<Vec<u8>> {
        let args = self.render(vars);
        log::debug!("running {} {}", self.program, args.join(" "));
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| format!("run {}", self.program))?;
        if !output.status.success() {
            let mut combined = output.stdout;
            combined.extend_from_slice(&output.stderr);
            bail!(
                "{} failed ({}):\n{}",
                self.program,
                output.status,
                String::from_utf8_lossy(&combined)
            );
        }
        Ok(output.stdout)
    }
}

fn path_var(p: &Path) -> String {
    p.display().to_string()
}

/// Empty (or whitespace) stdout means "no report".
fn parse_report<T: DeserializeOwned + Default>(program: &str, stdout: &[u8]) -> Result<T> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(stdout).with_context(|| format!("parse report from {}", program))
}

/// Runs an optional manifest tool, then reads the Manifest.MoM it left under `www/<version>/`.
#[derive(Clone, Debug, Default)]
pub struct ExternalManifests {
    /// `None` when manifests were materialized before the build started.
    pub command: Option<ToolCommand>,
}

impl ManifestService for ExternalManifests {
    fn materialize(&self, req: &ManifestRequest<'_>) -> Result<MomResult> {
        if let Some(cmd) = &self.command {
            let vars = HashMap::from([
                ("state_dir", path_var(req.state_dir)),
                ("version", req.version.to_string()),
                ("previous", req.previous.to_string()),
                ("min_version", req.min_version.to_string()),
                ("format", req.format.to_string()),
                ("workers", req.workers.to_string()),
            ]);
            cmd.run(&vars)?;
        }
        let www = www_dir(req.state_dir);
        let mut mom = read_mom(&manifest_path(&www, req.version, "MoM"))?;
        if mom.version != req.version {
            bail!(
                "Manifest.MoM reports version {} but version {} is being built",
                mom.version,
                req.version
            );
        }
        mom.full_manifest = manifest_path(&www, req.version, "full");
        Ok(mom)
    }
}

#[derive(Clone, Debug)]
pub struct ExternalFullfiles {
    pub command: ToolCommand,
}

impl FullfileService for ExternalFullfiles {
    fn generate(&self, req: &FullfileRequest<'_>) -> Result<FullfileReport> {
        let vars = HashMap::from([
            ("full_manifest", path_var(req.full_manifest)),
            ("chroot", path_var(req.chroot)),
            ("output_dir", path_var(req.output_dir)),
            ("workers", req.workers.to_string()),
            ("compression", req.compression.join(",")),
        ]);
        let stdout = self.command.run(&vars)?;
        parse_report(&self.command.program, &stdout)
    }
}

#[derive(Clone, Debug)]
pub struct ExternalPacks {
    pub command: ToolCommand,
}

impl PackService for ExternalPacks {
    fn build_pack(&self, req: &PackRequest<'_>) -> Result<PackReport> {
        let vars = HashMap::from([
            ("bundle", req.bundle.to_string()),
            ("from", req.from.to_string()),
            ("to", req.to.to_string()),
            ("output_dir", path_var(req.output_dir)),
            ("content_dir", path_var(req.content_dir)),
        ]);
        let stdout = self.command.run(&vars)?;
        parse_report(&self.command.program, &stdout)
    }
}
