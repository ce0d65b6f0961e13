//! Reader for a materialized Manifest.MoM (swupd text manifest).
//!
//! Header: `key:\tvalue` lines (the first line is `MANIFEST\t<format>`), ended by a
//! blank line. Body: `flags\thash\tversion\tname` entries; a flag starting with `M`
//! marks a bundle manifest.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::types::parse_version;
use crate::{BundleRef, MomResult};

/// Parse MoM text. Bundles whose version equals the header version are "updated".
pub fn parse_mom(text: &str) -> Result<MomResult> {
    let mut lines = text.lines().enumerate();
    let mut version = None;

    for (_, line) in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
        if let Some(v) = line.strip_prefix("version:") {
            version = Some(parse_version(v).context("MoM header version")?);
        }
    }
    let Some(version) = version else {
        bail!("MoM header has no version");
    };

    let mut mom = MomResult {
        version,
        ..Default::default()
    };
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let [flags, _hash, ver, name] = fields.as_slice() else {
            bail!("MoM line {}: expected 4 tab-separated fields", idx + 1);
        };
        if !flags.starts_with('M') {
            continue;
        }
        let bundle = BundleRef {
            name: name.to_string(),
            version: parse_version(ver).with_context(|| format!("MoM line {}", idx + 1))?,
        };
        if bundle.version == version {
            mom.updated_bundles.push(bundle.clone());
        }
        mom.files.push(bundle);
    }
    Ok(mom)
}

/// Read and parse `path`. `full_manifest` is left empty for the caller to fill.
pub fn read_mom(path: &Path) -> Result<MomResult> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_mom(&text).with_context(|| format!("parse {}", path.display()))
}
