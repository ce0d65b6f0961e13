//! Zero packs: for every bundle in the MoM, make sure `pack-<bundle>-from-0.tar` exists.
//!
//! The file at the canonical path is the cache key. Any entry there (even of the wrong
//! type) counts as built and is left untouched.

use anyhow::{Context, Result};
use log::{info, warn};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::tools::pack_path;
use crate::pipeline::BuildContext;
use crate::pipeline::pool::run_pool;
use crate::services::{PackRequest, PackService};
use crate::{BundleRef, ZeroPackSummary};

/// Whether the pack for `bundle` is already on disk. Stat errors other than
/// not-found are returned, never treated as "needs building".
pub fn zero_pack_exists(www: &Path, bundle: &BundleRef) -> Result<bool> {
    let path = pack_path(www, bundle.version, &bundle.name, 0);
    match std::fs::symlink_metadata(&path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e)
            .with_context(|| format!("couldn't access existing pack file {}", path.display())),
    }
}

/// Build missing zero packs for `bundles` with `ctx.workers.delta` workers.
pub fn create_zero_packs(
    ctx: &BuildContext,
    packs: &dyn PackService,
    bundles: &[BundleRef],
) -> Result<ZeroPackSummary> {
    info!("Using {} workers", ctx.workers.delta);
    let www = ctx.www_dir();
    let content_dir = ctx.image_dir();
    let built = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    run_pool(bundles, ctx.workers.delta, |bundle: &BundleRef| {
        if zero_pack_exists(&www, bundle)? {
            info!(
                "Zero pack {} already exists for version {}",
                bundle.name, bundle.version
            );
            skipped.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        info!(
            "Creating zero pack {} for version {}",
            bundle.name, bundle.version
        );
        let report = packs
            .build_pack(&PackRequest {
                bundle: &bundle.name,
                from: 0,
                to: bundle.version,
                output_dir: &www,
                content_dir: &content_dir,
            })
            .with_context(|| {
                format!(
                    "couldn't make pack {} for version {}",
                    bundle.name, bundle.version
                )
            })?;
        if !report.warnings.is_empty() {
            warn!("Warnings during pack {}:", bundle.name);
            for w in &report.warnings {
                warn!("  {}", w);
            }
        }
        info!("Fullfiles in pack {}: {}", bundle.name, report.fullfile_count);
        info!("Deltas in pack {}: {}", bundle.name, report.delta_count);
        built.fetch_add(1, Ordering::Relaxed);
        Ok(())
    })?;

    Ok(ZeroPackSummary {
        built: built.into_inner(),
        skipped: skipped.into_inner(),
    })
}
