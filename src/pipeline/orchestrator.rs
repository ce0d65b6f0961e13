//! Stage sequencing for one update build.
//!
//! metadata → manifests → sign MoM → archive MoM → archive bundle manifests (pool)
//! → archive full manifest → fullfiles → zero packs (pool). Stages run strictly in
//! order and the first failing stage ends the build; nothing written so far is rolled back.

use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use crate::engine::tools::{manifest_path, with_suffix};
use crate::pipeline::BuildContext;
use crate::pipeline::pool::run_pool;
use crate::pipeline::zero_pack::create_zero_packs;
use crate::services::{FullfileRequest, ManifestRequest, Services};
use crate::utils::stopwatch::Stopwatch;
use crate::{BuildSummary, BundleRef, FullfileReport, MomResult};

/// Run every stage for `ctx.version`.
pub fn build_update_content(ctx: &BuildContext, services: &Services) -> Result<BuildSummary> {
    ctx.validate()?;
    let mut timer = Stopwatch::default();

    services
        .metadata
        .write_meta_files(&ctx.version_dir(), ctx.format, env!("CARGO_PKG_VERSION"))
        .context("failed to write update metadata files")?;

    timer.start("CREATE MANIFESTS");
    let mom = services
        .manifests
        .materialize(&ManifestRequest {
            version: ctx.version,
            previous: ctx.previous,
            min_version: ctx.min_version,
            format: ctx.format,
            state_dir: &ctx.state_dir,
            workers: ctx.workers.bundle,
        })
        .context("failed to create update metadata")?;
    log_mom(&mom);

    archive_mom(ctx)?;
    archive_bundle_manifests(ctx, &mom.updated_bundles)?;

    // The full manifest is not listed in the MoM.
    info!("  full");
    let full = manifest_path(&ctx.www_dir(), ctx.version, "full");
    ctx.archiver.create(&with_suffix(&full, ".tar"), &[&full])?;
    timer.stop();

    let fullfiles = if ctx.skip.fullfiles {
        info!("=> CREATE FULLFILES - skipped");
        None
    } else {
        timer.start("CREATE FULLFILES");
        let report = create_fullfiles(ctx, services, &mom)?;
        timer.stop();
        Some(report)
    };

    let zero_packs = if ctx.skip.packs {
        info!("=> CREATE ZERO PACKS - skipped");
        None
    } else {
        timer.start("CREATE ZERO PACKS");
        let summary = create_zero_packs(ctx, services.packs.as_ref(), &mom.files)?;
        timer.stop();
        Some(summary)
    };

    Ok(BuildSummary {
        mom_version: mom.version,
        updated_bundles: mom.updated_bundles.len(),
        fullfiles,
        zero_packs,
    })
}

fn log_mom(mom: &MomResult) {
    info!("MoM version {}", mom.version);
    for f in &mom.files {
        info!("- {:<20} {}", f.name, f.version);
    }
}

/// Sign Manifest.MoM in place (unless skipped) and archive it with its signature.
fn archive_mom(ctx: &BuildContext) -> Result<()> {
    let mom = manifest_path(&ctx.www_dir(), ctx.version, "MoM");
    let mut srcs: Vec<PathBuf> = vec![mom.clone()];
    if !ctx.skip.signing {
        info!("Signing manifest.");
        srcs.push(ctx.signer.sign(&mom)?);
    }
    info!("Compressing Manifest.MoM");
    ctx.archiver.create(&with_suffix(&mom, ".tar"), &srcs)
}

/// Archive each updated bundle's manifest with `ctx.workers.bundle` workers.
/// Archives finished by other workers stay on disk when one fails.
pub fn archive_bundle_manifests(ctx: &BuildContext, bundles: &[BundleRef]) -> Result<()> {
    info!("Compressing bundle manifests");
    let www = ctx.www_dir();
    run_pool(bundles, ctx.workers.bundle, |bundle: &BundleRef| {
        info!("  {}", bundle.name);
        let f = manifest_path(&www, ctx.version, &bundle.name);
        ctx.archiver.create(&with_suffix(&f, ".tar"), &[&f])
    })
}

fn create_fullfiles(
    ctx: &BuildContext,
    services: &Services,
    mom: &MomResult,
) -> Result<FullfileReport> {
    info!("Using {} workers", ctx.workers.fullfile);
    let report = services
        .fullfiles
        .generate(&FullfileRequest {
            full_manifest: &mom.full_manifest,
            chroot: &ctx.full_chroot(),
            output_dir: &ctx.fullfiles_dir(),
            workers: ctx.workers.fullfile,
            compression: &ctx.compression,
        })
        .context("failed to create fullfiles")?;

    info!("- Already created: {}", report.skipped);
    info!("- Not compressed:  {}", report.not_compressed);
    info!("- Compressed");
    for (codec, n) in &report.compressed_counts {
        info!("  - {:<20} {}", codec, n);
    }
    info!("Total fullfiles: {}", report.total());
    Ok(report)
}
