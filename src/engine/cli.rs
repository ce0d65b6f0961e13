//! CLI command handler.

use anyhow::Result;
use log::{debug, info};

use crate::engine::archive::Archiver;
use crate::engine::arg_parser::{BuildArgs, Cli, Commands};
use crate::engine::signing::Signer;
use crate::pipeline::build_update_content;
use crate::utils::builder_toml::{load_builder_toml, resolve};
use crate::utils::setup_logging;

fn handle_build(args: &BuildArgs) -> Result<()> {
    let file = load_builder_toml(&args.config_path())?;
    let (ctx, services) = resolve(file, args)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        ctx
    );
    let summary = build_update_content(&ctx, &services)?;
    info!(
        "Built version {} ({} updated bundles)",
        summary.mom_version, summary.updated_bundles
    );
    Ok(())
}

/// Dispatch a parsed command line.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose);
    match &cli.command {
        Commands::Build(args) => handle_build(args),
        Commands::Archive { dst, srcs } => Archiver::default().create(dst, srcs),
        Commands::Sign { file, cert } => {
            let sig = Signer::new(cert).sign(file)?;
            info!("Wrote {}", sig.display());
            Ok(())
        }
    }
}
