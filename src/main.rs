//! Mixbuild CLI: build, archive or sign update content.

use anyhow::Result;
use clap::Parser;
use mixbuild::engine::arg_parser::Cli;
use mixbuild::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
