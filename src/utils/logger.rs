use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Install the logger: dependencies at warn, this crate at info (debug with `verbose`).
/// `RUST_LOG` still applies. A second call is a no-op.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let msg = record.args().to_string();
            let line = match record.level() {
                Level::Error => format!("[{} {}] {}", name, "ERROR".red(), msg),
                Level::Warn => format!("[{} {}] {}", name, "WARN".yellow(), msg),
                // Stage banners from the stopwatch.
                Level::Info if msg.starts_with("=>") => format!("[{}] {}", name, msg.bold()),
                Level::Info => format!("[{}] {}", name, msg),
                _ => format!(
                    "[{} {}] {}",
                    name,
                    record.target().dimmed(),
                    msg.dimmed()
                ),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
