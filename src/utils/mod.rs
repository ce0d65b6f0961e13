pub mod builder_toml;
pub mod config;
pub mod logger;
pub mod stopwatch;

pub use config::*;
pub use logger::setup_logging;
pub use stopwatch::Stopwatch;
