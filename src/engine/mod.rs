//! Engine: archiving, compression filter, signing, path helpers and the CLI.

pub mod archive;
pub mod arg_parser;
pub mod cli;
pub mod compress;
pub mod signing;
pub mod tools;

pub use archive::Archiver;
pub use arg_parser::{BuildArgs, Cli, Commands};
pub use cli::handle_run;
pub use compress::Compressor;
pub use signing::Signer;
pub use tools::{manifest_path, pack_file_name, pack_path, version_dir, with_suffix, www_dir};
