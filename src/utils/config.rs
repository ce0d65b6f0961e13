//! Application configuration constants.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    version_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: "builder.toml".to_string(),
                version_filename: format!("{pkg}-version"),
            }
        })
    }

    /// Default config file looked up in the working directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Metadata file recording which tool version built an update.
    pub fn version_filename(&self) -> &str {
        &self.version_filename
    }
}

// ---- Defaults ----

/// Codec names forwarded to fullfile generation when none are configured.
pub const DEFAULT_COMPRESSION: &[&str] = &["external-xz"];

/// Manifest format used when neither the config nor the CLI sets one.
pub const DEFAULT_FORMAT: u32 = 1;
