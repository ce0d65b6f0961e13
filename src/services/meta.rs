use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::MetadataWriter;
use crate::utils::config::PackagePaths;

/// Writes `format` and `<pkg>-version` into the version's output directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsMetadataWriter;

impl MetadataWriter for FsMetadataWriter {
    fn write_meta_files(&self, version_dir: &Path, format: u32, tool_version: &str) -> Result<()> {
        fs::create_dir_all(version_dir)
            .with_context(|| format!("create {}", version_dir.display()))?;
        let files = [
            ("format".to_string(), format.to_string()),
            (PackagePaths::get().version_filename().to_string(), tool_version.to_string()),
        ];
        for (name, contents) in files {
            let path = version_dir.join(name);
            fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        }
        Ok(())
    }
}
