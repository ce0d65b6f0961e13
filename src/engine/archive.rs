//! Compressed tar archives of manifest files.
//!
//! Sources are bundled uncompressed with the `tar` crate, piped through an external
//! compressor, and the whole result is held in memory before being written to the
//! destination in one call. No temp file or rename: a crash mid-write can leave a
//! truncated destination, which the next run overwrites.

use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::compress::{Compressor, ExternalWriter};

/// Mode of archives written to the content tree.
pub const ARCHIVE_MODE: u32 = 0o644;

/// Builds compressed archives with one compressor configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Archiver {
    pub compressor: Compressor,
}

impl Archiver {
    pub fn new(compressor: Compressor) -> Self {
        Self { compressor }
    }

    /// Archive `srcs` (regular files only, in order, stored by file name) into `dst`.
    pub fn create<P: AsRef<Path>>(&self, dst: &Path, srcs: &[P]) -> Result<()> {
        self.create_inner(dst, srcs)
            .with_context(|| format!("couldn't create compressed archive {}", dst.display()))
    }

    fn create_inner<P: AsRef<Path>>(&self, dst: &Path, srcs: &[P]) -> Result<()> {
        let mut xw = self.compressor.spawn()?;
        if let Err(e) = archive_files(&mut xw, srcs) {
            // A closed stdin means the compressor exited early; its own error says why.
            if is_broken_pipe(&e) {
                xw.finish()?;
            } else {
                xw.abort();
            }
            return Err(e);
        }
        let compressed = xw.finish()?;
        write_archive(dst, &compressed)
    }
}

fn is_broken_pipe(e: &anyhow::Error) -> bool {
    e.chain()
        .filter_map(|c| c.downcast_ref::<io::Error>())
        .any(|io| io.kind() == io::ErrorKind::BrokenPipe)
}

/// Write a tar stream of `srcs` into `w`. Each entry keeps the source's size and mode.
fn archive_files<P: AsRef<Path>>(w: &mut ExternalWriter, srcs: &[P]) -> Result<()> {
    let mut builder = tar::Builder::new(w);
    for src in srcs {
        let src = src.as_ref();
        let meta = fs::symlink_metadata(src).with_context(|| format!("stat {}", src.display()))?;
        if !meta.file_type().is_file() {
            bail!("{} has unsupported type of file", src.display());
        }
        let name = src
            .file_name()
            .with_context(|| format!("{} has no file name", src.display()))?;
        let data = fs::read(src).with_context(|| format!("read {}", src.display()))?;

        let mut header = tar::Header::new_gnu();
        header.set_metadata(&meta);
        header.set_size(data.len() as u64);
        builder
            .append_data(&mut header, name, data.as_slice())
            .with_context(|| format!("add {} to archive", src.display()))?;
    }
    builder.into_inner().context("finish tar stream")?.flush()?;
    Ok(())
}

#[cfg(unix)]
fn write_archive(dst: &Path, bytes: &[u8]) -> Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    let mut f = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(ARCHIVE_MODE)
        .open(dst)?;
    f.write_all(bytes)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_archive(dst: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(dst, bytes)?;
    Ok(())
}
