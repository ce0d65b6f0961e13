//! Shared fixtures: a server state tree, stand-in tools and fake collaborators.
#![allow(dead_code)]

use anyhow::Result;
use mixbuild::engine::{Archiver, Compressor, Signer, pack_file_name};
use mixbuild::services::{
    ExternalManifests, FsMetadataWriter, FullfileRequest, FullfileService, PackRequest,
    PackService, Services,
};
use mixbuild::{BuildContext, FullfileReport, PackReport, SkipFlags, WorkerCounts};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const VERSION: u32 = 20;
pub const PREVIOUS: u32 = 10;

/// Pass-through "compressor" so archives are plain tar streams.
pub fn identity_archiver() -> Archiver {
    Archiver::new(Compressor::new("cat", &[]))
}

#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stand-in for `openssl smime`: records its arguments and writes the `-out` file.
#[cfg(unix)]
pub fn fake_openssl(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-openssl",
        r#"echo "$@" > "$(dirname "$0")/openssl-args.txt"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-out" ]; then out="$2"; fi
  shift
done
printf 'signature' > "$out"
"#,
    )
}

pub fn www(state: &Path) -> PathBuf {
    state.join("www")
}

pub fn version_dir(state: &Path) -> PathBuf {
    www(state).join(VERSION.to_string())
}

/// Write Manifest.MoM listing `bundles` at VERSION, one Manifest.<bundle> each
/// (unless listed in `missing`), Manifest.full, and a small chroot.
pub fn stage_manifests(state: &Path, bundles: &[&str], missing: &[&str]) {
    let dir = version_dir(state);
    fs::create_dir_all(&dir).unwrap();
    let mut mom = format!(
        "MANIFEST\t1\nversion:\t{VERSION}\nprevious:\t{PREVIOUS}\nfilecount:\t{}\n\n",
        bundles.len()
    );
    for b in bundles {
        mom.push_str(&format!("M...\t{:0>64}\t{VERSION}\t{b}\n", 0));
        if !missing.contains(b) {
            fs::write(dir.join(format!("Manifest.{b}")), format!("manifest of {b}\n")).unwrap();
        }
    }
    fs::write(dir.join("Manifest.MoM"), mom).unwrap();
    fs::write(dir.join("Manifest.full"), "full manifest\n").unwrap();

    let chroot = state.join("image").join(VERSION.to_string()).join("full");
    fs::create_dir_all(chroot.join("usr/bin")).unwrap();
    fs::write(chroot.join("usr/bin/tool"), "binary").unwrap();
    fs::write(chroot.join("usr/README"), "readme").unwrap();
}

pub fn context(state: &Path, signer: Signer, workers: WorkerCounts, skip: SkipFlags) -> BuildContext {
    BuildContext {
        state_dir: state.to_path_buf(),
        version: VERSION,
        previous: PREVIOUS,
        min_version: 0,
        format: 1,
        workers,
        skip,
        compression: vec!["external-xz".to_string()],
        archiver: identity_archiver(),
        signer,
    }
}

/// Counts regular files in the chroot as "not compressed" fullfiles.
pub struct CountingFullfiles;

impl FullfileService for CountingFullfiles {
    fn generate(&self, req: &FullfileRequest<'_>) -> Result<FullfileReport> {
        let n = walkdir::WalkDir::new(req.chroot)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count();
        fs::create_dir_all(req.output_dir)?;
        Ok(FullfileReport {
            not_compressed: n as u64,
            ..Default::default()
        })
    }
}

/// Writes a small pack file and records which bundles it was asked to build.
#[derive(Clone, Default)]
pub struct RecordingPacks {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_on: Option<String>,
}

impl PackService for RecordingPacks {
    fn build_pack(&self, req: &PackRequest<'_>) -> Result<PackReport> {
        self.calls.lock().unwrap().push(req.bundle.to_string());
        if self.fail_on.as_deref() == Some(req.bundle) {
            anyhow::bail!("pack tool crashed");
        }
        let path = req
            .output_dir
            .join(req.to.to_string())
            .join(pack_file_name(req.bundle, req.from));
        fs::write(path, format!("pack {}", req.bundle))?;
        Ok(PackReport {
            warnings: vec![format!("{} has no deltas", req.bundle)],
            fullfile_count: 2,
            delta_count: 0,
        })
    }
}

pub fn services(packs: RecordingPacks) -> Services {
    Services {
        manifests: Box::new(ExternalManifests { command: None }),
        fullfiles: Box::new(CountingFullfiles),
        packs: Box::new(packs),
        metadata: Box::new(FsMetadataWriter),
    }
}

/// Entry names of a plain (uncompressed) tar archive, in order.
pub fn tar_names(path: &Path) -> Vec<String> {
    let f = fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(f);
    archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().display().to_string())
        .collect()
}
