//! Path helpers. Every artifact path is a pure function of state dir, version and bundle name.

use std::path::{Path, PathBuf};

/// `<state_dir>/www`
pub fn www_dir(state_dir: &Path) -> PathBuf {
    state_dir.join("www")
}

/// `<www>/<version>`
pub fn version_dir(www: &Path, version: u32) -> PathBuf {
    www.join(version.to_string())
}

/// `<www>/<version>/Manifest.<name>` (`MoM`, `full`, or a bundle name).
pub fn manifest_path(www: &Path, version: u32, name: &str) -> PathBuf {
    version_dir(www, version).join(format!("Manifest.{name}"))
}

/// Append a suffix to the full file name (`Manifest.MoM` → `Manifest.MoM.sig`).
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// File name of the pack taking `bundle` from version `from` to the version it is stored under.
pub fn pack_file_name(bundle: &str, from: u32) -> String {
    format!("pack-{bundle}-from-{from}.tar")
}

/// Canonical location of a pack: `<www>/<version>/pack-<bundle>-from-<from>.tar`.
pub fn pack_path(www: &Path, version: u32, bundle: &str, from: u32) -> PathBuf {
    version_dir(www, version).join(pack_file_name(bundle, from))
}
