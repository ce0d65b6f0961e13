//! Detached signatures via an external `openssl smime` invocation.

use anyhow::{Context, Result, bail};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::engine::tools::with_suffix;

/// Private key file expected next to the signing certificate.
pub const PRIVATE_KEY_NAME: &str = "private.pem";

/// Signing tool and certificate. The key is found beside the certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signer {
    pub program: String,
    pub cert: PathBuf,
}

impl Signer {
    pub fn new(cert: impl Into<PathBuf>) -> Self {
        Self {
            program: "openssl".to_string(),
            cert: cert.into(),
        }
    }

    pub fn private_key(&self) -> PathBuf {
        self.cert
            .parent()
            .unwrap_or(Path::new("."))
            .join(PRIVATE_KEY_NAME)
    }

    /// Sign `file`, writing a DER detached signature to `<file>.sig`. Returns the signature path.
    ///
    /// On failure the error carries the tool's combined output; a partial `.sig` may remain.
    pub fn sign(&self, file: &Path) -> Result<PathBuf> {
        let sig = with_suffix(file, ".sig");
        let mut cmd = Command::new(&self.program);
        cmd.arg("smime")
            .arg("-sign")
            .arg("-binary")
            .arg("-in")
            .arg(file)
            .arg("-signer")
            .arg(&self.cert)
            .arg("-inkey")
            .arg(self.private_key())
            .args(["-outform", "DER"])
            .arg("-out")
            .arg(&sig);
        let (status, combined) = combined_output(cmd)
            .with_context(|| format!("run {} to sign {}", self.program, file.display()))?;
        if !status.success() {
            bail!(
                "failed to sign file {}:\n{}",
                file.display(),
                String::from_utf8_lossy(&combined)
            );
        }
        Ok(sig)
    }
}

/// Run `cmd` with stdout and stderr sharing one pipe, so the output keeps the order
/// the tool wrote it in.
fn combined_output(mut cmd: Command) -> io::Result<(ExitStatus, Vec<u8>)> {
    let (mut reader, writer) = io::pipe()?;
    cmd.stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer);
    let mut child = cmd.spawn()?;
    // The command still holds the write ends; the read only sees EOF once they are gone.
    drop(cmd);
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok((child.wait()?, out))
}

impl Default for Signer {
    fn default() -> Self {
        Self::new("Swupd_Root.pem")
    }
}
