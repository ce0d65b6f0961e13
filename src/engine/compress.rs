//! External compression filter: feed bytes to a child process's stdin, collect its stdout.

use anyhow::{Context, Result, anyhow, bail};
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};

/// Program and arguments of a stdin → stdout compressor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compressor {
    pub program: String,
    pub args: Vec<String>,
}

impl Compressor {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// `xz --stdout`, the codec update clients expect for manifest archives.
    pub fn xz() -> Self {
        Self::new("xz", &["--stdout"])
    }

    /// Start the filter process.
    pub fn spawn(&self) -> Result<ExternalWriter> {
        ExternalWriter::spawn(self)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::xz()
    }
}

/// `Write` adapter over a running compressor. Call [`ExternalWriter::finish`] to get the output.
///
/// Stdout is drained on a separate thread so a full pipe never stalls the writer.
pub struct ExternalWriter {
    program: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout_reader: Option<JoinHandle<io::Result<Vec<u8>>>>,
    stderr_reader: Option<JoinHandle<io::Result<Vec<u8>>>>,
}

fn drain<R: Read + Send + 'static>(mut r: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        r.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

impl ExternalWriter {
    fn spawn(c: &Compressor) -> Result<Self> {
        let mut child = Command::new(&c.program)
            .args(&c.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("start compressor {}", c.program))?;
        let stdin = child.stdin.take();
        let stdout_reader = child.stdout.take().map(drain);
        let stderr_reader = child.stderr.take().map(drain);
        Ok(Self {
            program: c.program.clone(),
            child,
            stdin,
            stdout_reader,
            stderr_reader,
        })
    }

    /// Close stdin, wait for the process and return everything it wrote to stdout.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .with_context(|| format!("wait for compressor {}", self.program))?;
        let stdout = join_reader(self.stdout_reader.take(), &self.program)?;
        let stderr = join_reader(self.stderr_reader.take(), &self.program)?;
        if !status.success() {
            bail!(
                "compressor {} failed ({}):\n{}",
                self.program,
                status,
                String::from_utf8_lossy(&stderr)
            );
        }
        Ok(stdout)
    }

    /// Close stdin and reap the child without looking at its result.
    pub fn abort(mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn join_reader(h: Option<JoinHandle<io::Result<Vec<u8>>>>, program: &str) -> Result<Vec<u8>> {
    match h {
        Some(h) => h
            .join()
            .map_err(|_| anyhow!("{} output reader panicked", program))?
            .with_context(|| format!("read output of {}", program)),
        None => Ok(Vec::new()),
    }
}

impl Write for ExternalWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stdin.as_mut() {
            Some(stdin) => stdin.write(buf),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "compressor stdin closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stdin.as_mut() {
            Some(stdin) => stdin.flush(),
            None => Ok(()),
        }
    }
}
