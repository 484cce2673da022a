//! Gitignore lookups
//!
//! The resolution engine asks a [`GitignoreOracle`] which of its candidate
//! files are ignored. Three implementations are provided: no filtering,
//! ignore-file evaluation with the ignore crate, and `git check-ignore`
//! run as a subprocess under a timeout.

use ignore::WalkBuilder;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from a gitignore lookup
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git check-ignore timed out after {0:?}")]
    Timeout(Duration),

    #[error("git check-ignore exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("ignore-file walk failed: {0}")]
    Walk(#[from] ignore::Error),
}

/// Decides which files are excluded by gitignore rules
pub trait GitignoreOracle: Send + Sync {
    /// Returns the subset of `files` (all under `base`) that are ignored
    fn ignored(&self, base: &Path, files: &[PathBuf]) -> Result<HashSet<PathBuf>, OracleError>;
}

/// Treats nothing as ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGitignore;

impl GitignoreOracle for NoGitignore {
    fn ignored(&self, _base: &Path, _files: &[PathBuf]) -> Result<HashSet<PathBuf>, OracleError> {
        Ok(HashSet::new())
    }
}

/// Evaluates `.gitignore`, `.git/info/exclude` and parent ignore files
/// without requiring a git repository
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreFileOracle;

impl GitignoreOracle for IgnoreFileOracle {
    fn ignored(&self, base: &Path, files: &[PathBuf]) -> Result<HashSet<PathBuf>, OracleError> {
        if files.is_empty() {
            return Ok(HashSet::new());
        }

        let mut kept = HashSet::new();
        let walker = WalkBuilder::new(base)
            .hidden(false)
            .ignore(false)
            .git_global(false)
            .git_ignore(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false)
            .follow_links(false)
            .build();
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_some_and(|ft| ft.is_file()) {
                kept.insert(entry.into_path());
            }
        }

        Ok(files
            .iter()
            .filter(|file| !kept.contains(*file))
            .cloned()
            .collect())
    }
}

/// Asks `git check-ignore` under a timeout
///
/// On failure or timeout the lookup errors, unless `fail_open` is set, in
/// which case nothing is treated as ignored and a warning is logged.
#[derive(Debug, Clone)]
pub struct GitCheckIgnore {
    timeout: Duration,
    fail_open: bool,
}

impl GitCheckIgnore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            fail_open: false,
        }
    }

    pub fn fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    fn run(&self, base: &Path, files: &[PathBuf]) -> Result<HashSet<PathBuf>, OracleError> {
        let mut child = Command::new("git")
            .arg("-C")
            .arg(base)
            .args(["check-ignore", "--stdin", "-z"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(OracleError::Spawn)?;

        let mut input = Vec::new();
        for file in files {
            input.extend_from_slice(file.to_string_lossy().as_bytes());
            input.push(0);
        }

        // Pipes are serviced on their own threads so a full buffer cannot
        // stall the child while we poll it
        let stdin = child.stdin.take();
        thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                let _ = stdin.write_all(&input);
            }
        });
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait().map_err(OracleError::Spawn)? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(OracleError::Timeout(self.timeout));
            }
            thread::sleep(Duration::from_millis(5));
        };

        let collect = |handle: Option<thread::JoinHandle<Vec<u8>>>| {
            handle
                .and_then(|h| h.join().ok())
                .unwrap_or_default()
        };
        let stdout = collect(stdout);
        let stderr = String::from_utf8_lossy(&collect(stderr)).trim().to_string();

        match status.code() {
            Some(0) => Ok(String::from_utf8_lossy(&stdout)
                .split('\0')
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
                .collect()),
            // No path is ignored
            Some(1) => Ok(HashSet::new()),
            Some(128) if stderr.contains("not a git repository") => {
                tracing::debug!(base = %base.display(), "not a git repository, nothing ignored");
                Ok(HashSet::new())
            }
            code => Err(OracleError::Failed {
                status: code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")),
                stderr,
            }),
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

impl GitignoreOracle for GitCheckIgnore {
    fn ignored(&self, base: &Path, files: &[PathBuf]) -> Result<HashSet<PathBuf>, OracleError> {
        if files.is_empty() {
            return Ok(HashSet::new());
        }
        match self.run(base, files) {
            Ok(ignored) => Ok(ignored),
            Err(e) if self.fail_open => {
                tracing::warn!(base = %base.display(), error = %e, "gitignore lookup failed, treating nothing as ignored");
                Ok(HashSet::new())
            }
            Err(e) => Err(e),
        }
    }
}
