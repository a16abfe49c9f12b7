//! Remote repository support
//!
//! Remote sources are shallow-cloned into a temporary directory that is
//! removed when the returned handle is dropped.
//!
//! Uses git CLI directly (no libgit2) for portability.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const REMOTE_PREFIXES: &[&str] = &["http://", "https://", "git@"];
const FALLBACK_NAME: &str = "repository";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Check whether a repository source names a remote to clone
pub fn is_remote(source: &str) -> bool {
    REMOTE_PREFIXES.iter().any(|p| source.starts_with(p))
}

/// Derive a display name from a repository URL or path
///
/// Takes the last path segment with any trailing `/` and `.git` removed,
/// falling back to `repository` when nothing usable remains.
pub fn repo_name(source: &str) -> String {
    let trimmed = source.trim().trim_end_matches(['/', '\\']);
    let segment = trimmed
        .rsplit(['/', '\\', ':'])
        .next()
        .unwrap_or(trimmed);
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// A shallow clone living in a temporary directory
#[derive(Debug)]
pub struct Checkout {
    dir: TempDir,
}

impl Checkout {
    /// Root of the checked-out working tree
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Clone `url` with `--depth 1`, killing git if it exceeds `timeout`
///
/// Also aborts early when `cancel` is set.
pub fn clone_shallow(url: &str, timeout: Duration, cancel: &AtomicBool) -> Result<Checkout> {
    let dir = tempfile::Builder::new()
        .prefix("funcsize-")
        .tempdir()
        .context("failed to create temporary directory")?;

    let mut command = Command::new("git");
    command
        .args(["clone", "--depth", "1", "--quiet", "--", url])
        .arg(dir.path())
        .env("GIT_TERMINAL_PROMPT", "0");
    run_with_deadline(command, &format!("clone of {}", url), timeout, cancel)?;

    tracing::debug!(url, path = %dir.path().display(), "cloned repository");
    Ok(Checkout { dir })
}

/// Run `command` to completion, killing it on timeout or cancellation
///
/// Stderr is drained on a helper thread while the child runs; on failure
/// its text becomes the error message.
fn run_with_deadline(
    mut command: Command,
    what: &str,
    timeout: Duration,
    cancel: &AtomicBool,
) -> Result<()> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start {}", what))?;

    let drain = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut text = String::new();
            let _ = pipe.read_to_string(&mut text);
            text
        })
    });

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().context("failed to wait for child process")? {
            break status;
        }
        if cancel.load(Ordering::Relaxed) {
            let _ = child.kill();
            let _ = child.wait();
            anyhow::bail!("{} cancelled", what);
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            anyhow::bail!("{} timed out after {}s", what, timeout.as_secs());
        }
        thread::sleep(POLL_INTERVAL);
    };

    if !status.success() {
        let stderr = drain
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        anyhow::bail!("{} failed: {}", what, stderr.trim());
    }
    Ok(())
}
