//! Error types surfaced by the parser layer

use std::io;
use std::path::PathBuf;

/// A source file could not be opened or read
///
/// Scans treat this as a per-file failure: the file is skipped and the
/// rest of the repository is still processed.
#[derive(Debug, thiserror::Error)]
#[error("failed to read {}", path.display())]
pub struct FileAccessError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FileAccessError {
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FileAccessError {
            path: path.into(),
            source,
        }
    }
}
