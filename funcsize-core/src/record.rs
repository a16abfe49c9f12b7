//! Function records produced by the boundary detectors
//!
//! Global invariants enforced:
//! - `start_line >= 1` and `end_line >= start_line`
//! - `size == end_line - start_line + 1`
//! - A record is immutable once constructed

use serde::Serialize;
use std::fmt;

/// Name used when a declaration's identifier cannot be recovered
pub const ANONYMOUS: &str = "<anonymous>";

/// A detected function or method and its inclusive line range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionRecord {
    name: String,
    file_path: String,
    start_line: usize,
    end_line: usize,
    size: usize,
}

impl FunctionRecord {
    /// Create a record for the inclusive range `start_line..=end_line`
    ///
    /// An empty `name` is replaced with [`ANONYMOUS`]. Callers guarantee
    /// `1 <= start_line <= end_line`.
    pub fn new(
        name: impl Into<String>,
        file_path: impl Into<String>,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        debug_assert!(start_line >= 1, "line numbers are 1-based");
        debug_assert!(
            end_line >= start_line,
            "end_line {} precedes start_line {}",
            end_line,
            start_line
        );

        let name = name.into();
        let name = if name.is_empty() {
            ANONYMOUS.to_string()
        } else {
            name
        };

        FunctionRecord {
            name,
            file_path: file_path.into(),
            start_line,
            end_line,
            size: end_line - start_line + 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the scanned repository root
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// Inclusive line count
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check whether this record's line range encloses another's
    pub fn contains(&self, other: &FunctionRecord) -> bool {
        self.start_line <= other.start_line && other.end_line <= self.end_line
    }
}

impl fmt::Display for FunctionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{}-{}, {} lines)",
            self.name, self.file_path, self.start_line, self.end_line, self.size
        )
    }
}
