//! Ranking and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Ranks are contiguous and start at 1

use crate::record::FunctionRecord;
use crate::scan::{RepositoryScan, SkippedFile};
use serde::Serialize;

/// A function with its position in a size ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedFunction {
    pub rank: usize,
    #[serde(flatten)]
    pub record: FunctionRecord,
}

/// Rank the `top` largest functions of at least `min_size` lines
///
/// Ordered by size descending, then file path, start line and name
/// ascending.
pub fn rank_functions(records: &[FunctionRecord], min_size: usize, top: usize) -> Vec<RankedFunction> {
    let mut selected: Vec<&FunctionRecord> =
        records.iter().filter(|r| r.size() >= min_size).collect();

    selected.sort_by(|a, b| {
        // 1. Size descending
        b.size()
            .cmp(&a.size())
            // 2. File path ascending
            .then_with(|| a.file_path().cmp(b.file_path()))
            // 3. Start line ascending
            .then_with(|| a.start_line().cmp(&b.start_line()))
            // 4. Function name ascending
            .then_with(|| a.name().cmp(b.name()))
    });

    selected
        .into_iter()
        .take(top)
        .enumerate()
        .map(|(i, record)| RankedFunction {
            rank: i + 1,
            record: record.clone(),
        })
        .collect()
}

/// Summary of one repository for output
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryReport {
    pub name: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub files_scanned: usize,
    pub total_functions: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
    pub functions: Vec<RankedFunction>,
}

impl RepositoryReport {
    pub fn from_scan(scan: &RepositoryScan, min_size: usize, top: usize) -> Self {
        RepositoryReport {
            name: scan.name.clone(),
            source: scan.source.clone(),
            error: None,
            files_scanned: scan.files_scanned,
            total_functions: scan.functions.len(),
            skipped: scan.skipped.clone(),
            functions: rank_functions(&scan.functions, min_size, top),
        }
    }

    /// Report for a repository that could not be scanned
    pub fn failed(name: impl Into<String>, source: impl Into<String>, error: impl Into<String>) -> Self {
        RepositoryReport {
            name: name.into(),
            source: source.into(),
            error: Some(error.into()),
            files_scanned: 0,
            total_functions: 0,
            skipped: Vec::new(),
            functions: Vec::new(),
        }
    }
}

/// Render reports as text tables, one per repository
pub fn render_text(reports: &[RepositoryReport]) -> String {
    let mut output = String::new();

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("Repository: {} ({})\n", report.name, report.source));

        if let Some(ref error) = report.error {
            output.push_str(&format!("  error: {}\n", error));
            continue;
        }

        output.push_str(&format!(
            "Files scanned: {}, functions found: {}\n",
            report.files_scanned, report.total_functions
        ));
        for skipped in &report.skipped {
            output.push_str(&format!("  skipped {}: {}\n", skipped.path, skipped.reason));
        }

        if report.functions.is_empty() {
            output.push_str("  No functions found.\n");
            continue;
        }

        output.push('\n');
        output.push_str(&format!(
            "{:<6} {:<30} {:<40} {:<10} {:<10} {}\n",
            "Rank", "Function Name", "File Path", "Start Line", "End Line", "Lines of Code"
        ));
        for ranked in &report.functions {
            let record = &ranked.record;
            output.push_str(&format!(
                "{:<6} {} {} {:<10} {:<10} {}\n",
                ranked.rank,
                truncate_or_pad(record.name(), 30),
                truncate_or_pad(record.file_path(), 40),
                record.start_line(),
                record.end_line(),
                record.size(),
            ));
        }
    }

    output
}

/// Render reports as JSON output
pub fn render_json(reports: &[RepositoryReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
