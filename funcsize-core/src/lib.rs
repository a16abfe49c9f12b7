//! funcsize core library - heuristic function boundary detection for JavaScript, TypeScript, Java, C#, and Python

// Global invariants enforced in this crate:
// - Files are streamed line by line, never parsed into an AST
// - Each file gets a fresh detector; no state crosses file boundaries
// - Records are emitted in closing order, innermost scope first
// - Identical input yields identical records and identical rankings

pub mod config;
pub mod discover;
pub mod error;
pub mod git;
pub mod language;
pub mod record;
pub mod report;
pub mod scan;
pub mod source;

pub use config::{FuncsizeConfig, ResolvedConfig};
pub use error::FileAccessError;
pub use language::{parse_file, FunctionDetector, Language};
pub use record::FunctionRecord;
pub use report::{rank_functions, render_json, render_text, RankedFunction, RepositoryReport};
pub use scan::{read_repository_list, scan_repositories, scan_repository, RepositoryScan};
pub use source::{LineSource, SourceLine};
