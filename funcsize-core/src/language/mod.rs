//! Language detection and function boundary detectors
//!
//! Two parser families share one contract: consume a file's lines in order,
//! emit each function's line range at the moment its scope closes.
//!
//! - Brace family (JavaScript/TypeScript, Java, C#): [`BraceDepthParser`]
//! - Indentation family (Python): [`IndentationParser`]
//!
//! [`FunctionDetector`] is the tagged variant over both families; a fresh
//! detector is created for every file and never reused.

pub mod brace;
pub mod indent;
pub mod lexer;
pub mod signatures;

use crate::error::FileAccessError;
use crate::record::FunctionRecord;
use crate::source::{LineSource, SourceLine};
use std::collections::VecDeque;
use std::io;
use std::path::Path;

pub use brace::BraceDepthParser;
pub use indent::IndentationParser;

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// JavaScript (.js, .jsx, .mjs, .cjs)
    JavaScript,
    /// TypeScript (.ts, .tsx, .mts, .cts)
    TypeScript,
    /// Java (.java)
    Java,
    /// C# (.cs)
    CSharp,
    /// Python (.py, .pyw)
    Python,
}

/// How a language delimits function bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Brace,
    Indentation,
}

impl Language {
    /// Detect language from file extension
    ///
    /// Returns `None` if the extension is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use funcsize_core::language::Language;
    ///
    /// assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
    /// assert_eq!(Language::from_extension("cs"), Some(Language::CSharp));
    /// assert_eq!(Language::from_extension("rs"), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            "py" | "pyw" => Some(Language::Python),
            _ => None,
        }
    }

    /// Detect language from file path
    ///
    /// Returns `None` if the file has no extension or the extension is not recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the canonical name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Python => "Python",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Language::Python => Family::Indentation,
            _ => Family::Brace,
        }
    }

    /// Get file extensions for this language (without the dot)
    pub fn extensions(&self) -> &[&'static str] {
        match self {
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            Language::Java => &["java"],
            Language::CSharp => &["cs"],
            Language::Python => &["py", "pyw"],
        }
    }
}

/// A scope that closed, before it is bound to a file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedScope {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl ClosedScope {
    fn into_record(self, file_path: &str) -> FunctionRecord {
        FunctionRecord::new(self.name, file_path, self.start_line, self.end_line)
    }
}

/// Line-at-a-time scope tracking shared by both parser families
pub trait LineParser {
    /// Consume one line, appending any scopes it closes (innermost first)
    fn process_line(&mut self, line: &SourceLine, closed: &mut Vec<ClosedScope>);

    /// Handle end of input, appending any scopes the family closes at EOF
    fn finish(&mut self, closed: &mut Vec<ClosedScope>);
}

/// Function boundary detector for one file
pub enum FunctionDetector {
    Brace(BraceDepthParser),
    Indent(IndentationParser),
}

impl FunctionDetector {
    /// Create a fresh detector for a language
    pub fn for_language(language: Language) -> Self {
        match BraceDepthParser::new(language) {
            Some(parser) => FunctionDetector::Brace(parser),
            None => FunctionDetector::Indent(IndentationParser::new()),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            FunctionDetector::Brace(_) => Family::Brace,
            FunctionDetector::Indent(_) => Family::Indentation,
        }
    }

    /// Lazily detect functions over a line stream
    ///
    /// Records are yielded as their scopes close, so the caller can consume
    /// them while the file is still being read.
    pub fn records<I>(self, lines: I, file_path: impl Into<String>) -> Records<I>
    where
        I: Iterator<Item = io::Result<SourceLine>>,
    {
        Records {
            detector: self,
            lines,
            file_path: file_path.into(),
            ready: VecDeque::new(),
            scratch: Vec::new(),
            finished: false,
        }
    }

    /// Detect all functions in a line stream
    pub fn parse_lines<I>(self, lines: I, file_path: &str) -> io::Result<Vec<FunctionRecord>>
    where
        I: Iterator<Item = io::Result<SourceLine>>,
    {
        self.records(lines, file_path).collect()
    }
}

impl LineParser for FunctionDetector {
    fn process_line(&mut self, line: &SourceLine, closed: &mut Vec<ClosedScope>) {
        match self {
            FunctionDetector::Brace(parser) => parser.process_line(line, closed),
            FunctionDetector::Indent(parser) => parser.process_line(line, closed),
        }
    }

    fn finish(&mut self, closed: &mut Vec<ClosedScope>) {
        match self {
            FunctionDetector::Brace(parser) => parser.finish(closed),
            FunctionDetector::Indent(parser) => parser.finish(closed),
        }
    }
}

/// Streaming iterator of records produced by a [`FunctionDetector`]
///
/// Yields an I/O error at most once, after which it ends without
/// running end-of-file handling.
pub struct Records<I> {
    detector: FunctionDetector,
    lines: I,
    file_path: String,
    ready: VecDeque<ClosedScope>,
    scratch: Vec<ClosedScope>,
    finished: bool,
}

impl<I> Iterator for Records<I>
where
    I: Iterator<Item = io::Result<SourceLine>>,
{
    type Item = io::Result<FunctionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(scope) = self.ready.pop_front() {
                return Some(Ok(scope.into_record(&self.file_path)));
            }
            if self.finished {
                return None;
            }

            match self.lines.next() {
                Some(Ok(line)) => self.detector.process_line(&line, &mut self.scratch),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.detector.finish(&mut self.scratch);
                    self.finished = true;
                }
            }
            self.ready.extend(self.scratch.drain(..));
        }
    }
}

/// Detect all functions in a file, streaming it line by line
///
/// `display_path` is stored in each record (normally the path relative to
/// the repository root).
pub fn parse_file(
    path: &Path,
    language: Language,
    display_path: &str,
) -> Result<Vec<FunctionRecord>, FileAccessError> {
    let lines = LineSource::open(path)?;
    FunctionDetector::for_language(language)
        .parse_lines(lines, display_path)
        .map_err(|e| FileAccessError::new(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::lines_of;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("js"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("jsx"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("mjs"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("cs"), Some(Language::CSharp));
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("go"), None);
        assert_eq!(Language::from_extension(""), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            Language::from_path(Path::new("src/main.ts")),
            Some(Language::TypeScript)
        );
        assert_eq!(
            Language::from_path(Path::new("pkg/Sample.java")),
            Some(Language::Java)
        );
        assert_eq!(Language::from_path(Path::new("README.md")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_family() {
        assert_eq!(Language::JavaScript.family(), Family::Brace);
        assert_eq!(Language::CSharp.family(), Family::Brace);
        assert_eq!(Language::Python.family(), Family::Indentation);
        assert_eq!(
            FunctionDetector::for_language(Language::Java).family(),
            Family::Brace
        );
        assert_eq!(
            FunctionDetector::for_language(Language::Python).family(),
            Family::Indentation
        );
    }

    #[test]
    fn test_extensions_round_trip() {
        for language in [
            Language::JavaScript,
            Language::TypeScript,
            Language::Java,
            Language::CSharp,
            Language::Python,
        ] {
            for ext in language.extensions() {
                assert_eq!(Language::from_extension(ext), Some(language));
            }
        }
    }

    #[test]
    fn test_records_stream_before_end_of_input() {
        let src = "function a() {\n}\nfunction b() {\n";
        let mut records =
            FunctionDetector::for_language(Language::JavaScript).records(lines_of(src), "a.js");
        let first = records.next().unwrap().unwrap();
        assert_eq!(first.name(), "a");
        assert!(records.next().is_none(), "unterminated b must be dropped");
    }

    #[test]
    fn test_records_surface_read_error_once() {
        let lines = vec![
            Ok(SourceLine::new(1, "def f():")),
            Err(io::Error::new(io::ErrorKind::InvalidData, "boom")),
            Ok(SourceLine::new(3, "    pass")),
        ];
        let mut records =
            FunctionDetector::for_language(Language::Python).records(lines.into_iter(), "a.py");
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file(
            Path::new("/nonexistent/file.js"),
            Language::JavaScript,
            "file.js",
        )
        .unwrap_err();
        assert_eq!(err.path, Path::new("/nonexistent/file.js"));
    }

    #[test]
    fn test_parse_file_uses_display_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("util.js");
        std::fs::write(&path, "function f() {\n  return 1;\n}\n").unwrap();

        let records = parse_file(&path, Language::JavaScript, "src/util.js").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_path(), "src/util.js");
        assert_eq!(records[0].size(), 3);
    }
}
