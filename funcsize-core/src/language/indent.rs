//! Indentation-based function boundary detection (Python)
//!
//! A `def` (or `async def`) line opens a frame at its indentation `D`. The
//! frame closes when a later non-blank, non-comment line starts at an
//! indentation `<= D`; its end line is the last content line seen before
//! that trigger. Blank lines, comment lines, and continuation lines (inside
//! open brackets or triple-quoted strings, or after a trailing backslash)
//! never trigger a close.
//!
//! Unlike the brace family, frames still open at end of file are closed at
//! the last content line.

use super::{ClosedScope, LineParser};
use crate::source::SourceLine;
use regex::Regex;
use std::sync::OnceLock;

const TAB_WIDTH: usize = 8;

#[derive(Debug, Clone)]
struct IndentFrame {
    name: String,
    start_line: usize,
    indent: usize,
}

/// Bracket and string state carried across physical lines
#[derive(Debug, Clone, Default)]
struct ContinuationScanner {
    bracket_depth: usize,
    triple_quote: Option<char>,
    /// The last line ended in an explicit `\` line join
    backslash: bool,
}

impl ContinuationScanner {
    /// Check whether the next line continues the current logical line
    fn in_continuation(&self) -> bool {
        self.bracket_depth > 0 || self.triple_quote.is_some() || self.backslash
    }

    fn scan(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        self.backslash = false;

        while i < chars.len() {
            let c = chars[i];

            if let Some(quote) = self.triple_quote {
                if c == '\\' {
                    i += 2;
                } else if is_triple(&chars, i, quote) {
                    self.triple_quote = None;
                    i += 3;
                } else {
                    i += 1;
                }
                continue;
            }

            match c {
                '#' => break,
                '\'' | '"' if is_triple(&chars, i, c) => {
                    self.triple_quote = Some(c);
                    i += 3;
                }
                '\'' | '"' => i = skip_string(&chars, i),
                '\\' if i + 1 == chars.len() => {
                    self.backslash = true;
                    i += 1;
                }
                '(' | '[' | '{' => {
                    self.bracket_depth += 1;
                    i += 1;
                }
                ')' | ']' | '}' => {
                    self.bracket_depth = self.bracket_depth.saturating_sub(1);
                    i += 1;
                }
                _ => i += 1,
            }
        }
    }
}

fn is_triple(chars: &[char], at: usize, quote: char) -> bool {
    chars.get(at) == Some(&quote)
        && chars.get(at + 1) == Some(&quote)
        && chars.get(at + 2) == Some(&quote)
}

/// Skip a single-line string literal starting at `start`
fn skip_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    i
}

/// Indentation width of a line's leading whitespace
fn indentation(text: &str) -> usize {
    let mut width = 0;
    for c in text.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
            '\x0c' => width = 0,
            _ => break,
        }
    }
    width
}

/// Extract the function name from a stripped `def` / `async def` line
///
/// Returns `None` if the line is not a function declaration and an empty
/// name if the identifier is missing.
fn def_name(stripped: &str) -> Option<String> {
    static DEF_RE: OnceLock<Regex> = OnceLock::new();
    let def_re = DEF_RE.get_or_init(|| {
        Regex::new(r"^(?:async[ \t]+)?def(?:[ \t]+([^\W\d]\w*)?|[ \t]*$|[ \t]*\()")
            .expect("def pattern must compile")
    });

    let caps = def_re.captures(stripped)?;
    Some(caps.get(1).map_or(String::new(), |m| m.as_str().to_string()))
}

/// Per-file parser state for Python
#[derive(Debug, Default)]
pub struct IndentationParser {
    frames: Vec<IndentFrame>,
    /// Declaration whose parameter list is still open
    signature: Option<IndentFrame>,
    decorator_start: Option<usize>,
    last_content_line: usize,
    scanner: ContinuationScanner,
}

impl IndentationParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open function frames
    pub fn open_frames(&self) -> usize {
        self.frames.len()
    }

    /// Close every frame declared at or deeper than `indent`, innermost first
    fn close_frames(&mut self, indent: usize, closed: &mut Vec<ClosedScope>) {
        while self.frames.last().is_some_and(|f| f.indent >= indent) {
            if let Some(frame) = self.frames.pop() {
                closed.push(self.close(frame));
            }
        }
    }

    fn close(&self, frame: IndentFrame) -> ClosedScope {
        ClosedScope {
            end_line: self.last_content_line.max(frame.start_line),
            name: frame.name,
            start_line: frame.start_line,
        }
    }

    fn process_continuation(&mut self, line: &SourceLine) {
        if !line.text.trim().is_empty() {
            self.last_content_line = line.number;
        }
        self.scanner.scan(&line.text);

        if !self.scanner.in_continuation() {
            if let Some(frame) = self.signature.take() {
                self.frames.push(frame);
            }
        }
    }
}

impl LineParser for IndentationParser {
    fn process_line(&mut self, line: &SourceLine, closed: &mut Vec<ClosedScope>) {
        if self.scanner.in_continuation() {
            self.process_continuation(line);
            return;
        }

        let stripped = line.text.trim_start();
        if stripped.is_empty() || stripped.starts_with('#') {
            return;
        }

        let indent = indentation(&line.text);
        self.close_frames(indent, closed);
        self.last_content_line = line.number;
        self.scanner.scan(&line.text);

        if stripped.starts_with('@') {
            self.decorator_start.get_or_insert(line.number);
            return;
        }

        let decorator_start = self.decorator_start.take();
        let Some(name) = def_name(stripped) else {
            return;
        };

        let frame = IndentFrame {
            name,
            start_line: decorator_start.unwrap_or(line.number),
            indent,
        };
        if self.scanner.in_continuation() {
            self.signature = Some(frame);
        } else {
            self.frames.push(frame);
        }
    }

    fn finish(&mut self, closed: &mut Vec<ClosedScope>) {
        if let Some(frame) = self.signature.take() {
            tracing::trace!(
                name = %frame.name,
                line = frame.start_line,
                "dropping declaration with unterminated signature"
            );
        }
        while let Some(frame) = self.frames.pop() {
            closed.push(self.close(frame));
        }
        self.decorator_start = None;
    }
}
