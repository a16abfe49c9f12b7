//! Incremental line source
//!
//! Files are read one line at a time through a buffered reader so that a
//! file of any length is never held in memory at once. Invalid UTF-8 is
//! decoded lossily; line terminators (`\n`, `\r\n`) are stripped.

use crate::error::FileAccessError;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// One line of source text with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        SourceLine {
            number,
            text: text.into(),
        }
    }
}

/// Lazy, single-pass sequence of lines read from a buffered reader
///
/// After the first I/O error the iterator yields that error once and then
/// ends.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
    next_number: usize,
    finished: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        LineSource {
            reader,
            buf: Vec::new(),
            next_number: 1,
            finished: false,
        }
    }
}

impl LineSource<BufReader<File>> {
    /// Open a file for incremental reading
    pub fn open(path: &Path) -> Result<Self, FileAccessError> {
        let file = File::open(path).map_err(|e| FileAccessError::new(path, e))?;
        Ok(LineSource::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = io::Result<SourceLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                let text = String::from_utf8_lossy(&self.buf).into_owned();
                let line = SourceLine::new(self.next_number, text);
                self.next_number += 1;
                Some(Ok(line))
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => self.next(),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Build an in-memory line sequence, numbering from 1
///
/// Splits on `\n` like a file would be read, so a trailing newline does not
/// produce an extra empty line.
pub fn lines_of(text: &str) -> impl Iterator<Item = io::Result<SourceLine>> + '_ {
    LineSource::new(io::Cursor::new(text.as_bytes()))
}
