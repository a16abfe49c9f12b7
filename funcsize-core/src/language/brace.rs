//! Brace-depth function boundary detection (JavaScript/TypeScript, Java, C#)
//!
//! A declaration line sets a pending declaration. The first `{` at
//! parenthesis balance zero opens it as a scope frame at the new depth; the
//! `}` that brings depth back below that level closes it and emits a scope.
//!
//! Global invariants enforced:
//! - At most one pending declaration; a newer declaration replaces it
//! - A `;` at parenthesis balance zero discards the pending declaration
//! - An arrow whose expression body starts on its own line is discarded at
//!   the end of that line
//! - Scopes close innermost first, so emission order is by closing line
//! - Scopes still open at end of file are dropped, never force-closed

use super::lexer::{BraceLexer, Syntax, Token};
use super::signatures::SignatureSet;
use super::{ClosedScope, Language, LineParser};
use crate::source::SourceLine;

#[derive(Debug, Clone)]
struct PendingDeclaration {
    name: String,
    start_line: usize,
    paren_balance: usize,
    expression_body: bool,
}

#[derive(Debug, Clone)]
struct ScopeFrame {
    name: String,
    start_line: usize,
    depth: usize,
}

/// Per-file parser state for brace-delimited languages
pub struct BraceDepthParser {
    signatures: &'static SignatureSet,
    lexer: BraceLexer,
    depth: usize,
    frames: Vec<ScopeFrame>,
    pending: Option<PendingDeclaration>,
}

impl BraceDepthParser {
    /// Create fresh state for one file
    ///
    /// Returns `None` for languages outside the brace family.
    pub fn new(language: Language) -> Option<Self> {
        let signatures = SignatureSet::for_language(language)?;
        Some(BraceDepthParser {
            signatures,
            lexer: BraceLexer::new(syntax_for(language)),
            depth: 0,
            frames: Vec::new(),
            pending: None,
        })
    }

    /// Current brace depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn open_brace(&mut self) {
        self.depth += 1;
        let opens_pending = self
            .pending
            .as_ref()
            .is_some_and(|p| p.paren_balance == 0);
        if opens_pending {
            if let Some(pending) = self.pending.take() {
                self.frames.push(ScopeFrame {
                    name: pending.name,
                    start_line: pending.start_line,
                    depth: self.depth,
                });
            }
        }
    }

    /// Set a new pending declaration, replacing any earlier one
    fn declare(&mut self, name: String, line: usize, expression_body: bool) {
        let replaced = self.pending.replace(PendingDeclaration {
            name,
            start_line: line,
            paren_balance: 0,
            expression_body,
        });
        if let Some(stale) = replaced {
            tracing::trace!(
                name = %stale.name,
                line = stale.start_line,
                "discarding declaration without a body"
            );
        }
    }

    fn apply(&mut self, token: Token, line: usize, closed: &mut Vec<ClosedScope>) {
        match token {
            Token::OpenParen => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.paren_balance += 1;
                }
            }
            Token::CloseParen => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.paren_balance = pending.paren_balance.saturating_sub(1);
                }
            }
            Token::Semicolon => {
                if self.pending.as_ref().is_some_and(|p| p.paren_balance == 0) {
                    self.pending = None;
                }
            }
            Token::OpenBrace => self.open_brace(),
            Token::CloseBrace => self.close_brace(line, closed),
        }
    }

    fn close_brace(&mut self, line: usize, closed: &mut Vec<ClosedScope>) {
        if self.depth == 0 {
            return;
        }
        if self.frames.last().is_some_and(|f| f.depth == self.depth) {
            if let Some(frame) = self.frames.pop() {
                closed.push(ClosedScope {
                    name: frame.name,
                    start_line: frame.start_line,
                    end_line: line,
                });
            }
        }
        self.depth -= 1;
    }
}

impl LineParser for BraceDepthParser {
    fn process_line(&mut self, line: &SourceLine, closed: &mut Vec<ClosedScope>) {
        let lexed = self.lexer.lex(&line.text);
        let mut seg_start = 0;
        let mut next = 0;

        // A segment runs up to and including the next brace or semicolon, so
        // each declaration on a line is matched before its own brace is seen
        while seg_start < lexed.code.len() {
            let seg_end = lexed.tokens[next..]
                .iter()
                .find(|l| l.token.is_boundary())
                .map_or(lexed.code.len(), |l| l.offset + 1);

            let segment = &lexed.code[seg_start..seg_end];
            if let Some(name) = self.signatures.match_declaration(segment) {
                let expression_body = segment
                    .find("=>")
                    .is_some_and(|arrow| is_expression_body(&lexed.code[seg_start + arrow + 2..]));
                self.declare(name, line.number, expression_body);
            }

            while let Some(lexeme) = lexed.tokens.get(next).filter(|l| l.offset < seg_end) {
                self.apply(lexeme.token, line.number, closed);
                next += 1;
            }
            seg_start = seg_end;
        }

        if self.pending.as_ref().is_some_and(|p| p.expression_body) {
            if let Some(stale) = self.pending.take() {
                tracing::trace!(
                    name = %stale.name,
                    line = stale.start_line,
                    "discarding arrow with an expression body"
                );
            }
        }
    }

    fn finish(&mut self, _closed: &mut Vec<ClosedScope>) {
        for frame in self.frames.drain(..) {
            tracing::trace!(
                name = %frame.name,
                line = frame.start_line,
                "dropping unterminated scope"
            );
        }
        self.pending = None;
        self.depth = 0;
    }
}

/// Whether the code after `=>` is an expression rather than a block
fn is_expression_body(rest: &str) -> bool {
    let rest = rest.trim_start();
    !rest.is_empty() && !rest.starts_with('{')
}

fn syntax_for(language: Language) -> Syntax {
    match language {
        Language::JavaScript | Language::TypeScript => Syntax {
            template_literals: true,
            ..Syntax::default()
        },
        Language::Java => Syntax {
            text_blocks: true,
            ..Syntax::default()
        },
        Language::CSharp => Syntax {
            text_blocks: true,
            verbatim_strings: true,
            ..Syntax::default()
        },
        Language::Python => Syntax::default(),
    }
}

#[cfg(test)]
#[path = "brace/tests.rs"]
mod tests;
