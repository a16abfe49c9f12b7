//! Line lexer for brace-delimited languages
//!
//! Produces, for each line, a *code view* in which string contents and
//! comments are blanked out with spaces, plus the structural tokens that
//! occur in real code. Braces inside string literals, template literals,
//! text blocks, verbatim strings, and comments never become tokens.
//!
//! Multi-line constructs (block comments, template literals, text blocks,
//! verbatim strings) carry their state across lines. Single- and
//! double-quoted strings end at the end of the line even if unterminated.

/// Structural token found in code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Semicolon,
}

/// Literal forms recognized beyond plain quoted strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Syntax {
    /// JavaScript/TypeScript backtick template literals
    pub template_literals: bool,
    /// Java text blocks and C# raw string literals (`"""`)
    pub text_blocks: bool,
    /// C# verbatim strings (`@"..."`, `$@"..."`, `@$"..."`)
    pub verbatim_strings: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    BlockComment,
    Template,
    TextBlock,
    Verbatim,
}

impl Token {
    /// Tokens that end a declaration-matching segment
    pub fn is_boundary(self) -> bool {
        matches!(self, Token::OpenBrace | Token::CloseBrace | Token::Semicolon)
    }
}

/// A token and its byte offset in the code view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub offset: usize,
}

/// Result of lexing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedLine {
    pub code: String,
    pub tokens: Vec<Lexeme>,
}

impl LexedLine {
    /// Token kinds in order, without offsets
    pub fn kinds(&self) -> Vec<Token> {
        self.tokens.iter().map(|l| l.token).collect()
    }
}

/// Stateful per-file lexer
#[derive(Debug, Clone)]
pub struct BraceLexer {
    syntax: Syntax,
    mode: Mode,
}

impl BraceLexer {
    pub fn new(syntax: Syntax) -> Self {
        BraceLexer {
            syntax,
            mode: Mode::Code,
        }
    }

    /// Check whether the lexer is inside a construct spanning lines
    pub fn in_multiline_construct(&self) -> bool {
        self.mode != Mode::Code
    }

    pub fn lex(&mut self, line: &str) -> LexedLine {
        let chars: Vec<char> = line.chars().collect();
        let mut code = String::with_capacity(line.len());
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            match self.mode {
                Mode::BlockComment => {
                    if c == '*' && next == Some('/') {
                        code.push_str("  ");
                        self.mode = Mode::Code;
                        i += 2;
                    } else {
                        code.push(' ');
                        i += 1;
                    }
                }
                Mode::Template => {
                    if c == '\\' {
                        i += blank_escape(&mut code, next);
                    } else if c == '`' {
                        code.push('`');
                        self.mode = Mode::Code;
                        i += 1;
                    } else {
                        code.push(' ');
                        i += 1;
                    }
                }
                Mode::TextBlock => {
                    if c == '\\' {
                        i += blank_escape(&mut code, next);
                    } else if starts_with(&chars, i, "\"\"\"") {
                        code.push_str("\"\"\"");
                        self.mode = Mode::Code;
                        i += 3;
                    } else {
                        code.push(' ');
                        i += 1;
                    }
                }
                Mode::Verbatim => {
                    if c == '"' && next == Some('"') {
                        code.push_str("  ");
                        i += 2;
                    } else if c == '"' {
                        code.push('"');
                        self.mode = Mode::Code;
                        i += 1;
                    } else {
                        code.push(' ');
                        i += 1;
                    }
                }
                Mode::Code => {
                    i = self.lex_code(&chars, i, &mut code, &mut tokens);
                }
            }
        }

        LexedLine { code, tokens }
    }

    /// Lex one code-mode element starting at `i`, returning the next index
    fn lex_code(
        &mut self,
        chars: &[char],
        i: usize,
        code: &mut String,
        tokens: &mut Vec<Lexeme>,
    ) -> usize {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c == '/' && next == Some('/') {
            for _ in i..chars.len() {
                code.push(' ');
            }
            return chars.len();
        }
        if c == '/' && next == Some('*') {
            code.push_str("  ");
            self.mode = Mode::BlockComment;
            return i + 2;
        }
        if self.syntax.verbatim_strings {
            for prefix in ["@\"", "$@\"", "@$\""] {
                if starts_with(chars, i, prefix) {
                    code.push_str(prefix);
                    self.mode = Mode::Verbatim;
                    return i + prefix.chars().count();
                }
            }
        }
        if self.syntax.text_blocks && starts_with(chars, i, "\"\"\"") {
            code.push_str("\"\"\"");
            self.mode = Mode::TextBlock;
            return i + 3;
        }
        if self.syntax.template_literals && c == '`' {
            code.push('`');
            self.mode = Mode::Template;
            return i + 1;
        }
        if c == '"' || c == '\'' {
            return lex_quoted(chars, i, code);
        }

        let token = match c {
            '{' => Some(Token::OpenBrace),
            '}' => Some(Token::CloseBrace),
            '(' => Some(Token::OpenParen),
            ')' => Some(Token::CloseParen),
            ';' => Some(Token::Semicolon),
            _ => None,
        };
        if let Some(token) = token {
            tokens.push(Lexeme {
                token,
                offset: code.len(),
            });
        }
        code.push(c);
        i + 1
    }
}

/// Blank a single-line quoted literal starting at `start`, keeping its quotes
fn lex_quoted(chars: &[char], start: usize, code: &mut String) -> usize {
    let quote = chars[start];
    code.push(quote);
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += blank_escape(code, chars.get(i + 1).copied());
        } else if c == quote {
            code.push(quote);
            return i + 1;
        } else {
            code.push(' ');
            i += 1;
        }
    }

    i
}

/// Blank an escape sequence, returning how many chars it consumed
fn blank_escape(code: &mut String, next: Option<char>) -> usize {
    if next.is_some() {
        code.push_str("  ");
        2
    } else {
        code.push(' ');
        1
    }
}

fn starts_with(chars: &[char], at: usize, pattern: &str) -> bool {
    let mut idx = at;
    for p in pattern.chars() {
        if chars.get(idx) != Some(&p) {
            return false;
        }
        idx += 1;
    }
    true
}
