use crate::error::Diagnostic;

use super::{TokenKind, KEYWORDS};

/// Streaming scanner over the source text. `new` reads the first character
/// and recognizes the first symbol; `next` advances to the following one.
/// The parser reads `sym` directly, the way it would a one-token lookahead.
#[derive(Debug)]
pub struct Scanner {
    source: Vec<char>,
    index: usize,
    ch: char,
    line: usize,
    pos: usize,
    lastline: usize,
    lastpos: usize,
    last_reported: Option<(usize, usize)>,
    pub sym: TokenKind,
    diagnostics: Vec<Diagnostic>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        let mut scanner = Self {
            source: source.chars().collect(),
            index: 0,
            ch: '\0',
            line: 1,
            pos: 0,
            lastline: 1,
            lastpos: 0,
            last_reported: None,
            sym: TokenKind::Eof,
            diagnostics: vec![],
        };
        scanner.get_char();
        scanner.next();
        scanner
    }

    /// Records an error at the end position of the previous token, so the
    /// message points at the construct that was actually recognized.
    /// Repeated reports at one position are suppressed.
    pub fn report(&mut self, msg: &str) {
        let at = (self.lastline, self.lastpos);
        if self.last_reported != Some(at) {
            self.diagnostics.push(Diagnostic {
                line: at.0,
                pos: at.1,
                msg: msg.to_string(),
            });
        }
        self.last_reported = Some(at);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn get_char(&mut self) {
        if self.index == self.source.len() {
            self.ch = '\0';
        } else {
            self.ch = self.source[self.index];
            self.index += 1;
            self.lastpos = self.pos;
            if self.ch == '\n' {
                self.pos = 0;
                self.line += 1;
            } else {
                self.lastline = self.line;
                self.pos += 1;
            }
        }
    }

    fn number(&mut self) {
        let mut val: i64 = 0;
        while self.ch.is_ascii_digit() {
            val = 10 * val + (self.ch as i64 - '0' as i64);
            // keep the accumulator small so pathological literals cannot wrap
            val = val.min(1 << 31);
            self.get_char();
        }
        if val >= 1 << 31 {
            self.report("number too large");
            val = 0;
        }
        self.sym = TokenKind::Number(val as i32);
    }

    fn ident_or_keyword(&mut self) {
        let mut text = String::new();
        while self.ch.is_ascii_alphanumeric() {
            text.push(self.ch);
            self.get_char();
        }
        self.sym = match KEYWORDS.get(&text) {
            Some(kind) => kind.clone(),
            None => TokenKind::Ident(text),
        };
    }

    /// comment ::= '{' {character} '}'
    fn comment(&mut self) {
        while self.ch != '\0' && self.ch != '}' {
            self.get_char();
        }
        if self.ch == '\0' {
            self.report("comment not terminated");
        } else {
            self.get_char();
        }
    }

    /// Recognizes the next symbol, longest match first. Unknown characters
    /// are reported and skipped.
    pub fn next(&mut self) {
        while self.ch != '\0' && self.ch <= ' ' {
            self.get_char();
        }
        match self.ch {
            'A'..='Z' | 'a'..='z' => self.ident_or_keyword(),
            '0'..='9' => self.number(),
            '{' => {
                self.comment();
                self.next();
            }
            '*' => self.one(TokenKind::Times),
            '+' => self.one(TokenKind::Plus),
            '-' => self.one(TokenKind::Minus),
            '=' => self.one(TokenKind::Eq),
            '<' => {
                self.get_char();
                if self.ch == '=' {
                    self.one(TokenKind::Le);
                } else if self.ch == '>' {
                    self.one(TokenKind::Ne);
                } else {
                    self.sym = TokenKind::Lt;
                }
            }
            '>' => {
                self.get_char();
                if self.ch == '=' {
                    self.one(TokenKind::Ge);
                } else {
                    self.sym = TokenKind::Gt;
                }
            }
            ':' => {
                self.get_char();
                if self.ch == '=' {
                    self.one(TokenKind::Becomes);
                } else {
                    self.sym = TokenKind::Colon;
                }
            }
            ';' => self.one(TokenKind::Semicolon),
            ',' => self.one(TokenKind::Comma),
            '.' => self.one(TokenKind::Period),
            '(' => self.one(TokenKind::LParen),
            ')' => self.one(TokenKind::RParen),
            '[' => self.one(TokenKind::LBrak),
            ']' => self.one(TokenKind::RBrak),
            '~' => self.one(TokenKind::Tilde),
            '&' => self.one(TokenKind::Amp),
            '|' => self.one(TokenKind::Bar),
            '\0' => self.sym = TokenKind::Eof,
            _ => {
                self.report("illegal character");
                self.get_char();
                self.next();
            }
        }
    }

    fn one(&mut self, kind: TokenKind) {
        self.get_char();
        self.sym = kind;
    }
}
