//! CSS tokenizer and rewindable token stream.
//!
//! Tokenization follows the shape of CSS Syntax Level 3 closely enough for
//! property values: idents may contain `-` (so `min-content` is one token),
//! an ident immediately followed by `(` is a [`Token::Function`], and a
//! sign followed by a digit starts a number.

/// A CSS token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (`auto`, `span`, `min-content`).
    Ident(String),
    /// Function name including the opening parenthesis (`minmax(`).
    Function(String),
    /// Bare number.
    Number { value: f32, is_integer: bool },
    /// Number followed by `%`.
    Percentage(f32),
    /// Number followed by a unit (`10px`, `1fr`).
    Dimension {
        value: f32,
        unit: String,
        is_integer: bool,
    },
    /// `#name`.
    Hash(String),
    /// Quoted string (quotes removed).
    String(String),
    /// Any other single character (`/`, `!`, `*`).
    Delim(char),
    Comma,
    Colon,
    Semicolon,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    /// A run of whitespace.
    Whitespace,
}

impl Token {
    /// Whether this is an ident matching `name` (ASCII case-insensitive).
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Token::Ident(ident) if ident.eq_ignore_ascii_case(name))
    }

    /// Whether this is a function token named `name` (ASCII case-insensitive).
    pub fn is_function(&self, name: &str) -> bool {
        matches!(self, Token::Function(func) if func.eq_ignore_ascii_case(name))
    }

    /// Whether this is the delimiter `ch`.
    pub fn is_delim(&self, ch: char) -> bool {
        matches!(self, Token::Delim(c) if *c == ch)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_ident_char(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit() || ch == '-'
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_number(&self) -> bool {
        match self.peek_at(0) {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') => match self.peek_at(1) {
                Some(d) if d.is_ascii_digit() => true,
                Some('.') => self.peek_at(2).is_some_and(|d| d.is_ascii_digit()),
                _ => false,
            },
            Some('.') => self.peek_at(1).is_some_and(|d| d.is_ascii_digit()),
            _ => false,
        }
    }

    fn starts_ident(&self) -> bool {
        match self.peek_at(0) {
            Some('-') => self
                .peek_at(1)
                .is_some_and(|c| is_ident_start(c) || c == '-'),
            Some(c) => is_ident_start(c),
            None => false,
        }
    }

    fn consume_name(&mut self) -> String {
        let start = self.pos;
        while self.peek_at(0).is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn consume_number(&mut self) -> (f32, bool) {
        let start = self.pos;
        if matches!(self.peek_at(0), Some('+') | Some('-')) {
            self.pos += 1;
        }
        while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_integer = true;
        if self.peek_at(0) == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_integer = false;
            self.pos += 1;
            while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        (text.parse::<f32>().unwrap_or(0.0), is_integer)
    }

    fn consume_numeric(&mut self) -> Token {
        let (value, is_integer) = self.consume_number();
        if self.peek_at(0) == Some('%') {
            self.pos += 1;
            return Token::Percentage(value);
        }
        if self.starts_ident() {
            let unit = self.consume_name().to_ascii_lowercase();
            return Token::Dimension {
                value,
                unit,
                is_integer,
            };
        }
        Token::Number { value, is_integer }
    }

    fn consume_string(&mut self, quote: char) -> Token {
        self.pos += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_at(0) {
            self.pos += 1;
            match c {
                '\\' => {
                    if let Some(escaped) = self.peek_at(0) {
                        out.push(escaped);
                        self.pos += 1;
                    }
                }
                c if c == quote => break,
                c => out.push(c),
            }
        }
        Token::String(out)
    }

    fn skip_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.chars.len() {
            if self.peek_at(0) == Some('*') && self.peek_at(1) == Some('/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let ch = self.peek_at(0)?;

            if ch == '/' && self.peek_at(1) == Some('*') {
                self.skip_comment();
                continue;
            }

            if ch.is_whitespace() {
                while self.peek_at(0).is_some_and(char::is_whitespace) {
                    self.pos += 1;
                }
                return Some(Token::Whitespace);
            }

            if self.starts_number() {
                return Some(self.consume_numeric());
            }

            if self.starts_ident() {
                let name = self.consume_name();
                if self.peek_at(0) == Some('(') {
                    self.pos += 1;
                    return Some(Token::Function(name));
                }
                return Some(Token::Ident(name));
            }

            self.pos += 1;
            let token = match ch {
                '"' | '\'' => {
                    self.pos -= 1;
                    self.consume_string(ch)
                }
                '#' if self.peek_at(0).is_some_and(is_ident_char) => {
                    Token::Hash(self.consume_name())
                }
                ',' => Token::Comma,
                ':' => Token::Colon,
                ';' => Token::Semicolon,
                '(' => Token::OpenParen,
                ')' => Token::CloseParen,
                '{' => Token::OpenBrace,
                '}' => Token::CloseBrace,
                other => Token::Delim(other),
            };
            return Some(token);
        }
    }
}

/// Tokenize a CSS fragment.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    tokens
}

/// A token vector with a rewindable cursor.
///
/// Grammars record [`position`](Self::position) before an attempt and
/// [`rewind`](Self::rewind) on failure, so a failed parse never leaves the
/// cursor half-way through a value.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    /// Tokenize `input` and position the cursor at its first token.
    pub fn new(input: &str) -> Self {
        Self::from_tokens(tokenize(input))
    }

    /// Wrap an existing token vector.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor back to a position returned by [`position`](Self::position).
    pub fn rewind(&mut self, position: usize) {
        self.pos = position.min(self.tokens.len());
    }

    /// Look at the token under the cursor without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consume and return the token under the cursor.
    pub fn next_token(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Skip any whitespace tokens under the cursor.
    pub fn skip_whitespace(&mut self) {
        while matches!(self.tokens.get(self.pos), Some(Token::Whitespace)) {
            self.pos += 1;
        }
    }

    /// Whether only whitespace remains.
    pub fn is_exhausted(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .all(|t| matches!(t, Token::Whitespace))
    }
}
