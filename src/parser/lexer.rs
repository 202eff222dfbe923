//! Lexer (tokenizer) for script source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Each token remembers whether a line break preceded it so the parser can
//! approximate automatic semicolon insertion.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// One `${...}` segment of a template literal, kept as raw source so the
/// parser can run a nested parse with the correct source origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateChunk {
    pub source: String,
    pub origin: SourceLocation,
}

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(String),
    Template {
        quasis: Vec<String>,
        chunks: Vec<TemplateChunk>,
    },

    // Identifiers
    Ident(String),

    // Keywords
    Var,
    Let,
    Const,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    True,
    False,
    Null,
    This,
    New,
    Typeof,
    Try,
    Catch,
    Finally,
    Throw,
    Await,

    // Arithmetic
    Plus,     // +
    Minus,    // -
    Star,     // *
    StarStar, // **
    Slash,    // /
    Percent,  // %

    // Comparison
    EqEq,     // ==
    EqEqEq,   // ===
    NotEq,    // !=
    NotEqEq,  // !==
    Lt,       // <
    Le,       // <=
    Gt,       // >
    Ge,       // >=

    // Logical
    AndAnd,           // &&
    OrOr,             // ||
    QuestionQuestion, // ??
    Bang,             // !

    // Bitwise
    Amp,    // &
    Pipe,   // |
    Caret,  // ^
    Tilde,  // ~
    LtLt,   // <<
    GtGt,   // >>
    GtGtGt, // >>>

    // Assignment
    Eq,         // =
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    StarStarEq, // **=
    SlashEq,    // /=
    PercentEq,  // %=
    AmpEq,      // &=
    PipeEq,     // |=
    CaretEq,    // ^=
    LtLtEq,     // <<=
    GtGtEq,     // >>=
    GtGtGtEq,   // >>>=

    // Increment/Decrement
    PlusPlus,   // ++
    MinusMinus, // --

    // Punctuation
    Dot,       // .
    FatArrow,  // =>
    Question,  // ?
    Colon,     // :
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,

    Eof,
}

/// A token with its position and line-break flag
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    pub newline_before: bool,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::String(s) => write!(f, "string \"{}\"", s),
            TokenKind::Template { .. } => write!(f, "template literal"),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Eof => write!(f, "end of input"),
            other => write!(f, "'{}'", other.text()),
        }
    }
}

impl TokenKind {
    /// Source text of keyword and punctuation tokens
    pub fn text(&self) -> &'static str {
        match self {
            TokenKind::Var => "var",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::This => "this",
            TokenKind::New => "new",
            TokenKind::Typeof => "typeof",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Throw => "throw",
            TokenKind::Await => "await",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::StarStar => "**",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::EqEqEq => "===",
            TokenKind::NotEq => "!=",
            TokenKind::NotEqEq => "!==",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::QuestionQuestion => "??",
            TokenKind::Bang => "!",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::GtGtGt => ">>>",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::StarStarEq => "**=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::LtLtEq => "<<=",
            TokenKind::GtGtEq => ">>=",
            TokenKind::GtGtGtEq => ">>>=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Dot => ".",
            TokenKind::FatArrow => "=>",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Number(_)
            | TokenKind::String(_)
            | TokenKind::Template { .. }
            | TokenKind::Ident(_)
            | TokenKind::Eof => "",
        }
    }

    /// Keywords that may still be used as property names (`obj.new`, `{ do: 1 }`)
    pub fn keyword_name(&self) -> Option<&'static str> {
        match self {
            TokenKind::Number(_)
            | TokenKind::String(_)
            | TokenKind::Template { .. }
            | TokenKind::Ident(_)
            | TokenKind::Eof => None,
            other => {
                let text = other.text();
                text.chars()
                    .all(|c| c.is_ascii_alphabetic())
                    .then_some(text)
            }
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("{message} ({}:{})", location.line, location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for script source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    base: usize,
    saw_newline: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self::with_origin(input, SourceLocation::new(1, 0, 0, 0))
    }

    /// Create a lexer for a fragment embedded at `origin` in a larger source,
    /// so reported locations refer to the enclosing text.
    pub fn with_origin(input: &str, origin: SourceLocation) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: origin.line,
            column: origin.column,
            base: origin.start,
            saw_newline: false,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.saw_newline = false;
            self.skip_whitespace_and_comments()?;
            let newline_before = self.saw_newline;

            if self.is_at_end() {
                let loc = self.current_location();
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    location: loc,
                    newline_before,
                });
                break;
            }

            let start = self.current_location();
            let kind = self.next_token()?;
            tokens.push(Token {
                kind,
                location: SourceLocation {
                    end: self.base + self.position,
                    ..start
                },
                newline_before,
            });
        }

        Ok(tokens)
    }

    /// Get next token kind
    fn next_token(&mut self) -> Result<TokenKind, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of input".to_string(),
            location: loc,
        })?;

        let kind = match ch {
            '"' | '\'' => return self.string_literal(ch, loc),
            '`' => return self.template_literal(loc),
            '0'..='9' => return self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                return self.number_literal(ch, loc)
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                return Ok(self.identifier_or_keyword(ch))
            }

            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('*') {
                    if self.eat('=') {
                        TokenKind::StarStarEq
                    } else {
                        TokenKind::StarStar
                    }
                } else if self.eat('=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '=' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.eat('>') {
                    TokenKind::FatArrow
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::NotEqEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('<') {
                    if self.eat('=') {
                        TokenKind::LtLtEq
                    } else {
                        TokenKind::LtLt
                    }
                } else if self.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('>') {
                    if self.eat('>') {
                        if self.eat('=') {
                            TokenKind::GtGtGtEq
                        } else {
                            TokenKind::GtGtGt
                        }
                    } else if self.eat('=') {
                        TokenKind::GtGtEq
                    } else {
                        TokenKind::GtGt
                    }
                } else if self.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else if self.eat('=') {
                    TokenKind::AmpEq
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else if self.eat('=') {
                    TokenKind::PipeEq
                } else {
                    TokenKind::Pipe
                }
            }
            '^' => {
                if self.eat('=') {
                    TokenKind::CaretEq
                } else {
                    TokenKind::Caret
                }
            }
            '?' => {
                if self.eat('?') {
                    TokenKind::QuestionQuestion
                } else {
                    TokenKind::Question
                }
            }
            '~' => TokenKind::Tilde,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => {
                return Err(LexError {
                    message: format!("Unexpected character '{}'", ch),
                    location: loc,
                })
            }
        };

        Ok(kind)
    }

    /// Parse a quoted string literal; the opening quote is already consumed
    fn string_literal(
        &mut self,
        quote: char,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance();
                return Ok(TokenKind::String(string));
            }
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == '\\' {
                if let Some(c) = self.escape_sequence()? {
                    string.push(c);
                }
            } else {
                string.push(ch);
            }
        }

        Err(LexError {
            message: "Unterminated string constant".to_string(),
            location: loc,
        })
    }

    /// Decode the character after a backslash. Returns `None` for a line continuation.
    fn escape_sequence(&mut self) -> Result<Option<char>, LexError> {
        let loc = self.current_location();
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unterminated string constant".to_string(),
            location: loc,
        })?;

        let c = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            '\n' => return Ok(None),
            'x' => self.hex_escape(2, loc)?,
            'u' => {
                if self.eat('{') {
                    let mut digits = String::new();
                    while let Some(c) = self.peek() {
                        self.advance();
                        if c == '}' {
                            break;
                        }
                        digits.push(c);
                    }
                    Self::decode_hex(&digits, loc)?
                } else {
                    self.hex_escape(4, loc)?
                }
            }
            other => other,
        };

        Ok(Some(c))
    }

    fn hex_escape(
        &mut self,
        count: usize,
        loc: SourceLocation,
    ) -> Result<char, LexError> {
        let mut digits = String::new();
        for _ in 0..count {
            match self.advance() {
                Some(c) => digits.push(c),
                None => break,
            }
        }
        Self::decode_hex(&digits, loc)
    }

    fn decode_hex(digits: &str, loc: SourceLocation) -> Result<char, LexError> {
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| LexError {
                message: format!("Invalid escape sequence '{}'", digits),
                location: loc,
            })
    }

    /// Parse a template literal; the opening backtick is already consumed
    fn template_literal(
        &mut self,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        let mut quasis = Vec::new();
        let mut chunks = Vec::new();
        let mut current = String::new();

        while let Some(ch) = self.peek() {
            if ch == '`' {
                self.advance();
                quasis.push(current);
                return Ok(TokenKind::Template { quasis, chunks });
            }
            if ch == '$' && self.peek_ahead(1) == Some('{') {
                self.advance();
                self.advance();
                quasis.push(std::mem::take(&mut current));
                chunks.push(self.template_chunk(loc)?);
                continue;
            }
            self.advance();
            if ch == '\\' {
                if let Some(c) = self.escape_sequence()? {
                    current.push(c);
                }
            } else {
                current.push(ch);
            }
        }

        Err(LexError {
            message: "Unterminated template".to_string(),
            location: loc,
        })
    }

    /// Collect the raw source of a `${...}` segment up to its matching brace
    fn template_chunk(
        &mut self,
        template_loc: SourceLocation,
    ) -> Result<TemplateChunk, LexError> {
        let origin = self.current_location();
        let mut source = String::new();
        let mut depth = 0usize;

        while let Some(ch) = self.advance() {
            match ch {
                '{' => depth += 1,
                '}' if depth == 0 => return Ok(TemplateChunk { source, origin }),
                '}' => depth -= 1,
                _ => {}
            }
            source.push(ch);
        }

        Err(LexError {
            message: "Unterminated template".to_string(),
            location: template_loc,
        })
    }

    /// Parse numeric literal (decimal, float, exponent, hex/octal/binary)
    fn number_literal(
        &mut self,
        first: char,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        if first == '0' {
            let radix = match self.peek() {
                Some('x') | Some('X') => Some(16),
                Some('o') | Some('O') => Some(8),
                Some('b') | Some('B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                let mut digits = String::new();
                while let Some(c) = self.peek() {
                    if c.is_digit(radix) {
                        digits.push(c);
                        self.advance();
                    } else if c == '_' {
                        self.advance();
                    } else {
                        break;
                    }
                }
                return u64::from_str_radix(&digits, radix)
                    .map(|v| TokenKind::Number(v as f64))
                    .map_err(|_| LexError {
                        message: "Invalid number".to_string(),
                        location: loc,
                    });
            }
        }

        let mut num_str = String::new();
        num_str.push(first);
        let mut seen_dot = first == '.';
        let mut seen_exp = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
            } else if ch == '_' {
                // numeric separator
            } else if ch == '.' && !seen_dot && !seen_exp {
                seen_dot = true;
                num_str.push(ch);
            } else if (ch == 'e' || ch == 'E') && !seen_exp {
                seen_exp = true;
                num_str.push(ch);
                if let Some(sign @ ('+' | '-')) = self.peek_ahead(1) {
                    self.advance();
                    num_str.push(sign);
                }
            } else {
                break;
            }
            self.advance();
        }

        num_str
            .parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| LexError {
                message: format!("Invalid number '{}'", num_str),
                location: loc,
            })
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "this" => TokenKind::This,
            "new" => TokenKind::New,
            "typeof" => TokenKind::Typeof,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            "await" => TokenKind::Await,
            _ => TokenKind::Ident(ident),
        }
    }

    /// Skip whitespace and comments, noting any line break crossed
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...), leaving the newline in place
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            if self.peek() == Some('\n') {
                self.saw_newline = true;
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated comment".to_string(),
            location: start_loc,
        })
    }

    /// Consume `expected` if it is the next character
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        let offset = self.base + self.position;
        SourceLocation::new(self.line, self.column, offset, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("let x = 5;");

        assert_eq!(tokens[0], TokenKind::Let);
        assert!(matches!(tokens[1], TokenKind::Ident(ref s) if s == "x"));
        assert_eq!(tokens[2], TokenKind::Eq);
        assert_eq!(tokens[3], TokenKind::Number(5.0));
        assert_eq!(tokens[4], TokenKind::Semicolon);
        assert_eq!(tokens[5], TokenKind::Eof);
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("=== !== ** **= >>> >>>= ?? => ++ --");

        assert_eq!(
            tokens[..10],
            [
                TokenKind::EqEqEq,
                TokenKind::NotEqEq,
                TokenKind::StarStar,
                TokenKind::StarStarEq,
                TokenKind::GtGtGt,
                TokenKind::GtGtGtEq,
                TokenKind::QuestionQuestion,
                TokenKind::FatArrow,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("0xff 3.14 1e3 .5 1_000");

        assert_eq!(tokens[0], TokenKind::Number(255.0));
        assert_eq!(tokens[1], TokenKind::Number(3.14));
        assert_eq!(tokens[2], TokenKind::Number(1000.0));
        assert_eq!(tokens[3], TokenKind::Number(0.5));
        assert_eq!(tokens[4], TokenKind::Number(1000.0));
    }

    #[test]
    fn test_comments_and_newlines() {
        let tokens = Lexer::new("a // comment\nb /* block\ncomment */ c")
            .tokenize()
            .expect("tokenize");

        assert!(matches!(tokens[0].kind, TokenKind::Ident(ref s) if s == "a"));
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "b"));
        assert!(tokens[1].newline_before);
        assert!(matches!(tokens[2].kind, TokenKind::Ident(ref s) if s == "c"));
        assert!(tokens[2].newline_before);
        assert_eq!(tokens[2].location.line, 3);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = kinds(r#"'it\'s' "a\nb" 'A'"#);

        assert_eq!(tokens[0], TokenKind::String("it's".to_string()));
        assert_eq!(tokens[1], TokenKind::String("a\nb".to_string()));
        assert_eq!(tokens[2], TokenKind::String("A".to_string()));
    }

    #[test]
    fn test_template_literal() {
        let tokens = kinds("`a ${x + 1} b`");

        match &tokens[0] {
            TokenKind::Template { quasis, chunks } => {
                assert_eq!(quasis, &["a ".to_string(), " b".to_string()]);
                assert_eq!(chunks.len(), 1);
                assert_eq!(chunks[0].source, "x + 1");
                assert_eq!(chunks[0].origin.column, 5);
            }
            other => panic!("Expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("let s = 'abc").tokenize().unwrap_err();

        assert_eq!(err.message, "Unterminated string constant");
        assert_eq!(err.location.line, 1);
        assert_eq!(err.location.column, 8);
    }

    #[test]
    fn test_locations() {
        let tokens = Lexer::new("x\n  foo").tokenize().expect("tokenize");

        assert_eq!(tokens[1].location.line, 2);
        assert_eq!(tokens[1].location.column, 2);
        assert_eq!(tokens[1].location.start, 4);
        assert_eq!(tokens[1].location.end, 7);
    }
}
