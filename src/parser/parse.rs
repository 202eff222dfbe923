//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `statements`: declarations and control flow (if, for, while, try, ...)
//! - `expressions`: expressions with one method per precedence level, plus
//!   function, arrow, array and object literals
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, TemplateChunk, Token, TokenKind};
use serde::Serialize;
use thiserror::Error;

/// Syntax error with the 1-based line and 0-based column where it was detected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} ({line}:{column})")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn at(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError {
            message: message.into(),
            line: location.line,
            column: location.column,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::at(err.message, err.location)
    }
}

/// Deepest nesting of statements and expressions the parser accepts
pub const MAX_NESTING_DEPTH: usize = 40;

/// Recursive descent parser for the script subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Nesting of guarded grammar rules currently being parsed
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the entire program
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let start = self.current_location();
        let mut program = Program::new();

        while !self.is_at_end() {
            program.body.push(self.parse_statement()?);
        }

        program.location = SourceLocation {
            end: self.current_location().end,
            ..start
        };
        Ok(program)
    }

    /// Parse the expression inside a template literal `${...}` segment
    /// The nested parser continues counting from `depth`
    pub(crate) fn parse_template_chunk(
        chunk: &TemplateChunk,
        depth: usize,
    ) -> Result<Expression, ParseError> {
        let mut lexer = Lexer::with_origin(&chunk.source, chunk.origin);
        let mut parser = Parser {
            tokens: lexer.tokenize()?,
            position: 0,
            depth,
        };
        let expr = parser.parse_expression()?;
        if !parser.is_at_end() {
            return Err(parser.unexpected());
        }
        Ok(expr)
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Run `rule` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`]
    pub(crate) fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::at("Nesting too deep", self.current_location()));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    /// True if the current token is the identifier `name` (contextual keywords)
    pub(crate) fn check_ident(&self, name: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(s) if s == name)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        // The token stream always ends with Eof and `advance` never moves past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    /// Location from `start` to the end of the last consumed token
    pub(crate) fn span_from(&self, start: SourceLocation) -> SourceLocation {
        SourceLocation {
            end: self.previous().location.end.max(start.start),
            ..start
        }
    }

    /// Error for the current token
    pub(crate) fn unexpected(&self) -> ParseError {
        let token = self.peek();
        let message = match token.kind {
            TokenKind::Eof => "Unexpected end of input".to_string(),
            ref kind => format!("Unexpected token {}", kind),
        };
        ParseError::at(message, token.location)
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: &TokenKind,
        ctx: &str,
    ) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::at(
                format!("Expected '{}' {}, found {}", kind.text(), ctx, self.peek().kind),
                self.current_location(),
            ))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::LParen, ctx)
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RParen, ctx)
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::LBrace, ctx)
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RBrace, ctx)
    }

    /// Consume a statement terminator: an explicit `;`, or an inserted one
    /// before `}`, end of input, or a line break.
    pub(crate) fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }
        let token = self.peek();
        if token.newline_before
            || matches!(token.kind, TokenKind::RBrace | TokenKind::Eof)
        {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::at(
                format!("Expected identifier, found {}", self.peek().kind),
                self.current_location(),
            ))
        }
    }

    /// Identifier or keyword used in property-name position (`a.new`, `{ if: 1 }`)
    pub(crate) fn expect_property_name(&mut self) -> Result<String, ParseError> {
        let name = match &self.peek().kind {
            TokenKind::Ident(name) => name.clone(),
            kind => match kind.keyword_name() {
                Some(name) => name.to_string(),
                None => {
                    return Err(ParseError::at(
                        format!("Expected property name, found {}", kind),
                        self.current_location(),
                    ))
                }
            },
        };
        self.advance();
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_program() {
        let program = Parser::new("").unwrap().parse_program().unwrap();
        assert!(program.body.is_empty());
    }

    #[test]
    fn test_asi_on_newline() {
        let program = Parser::new("let a = 1\nlet b = 2\na + b")
            .unwrap()
            .parse_program()
            .unwrap();
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        let err = Parser::new("let a = 1 let b = 2")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 10);
        assert!(err.message.starts_with("Unexpected token"));
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let source = format!("let x = {}1{};", "(".repeat(100), ")".repeat(100));
        let err = Parser::new(&source).unwrap().parse_program().unwrap_err();
        assert_eq!(err.message, "Nesting too deep");
        assert_eq!(err.line, 1);

        let shallow = format!("let x = {}1{};", "(".repeat(20), ")".repeat(20));
        assert!(Parser::new(&shallow).unwrap().parse_program().is_ok());
    }

    #[test]
    fn test_nesting_depth_counts_blocks_unary_and_arrays() {
        let blocks = format!("{}{}", "{".repeat(60), "}".repeat(60));
        let err = Parser::new(&blocks).unwrap().parse_program().unwrap_err();
        assert_eq!(err.message, "Nesting too deep");

        let unary = format!("let y = {}1;", "!".repeat(200));
        let err = Parser::new(&unary).unwrap().parse_program().unwrap_err();
        assert_eq!(err.message, "Nesting too deep");

        let arrays = format!("let z = {}{};", "[".repeat(60), "]".repeat(60));
        let err = Parser::new(&arrays).unwrap().parse_program().unwrap_err();
        assert_eq!(err.message, "Nesting too deep");
    }

    #[test]
    fn test_error_position() {
        let err = Parser::new("let x = 1;\nlet y = ;")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 8);
    }
}
