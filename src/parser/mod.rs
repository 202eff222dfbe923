//! Script source parser
//!
//! This module transforms script source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser state, helpers, and errors; statement and expression
//!   grammar live in `statements` and `expressions`
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! - Declarations: `var`, `let`, `const`, `function`, `async function`
//! - Control flow: `if`/`else`, `for`, `for...of`, `while`, `do...while`,
//!   `break`, `continue`, `return`, `throw`, `try`/`catch`/`finally`
//! - Expressions: literals (including template strings), arrays, objects,
//!   function expressions and arrows, calls, `new`, member access, every
//!   assignment operator, ternary, logical, bitwise, equality, relational,
//!   arithmetic, unary, update, `await`
//! - No classes, generators, destructuring, spread, or regular expression literals
//!
//! Hand-written recursive descent parser with one method per precedence level.
//! Semicolons may be omitted where a statement ends at a line break, `}`, or
//! end of input.

pub mod ast;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseError, Parser};

/// Parse a complete program
pub fn parse_code(source: &str) -> Result<ast::Program, ParseError> {
    Parser::new(source)?.parse_program()
}
