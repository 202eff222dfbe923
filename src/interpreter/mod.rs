//! Tracing interpreter for the JavaScript subset
//!
//! This module provides the core execution logic:
//! - [`engine`]: interpreter state, step recording, scopes and function calls
//! - [`errors`]: runtime error types
//! - `statements` / `expressions`: the tree walk itself
//! - `ops`: operators, property access and assignment
//! - `builtins` / `methods`: console, Math, Object statics and the built-in
//!   array and string methods
//!
//! # Execution Model
//!
//! The interpreter walks the AST and records an [`ExecutionStep`](crate::snapshot::ExecutionStep)
//! at every observable action. Each step carries a deep copy of the call stack,
//! the active scope chain and the reachable heap, so a viewer can move freely
//! through the trace.
//!
//! Runs are always bounded: a step ceiling, a call-depth ceiling and a
//! per-loop iteration ceiling turn runaway programs into a terminal `error`
//! step instead of a hang.

mod builtins;
pub(crate) mod describe;
pub mod engine;
pub mod errors;
mod expressions;
mod methods;
mod ops;
mod statements;

pub use engine::{interpret, Execution, Interpreter};
pub use errors::RuntimeError;
