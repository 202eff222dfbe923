//! # Introduction
//!
//! jstrace turns a short script in a JavaScript subset into a deterministic,
//! fully replayable trace. Two independent engines share the same contract:
//! source text in, an append-only array of steps out.
//!
//! ## Engines
//!
//! ```text
//! Source → Lexer → Parser → AST ─┬→ Interpreter      → ExecutionStep[]
//!                                └→ Event-loop analyzer → EventLoopStep[]
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an AST with source
//!    positions on every node.
//! 2. [`interpreter`]: walks the AST and records an
//!    [`ExecutionStep`](snapshot::ExecutionStep) for each declaration,
//!    assignment, call, branch, loop transition and property access. Every step
//!    owns a copy of the call stack, the scope chain and the reachable heap.
//! 3. [`memory`]: the value model. Arrays and objects live in a per-run
//!    [`Heap`](memory::heap::Heap) and keep their id for the whole run.
//! 4. [`snapshot`]: step types, the bounded step recorder and the console.
//! 5. [`event_loop`]: a static simulation of synchronous code, microtasks and
//!    macrotasks, for showing scheduling order without running the callbacks.
//! 6. [`config`]: resource ceilings for both engines.
//!
//! Neither engine returns an error for a bad program at runtime. A runtime
//! error or an exceeded ceiling ends the trace with a terminal step; only a
//! syntax error is reported as an error.
//!
//! ```
//! let execution = jstrace::interpret("let x = 10 / 0; console.log(x);").unwrap();
//! assert_eq!(execution.console_output, vec!["Infinity"]);
//!
//! let analysis = jstrace::analyze_event_loop(
//!     "console.log('a'); setTimeout(() => console.log('c'), 0); console.log('b');",
//! );
//! assert_eq!(analysis.final_output(), ["a", "b", "c"]);
//! ```

pub mod config;
pub mod event_loop;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod snapshot;

pub use config::{AnalyzerLimits, InterpreterLimits};
pub use event_loop::{analyze_event_loop, analyze_event_loop_with_limits, AnalyzeResult};
pub use interpreter::{interpret, Execution, Interpreter};
pub use parser::{parse_code, ParseError};
