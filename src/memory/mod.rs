//! Memory model for the interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (primitives, references, functions)
//! - [`heap`]: Per-run arena holding array and object contents by id
//! - [`scope`]: Scope arena and scope-chain name resolution
//! - [`stack`]: Call stack with frames mirroring params and locals
//! - [`format`]: Display formatting of values
//!
//! # Identity
//!
//! Arrays and objects are handles into the [`heap::Heap`]. Copying a
//! [`value::RuntimeValue`] copies the handle, so mutation through one binding
//! is visible through every other binding of the same id:
//! ```text
//! let a = [1]; let b = a; b.push(2)  →  a is [1, 2]
//! ```

pub mod format;
pub mod heap;
pub mod scope;
pub mod stack;
pub mod value;
