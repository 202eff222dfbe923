//! Execution steps and the bounded step recorder
//!
//! Every observable action of the interpreter is recorded as an
//! [`ExecutionStep`]: an owned snapshot of the call stack, the active scope
//! chain and the heap objects reachable from them. Steps are append-only and
//! never modified after being recorded, so a UI can scrub to any index.

use crate::memory::{heap::Heap, scope::Scope, stack::StackFrame};
use crate::parser::ast::SourceLocation;
use serde::Serialize;

/// What a step represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Declaration,
    Assignment,
    Expression,
    Call,
    Return,
    Branch,
    LoopStart,
    LoopIteration,
    LoopEnd,
    ArrayAccess,
    ArrayModify,
    ObjectAccess,
    ObjectModify,
    Comparison,
    /// Terminal step recorded when the run stops on an error
    Error,
}

/// Snapshot of execution state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    /// 1-based position in the trace
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub location: SourceLocation,
    pub line: usize,
    pub call_stack: Vec<StackFrame>,
    pub scopes: Vec<Scope>,
    /// Heap objects reachable from `call_stack` and `scopes`
    pub heap: Heap,
    pub description: String,
    /// Everything logged up to and including this step
    pub console_output: Vec<String>,
}

impl ExecutionStep {
    /// Most recent console line at this step
    pub fn last_output(&self) -> Option<&str> {
        self.console_output.last().map(String::as_str)
    }
}

/// Captures `console.log` output
#[derive(Debug, Clone, Default)]
pub struct Console {
    pub lines: Vec<ConsoleLine>,
}

/// A line of console output with source location tracking
#[derive(Debug, Clone)]
pub struct ConsoleLine {
    pub text: String,
    pub location: SourceLocation,
}

impl Console {
    pub fn new() -> Self {
        Console::default()
    }

    pub fn log(&mut self, text: String, location: SourceLocation) {
        self.lines.push(ConsoleLine { text, location });
    }

    /// Get all lines as a vector of strings
    pub fn get_output(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Append-only step history with a hard ceiling
#[derive(Debug)]
pub struct StepRecorder {
    steps: Vec<ExecutionStep>,
    max_steps: usize,
}

impl StepRecorder {
    pub fn new(max_steps: usize) -> Self {
        StepRecorder {
            steps: Vec::new(),
            max_steps,
        }
    }

    /// Whether an ordinary step can still be recorded.
    /// The last slot is reserved for a terminal error step.
    pub fn has_room(&self) -> bool {
        self.steps.len() + 1 < self.max_steps
    }

    /// Id the next recorded step will get
    pub fn next_id(&self) -> usize {
        self.steps.len() + 1
    }

    /// Add a step to history. Returns false when the ceiling has been reached.
    pub fn push(&mut self, step: ExecutionStep) -> bool {
        if !self.has_room() {
            return false;
        }
        self.steps.push(step);
        true
    }

    /// Add the terminal step, using the reserved slot if needed
    pub fn push_terminal(&mut self, step: ExecutionStep) {
        if self.steps.len() < self.max_steps {
            self.steps.push(step);
        }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Get a step by index
    pub fn get(&self, index: usize) -> Option<&ExecutionStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<ExecutionStep> {
        self.steps
    }
}
