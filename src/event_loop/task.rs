//! Tasks the analyzer extracts from the script

use crate::parser::ast::Expression;
use serde::Serialize;

/// Which queue a scheduled callback waits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Micro,
    Macro,
}

/// The construct that created a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskSource {
    #[serde(rename = "setTimeout")]
    SetTimeout,
    #[serde(rename = "queueMicrotask")]
    QueueMicrotask,
    #[serde(rename = "Promise.then")]
    PromiseThen,
    #[serde(rename = "chained .then")]
    ChainedThen,
}

/// A callback waiting in the micro- or macrotask queue
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub kind: TaskKind,
    pub label: String,
    /// 1-based line where the callback body starts
    pub callback_line: usize,
    /// The callback expression, inspected when the task runs
    pub callback: Option<Expression>,
    pub source: TaskSource,
    /// The next `.then` in a chain, queued once this task has run
    pub continuation: Option<Box<ScheduledTask>>,
}

impl ScheduledTask {
    /// Number of chained callbacks still waiting behind this one
    pub fn pending_continuations(&self) -> usize {
        let mut count = 0;
        let mut next = self.continuation.as_deref();
        while let Some(task) = next {
            count += 1;
            next = task.continuation.as_deref();
        }
        count
    }
}

/// One effect of running code: either top-level statements or a callback body
#[derive(Debug, Clone)]
pub enum SyncTask {
    /// `console.log(...)` with its rendered text
    Log { text: String, line: usize },
    /// A top-level function declaration; the body is not inspected
    FunctionDecl { name: String, line: usize },
    /// A call that hands a callback to a queue
    Schedule {
        api: &'static str,
        task: ScheduledTask,
        line: usize,
    },
}

impl SyncTask {
    pub fn line(&self) -> usize {
        match self {
            SyncTask::Log { line, .. }
            | SyncTask::FunctionDecl { line, .. }
            | SyncTask::Schedule { line, .. } => *line,
        }
    }
}
