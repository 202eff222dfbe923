//! Event-loop analyzer
//!
//! Simulates how synchronous code, microtasks and macrotasks interleave,
//! without evaluating the script:
//! - [`extract`]: finds `console.log`, `setTimeout`, `queueMicrotask` and
//!   `Promise.resolve().then` chains in the syntax tree
//! - `simulate`: replays them against two FIFO queues, draining every
//!   microtask before each macrotask
//! - `warnings`: advisory scan for constructs the model does not cover
//!
//! Every simulation is bounded by [`AnalyzerLimits`].

pub mod extract;
mod simulate;
pub mod task;
mod warnings;

use crate::config::AnalyzerLimits;
use crate::parser::{parse_code, ParseError};
use log::debug;
use serde::Serialize;
use simulate::{Simulator, StopReason};

/// What the event loop is doing during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Sync,
    Micro,
    Macro,
    Idle,
}

/// One frame of the simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLoopStep {
    pub description: String,
    /// 0-based source line; absent for transitions between tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_line: Option<usize>,
    pub call_stack: Vec<String>,
    pub micro_queue: Vec<String>,
    pub macro_queue: Vec<String>,
    /// Everything logged so far
    pub output: Vec<String>,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_web_api: Option<String>,
    /// Set on the final step when a ceiling stopped the simulation
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzerWarning {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResult {
    pub success: bool,
    pub steps: Vec<EventLoopStep>,
    pub warnings: Vec<AnalyzerWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseError>,
}

impl AnalyzeResult {
    /// Output of the last step
    pub fn final_output(&self) -> &[String] {
        self.steps.last().map(|s| s.output.as_slice()).unwrap_or_default()
    }
}

/// Analyze with the default limits
pub fn analyze_event_loop(source: &str) -> AnalyzeResult {
    analyze_event_loop_with_limits(source, AnalyzerLimits::default())
}

pub fn analyze_event_loop_with_limits(source: &str, limits: AnalyzerLimits) -> AnalyzeResult {
    let program = match parse_code(source) {
        Ok(program) => program,
        Err(err) => {
            debug!("event loop analysis aborted: {}", err);
            return AnalyzeResult {
                success: false,
                steps: Vec::new(),
                warnings: Vec::new(),
                error: Some(err),
            };
        }
    };

    let mut warnings = warnings::detect_unsupported(source);

    let extractor = extract::Extractor::new(source);
    let sync_tasks = extractor.sync_tasks(&program);
    debug!("event loop analysis: {} synchronous tasks", sync_tasks.len());

    let (steps, stopped) = Simulator::new(&extractor, limits).run(sync_tasks);
    match stopped {
        Some(StopReason::StepLimit) => warnings.push(AnalyzerWarning {
            message: format!("Output truncated at {} steps", limits.max_steps),
            line: None,
        }),
        Some(StopReason::IterationLimit) => warnings.push(AnalyzerWarning {
            message: format!(
                "Event loop stopped after {} task runs",
                limits.max_iterations
            ),
            line: None,
        }),
        None => {}
    }
    debug!("event loop analysis produced {} steps", steps.len());

    AnalyzeResult {
        success: true,
        steps,
        warnings,
        error: None,
    }
}
