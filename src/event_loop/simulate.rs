// Two-queue event loop simulation

use super::extract::Extractor;
use super::task::{ScheduledTask, SyncTask, TaskKind};
use super::{EventLoopStep, Phase};
use crate::config::AnalyzerLimits;
use log::{trace, warn};
use std::collections::VecDeque;

/// Which ceiling cut the simulation short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopReason {
    StepLimit,
    IterationLimit,
}

pub(crate) struct Simulator<'a> {
    extractor: &'a Extractor<'a>,
    limits: AnalyzerLimits,
    steps: Vec<EventLoopStep>,
    call_stack: Vec<String>,
    microtasks: VecDeque<ScheduledTask>,
    macrotasks: VecDeque<ScheduledTask>,
    output: Vec<String>,
    task_runs: usize,
    stopped: Option<StopReason>,
}

impl<'a> Simulator<'a> {
    pub(crate) fn new(extractor: &'a Extractor<'a>, limits: AnalyzerLimits) -> Self {
        Simulator {
            extractor,
            limits,
            steps: Vec::new(),
            call_stack: Vec::new(),
            microtasks: VecDeque::new(),
            macrotasks: VecDeque::new(),
            output: Vec::new(),
            task_runs: 0,
            stopped: None,
        }
    }

    /// Replay the synchronous tasks, then run the event loop until both queues
    /// are empty or a ceiling is hit
    pub(crate) fn run(mut self, sync_tasks: Vec<SyncTask>) -> (Vec<EventLoopStep>, Option<StopReason>) {
        self.call_stack.push("<script>".to_string());
        self.record(
            "Script starts executing. Global execution context pushed to call stack.",
            None,
            Phase::Sync,
        );

        for task in sync_tasks {
            if !self.has_room() {
                break;
            }
            self.run_sync_task(task);
        }
        self.call_stack.clear();

        if self.stopped.is_none() {
            self.run_event_loop();
        }
        self.finish();

        (self.steps, self.stopped)
    }

    fn run_sync_task(&mut self, task: SyncTask) {
        match task {
            SyncTask::Log { text, line } => {
                let label = format!("console.log('{}')", text);
                self.call_stack.push(label.clone());
                self.output.push(text);
                self.record(
                    format!("{} executes immediately (synchronous)", label),
                    Some(line),
                    Phase::Sync,
                );
                self.call_stack.pop();
            }

            SyncTask::FunctionDecl { name, line } => {
                self.record(
                    format!("Function {} declared. Its body runs only when called.", name),
                    Some(line),
                    Phase::Sync,
                );
            }

            SyncTask::Schedule { api, task, line } => match task.kind {
                TaskKind::Macro => {
                    self.enqueue(task);
                    self.record(
                        format!("{} registers callback in Web APIs, adds to macrotask queue", api),
                        Some(line),
                        Phase::Sync,
                    );
                    if let Some(step) = self.steps.last_mut() {
                        step.active_web_api = Some("setTimeout".to_string());
                    }
                }
                TaskKind::Micro => {
                    let waiting = task.pending_continuations();
                    self.enqueue(task);
                    let description = if waiting > 0 {
                        format!(
                            "{} registers callback in microtask queue ({} chained callback(s) wait for it)",
                            api, waiting
                        )
                    } else {
                        format!("{} registers callback in microtask queue", api)
                    };
                    self.record(description, Some(line), Phase::Sync);
                }
            },
        }
    }

    /// Drain microtasks, run one macrotask, repeat
    fn run_event_loop(&mut self) {
        if !self.microtasks.is_empty() || !self.macrotasks.is_empty() {
            if !self.has_room() {
                return;
            }
            self.record(
                "Synchronous code done. Script pops off. Event loop checks microtasks FIRST!",
                None,
                Phase::Idle,
            );
        }

        let mut macro_runs = 0;
        loop {
            // Microtask checkpoint
            if !self.drain_microtasks(macro_runs > 0) {
                return;
            }
            if self.macrotasks.is_empty() || !self.can_run_task() || !self.has_room() {
                return;
            }

            let transition = if macro_runs == 0 {
                "Microtask queue empty. Now event loop processes macrotask queue."
            } else {
                "Macrotask done. Check microtasks (empty), then next macrotask."
            };
            self.record(transition, None, Phase::Idle);
            if !self.has_room() {
                return;
            }

            if let Some(task) = self.macrotasks.pop_front() {
                self.run_task(task, Phase::Macro, false);
                macro_runs += 1;
            }
        }
    }

    /// Run microtasks until the queue is empty. `false` when a ceiling stopped it.
    fn drain_microtasks(&mut self, after_macrotask: bool) -> bool {
        let mut first = true;
        while !self.microtasks.is_empty() {
            if !self.can_run_task() || !self.has_room() {
                return false;
            }
            if !first {
                self.record(
                    "Microtask queue not empty - process next microtask.",
                    None,
                    Phase::Micro,
                );
                if !self.has_room() {
                    return false;
                }
            }
            if let Some(task) = self.microtasks.pop_front() {
                self.run_task(task, Phase::Micro, after_macrotask);
            }
            first = false;
        }
        true
    }

    /// Execute one callback: apply the effects found directly in its body,
    /// queue the next link of its `.then` chain, and record the step
    fn run_task(&mut self, mut task: ScheduledTask, phase: Phase, after_macrotask: bool) {
        self.task_runs += 1;
        self.call_stack.push(task.label.clone());

        let inner = task
            .callback
            .as_ref()
            .map(|callback| self.extractor.callback_tasks(callback))
            .unwrap_or_default();
        for effect in inner {
            match effect {
                SyncTask::Log { text, .. } => self.output.push(text),
                SyncTask::Schedule { task, .. } => self.enqueue(task),
                SyncTask::FunctionDecl { .. } => {}
            }
        }
        if let Some(next) = task.continuation.take() {
            self.enqueue(*next);
        }

        let name = task.label.replacen(" cb", " callback", 1);
        let description = match (phase, after_macrotask) {
            (Phase::Macro, _) => format!("Macrotask runs: {}", name),
            (_, true) => format!("Nested microtask runs: {}", name),
            _ => format!("Microtask runs: {}", name),
        };
        self.record(description, Some(task.callback_line), phase);
        self.call_stack.pop();
    }

    fn enqueue(&mut self, task: ScheduledTask) {
        trace!("queue {:?} task '{}'", task.kind, task.label);
        match task.kind {
            TaskKind::Micro => self.microtasks.push_back(task),
            TaskKind::Macro => self.macrotasks.push_back(task),
        }
    }

    /// Room for one more step, keeping the last slot for the final one
    fn has_room(&mut self) -> bool {
        if self.steps.len() + 1 < self.limits.max_steps {
            return true;
        }
        if self.stopped.is_none() {
            warn!("event loop simulation hit the {} step ceiling", self.limits.max_steps);
            self.stopped = Some(StopReason::StepLimit);
        }
        false
    }

    fn can_run_task(&mut self) -> bool {
        if self.task_runs < self.limits.max_iterations {
            return true;
        }
        if self.stopped.is_none() {
            warn!(
                "event loop simulation stopped after {} task runs",
                self.limits.max_iterations
            );
            self.stopped = Some(StopReason::IterationLimit);
        }
        false
    }

    fn finish(&mut self) {
        let mut step = match self.stopped {
            Some(_) => {
                let left = self.microtasks.len() + self.macrotasks.len();
                self.snapshot(
                    format!("Simulation truncated. {} task(s) left in queues.", left),
                    None,
                    Phase::Idle,
                )
            }
            None => self.snapshot(
                "All queues empty. Event loop waits for new tasks.",
                None,
                Phase::Idle,
            ),
        };
        step.truncated = self.stopped.is_some();
        self.steps.push(step);
    }

    fn record(&mut self, description: impl Into<String>, line: Option<usize>, phase: Phase) {
        let step = self.snapshot(description, line, phase);
        self.steps.push(step);
    }

    /// Current state as a step; `line` is 1-based and stored 0-based
    fn snapshot(&self, description: impl Into<String>, line: Option<usize>, phase: Phase) -> EventLoopStep {
        EventLoopStep {
            description: description.into(),
            code_line: line.map(|l| l.saturating_sub(1)),
            call_stack: self.call_stack.clone(),
            micro_queue: self.microtasks.iter().map(|t| t.label.clone()).collect(),
            macro_queue: self.macrotasks.iter().map(|t| t.label.clone()).collect(),
            output: self.output.clone(),
            phase,
            active_web_api: None,
            truncated: false,
        }
    }
}
