//! Pattern-based extraction of scheduling calls
//!
//! Nothing here evaluates the script. Top-level statements are scanned for
//! `console.log`, `setTimeout`, `queueMicrotask` and `Promise.resolve().then`
//! chains; function bodies are skipped. Callback bodies are scanned one level
//! deep, and only when the simulator runs the callback.

use super::task::{ScheduledTask, SyncTask, TaskKind, TaskSource};
use crate::interpreter::describe::expr_to_source;
use crate::memory::value::number_to_string;
use crate::parser::ast::*;
use log::trace;

/// Where a call was found; decides the labels of the tasks it creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    TopLevel,
    Callback,
}

/// Extracts [`SyncTask`]s from syntax, falling back to the raw source text
/// to render `console.log` arguments it cannot read statically
pub struct Extractor<'a> {
    source: &'a str,
}

impl<'a> Extractor<'a> {
    pub fn new(source: &'a str) -> Self {
        Extractor { source }
    }

    /// Effects of the top-level statement list, in source order
    pub fn sync_tasks(&self, program: &Program) -> Vec<SyncTask> {
        let mut tasks = Vec::new();
        for stmt in &program.body {
            match stmt {
                Statement::Expression { expr, .. } => {
                    self.extract_expression(expr, Context::TopLevel, &mut tasks)
                }
                Statement::VarDecl { declarations, .. } => {
                    for init in declarations.iter().filter_map(|d| d.init.as_ref()) {
                        self.extract_expression(init, Context::TopLevel, &mut tasks);
                    }
                }
                Statement::FunctionDecl { function, location } => {
                    if let Some(name) = &function.name {
                        tasks.push(SyncTask::FunctionDecl {
                            name: name.clone(),
                            line: location.line,
                        });
                    }
                }
                _ => {}
            }
        }
        tasks
    }

    /// Effects directly contained in a callback body (one level deep)
    pub fn callback_tasks(&self, callback: &Expression) -> Vec<SyncTask> {
        let mut tasks = Vec::new();
        let Some(function) = callback.as_function() else {
            return tasks;
        };
        match &function.body {
            FunctionBody::Block(statements) => {
                for stmt in statements {
                    match stmt {
                        Statement::Expression { expr, .. } => {
                            self.extract_expression(expr, Context::Callback, &mut tasks)
                        }
                        Statement::VarDecl { declarations, .. } => {
                            for init in declarations.iter().filter_map(|d| d.init.as_ref()) {
                                self.extract_expression(init, Context::Callback, &mut tasks);
                            }
                        }
                        _ => {}
                    }
                }
            }
            FunctionBody::Expression(expr) => {
                self.extract_expression(expr, Context::Callback, &mut tasks)
            }
        }
        tasks
    }

    fn extract_expression(&self, expr: &Expression, context: Context, tasks: &mut Vec<SyncTask>) {
        let expr = match expr {
            Expression::Await { argument, .. } => argument.as_ref(),
            other => other,
        };
        let Expression::Call {
            callee,
            arguments,
            location,
        } = expr
        else {
            return;
        };
        let line = location.line;

        if callee.as_static_member() == Some(("console", "log")) {
            tasks.push(SyncTask::Log {
                text: self.console_text(arguments),
                line,
            });
            return;
        }

        let timer = match callee.as_identifier() {
            Some("setTimeout") => Some((TaskKind::Macro, TaskSource::SetTimeout)),
            Some("queueMicrotask") => Some((TaskKind::Micro, TaskSource::QueueMicrotask)),
            _ => None,
        };
        if let Some((kind, source)) = timer {
            let callback = arguments.first();
            let label = match (kind, context) {
                (TaskKind::Macro, Context::TopLevel) => "timeout cb",
                (TaskKind::Macro, Context::Callback) => "nested timeout cb",
                (TaskKind::Micro, Context::TopLevel) => "microtask",
                (TaskKind::Micro, Context::Callback) => "nested microtask",
            };
            trace!("extracted {:?} task '{}' at line {}", kind, label, line);
            tasks.push(SyncTask::Schedule {
                api: if kind == TaskKind::Macro {
                    "setTimeout()"
                } else {
                    "queueMicrotask()"
                },
                task: ScheduledTask {
                    kind,
                    label: label.to_string(),
                    callback_line: callback_line(callback, line),
                    callback: callback.cloned(),
                    source,
                    continuation: None,
                },
                line,
            });
            return;
        }

        if let Some(task) = self.promise_chain(expr, context) {
            trace!("extracted promise chain '{}' at line {}", task.label, line);
            tasks.push(SyncTask::Schedule {
                api: "Promise.then()",
                task,
                line,
            });
            return;
        }

        // `a.b(...)`: the receiver may itself schedule something
        if let Expression::Member { object, .. } = callee.as_ref() {
            self.extract_expression(object, context, tasks);
        }
    }

    /// `Promise.resolve().then(a).then(b)...` as one task for `a` carrying
    /// the rest of the chain as continuations. `.catch` links pass through.
    fn promise_chain(&self, expr: &Expression, context: Context) -> Option<ScheduledTask> {
        // Collected outermost first
        let mut callbacks: Vec<Option<&Expression>> = Vec::new();
        let mut current = expr;
        loop {
            let Expression::Call {
                callee, arguments, ..
            } = current
            else {
                return None;
            };
            let Expression::Member {
                object,
                property: MemberProperty::Named(method),
                ..
            } = callee.as_ref()
            else {
                return None;
            };
            match method.as_str() {
                "then" => callbacks.push(arguments.first()),
                "catch" => {}
                "resolve" if object.as_identifier() == Some("Promise") => break,
                _ => return None,
            }
            current = object;
        }

        let call_line = expr.location().line;
        let links: Vec<&Expression> = callbacks.into_iter().rev().flatten().collect();

        let mut chain: Option<Box<ScheduledTask>> = None;
        for (i, callback) in links.iter().enumerate().rev() {
            let extracted = self.promise_label(callback);
            let (label, source) = match (i, context) {
                (0, Context::TopLevel) => (
                    extracted.unwrap_or_else(|| "promise cb".to_string()),
                    TaskSource::PromiseThen,
                ),
                (0, Context::Callback) => ("nested promise cb".to_string(), TaskSource::PromiseThen),
                _ => (
                    extracted.unwrap_or_else(|| "chained promise cb".to_string()),
                    TaskSource::ChainedThen,
                ),
            };
            chain = Some(Box::new(ScheduledTask {
                kind: TaskKind::Micro,
                label,
                callback_line: callback_line(Some(*callback), call_line),
                callback: Some((*callback).clone()),
                source,
                continuation: chain,
            }));
        }
        chain.map(|task| *task)
    }

    /// `"<logged text> cb"` when the callback logs something
    fn promise_label(&self, callback: &Expression) -> Option<String> {
        let function = callback.as_function()?;
        let log_call = |expr: &Expression| match expr {
            Expression::Call {
                callee, arguments, ..
            } if callee.as_static_member() == Some(("console", "log")) => {
                Some(format!("{} cb", self.console_text(arguments)))
            }
            _ => None,
        };
        match &function.body {
            FunctionBody::Expression(expr) => log_call(expr),
            FunctionBody::Block(statements) => statements.iter().find_map(|stmt| match stmt {
                Statement::Expression { expr, .. } => log_call(expr),
                _ => None,
            }),
        }
    }

    /// Text a `console.log` call prints. Literal arguments render directly;
    /// anything else is read back from its own span of the source.
    pub fn console_text(&self, arguments: &[Expression]) -> String {
        arguments
            .iter()
            .map(|arg| {
                literal_text(arg)
                    .or_else(|| self.source_text(arg.location()).map(str::to_string))
                    .unwrap_or_else(|| expr_to_source(arg))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Source covered by `location`, whose offsets count chars
    fn source_text(&self, location: SourceLocation) -> Option<&'a str> {
        if location.end <= location.start {
            return None;
        }
        let mut offsets = self
            .source
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(self.source.len()));
        let start = offsets.nth(location.start)?;
        let end = offsets.nth(location.end - location.start - 1)?;
        let text = self.source.get(start..end)?.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// Rendered value of a literal argument
fn literal_text(expr: &Expression) -> Option<String> {
    match expr {
        Expression::String { value, .. } => Some(value.clone()),
        Expression::Number { value, .. } => Some(number_to_string(*value)),
        Expression::Boolean { value, .. } => Some(value.to_string()),
        Expression::Null { .. } => Some("null".to_string()),
        Expression::Template {
            quasis,
            expressions,
            ..
        } if expressions.is_empty() => Some(quasis.concat()),
        _ => None,
    }
}

/// Line where the callback's body starts, else the callback, else the call
fn callback_line(callback: Option<&Expression>, call_line: usize) -> usize {
    match callback {
        Some(expr) => match expr.as_function() {
            Some(function) => function.body_location.line,
            None => expr.location().line,
        },
        None => call_line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_code;

    fn extract(source: &str) -> Vec<SyncTask> {
        let program = parse_code(source).expect("parse");
        Extractor::new(source).sync_tasks(&program)
    }

    #[test]
    fn test_console_log_literals() {
        let tasks = extract("console.log('a'); console.log(1, true);");
        let texts: Vec<_> = tasks
            .iter()
            .filter_map(|t| match t {
                SyncTask::Log { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["a", "1 true"]);
    }

    #[test]
    fn test_console_log_falls_back_to_source() {
        let tasks = extract("let x = 1;\nconsole.log(x + 1);");
        match &tasks[0] {
            SyncTask::Log { text, line } => {
                assert_eq!(text, "x + 1");
                assert_eq!(*line, 2);
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_console_log_reads_each_call_span() {
        let tasks = extract("let x = 2; let o = { n: 1 };\nconsole.log('a'); console.log(x); console.log(o.n, 'b');");
        let texts: Vec<_> = tasks
            .iter()
            .filter_map(|t| match t {
                SyncTask::Log { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["a", "x", "o.n b"]);
    }

    #[test]
    fn test_function_bodies_are_skipped() {
        let tasks = extract("function f() { console.log('inside'); }\nconsole.log('out');");
        assert_eq!(tasks.len(), 2);
        assert!(matches!(&tasks[0], SyncTask::FunctionDecl { name, .. } if name == "f"));
        assert!(matches!(&tasks[1], SyncTask::Log { text, .. } if text == "out"));
    }

    #[test]
    fn test_scheduling_calls() {
        let tasks = extract(
            "setTimeout(() => console.log('t'), 0);\nqueueMicrotask(() => {});\nPromise.resolve().then(() => console.log('p'));",
        );
        let labels: Vec<_> = tasks
            .iter()
            .filter_map(|t| match t {
                SyncTask::Schedule { task, .. } => Some((task.kind, task.label.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                (TaskKind::Macro, "timeout cb"),
                (TaskKind::Micro, "microtask"),
                (TaskKind::Micro, "p cb"),
            ]
        );
    }

    #[test]
    fn test_then_chain_becomes_continuations() {
        let tasks = extract(
            "Promise.resolve().then(() => console.log('a')).then(() => 1).catch(() => 0).then(() => console.log('c'));",
        );
        assert_eq!(tasks.len(), 1);
        let SyncTask::Schedule { task, .. } = &tasks[0] else {
            panic!("expected a schedule task");
        };
        assert_eq!(task.label, "a cb");
        assert_eq!(task.pending_continuations(), 2);
        let second = task.continuation.as_deref().expect("second link");
        assert_eq!(second.label, "chained promise cb");
        assert_eq!(second.source, TaskSource::ChainedThen);
        let third = second.continuation.as_deref().expect("third link");
        assert_eq!(third.label, "c cb");
    }

    #[test]
    fn test_promise_in_initializer() {
        let tasks = extract("const p = Promise.resolve().then(() => {});");
        assert!(matches!(
            &tasks[0],
            SyncTask::Schedule { task, .. } if task.label == "promise cb"
        ));
    }

    #[test]
    fn test_callback_tasks_use_nested_labels() {
        let source = "setTimeout(() => {\n  console.log('x');\n  queueMicrotask(() => {});\n  setTimeout(() => {}, 0);\n}, 0);";
        let program = parse_code(source).expect("parse");
        let extractor = Extractor::new(source);
        let tasks = extractor.sync_tasks(&program);
        let SyncTask::Schedule { task, .. } = &tasks[0] else {
            panic!("expected a schedule task");
        };
        assert_eq!(task.callback_line, 1);
        let callback = task.callback.as_ref().expect("callback");
        let inner = extractor.callback_tasks(callback);
        assert_eq!(inner.len(), 3);
        assert!(matches!(&inner[1], SyncTask::Schedule { task, .. } if task.label == "nested microtask"));
        assert!(matches!(&inner[2], SyncTask::Schedule { task, .. } if task.label == "nested timeout cb"));
    }
}
