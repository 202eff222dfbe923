// Integration tests for the event-loop analyzer

use jstrace::event_loop::Phase;
use jstrace::{analyze_event_loop, analyze_event_loop_with_limits, AnalyzerLimits};

fn final_output(source: &str) -> Vec<String> {
    let result = analyze_event_loop(source);
    assert!(result.success, "analysis failed: {:?}", result.error);
    result.final_output().to_vec()
}

#[test]
fn test_synchronous_logs_in_order() {
    assert_eq!(
        final_output("console.log('1');\nconsole.log('2');\nconsole.log('3');"),
        vec!["1", "2", "3"]
    );
}

#[test]
fn test_timeout_runs_after_sync_code() {
    let source = r#"console.log('start');
setTimeout(() => console.log('timeout'), 0);
console.log('end');"#;
    assert_eq!(final_output(source), vec!["start", "end", "timeout"]);
}

#[test]
fn test_microtasks_before_macrotasks() {
    let source = r#"console.log('1');
setTimeout(() => console.log('timeout'), 0);
Promise.resolve().then(() => console.log('promise'));
console.log('2');"#;
    assert_eq!(final_output(source), vec!["1", "2", "promise", "timeout"]);
}

#[test]
fn test_nested_timeouts() {
    let source = r#"console.log('start');
setTimeout(() => {
  console.log('outer');
  setTimeout(() => console.log('inner'), 0);
}, 0);
console.log('end');"#;
    assert_eq!(final_output(source), vec!["start", "end", "outer", "inner"]);
}

#[test]
fn test_promise_inside_timeout() {
    let source = r#"console.log('start');
setTimeout(() => {
  console.log('timeout');
  Promise.resolve().then(() => console.log('promise in timeout'));
}, 0);
console.log('end');"#;
    let result = analyze_event_loop(source);
    assert_eq!(
        result.final_output(),
        ["start", "end", "timeout", "promise in timeout"]
    );
    assert!(result
        .steps
        .iter()
        .any(|s| s.description.starts_with("Nested microtask runs:")));
}

#[test]
fn test_chained_then_waits_for_previous_link() {
    let source = r#"Promise.resolve()
  .then(() => console.log('a'))
  .then(() => console.log('c'));
queueMicrotask(() => console.log('b'));"#;
    let result = analyze_event_loop(source);
    assert_eq!(result.final_output(), ["a", "b", "c"]);
    assert!(result
        .steps
        .iter()
        .any(|s| s.description.ends_with("(1 chained callback(s) wait for it)")));
}

#[test]
fn test_function_bodies_are_not_run() {
    let source = r#"function later() {
  console.log('never');
}
console.log('now');"#;
    let result = analyze_event_loop(source);
    assert_eq!(result.final_output(), ["now"]);
    assert_eq!(
        result.steps[1].description,
        "Function later declared. Its body runs only when called."
    );
}

#[test]
fn test_step_shape() {
    let source = "console.log('a');\nsetTimeout(() => console.log('b'), 0);";
    let result = analyze_event_loop(source);
    let steps = &result.steps;

    assert_eq!(steps[0].call_stack, vec!["<script>"]);
    assert_eq!(steps[0].phase, Phase::Sync);
    assert_eq!(steps[1].code_line, Some(0));
    assert_eq!(steps[1].call_stack, vec!["<script>", "console.log('a')"]);

    assert_eq!(steps[2].code_line, Some(1));
    assert_eq!(steps[2].macro_queue, vec!["timeout cb"]);
    assert_eq!(steps[2].active_web_api.as_deref(), Some("setTimeout"));

    let last = steps.last().expect("final step");
    assert_eq!(last.phase, Phase::Idle);
    assert!(!last.truncated);
    assert!(last.micro_queue.is_empty() && last.macro_queue.is_empty());
    assert_eq!(
        last.description,
        "All queues empty. Event loop waits for new tasks."
    );
}

#[test]
fn test_json_omits_missing_code_line() {
    let result = analyze_event_loop("console.log('x');");
    let json = serde_json::to_value(&result).expect("serialize");
    let steps = json["steps"].as_array().expect("steps");

    assert!(steps[0].get("codeLine").is_none());
    assert_eq!(steps[1]["codeLine"], 0);
    assert_eq!(steps[1]["phase"], "sync");
    assert!(steps[1]["callStack"].is_array());
    assert_eq!(json["success"], true);
}

#[test]
fn test_identical_runs_are_identical() {
    let source = r#"console.log('1');
setTimeout(() => console.log('t'), 0);
Promise.resolve().then(() => console.log('p')).then(() => console.log('q'));"#;
    assert_eq!(analyze_event_loop(source), analyze_event_loop(source));
}

#[test]
fn test_parse_error_is_not_success() {
    let result = analyze_event_loop("setTimeout(() => {, 0);");
    assert!(!result.success);
    assert!(result.steps.is_empty());
    assert!(result.error.is_some());
}

#[test]
fn test_unsupported_constructs_warn() {
    let source = "console.log('a');\nfetch('/api').then(r => console.log(r));";
    let result = analyze_event_loop(source);
    assert!(result.success);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.message == "fetch() treated as immediate resolution" && w.line == Some(2)));
}

#[test]
fn test_step_ceiling_truncates() {
    let source = (0..10)
        .map(|i| format!("console.log('{}');", i))
        .collect::<Vec<_>>()
        .join("\n");
    let limits = AnalyzerLimits {
        max_steps: 5,
        ..AnalyzerLimits::default()
    };
    let result = analyze_event_loop_with_limits(&source, limits);

    assert_eq!(result.steps.len(), 5);
    let last = result.steps.last().expect("final step");
    assert!(last.truncated);
    assert_eq!(last.output, vec!["0", "1", "2"]);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.message == "Output truncated at 5 steps"));
}

#[test]
fn test_iteration_ceiling_truncates() {
    let source = r#"setTimeout(() => console.log('a'), 0);
setTimeout(() => console.log('b'), 0);
setTimeout(() => console.log('c'), 0);"#;
    let limits = AnalyzerLimits {
        max_iterations: 2,
        ..AnalyzerLimits::default()
    };
    let result = analyze_event_loop_with_limits(source, limits);

    assert_eq!(result.final_output(), ["a", "b"]);
    let last = result.steps.last().expect("final step");
    assert!(last.truncated);
    assert_eq!(
        last.description,
        "Simulation truncated. 1 task(s) left in queues."
    );
    assert!(result
        .warnings
        .iter()
        .any(|w| w.message == "Event loop stopped after 2 task runs"));
}
