// Integration tests for the tracing interpreter

use jstrace::interpreter::Interpreter;
use jstrace::memory::value::RuntimeValue;
use jstrace::parser::parse_code;
use jstrace::snapshot::{ExecutionStep, StepKind};
use jstrace::{interpret, InterpreterLimits};

fn run(source: &str) -> (Vec<ExecutionStep>, Vec<String>) {
    let execution = interpret(source).expect("Parsing failed");
    (execution.steps, execution.console_output)
}

fn output(source: &str) -> Vec<String> {
    let (steps, output) = run(source);
    if let Some(last) = steps.last() {
        assert_ne!(
            last.kind,
            StepKind::Error,
            "run ended in an error: {}",
            last.description
        );
    }
    output
}

fn last_error(steps: &[ExecutionStep]) -> &str {
    let last = steps.last().expect("no steps recorded");
    assert_eq!(last.kind, StepKind::Error);
    &last.description
}

#[test]
fn test_console_log_order() {
    assert_eq!(
        output("console.log('1'); console.log('2'); console.log('3');"),
        vec!["1", "2", "3"]
    );
}

#[test]
fn test_recursive_factorial() {
    let source = r#"
        function factorial(n) {
            if (n <= 1) {
                return 1;
            }
            return n * factorial(n - 1);
        }
        const result = factorial(4);
        console.log(result);
    "#;

    let (steps, output) = run(source);
    assert_eq!(output, vec!["24"]);

    let max_depth = steps.iter().map(|s| s.call_stack.len()).max().unwrap_or(0);
    assert!(max_depth > 2, "max depth was {}", max_depth);

    assert!(steps
        .iter()
        .any(|s| s.kind == StepKind::Declaration && s.description == "Declare const result = 24"));
    assert!(steps
        .iter()
        .any(|s| s.kind == StepKind::Return && s.description == "Return from factorial: 24"));
}

#[test]
fn test_division_by_zero_is_infinity() {
    let (steps, output) = run("const x = 10 / 0;\nconsole.log(x);");
    assert_eq!(output, vec!["Infinity"]);
    assert!(steps.iter().any(|s| s.description == "10 / 0 → Infinity"));
    assert!(steps.iter().any(|s| s.description == "Declare const x = Infinity"));
}

#[test]
fn test_while_true_with_break_completes() {
    let source = r#"
        let i = 0;
        while (true) {
            i++;
            if (i >= 3) {
                break;
            }
        }
        console.log(i);
    "#;
    let (steps, output) = run(source);
    assert_eq!(output, vec!["3"]);
    assert!(steps
        .iter()
        .any(|s| s.kind == StepKind::LoopEnd && s.description == "While loop exited via break"));
    assert_ne!(steps.last().map(|s| s.kind), Some(StepKind::Error));
}

#[test]
fn test_infinite_loop_is_bounded() {
    let (steps, _) = run("let i = 0;\nwhile (true) {\n  i++;\n}");
    assert!(steps.len() < InterpreterLimits::default().max_steps);
    assert_eq!(last_error(&steps), "Error: Maximum loop iterations exceeded");

    let iterations = steps
        .iter()
        .filter(|s| s.kind == StepKind::LoopIteration)
        .count();
    assert_eq!(iterations, InterpreterLimits::default().max_loop_iterations);
}

#[test]
fn test_step_ceiling_counts_terminal_step() {
    let limits = InterpreterLimits {
        max_steps: 50,
        ..InterpreterLimits::default()
    };
    let program = parse_code("for (let i = 0; i < 500; i++) { let x = i; }").expect("Parsing failed");
    let steps = Interpreter::with_limits(limits).execute(&program);

    assert_eq!(steps.len(), 50);
    assert_eq!(last_error(&steps), "Error: Maximum step limit (50) exceeded");
    let ids: Vec<usize> = steps.iter().map(|s| s.id).collect();
    assert_eq!(ids, (1..=50).collect::<Vec<_>>());
}

#[test]
fn test_runaway_recursion_is_bounded() {
    let (steps, _) = run("function f(n) { return f(n + 1); }\nf(0);");
    assert_eq!(last_error(&steps), "Error: Maximum call stack size exceeded");
    let max_depth = steps.iter().map(|s| s.call_stack.len()).max().unwrap_or(0);
    assert_eq!(max_depth, InterpreterLimits::default().max_call_depth);
}

#[test]
fn test_closures_keep_their_scope() {
    let source = r#"
        function makeCounter() {
            let count = 0;
            return function() {
                count += 1;
                return count;
            };
        }
        const counter = makeCounter();
        counter();
        counter();
        console.log(counter());
    "#;
    assert_eq!(output(source), vec!["3"]);
}

#[test]
fn test_return_inside_nested_loop() {
    let source = r#"
        function find(arr, target) {
            for (let i = 0; i < arr.length; i++) {
                if (arr[i] === target) {
                    return i;
                }
            }
            return -1;
        }
        console.log(find([5, 7, 9], 9));
        console.log(find([5, 7, 9], 4));
    "#;
    assert_eq!(output(source), vec!["2", "-1"]);
}

#[test]
fn test_block_scoping_and_var_hoisting() {
    let source = r#"
        let x = 1;
        {
            let x = 2;
        }
        console.log(x);
        function f() {
            if (true) {
                var y = 5;
            }
            return y;
        }
        console.log(f());
    "#;
    assert_eq!(output(source), vec!["1", "5"]);
}

#[test]
fn test_const_assignment_is_an_error() {
    let (steps, _) = run("const a = 1;\na = 2;");
    assert_eq!(last_error(&steps), "Error: Assignment to constant variable 'a'");
}

#[test]
fn test_calling_a_non_function() {
    let (steps, output) = run("const x = 5;\nconsole.log('before');\nx();");
    assert_eq!(output, vec!["before"]);
    assert_eq!(last_error(&steps), "Error: x is not a function");
    assert_eq!(steps.last().map(|s| s.line), Some(3));
}

#[test]
fn test_array_methods() {
    let source = r#"
        const nums = [1, 2, 3, 4];
        const doubled = nums.map(n => n * 2);
        console.log(doubled.join("-"));
        console.log(nums.filter(n => n % 2 === 0).length);
        console.log(nums.reduce((a, b) => a + b, 0));
        console.log(nums.indexOf(3), nums.includes(9));
        nums.push(5);
        console.log(nums.slice(-2));
    "#;
    let (steps, output) = run(source);
    assert_eq!(output, vec!["2-4-6-8", "2", "10", "2 false", "[4, 5]"]);
    assert!(steps
        .iter()
        .any(|s| s.description == "Array.map() - transforming 4 elements"));
    assert!(steps
        .iter()
        .any(|s| s.kind == StepKind::ArrayModify && s.description == "Array.push(5) → length 5"));
}

#[test]
fn test_reduce_of_empty_array() {
    let (steps, _) = run("[].reduce((a, b) => a + b);");
    assert_eq!(last_error(&steps), "Error: Reduce of empty array with no initial value");
}

#[test]
fn test_string_methods() {
    let source = r#"
        const s = "hello";
        console.log(s.toUpperCase());
        console.log(s.length);
        console.log(s.split("").reverse().join(""));
        console.log("a-b-a".replace("a", "x"));
        console.log("7".padStart(3, "0"));
    "#;
    assert_eq!(output(source), vec!["HELLO", "5", "olleh", "x-b-a", "007"]);
}

#[test]
fn test_coercions() {
    let source = r#"
        let s = "a";
        s += "b";
        console.log(s);
        console.log(1 == "1", 1 === "1");
        console.log(`${1 + 1} ${typeof missing}`);
        console.log("5" * "2", "5" + 2);
    "#;
    assert_eq!(output(source), vec!["ab", "true false", "2 undefined", "10 52"]);
}

#[test]
fn test_objects_and_constructors() {
    let source = r#"
        function Point(x, y) {
            this.x = x;
            this.y = y;
        }
        const p = new Point(1, 2);
        console.log(p.x + p.y);
        const o = { a: 1 };
        o.b = 2;
        console.log(Object.keys(o));
    "#;
    let (steps, output) = run(source);
    assert_eq!(output, vec!["3", "[\"a\", \"b\"]"]);
    assert!(steps
        .iter()
        .any(|s| s.kind == StepKind::ObjectModify && s.description == "o.b = 2"));
}

#[test]
fn test_prototype_extension() {
    let source = r#"
        Array.prototype.sum = function() {
            return this.reduce((a, b) => a + b, 0);
        };
        console.log([1, 2, 3].sum());
    "#;
    assert_eq!(output(source), vec!["6"]);
}

#[test]
fn test_steps_are_isolated_snapshots() {
    let (steps, _) = run("const arr = [1];\narr.push(2);");

    let declared = steps
        .iter()
        .find(|s| s.kind == StepKind::Declaration)
        .expect("declaration step");
    let Some(RuntimeValue::Array { id }) = declared.scopes[0].get("arr").cloned() else {
        panic!("arr is not an array");
    };
    assert_eq!(declared.heap.array(id).map(Vec::len), Some(1));

    let modified = steps
        .iter()
        .find(|s| s.kind == StepKind::ArrayModify)
        .expect("push step");
    assert_eq!(modified.heap.array(id).map(Vec::len), Some(2));
}

#[test]
fn test_frames_track_params_and_locals() {
    let source = r#"
        function add(a, b) {
            const sum = a + b;
            return sum;
        }
        add(2, 3);
    "#;
    let (steps, _) = run(source);
    let ret = steps
        .iter()
        .find(|s| s.description == "Return 5")
        .expect("return step");
    let frame = ret.call_stack.last().expect("frame");
    assert_eq!(frame.function_name, "add");
    assert_eq!(frame.depth, 1);
    assert_eq!(frame.get_var("a"), Some(&RuntimeValue::number(2.0)));
    assert_eq!(frame.get_var("sum"), Some(&RuntimeValue::number(5.0)));
}

#[test]
fn test_trace_json_shape() {
    let execution = interpret("let a = [1, 2];\nconsole.log(a);").expect("Parsing failed");
    let json = serde_json::to_value(&execution).expect("serialize");

    assert_eq!(json["consoleOutput"], serde_json::json!(["[1, 2]"]));
    assert_eq!(json["steps"][0]["type"], "expression");
    assert_eq!(json["steps"][0]["id"], 1);
    let step = &json["steps"][1];
    assert_eq!(step["type"], "declaration");
    assert_eq!(step["description"], "Declare let a = [1, 2]");
    assert_eq!(step["line"], 1);
    assert!(step["callStack"].is_array());
    assert_eq!(step["scopes"][0]["type"], "global");
    assert_eq!(step["scopes"][0]["variables"]["a"]["type"], "array");
}

#[test]
fn test_identical_runs_are_identical() {
    let source = "const o = { list: [1, 2] };\no.list.push(3);\nconsole.log(o);";
    let first = serde_json::to_string(&interpret(source).expect("Parsing failed")).expect("serialize");
    let second = serde_json::to_string(&interpret(source).expect("Parsing failed")).expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn test_syntax_error_is_reported() {
    let err = interpret("let = ;").expect_err("should not parse");
    assert_eq!(err.line, 1);
}

#[test]
fn test_compound_assignment_operators() {
    let source = r#"
        let a = 10;
        a -= 3;
        a *= 4;
        a /= 2;
        a %= 5;
        a **= 2;
        console.log(a);
        let b = 12;
        b ^= 5;
        b &= 3;
        b |= 6;
        b <<= 2;
        b >>= 1;
        console.log(b);
        let c = -8;
        c >>>= 28;
        console.log(c);
        const o = { n: 2 };
        o.n **= 3;
        console.log(o.n);
    "#;
    let (steps, output) = run(source);
    assert_eq!(output, vec!["16", "14", "15", "8"]);
    assert!(steps
        .iter()
        .any(|s| s.kind == StepKind::Assignment && s.description == "c >>>= 15"));
}

#[test]
fn test_compound_assignment_on_reference_is_undefined() {
    assert_eq!(output("let x = [1];\nx += 1;\nconsole.log(x);"), vec!["undefined"]);
}

#[test]
fn test_missing_and_extra_arguments() {
    let source = "function f(a, b) { console.log(a, b); }\nf(1);\nf(1, 2, 3);";
    assert_eq!(output(source), vec!["1 undefined", "1 2"]);
}

#[test]
fn test_conditional_operator() {
    let source = r#"
        const n = 5;
        console.log(n > 3 ? "big" : "small");
        console.log(n % 2 === 0 ? "even" : n > 4 ? "odd and large" : "odd");
        const pick = n < 0 ? -1 : 1;
        console.log(pick);
    "#;
    assert_eq!(output(source), vec!["big", "odd and large", "1"]);
}

#[test]
fn test_while_body_runs_in_one_loop_scope() {
    let source = r#"
        let i = 0;
        while (i < 2) {
            let sq = i * i;
            i++;
        }
        do {
            let once = true;
        } while (false);
        console.log(typeof sq, typeof once);
    "#;
    let (steps, output) = run(source);
    assert_eq!(output, vec!["undefined undefined"]);

    let declared = steps
        .iter()
        .find(|s| s.description == "Declare let sq = 1")
        .expect("second pass declaration");
    let names: Vec<&str> = declared.scopes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names.last(), Some(&"while-loop"));
    assert_eq!(names.len(), 2);

    let once = steps
        .iter()
        .find(|s| s.description == "Declare let once = true")
        .expect("do-while declaration");
    assert_eq!(once.scopes.last().map(|s| s.name.as_str()), Some("do-while-loop"));
}

#[test]
fn test_strings_count_utf16_units() {
    let source = r#"
        const face = "😀";
        console.log(face.length, "héllo".length);
        console.log("😀a".charAt(2), "a😀b".indexOf("b"));
        console.log("a😀".slice(1) === face, face.split("").length);
    "#;
    assert_eq!(output(source), vec!["2 5", "a 3", "true 2"]);
}

#[test]
fn test_invalid_array_length_is_a_range_error() {
    let (steps, _) = run("const a = [];\na.length = -1;");
    assert_eq!(last_error(&steps), "Error: Uncaught RangeError: Invalid array length");

    let (steps, _) = run("const a = [];\na[4294967295] = 1;");
    assert_eq!(last_error(&steps), "Error: Uncaught RangeError: Invalid array length");

    let (steps, _) = run("const a = new Array(1e15);");
    assert_eq!(last_error(&steps), "Error: Uncaught RangeError: Invalid array length");
}

#[test]
fn test_array_growth_is_bounded() {
    let (steps, _) = run("const a = [];\na[4294967294] = 1;");
    assert_eq!(last_error(&steps), "Error: Maximum array length (10000) exceeded");

    let (steps, _) = run("const a = [];\na.length = 20000;");
    assert_eq!(last_error(&steps), "Error: Maximum array length (10000) exceeded");

    let (steps, _) = run("const a = new Array(50000);");
    assert_eq!(last_error(&steps), "Error: Maximum array length (10000) exceeded");
    assert_eq!(steps.last().map(|s| s.line), Some(1));

    let limits = InterpreterLimits {
        max_array_length: 3,
        ..InterpreterLimits::default()
    };
    let program = parse_code("const a = [1, 2, 3];\na.push(4);").expect("Parsing failed");
    let steps = Interpreter::with_limits(limits).execute(&program);
    assert_eq!(last_error(&steps), "Error: Maximum array length (3) exceeded");
    assert_eq!(steps.last().map(|s| s.line), Some(2));
}

#[test]
fn test_string_growth_is_bounded() {
    let (steps, _) = run("const s = 'ab'.repeat(1e12);");
    assert_eq!(last_error(&steps), "Error: Maximum string length (100000) exceeded");

    let (steps, _) = run("const s = 'x'.padStart(1e12, '-');");
    assert_eq!(last_error(&steps), "Error: Maximum string length (100000) exceeded");

    let (steps, _) = run("const s = 'x'.padEnd(1e12);");
    assert_eq!(last_error(&steps), "Error: Maximum string length (100000) exceeded");

    let (steps, _) = run("let s = 'x';\nwhile (true) {\n  s += s;\n}");
    assert_eq!(last_error(&steps), "Error: Maximum string length (100000) exceeded");
    assert_eq!(steps.last().map(|s| s.line), Some(3));

    let (steps, _) = run("const parts = new Array(5000).fill('abcdefghijklmnopqrstuvwxyz');\nparts.join('-');");
    assert_eq!(last_error(&steps), "Error: Maximum string length (100000) exceeded");
}

#[test]
fn test_deep_nesting_is_a_syntax_error() {
    let source = format!("let x = {}1{};", "(".repeat(500), ")".repeat(500));
    let err = interpret(&source).expect_err("should not parse");
    assert_eq!(err.message, "Nesting too deep");
}
