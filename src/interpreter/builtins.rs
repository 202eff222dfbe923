// Built-in functions: console, Math, Array/Object statics and global conversions

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::format::to_js_string;
use crate::interpreter::ops::to_numeric;
use crate::memory::value::{FunctionValue, RuntimeValue};
use crate::parser::ast::SourceLocation;
use crate::snapshot::StepKind;

/// Natives reachable as `namespace.member`
const NAMESPACED: &[&str] = &[
    "console.log",
    "Math.floor",
    "Math.ceil",
    "Math.abs",
    "Math.min",
    "Math.max",
    "Math.round",
    "Math.sqrt",
    "Math.pow",
    "Math.trunc",
    "Math.sign",
    "Array.isArray",
    "Object.keys",
    "Object.values",
    "Object.entries",
];

/// Natives reachable as bare global names
const GLOBAL_FUNCTIONS: &[&str] = &["String", "Number", "Boolean", "parseInt", "parseFloat", "isNaN"];

/// Value of `namespace.member` for the builtin namespaces
pub(crate) fn namespace_member(namespace: &str, member: &str) -> Option<RuntimeValue> {
    match (namespace, member) {
        ("Math", "PI") => return Some(RuntimeValue::number(std::f64::consts::PI)),
        ("Math", "E") => return Some(RuntimeValue::number(std::f64::consts::E)),
        ("Number", "MAX_SAFE_INTEGER") => return Some(RuntimeValue::number(9_007_199_254_740_991.0)),
        _ => {}
    }
    let name = format!("{}.{}", namespace, member);
    NAMESPACED
        .contains(&name.as_str())
        .then(|| RuntimeValue::Function(FunctionValue::native(&name)))
}

/// Value of an unbound global name
pub(crate) fn global_value(name: &str) -> Option<RuntimeValue> {
    match name {
        "undefined" => Some(RuntimeValue::Undefined),
        "NaN" => Some(RuntimeValue::number(f64::NAN)),
        "Infinity" => Some(RuntimeValue::number(f64::INFINITY)),
        _ if GLOBAL_FUNCTIONS.contains(&name) => {
            Some(RuntimeValue::Function(FunctionValue::native(name)))
        }
        _ => None,
    }
}

impl Interpreter {
    /// Call a native function by name
    pub(crate) fn call_native(
        &mut self,
        name: &str,
        args: Vec<RuntimeValue>,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        let first = args.first().cloned().unwrap_or_default();

        match name {
            "console.log" => {
                // Top-level strings print raw, everything else as inspected
                let output = args
                    .iter()
                    .map(|a| match a.as_str() {
                        Some(s) => s.to_string(),
                        None => self.fmt(a),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                self.console.log(output, location);
                self.record_step(
                    location,
                    StepKind::Call,
                    format!("console.log({})", self.fmt_list(&args)),
                )?;
                Ok(RuntimeValue::Undefined)
            }

            "Array.isArray" => {
                let result = RuntimeValue::boolean(matches!(first, RuntimeValue::Array { .. }));
                self.record_step(
                    location,
                    StepKind::Expression,
                    format!("Array.isArray() → {}", self.fmt(&result)),
                )?;
                Ok(result)
            }

            "Object.keys" | "Object.values" | "Object.entries" => {
                let entries = self.own_entries(&first);
                let items: Vec<RuntimeValue> = match name {
                    "Object.keys" => entries.into_iter().map(|(k, _)| RuntimeValue::string(k)).collect(),
                    "Object.values" => entries.into_iter().map(|(_, v)| v).collect(),
                    _ => entries
                        .into_iter()
                        .map(|(k, v)| self.heap.alloc_array(vec![RuntimeValue::string(k), v]))
                        .collect(),
                };
                let result = self.heap.alloc_array(items);
                self.record_step(
                    location,
                    StepKind::Expression,
                    format!("{}() → {}", name, self.fmt(&result)),
                )?;
                Ok(result)
            }

            "String" => Ok(RuntimeValue::string(match args.first() {
                Some(v) => to_js_string(v, &self.heap),
                None => String::new(),
            })),
            "Number" => Ok(RuntimeValue::number(match args.first() {
                Some(v) => self.to_number(v),
                None => 0.0,
            })),
            "Boolean" => Ok(RuntimeValue::boolean(first.is_truthy())),
            "isNaN" => Ok(RuntimeValue::boolean(self.to_number(&first).is_nan())),
            "parseInt" => {
                let text = to_js_string(&first, &self.heap);
                let radix = args.get(1).map(|r| self.to_number(r)).unwrap_or(0.0);
                Ok(RuntimeValue::number(parse_int(&text, radix as u32)))
            }
            "parseFloat" => {
                let text = to_js_string(&first, &self.heap);
                Ok(RuntimeValue::number(parse_float(&text)))
            }

            _ => match name.strip_prefix("Math.") {
                Some(function) => {
                    let nums: Vec<f64> = args.iter().map(|a| self.to_number(a)).collect();
                    Ok(RuntimeValue::number(math(function, &nums)))
                }
                None => Err(RuntimeError::NotAFunction {
                    callee: name.to_string(),
                    location,
                }),
            },
        }
    }

    /// Numeric coercion, including arrays (`[5]` → 5) via their string form
    pub(crate) fn to_number(&self, value: &RuntimeValue) -> f64 {
        to_numeric(value, &self.heap)
    }

    /// Key/value pairs of an object, or index/element pairs of an array
    fn own_entries(&self, value: &RuntimeValue) -> Vec<(String, RuntimeValue)> {
        match value {
            RuntimeValue::Object { id } => self
                .heap
                .object(*id)
                .map(|props| props.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
            RuntimeValue::Array { id } => self
                .heap
                .array(*id)
                .map(|elements| {
                    elements
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (i.to_string(), v.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            RuntimeValue::Primitive(_) if value.is_string() => value
                .as_str()
                .unwrap_or_default()
                .chars()
                .enumerate()
                .map(|(i, c)| (i.to_string(), RuntimeValue::string(c.to_string())))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// `Math.*` over already-coerced arguments
fn math(function: &str, nums: &[f64]) -> f64 {
    let x = nums.first().copied().unwrap_or(f64::NAN);
    match function {
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "abs" => x.abs(),
        "trunc" => x.trunc(),
        "sqrt" => x.sqrt(),
        // JS rounds halves towards +Infinity
        "round" => (x + 0.5).floor(),
        "sign" => {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "pow" => {
            let y = nums.get(1).copied().unwrap_or(f64::NAN);
            if y.is_nan() {
                f64::NAN
            } else {
                x.powf(y)
            }
        }
        "min" => nums.iter().fold(f64::INFINITY, |acc, n| {
            if acc.is_nan() || n.is_nan() {
                f64::NAN
            } else {
                acc.min(*n)
            }
        }),
        "max" => nums.iter().fold(f64::NEG_INFINITY, |acc, n| {
            if acc.is_nan() || n.is_nan() {
                f64::NAN
            } else {
                acc.max(*n)
            }
        }),
        _ => f64::NAN,
    }
}

/// `parseInt`: leading integer prefix in the given radix (0 means auto)
fn parse_int(text: &str, radix: u32) -> f64 {
    let mut s = text.trim_start();
    let negative = s.starts_with('-');
    if negative || s.starts_with('+') {
        s = &s[1..];
    }

    let mut radix = radix;
    if (radix == 0 || radix == 16) && (s.starts_with("0x") || s.starts_with("0X")) {
        s = &s[2..];
        radix = 16;
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }

    let digits: Vec<u32> = s.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let value = digits
        .iter()
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(*d));
    if negative {
        -value
    } else {
        value
    }
}

/// `parseFloat`: longest numeric prefix
fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    if let Some(rest) = s.strip_prefix('-') {
        if rest.starts_with("Infinity") {
            return f64::NEG_INFINITY;
        }
    }
    if s.trim_start_matches('+').starts_with("Infinity") {
        return f64::INFINITY;
    }

    // Try successively shorter prefixes made of number characters
    let candidate: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        .collect();
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::number_to_string;

    #[test]
    fn test_math_functions() {
        assert_eq!(math("floor", &[2.7]), 2.0);
        assert_eq!(math("round", &[2.5]), 3.0);
        assert_eq!(math("round", &[-2.5]), -2.0);
        assert_eq!(math("max", &[1.0, 5.0, 3.0]), 5.0);
        assert_eq!(math("max", &[]), f64::NEG_INFINITY);
        assert!(math("min", &[1.0, f64::NAN]).is_nan());
        assert!(math("pow", &[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42px", 0), 42.0);
        assert_eq!(parse_int("  -17", 10), -17.0);
        assert_eq!(parse_int("0x1f", 0), 31.0);
        assert_eq!(parse_int("101", 2), 5.0);
        assert!(parse_int("abc", 10).is_nan());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("3.14abc"), 3.14);
        assert_eq!(parse_float("1e3"), 1000.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float("x1").is_nan());
    }

    #[test]
    fn test_namespace_lookup() {
        assert!(namespace_member("Math", "floor").is_some());
        assert!(namespace_member("Math", "random").is_none());
        assert_eq!(
            namespace_member("Math", "PI").and_then(|v| v.as_number()),
            Some(std::f64::consts::PI)
        );
        assert!(global_value("parseInt").is_some());
        assert!(global_value("nope").is_none());
        assert_eq!(number_to_string(math("sqrt", &[16.0])), "4");
    }
}
