//! Runtime value representation
//!
//! This module defines the [`RuntimeValue`] enum, the closed set of values a
//! script can produce:
//!
//! - [`RuntimeValue::Primitive`]: number, string, or boolean
//! - [`RuntimeValue::Null`] and [`RuntimeValue::Undefined`]
//! - [`RuntimeValue::Array`] / [`RuntimeValue::Object`]: references into the
//!   per-run [`Heap`](super::heap::Heap), identified by a [`HeapId`]
//! - [`RuntimeValue::Function`]: a user function with its captured scope chain,
//!   or a native builtin
//!
//! Reference values compare by heap id, never by contents.

use super::scope::ScopeId;
use crate::parser::ast::FunctionNode;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Identity of an array or object in the heap, assigned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HeapId(pub u64);

impl HeapId {
    /// Display address such as `0x002a`
    pub fn address(&self) -> String {
        format!("0x{:04x}", self.0)
    }
}

impl fmt::Display for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primitive payload tagged with its data type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dataType", content = "value", rename_all = "lowercase")]
pub enum Primitive {
    Number(f64),
    String(String),
    Boolean(bool),
}

/// A callable value
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionValue {
    pub name: String,
    pub params: Vec<String>,
    /// Scope chain captured at creation, outermost first
    pub closure: Vec<ScopeId>,
    #[serde(skip)]
    pub node: Option<Arc<FunctionNode>>,
}

impl FunctionValue {
    /// A builtin such as `Math.floor`, dispatched by name
    pub fn native(name: &str) -> Self {
        FunctionValue {
            name: name.to_string(),
            params: Vec::new(),
            closure: Vec::new(),
            node: None,
        }
    }

    pub fn is_native(&self) -> bool {
        self.node.is_none()
    }
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuntimeValue {
    Primitive(Primitive),
    Null,
    #[default]
    Undefined,
    Array { id: HeapId },
    Object { id: HeapId },
    Function(FunctionValue),
}

impl PartialEq for RuntimeValue {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

impl RuntimeValue {
    pub fn number(n: f64) -> Self {
        RuntimeValue::Primitive(Primitive::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        RuntimeValue::Primitive(Primitive::String(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        RuntimeValue::Primitive(Primitive::Boolean(b))
    }

    /// Get the number, returns None if not a number primitive
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuntimeValue::Primitive(Primitive::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Get the string, returns None if not a string primitive
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RuntimeValue::Primitive(Primitive::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        self.as_str().is_some()
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, RuntimeValue::Null | RuntimeValue::Undefined)
    }

    /// Heap id of an array or object
    pub fn heap_id(&self) -> Option<HeapId> {
        match self {
            RuntimeValue::Array { id } | RuntimeValue::Object { id } => Some(*id),
            _ => None,
        }
    }

    /// JS truthiness: `0`, `NaN`, `""`, `false`, `null`, `undefined` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            RuntimeValue::Primitive(Primitive::Number(n)) => *n != 0.0 && !n.is_nan(),
            RuntimeValue::Primitive(Primitive::String(s)) => !s.is_empty(),
            RuntimeValue::Primitive(Primitive::Boolean(b)) => *b,
            RuntimeValue::Null | RuntimeValue::Undefined => false,
            RuntimeValue::Array { .. }
            | RuntimeValue::Object { .. }
            | RuntimeValue::Function(_) => true,
        }
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            RuntimeValue::Primitive(Primitive::Number(_)) => "number",
            RuntimeValue::Primitive(Primitive::String(_)) => "string",
            RuntimeValue::Primitive(Primitive::Boolean(_)) => "boolean",
            RuntimeValue::Undefined => "undefined",
            RuntimeValue::Function(_) => "function",
            RuntimeValue::Null | RuntimeValue::Array { .. } | RuntimeValue::Object { .. } => {
                "object"
            }
        }
    }

    /// Numeric coercion for primitives, null and undefined.
    /// Reference values coerce to NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            RuntimeValue::Primitive(Primitive::Number(n)) => *n,
            RuntimeValue::Primitive(Primitive::String(s)) => string_to_number(s),
            RuntimeValue::Primitive(Primitive::Boolean(b)) => f64::from(u8::from(*b)),
            RuntimeValue::Null => 0.0,
            RuntimeValue::Undefined
            | RuntimeValue::Array { .. }
            | RuntimeValue::Object { .. }
            | RuntimeValue::Function(_) => f64::NAN,
        }
    }
}

/// Variant-typed equality: primitives by value, arrays/objects by heap id,
/// functions by name
pub fn values_equal(a: &RuntimeValue, b: &RuntimeValue) -> bool {
    match (a, b) {
        (RuntimeValue::Primitive(x), RuntimeValue::Primitive(y)) => x == y,
        (RuntimeValue::Null, RuntimeValue::Null) => true,
        (RuntimeValue::Undefined, RuntimeValue::Undefined) => true,
        (RuntimeValue::Array { id: x }, RuntimeValue::Array { id: y }) => x == y,
        (RuntimeValue::Object { id: x }, RuntimeValue::Object { id: y }) => x == y,
        (RuntimeValue::Function(f), RuntimeValue::Function(g)) => f.name == g.name,
        _ => false,
    }
}

/// JS `Number(string)` conversion
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust accepts "inf"/"nan" spellings that JS does not
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// JS `String(number)` conversion
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }

    format!("{}", n)
}

/// ToInt32 conversion used by the bitwise operators
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ToUint32 conversion used by `>>>`
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!RuntimeValue::number(0.0).is_truthy());
        assert!(!RuntimeValue::number(f64::NAN).is_truthy());
        assert!(!RuntimeValue::string("").is_truthy());
        assert!(!RuntimeValue::Null.is_truthy());
        assert!(!RuntimeValue::Undefined.is_truthy());
        assert!(RuntimeValue::string("0").is_truthy());
        assert!(RuntimeValue::Array { id: HeapId(1) }.is_truthy());
        assert!(RuntimeValue::Function(FunctionValue::native("f")).is_truthy());
    }

    #[test]
    fn test_equality_by_identity() {
        let a = RuntimeValue::Array { id: HeapId(1) };
        let b = RuntimeValue::Array { id: HeapId(2) };
        assert!(values_equal(&a, &a.clone()));
        assert!(!values_equal(&a, &b));
        assert!(!values_equal(&a, &RuntimeValue::Object { id: HeapId(1) }));
        assert!(values_equal(&RuntimeValue::number(2.0), &RuntimeValue::number(2.0)));
        assert!(!values_equal(&RuntimeValue::number(2.0), &RuntimeValue::string("2")));
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(5.0), "5");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(3.14), "3.14");
        assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(123456789.0), "123456789");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("  42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x10"), 16.0);
        assert!(string_to_number("abc").is_nan());
        assert!(string_to_number("inf").is_nan());
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_int32_conversion() {
        assert_eq!(to_int32(4_294_967_295.0), -1);
        assert_eq!(to_int32(-1.5), -1);
        assert_eq!(to_uint32(-1.0), 4_294_967_295);
        assert_eq!(to_int32(f64::NAN), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(RuntimeValue::number(1.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "primitive", "dataType": "number", "value": 1.0})
        );
        let json = serde_json::to_value(RuntimeValue::Array { id: HeapId(3) }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "array", "id": 3}));
    }
}
