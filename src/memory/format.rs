//! Display formatting of runtime values
//!
//! Two renderings are provided:
//! - [`format_value`]: the inspector form used in step descriptions and
//!   `console.log` output (strings quoted, arrays and objects expanded)
//! - [`to_js_string`]: the `String(value)` coercion used by concatenation,
//!   template literals, and `join`

use super::heap::Heap;
use super::value::{number_to_string, HeapId, Primitive, RuntimeValue};

/// Compact arrays show this many elements before `...`
const COMPACT_ARRAY_ITEMS: usize = 3;
/// Compact objects show this many properties before `...`
const COMPACT_OBJECT_ITEMS: usize = 2;

/// Format a runtime value for display.
///
/// Nested values are always rendered compact. A reference that points back
/// into the value being printed renders as `[Circular]`.
pub fn format_value(value: &RuntimeValue, heap: &Heap, compact: bool) -> String {
    let mut path = Vec::new();
    format_inner(value, heap, compact, &mut path)
}

fn format_inner(
    value: &RuntimeValue,
    heap: &Heap,
    compact: bool,
    path: &mut Vec<HeapId>,
) -> String {
    match value {
        RuntimeValue::Primitive(Primitive::String(s)) => format!("\"{}\"", s),
        RuntimeValue::Primitive(Primitive::Number(n)) => number_to_string(*n),
        RuntimeValue::Primitive(Primitive::Boolean(b)) => b.to_string(),
        RuntimeValue::Null => "null".to_string(),
        RuntimeValue::Undefined => "undefined".to_string(),
        RuntimeValue::Function(f) => format!("ƒ {}()", f.name),
        RuntimeValue::Array { id } => {
            if path.contains(id) {
                return "[Circular]".to_string();
            }
            let Some(elements) = heap.array(*id) else {
                return "<unknown>".to_string();
            };
            path.push(*id);
            let truncated = compact && elements.len() > COMPACT_ARRAY_ITEMS;
            let shown = if truncated { COMPACT_ARRAY_ITEMS } else { elements.len() };
            let parts: Vec<String> = elements[..shown]
                .iter()
                .map(|e| format_inner(e, heap, true, path))
                .collect();
            path.pop();

            if truncated {
                format!("[{}, ...]", parts.join(", "))
            } else {
                format!("[{}]", parts.join(", "))
            }
        }
        RuntimeValue::Object { id } => {
            if path.contains(id) {
                return "[Circular]".to_string();
            }
            let Some(properties) = heap.object(*id) else {
                return "<unknown>".to_string();
            };
            path.push(*id);
            let truncated = compact && properties.len() > COMPACT_OBJECT_ITEMS;
            let parts: Vec<String> = properties
                .iter()
                .take(if truncated { COMPACT_OBJECT_ITEMS } else { properties.len() })
                .map(|(k, v)| format!("{}: {}", k, format_inner(v, heap, true, path)))
                .collect();
            path.pop();

            if truncated {
                format!("{{{}, ...}}", parts.join(", "))
            } else {
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

/// JS `String(value)` coercion
pub fn to_js_string(value: &RuntimeValue, heap: &Heap) -> String {
    let mut path = Vec::new();
    js_string_inner(value, heap, &mut path)
}

fn js_string_inner(value: &RuntimeValue, heap: &Heap, path: &mut Vec<HeapId>) -> String {
    match value {
        RuntimeValue::Primitive(Primitive::String(s)) => s.clone(),
        RuntimeValue::Primitive(Primitive::Number(n)) => number_to_string(*n),
        RuntimeValue::Primitive(Primitive::Boolean(b)) => b.to_string(),
        RuntimeValue::Null => "null".to_string(),
        RuntimeValue::Undefined => "undefined".to_string(),
        RuntimeValue::Function(f) => format!("function {}() {{ ... }}", f.name),
        RuntimeValue::Object { .. } => "[object Object]".to_string(),
        RuntimeValue::Array { id } => {
            // Cycles and holes render as empty, as Array.prototype.join does
            if path.contains(id) {
                return String::new();
            }
            let Some(elements) = heap.array(*id) else {
                return String::new();
            };
            path.push(*id);
            let joined = elements
                .iter()
                .map(|e| {
                    if e.is_nullish() {
                        String::new()
                    } else {
                        js_string_inner(e, heap, path)
                    }
                })
                .collect::<Vec<_>>()
                .join(",");
            path.pop();
            joined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn numbers(heap: &mut Heap, values: &[f64]) -> RuntimeValue {
        heap.alloc_array(values.iter().map(|n| RuntimeValue::number(*n)).collect())
    }

    #[test]
    fn test_format_primitives() {
        let heap = Heap::new();
        assert_eq!(format_value(&RuntimeValue::string("hi"), &heap, false), "\"hi\"");
        assert_eq!(format_value(&RuntimeValue::number(2.5), &heap, false), "2.5");
        assert_eq!(format_value(&RuntimeValue::boolean(true), &heap, false), "true");
        assert_eq!(format_value(&RuntimeValue::Undefined, &heap, false), "undefined");
    }

    #[test]
    fn test_format_array_compact_truncation() {
        let mut heap = Heap::new();
        let arr = numbers(&mut heap, &[1.0, 2.0, 3.0, 4.0]);

        assert_eq!(format_value(&arr, &heap, false), "[1, 2, 3, 4]");
        assert_eq!(format_value(&arr, &heap, true), "[1, 2, 3, ...]");
    }

    #[test]
    fn test_format_object_compact_truncation() {
        let mut heap = Heap::new();
        let mut props = IndexMap::new();
        props.insert("a".to_string(), RuntimeValue::number(1.0));
        props.insert("b".to_string(), RuntimeValue::string("x"));
        props.insert("c".to_string(), RuntimeValue::Null);
        let obj = heap.alloc_object(props);

        assert_eq!(format_value(&obj, &heap, false), "{a: 1, b: \"x\", c: null}");
        assert_eq!(format_value(&obj, &heap, true), "{a: 1, b: \"x\", ...}");
    }

    #[test]
    fn test_nested_values_render_compact() {
        let mut heap = Heap::new();
        let inner = numbers(&mut heap, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let outer = heap.alloc_array(vec![inner]);

        assert_eq!(format_value(&outer, &heap, false), "[[1, 2, 3, ...]]");
    }

    #[test]
    fn test_format_circular_reference() {
        let mut heap = Heap::new();
        let arr = heap.alloc_array(vec![]);
        let id = arr.heap_id().unwrap();
        heap.array_mut(id).unwrap().push(arr.clone());

        assert_eq!(format_value(&arr, &heap, false), "[[Circular]]");
    }

    #[test]
    fn test_js_string_coercion() {
        let mut heap = Heap::new();
        let arr = heap.alloc_array(vec![
            RuntimeValue::number(1.0),
            RuntimeValue::Null,
            RuntimeValue::string("a"),
        ]);
        let obj = heap.alloc_object(IndexMap::new());

        assert_eq!(to_js_string(&arr, &heap), "1,,a");
        assert_eq!(to_js_string(&obj, &heap), "[object Object]");
        assert_eq!(to_js_string(&RuntimeValue::number(f64::INFINITY), &heap), "Infinity");
    }
}
