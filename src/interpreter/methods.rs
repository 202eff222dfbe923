// Built-in array and string methods

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::format::to_js_string;
use crate::memory::value::{number_to_string, values_equal, HeapId, RuntimeValue};
use crate::parser::ast::SourceLocation;
use crate::snapshot::StepKind;

impl Interpreter {
    /// Dispatch a built-in array method. `Ok(None)` when `method` is not one.
    pub(crate) fn call_array_method(
        &mut self,
        id: HeapId,
        method: &str,
        args: &[RuntimeValue],
        location: SourceLocation,
    ) -> Result<Option<RuntimeValue>, RuntimeError> {
        let this = RuntimeValue::Array { id };
        let len = self.elements(id).len();

        let result = match method {
            "push" => {
                self.check_array_length(len + args.len(), location)?;
                let new_len = self.with_elements(id, |e| {
                    e.extend(args.iter().cloned());
                    e.len()
                });
                self.record_step(
                    location,
                    StepKind::ArrayModify,
                    format!("Array.push({}) → length {}", self.fmt_list(args), new_len),
                )?;
                RuntimeValue::number(new_len as f64)
            }

            "pop" | "shift" => {
                let removed = self
                    .with_elements(id, |e| match method {
                        "pop" => e.pop(),
                        _ if e.is_empty() => None,
                        _ => Some(e.remove(0)),
                    })
                    .unwrap_or_default();
                self.record_step(
                    location,
                    StepKind::ArrayModify,
                    format!("Array.{}() → {}", method, self.fmt(&removed)),
                )?;
                removed
            }

            "unshift" => {
                self.check_array_length(len + args.len(), location)?;
                let new_len = self.with_elements(id, |e| {
                    e.splice(0..0, args.iter().cloned());
                    e.len()
                });
                self.record_step(
                    location,
                    StepKind::ArrayModify,
                    format!("Array.unshift({}) → length {}", self.fmt_list(args), new_len),
                )?;
                RuntimeValue::number(new_len as f64)
            }

            "indexOf" | "includes" => {
                let needle = args.first().cloned().unwrap_or_default();
                let from = self.index_arg(args.get(1), len, 0);
                let position = self.elements(id)[from..].iter().position(|el| {
                    values_equal(el, &needle) || (method == "includes" && both_nan(el, &needle))
                });
                let result = match method {
                    "indexOf" => RuntimeValue::number(position.map_or(-1.0, |p| (from + p) as f64)),
                    _ => RuntimeValue::boolean(position.is_some()),
                };
                self.record_step(
                    location,
                    StepKind::ArrayAccess,
                    format!("Array.{}({}) → {}", method, self.fmt(&needle), self.fmt(&result)),
                )?;
                result
            }

            "slice" => {
                let start = self.index_arg(args.first(), len, 0);
                let end = self.index_arg(args.get(1), len, len).max(start);
                let sliced = self.elements(id)[start..end].to_vec();
                let result = self.heap.alloc_array(sliced);
                self.record_step(
                    location,
                    StepKind::ArrayAccess,
                    format!("Array.slice({}, {}) → {}", start, end, self.fmt(&result)),
                )?;
                result
            }

            "splice" => {
                let start = self.index_arg(args.first(), len, 0);
                let delete_count = match args.get(1) {
                    Some(count) => clamp_count(self.to_number(count), len - start),
                    None => len - start,
                };
                let inserted = args.iter().skip(2).cloned();
                self.check_array_length(len - delete_count + inserted.len(), location)?;
                let removed: Vec<RuntimeValue> =
                    self.with_elements(id, |e| e.splice(start..start + delete_count, inserted).collect());
                let result = self.heap.alloc_array(removed);
                self.record_step(
                    location,
                    StepKind::ArrayModify,
                    format!("Array.splice({}, {}) → {}", start, delete_count, self.fmt(&result)),
                )?;
                result
            }

            "join" => {
                let separator = match args.first() {
                    Some(sep) if *sep != RuntimeValue::Undefined => to_js_string(sep, &self.heap),
                    _ => ",".to_string(),
                };
                let separator_units = separator.encode_utf16().count();
                let mut joined = String::new();
                let mut units = 0;
                for (i, el) in self.elements(id).iter().enumerate() {
                    let part = match el {
                        RuntimeValue::Null | RuntimeValue::Undefined => String::new(),
                        other => to_js_string(other, &self.heap),
                    };
                    if i > 0 {
                        units += separator_units;
                        joined.push_str(&separator);
                    }
                    units += part.encode_utf16().count();
                    self.check_string_length(units, location)?;
                    joined.push_str(&part);
                }
                self.record_step(
                    location,
                    StepKind::Expression,
                    format!("Array.join(\"{}\") → \"{}\"", separator, joined),
                )?;
                RuntimeValue::string(joined)
            }

            "reverse" => {
                self.with_elements(id, |e| e.reverse());
                self.record_step(
                    location,
                    StepKind::ArrayModify,
                    format!("Array.reverse() → {}", self.fmt(&this)),
                )?;
                this
            }

            "concat" => {
                let total = args.iter().fold(len, |total, arg| match arg {
                    RuntimeValue::Array { id } => total + self.elements(*id).len(),
                    _ => total + 1,
                });
                self.check_array_length(total, location)?;
                let mut combined = self.elements(id).to_vec();
                for arg in args {
                    match arg {
                        RuntimeValue::Array { id } => combined.extend(self.elements(*id).iter().cloned()),
                        other => combined.push(other.clone()),
                    }
                }
                let result = self.heap.alloc_array(combined);
                self.record_step(
                    location,
                    StepKind::Expression,
                    format!("Array.concat() → {}", self.fmt(&result)),
                )?;
                result
            }

            "fill" => {
                let value = args.first().cloned().unwrap_or_default();
                let start = self.index_arg(args.get(1), len, 0);
                let end = self.index_arg(args.get(2), len, len).max(start);
                self.with_elements(id, |e| {
                    for slot in &mut e[start..end] {
                        *slot = value.clone();
                    }
                });
                self.record_step(
                    location,
                    StepKind::ArrayModify,
                    format!("Array.fill({}) → {}", self.fmt(&value), self.fmt(&this)),
                )?;
                this
            }

            "forEach" | "map" | "filter" | "find" | "findIndex" | "some" | "every" => {
                self.iterate_with_callback(id, method, args, location)?
            }

            "reduce" => {
                let callback = self.require_callback(method, args, location)?;
                let (mut accumulator, start) = match args.get(1) {
                    Some(initial) => (initial.clone(), 0),
                    None => match self.elements(id).first() {
                        Some(first) => (first.clone(), 1),
                        None => return Err(RuntimeError::EmptyReduce { location }),
                    },
                };
                self.record_step(
                    location,
                    StepKind::Expression,
                    format!("Array.reduce() - reducing {} elements", len),
                )?;
                for i in start..len {
                    let Some(element) = self.element(id, i) else { break };
                    accumulator = self.invoke_callback(
                        &callback,
                        vec![accumulator, element, RuntimeValue::number(i as f64), this.clone()],
                        location,
                    )?;
                }
                self.record_step(
                    location,
                    StepKind::Expression,
                    format!("Array.reduce() → {}", self.fmt(&accumulator)),
                )?;
                accumulator
            }

            _ => return Ok(None),
        };

        Ok(Some(result))
    }

    /// The callback-driven methods that visit elements in order and may stop early
    fn iterate_with_callback(
        &mut self,
        id: HeapId,
        method: &str,
        args: &[RuntimeValue],
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        let callback = self.require_callback(method, args, location)?;
        let this = RuntimeValue::Array { id };
        let len = self.elements(id).len();

        let verb = match method {
            "forEach" => "iterating",
            "map" => "transforming",
            "filter" => "filtering",
            "find" | "findIndex" => "searching",
            _ => "testing",
        };
        self.record_step(
            location,
            StepKind::Expression,
            format!("Array.{}() - {} {} elements", method, verb, len),
        )?;

        let mut collected = Vec::new();
        let mut hit: Option<(usize, RuntimeValue)> = None;
        for i in 0..len {
            // Elements are read live: the callback may mutate the array
            let Some(element) = self.element(id, i) else { break };
            let outcome = self.invoke_callback(
                &callback,
                vec![element.clone(), RuntimeValue::number(i as f64), this.clone()],
                location,
            )?;
            match method {
                "map" => collected.push(outcome),
                "filter" if outcome.is_truthy() => collected.push(element),
                "find" | "findIndex" | "some" if outcome.is_truthy() => {
                    hit = Some((i, element));
                    break;
                }
                "every" if !outcome.is_truthy() => {
                    hit = Some((i, element));
                    break;
                }
                _ => {}
            }
        }

        let result = match method {
            "forEach" => return Ok(RuntimeValue::Undefined),
            "map" | "filter" => self.heap.alloc_array(collected),
            "find" => hit.map(|(_, el)| el).unwrap_or_default(),
            "findIndex" => RuntimeValue::number(hit.map_or(-1.0, |(i, _)| i as f64)),
            "some" => RuntimeValue::boolean(hit.is_some()),
            _ => RuntimeValue::boolean(hit.is_none()),
        };
        self.record_step(
            location,
            StepKind::Expression,
            format!("Array.{}() → {}", method, self.fmt(&result)),
        )?;
        Ok(result)
    }

    fn require_callback(
        &self,
        method: &str,
        args: &[RuntimeValue],
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        match args.first() {
            Some(callback @ RuntimeValue::Function(_)) => Ok(callback.clone()),
            _ => Err(RuntimeError::CallbackRequired {
                method: method.to_string(),
                location,
            }),
        }
    }

    fn elements(&self, id: HeapId) -> &[RuntimeValue] {
        self.heap.array(id).map(Vec::as_slice).unwrap_or_default()
    }

    fn element(&self, id: HeapId, index: usize) -> Option<RuntimeValue> {
        self.elements(id).get(index).cloned()
    }

    fn with_elements<T: Default>(
        &mut self,
        id: HeapId,
        f: impl FnOnce(&mut Vec<RuntimeValue>) -> T,
    ) -> T {
        self.heap.array_mut(id).map(f).unwrap_or_default()
    }

    /// A relative index argument resolved against `len`
    fn index_arg(&self, arg: Option<&RuntimeValue>, len: usize, default: usize) -> usize {
        match arg {
            None | Some(RuntimeValue::Undefined) => default,
            Some(value) => relative_index(self.to_number(value), len),
        }
    }

    /// Dispatch a built-in string method. `Ok(None)` when `method` is not one.
    ///
    /// Positions and lengths count UTF-16 code units. A slice that splits a
    /// surrogate pair renders the lone half as U+FFFD.
    pub(crate) fn call_string_method(
        &mut self,
        s: &str,
        method: &str,
        args: &[RuntimeValue],
        location: SourceLocation,
    ) -> Result<Option<RuntimeValue>, RuntimeError> {
        let units: Vec<u16> = s.encode_utf16().collect();
        let len = units.len();
        let text_arg = |i: usize| -> String {
            args.get(i)
                .map(|a| to_js_string(a, &self.heap))
                .unwrap_or_else(|| "undefined".to_string())
        };
        let unit_string = |range: &[u16]| RuntimeValue::string(String::from_utf16_lossy(range));

        let (call, result) = match method {
            "charAt" | "charCodeAt" => {
                let index = args.first().map_or(0.0, |a| self.to_number(a));
                let index = if index.is_nan() { 0.0 } else { index.trunc() };
                let found = (index >= 0.0).then(|| units.get(index as usize)).flatten();
                let result = match (method, found) {
                    ("charAt", Some(unit)) => unit_string(&[*unit]),
                    ("charAt", None) => RuntimeValue::string(""),
                    (_, Some(unit)) => RuntimeValue::number(f64::from(*unit)),
                    (_, None) => RuntimeValue::number(f64::NAN),
                };
                (format!("{}({})", method, number_to_string(index)), result)
            }

            "substring" => {
                let bound = |arg: Option<&RuntimeValue>, default: usize| match arg {
                    None | Some(RuntimeValue::Undefined) => default,
                    Some(v) => clamp_count(self.to_number(v), len),
                };
                let (a, b) = (bound(args.first(), 0), bound(args.get(1), len));
                let (start, end) = (a.min(b), a.max(b));
                (format!("substring({}, {})", a, b), unit_string(&units[start..end]))
            }

            "slice" => {
                let start = self.index_arg(args.first(), len, 0);
                let end = self.index_arg(args.get(1), len, len).max(start);
                (format!("slice({}, {})", start, end), unit_string(&units[start..end]))
            }

            "split" => {
                let parts: Vec<RuntimeValue> = match args.first() {
                    None | Some(RuntimeValue::Undefined) => vec![RuntimeValue::string(s)],
                    Some(sep) => {
                        let sep = to_js_string(sep, &self.heap);
                        if sep.is_empty() {
                            units.iter().map(|unit| unit_string(&[*unit])).collect()
                        } else {
                            s.split(sep.as_str()).map(RuntimeValue::string).collect()
                        }
                    }
                };
                self.check_array_length(parts.len(), location)?;
                let call = match args.first() {
                    Some(sep) => format!("split(\"{}\")", to_js_string(sep, &self.heap)),
                    None => "split()".to_string(),
                };
                (call, self.heap.alloc_array(parts))
            }

            "indexOf" | "lastIndexOf" => {
                let needle: Vec<u16> = text_arg(0).encode_utf16().collect();
                let position = if method == "indexOf" {
                    let from = args.get(1).map_or(0, |a| clamp_count(self.to_number(a), len));
                    find_slice(&units, &needle, from)
                } else {
                    rfind_slice(&units, &needle)
                };
                (
                    format!("{}(\"{}\")", method, text_arg(0)),
                    RuntimeValue::number(position.map_or(-1.0, |p| p as f64)),
                )
            }

            "includes" | "startsWith" | "endsWith" => {
                let needle = text_arg(0);
                let found = match method {
                    "includes" => s.contains(needle.as_str()),
                    "startsWith" => s.starts_with(needle.as_str()),
                    _ => s.ends_with(needle.as_str()),
                };
                (format!("{}(\"{}\")", method, needle), RuntimeValue::boolean(found))
            }

            "toUpperCase" => (format!("{}()", method), RuntimeValue::string(s.to_uppercase())),
            "toLowerCase" => (format!("{}()", method), RuntimeValue::string(s.to_lowercase())),
            "trim" => (format!("{}()", method), RuntimeValue::string(s.trim())),

            "repeat" => {
                let count = args.first().map_or(0.0, |a| self.to_number(a));
                let count = if count.is_nan() { 0.0 } else { count.trunc() };
                if count < 0.0 || count.is_infinite() {
                    return Err(RuntimeError::Thrown {
                        value: "RangeError: Invalid count value".to_string(),
                        location,
                    });
                }
                // Saturating float-to-int cast
                self.check_string_length((count * len as f64) as usize, location)?;
                (
                    format!("repeat({})", number_to_string(count)),
                    RuntimeValue::string(s.repeat(count as usize)),
                )
            }

            "padStart" | "padEnd" => {
                let target = args.first().map_or(0, |a| clamp_count(self.to_number(a), usize::MAX));
                self.check_string_length(target, location)?;
                let pad: Vec<u16> = match args.get(1) {
                    None | Some(RuntimeValue::Undefined) => vec![u16::from(b' ')],
                    Some(p) => to_js_string(p, &self.heap).encode_utf16().collect(),
                };
                let filler: Vec<u16> = if target > len && !pad.is_empty() {
                    pad.iter().copied().cycle().take(target - len).collect()
                } else {
                    Vec::new()
                };
                let filler = String::from_utf16_lossy(&filler);
                let padded = if method == "padStart" {
                    format!("{}{}", filler, s)
                } else {
                    format!("{}{}", s, filler)
                };
                (format!("{}({})", method, target), RuntimeValue::string(padded))
            }

            // Only the first occurrence is replaced
            "replace" => {
                let (search, replacement) = (text_arg(0), text_arg(1));
                let replaced = RuntimeValue::string(s.replacen(search.as_str(), &replacement, 1));
                self.check_string_value(&replaced, location)?;
                (format!("replace(\"{}\", \"{}\")", search, replacement), replaced)
            }

            _ => return Ok(None),
        };

        let shown = match &result {
            RuntimeValue::Primitive(_) if result.is_string() => {
                format!("\"{}\"", result.as_str().unwrap_or_default())
            }
            other => self.fmt(other),
        };
        self.record_step(
            location,
            StepKind::Expression,
            format!("\"{}\".{} → {}", s, call, shown),
        )?;
        Ok(Some(result))
    }
}

/// Resolve a possibly negative index against `len`, clamped to `0..=len`
fn relative_index(n: f64, len: usize) -> usize {
    if n.is_nan() {
        0
    } else if n < 0.0 {
        (len as f64 + n.trunc()).max(0.0) as usize
    } else {
        n.trunc().min(len as f64) as usize
    }
}

/// Clamp a count to `0..=max`
fn clamp_count(n: f64, max: usize) -> usize {
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        n.trunc().min(max as f64) as usize
    }
}

fn both_nan(a: &RuntimeValue, b: &RuntimeValue) -> bool {
    matches!((a.as_number(), b.as_number()), (Some(x), Some(y)) if x.is_nan() && y.is_nan())
}

fn find_slice<T: PartialEq>(haystack: &[T], needle: &[T], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    (from..haystack.len())
        .find(|&i| haystack[i..].starts_with(needle))
}

fn rfind_slice<T: PartialEq>(haystack: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    (0..haystack.len())
        .rev()
        .find(|&i| haystack[i..].starts_with(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(-1.0, 5), 4);
        assert_eq!(relative_index(-10.0, 5), 0);
        assert_eq!(relative_index(2.7, 5), 2);
        assert_eq!(relative_index(99.0, 5), 5);
        assert_eq!(relative_index(f64::NAN, 5), 0);
    }

    #[test]
    fn test_char_search() {
        let hay: Vec<char> = "héllo héllo".chars().collect();
        let needle: Vec<char> = "llo".chars().collect();
        assert_eq!(find_slice(&hay, &needle, 0), Some(2));
        assert_eq!(find_slice(&hay, &needle, 3), Some(8));
        assert_eq!(rfind_slice(&hay, &needle), Some(8));
        assert_eq!(find_slice(&hay, &['z'], 0), None);
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(-3.0, 10), 0);
        assert_eq!(clamp_count(4.9, 10), 4);
        assert_eq!(clamp_count(f64::INFINITY, 10), 10);
    }
}
