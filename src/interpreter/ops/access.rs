use crate::interpreter::builtins::namespace_member;
use crate::interpreter::describe::expr_to_source;
use crate::interpreter::engine::{Interpreter, ProtoTarget};
use crate::interpreter::errors::RuntimeError;
use crate::memory::format::to_js_string;
use crate::memory::value::RuntimeValue;
use crate::parser::ast::{Expression, MemberProperty, SourceLocation};
use crate::snapshot::StepKind;

impl Interpreter {
    /// Property name of a member expression; computed keys go through ToString
    pub(crate) fn property_key(&mut self, property: &MemberProperty) -> Result<String, RuntimeError> {
        match property {
            MemberProperty::Named(name) => Ok(name.clone()),
            MemberProperty::Computed(expr) => {
                let key = self.evaluate(expr)?;
                Ok(to_js_string(&key, &self.heap))
            }
        }
    }

    pub(crate) fn evaluate_member(
        &mut self,
        expr: &Expression,
        object: &Expression,
        property: &MemberProperty,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        // Math.PI, console.log, ... unless the namespace is shadowed
        if let Some((namespace, member)) = expr.as_static_member() {
            if !self.is_bound(namespace) {
                if let Some(value) = namespace_member(namespace, member) {
                    return Ok(value);
                }
            }
        }

        let base = self.evaluate(object)?;
        let key = self.property_key(property)?;
        let value = self.read_property(&base, &key, location)?;

        let kind = match &base {
            RuntimeValue::Array { .. } if array_index(&key).is_some() => Some(StepKind::ArrayAccess),
            RuntimeValue::Object { .. } => Some(StepKind::ObjectAccess),
            _ => None,
        };
        if let Some(kind) = kind {
            self.record_step(
                location,
                kind,
                format!("{} → {}", expr_to_source(expr), self.fmt(&value)),
            )?;
        }

        Ok(value)
    }

    /// Read `base[key]` without recording a step
    pub(crate) fn read_property(
        &self,
        base: &RuntimeValue,
        key: &str,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        let value = match base {
            RuntimeValue::Array { id } => {
                let elements = self.heap.array(*id).map(Vec::as_slice).unwrap_or_default();
                match (key, array_index(key)) {
                    (_, Some(index)) => elements.get(index).cloned(),
                    ("length", None) => Some(RuntimeValue::number(elements.len() as f64)),
                    _ => self.prototype_value(ProtoTarget::Array, key),
                }
            }
            RuntimeValue::Object { id } => self
                .heap
                .object(*id)
                .and_then(|props| props.get(key))
                .cloned()
                .or_else(|| self.prototype_value(ProtoTarget::Object, key)),
            RuntimeValue::Primitive(_) if base.is_string() => {
                let s = base.as_str().unwrap_or_default();
                // Lengths and indices count UTF-16 code units
                match (key, array_index(key)) {
                    (_, Some(index)) => s
                        .encode_utf16()
                        .nth(index)
                        .map(|unit| RuntimeValue::string(String::from_utf16_lossy(&[unit]))),
                    ("length", None) => Some(RuntimeValue::number(s.encode_utf16().count() as f64)),
                    _ => self.prototype_value(ProtoTarget::String, key),
                }
            }
            RuntimeValue::Function(f) if key == "name" => Some(RuntimeValue::string(f.name.clone())),
            RuntimeValue::Null | RuntimeValue::Undefined => {
                return Err(RuntimeError::PropertyOfNullish {
                    value: self.fmt(base),
                    property: key.to_string(),
                    location,
                })
            }
            _ => None,
        };
        Ok(value.unwrap_or_default())
    }

    /// Write `base[key] = value` without recording a step.
    ///
    /// Writing past the end of an array fills the gap with `undefined`;
    /// writing `length` truncates or extends. Writes to primitives are ignored.
    pub(crate) fn write_property(
        &mut self,
        base: &RuntimeValue,
        key: &str,
        value: RuntimeValue,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match base {
            RuntimeValue::Array { id } => {
                if let Some(index) = array_index(key) {
                    let current = self.heap.array(*id).map_or(0, Vec::len);
                    if index >= current {
                        self.checked_array_length(index as f64 + 1.0, location)?;
                    }
                    if let Some(elements) = self.heap.array_mut(*id) {
                        if index >= elements.len() {
                            elements.resize(index + 1, RuntimeValue::Undefined);
                        }
                        elements[index] = value;
                    }
                } else if key == "length" {
                    let length = self.checked_array_length(self.to_number(&value), location)?;
                    if let Some(elements) = self.heap.array_mut(*id) {
                        elements.resize(length, RuntimeValue::Undefined);
                    }
                }
            }
            RuntimeValue::Object { id } => {
                if let Some(props) = self.heap.object_mut(*id) {
                    props.insert(key.to_string(), value);
                }
            }
            RuntimeValue::Null | RuntimeValue::Undefined => {
                return Err(RuntimeError::PropertyOfNullish {
                    value: self.fmt(base),
                    property: key.to_string(),
                    location,
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn prototype_value(&self, target: ProtoTarget, key: &str) -> Option<RuntimeValue> {
        self.prototypes
            .method(target, key)
            .map(|f| RuntimeValue::Function(f.clone()))
    }
}

/// Canonical array index: `"0"`, `"12"`, but not `"01"`, `"-1"` or `"1.5"`
pub(crate) fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_index() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("1.5"), None);
        assert_eq!(array_index("length"), None);
        assert_eq!(array_index(""), None);
    }
}
