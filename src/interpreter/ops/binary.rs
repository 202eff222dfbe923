use crate::interpreter::describe::expr_to_source;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::format::to_js_string;
use crate::memory::heap::Heap;
use crate::memory::value::{to_int32, to_uint32, values_equal, Primitive, RuntimeValue};
use crate::parser::ast::{BinOp, Expression, SourceLocation};
use crate::snapshot::StepKind;
use std::cmp::Ordering;

impl Interpreter {
    /// Evaluate both operands, apply the operator and record a comparison step
    pub(crate) fn evaluate_binary(
        &mut self,
        expr: &Expression,
        op: BinOp,
        left: &Expression,
        right: &Expression,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        let result = apply_binary(op, &left, &right, &self.heap);
        self.check_string_value(&result, location)?;

        let source = expr_to_source(expr);
        let values = format!("{} {} {}", self.fmt(&left), op.symbol(), self.fmt(&right));
        let description = if source != values {
            format!("{}: {} → {}", source, values, self.fmt(&result))
        } else {
            format!("{} → {}", values, self.fmt(&result))
        };
        self.record_step(location, StepKind::Comparison, description)?;

        Ok(result)
    }
}

/// Apply a binary operator with JS semantics
pub(crate) fn apply_binary(
    op: BinOp,
    left: &RuntimeValue,
    right: &RuntimeValue,
    heap: &Heap,
) -> RuntimeValue {
    let num = |v: &RuntimeValue| to_numeric(v, heap);

    match op {
        BinOp::Add => {
            if is_stringish(left) || is_stringish(right) {
                let mut s = to_js_string(left, heap);
                s.push_str(&to_js_string(right, heap));
                RuntimeValue::string(s)
            } else {
                RuntimeValue::number(num(left) + num(right))
            }
        }
        BinOp::Sub => RuntimeValue::number(num(left) - num(right)),
        BinOp::Mul => RuntimeValue::number(num(left) * num(right)),
        // Division by zero follows IEEE 754: Infinity, -Infinity or NaN
        BinOp::Div => RuntimeValue::number(num(left) / num(right)),
        BinOp::Mod => RuntimeValue::number(num(left) % num(right)),
        BinOp::Exp => {
            let (base, exponent) = (num(left), num(right));
            if exponent.is_nan() {
                RuntimeValue::number(f64::NAN)
            } else {
                RuntimeValue::number(base.powf(exponent))
            }
        }

        BinOp::Lt => RuntimeValue::boolean(compare(left, right, heap) == Some(Ordering::Less)),
        BinOp::Gt => RuntimeValue::boolean(compare(left, right, heap) == Some(Ordering::Greater)),
        BinOp::Le => RuntimeValue::boolean(matches!(
            compare(left, right, heap),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinOp::Ge => RuntimeValue::boolean(matches!(
            compare(left, right, heap),
            Some(Ordering::Greater | Ordering::Equal)
        )),

        BinOp::StrictEq => RuntimeValue::boolean(values_equal(left, right)),
        BinOp::StrictNe => RuntimeValue::boolean(!values_equal(left, right)),
        BinOp::LooseEq => RuntimeValue::boolean(loose_equals(left, right, heap)),
        BinOp::LooseNe => RuntimeValue::boolean(!loose_equals(left, right, heap)),

        BinOp::BitAnd => int_op(left, right, heap, |a, b| a & b),
        BinOp::BitOr => int_op(left, right, heap, |a, b| a | b),
        BinOp::BitXor => int_op(left, right, heap, |a, b| a ^ b),
        BinOp::Shl => int_op(left, right, heap, |a, b| a.wrapping_shl(b as u32 & 31)),
        BinOp::Shr => int_op(left, right, heap, |a, b| a >> (b as u32 & 31)),
        BinOp::UShr => {
            let a = to_uint32(num(left));
            let b = to_uint32(num(right)) & 31;
            RuntimeValue::number(f64::from(a >> b))
        }
    }
}

/// Compound assignment: defined only when both operands are primitives.
/// Anything else yields `undefined`.
pub(crate) fn apply_compound(
    op: BinOp,
    current: &RuntimeValue,
    value: &RuntimeValue,
    heap: &Heap,
) -> RuntimeValue {
    match (current, value) {
        (RuntimeValue::Primitive(_), RuntimeValue::Primitive(_)) => {
            apply_binary(op, current, value, heap)
        }
        _ => RuntimeValue::Undefined,
    }
}

/// Strings and reference values concatenate under `+`
fn is_stringish(value: &RuntimeValue) -> bool {
    matches!(
        value,
        RuntimeValue::Primitive(Primitive::String(_))
            | RuntimeValue::Array { .. }
            | RuntimeValue::Object { .. }
            | RuntimeValue::Function(_)
    )
}

/// ToNumber, going through ToPrimitive for arrays (`[5]` → 5)
pub(crate) fn to_numeric(value: &RuntimeValue, heap: &Heap) -> f64 {
    match value {
        RuntimeValue::Array { .. } => RuntimeValue::string(to_js_string(value, heap)).to_number(),
        other => other.to_number(),
    }
}

fn int_op(
    left: &RuntimeValue,
    right: &RuntimeValue,
    heap: &Heap,
    f: impl Fn(i32, i32) -> i32,
) -> RuntimeValue {
    let a = to_int32(to_numeric(left, heap));
    let b = to_int32(to_numeric(right, heap));
    RuntimeValue::number(f64::from(f(a, b)))
}

/// Relational comparison: strings compare lexicographically, everything else
/// numerically. `None` when either side is NaN.
fn compare(left: &RuntimeValue, right: &RuntimeValue, heap: &Heap) -> Option<Ordering> {
    match (left.as_str(), right.as_str()) {
        (Some(a), Some(b)) => Some(a.cmp(b)),
        _ => to_numeric(left, heap).partial_cmp(&to_numeric(right, heap)),
    }
}

/// `==` with JS coercions
fn loose_equals(left: &RuntimeValue, right: &RuntimeValue, heap: &Heap) -> bool {
    match (left, right) {
        (RuntimeValue::Null | RuntimeValue::Undefined, RuntimeValue::Null | RuntimeValue::Undefined) => {
            true
        }
        (RuntimeValue::Null | RuntimeValue::Undefined, _)
        | (_, RuntimeValue::Null | RuntimeValue::Undefined) => false,
        (RuntimeValue::Primitive(a), RuntimeValue::Primitive(b)) => match (a, b) {
            (Primitive::String(x), Primitive::String(y)) => x == y,
            _ => left.to_number() == right.to_number(),
        },
        (RuntimeValue::Primitive(_), _) => {
            loose_equals(left, &RuntimeValue::string(to_js_string(right, heap)), heap)
        }
        (_, RuntimeValue::Primitive(_)) => {
            loose_equals(&RuntimeValue::string(to_js_string(left, heap)), right, heap)
        }
        _ => values_equal(left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn bin(op: BinOp, l: RuntimeValue, r: RuntimeValue) -> RuntimeValue {
        apply_binary(op, &l, &r, &Heap::new())
    }

    #[test]
    fn test_division_by_zero_is_infinity() {
        assert_eq!(
            bin(BinOp::Div, RuntimeValue::number(10.0), RuntimeValue::number(0.0)),
            RuntimeValue::number(f64::INFINITY)
        );
        assert_eq!(
            bin(BinOp::Div, RuntimeValue::number(-1.0), RuntimeValue::number(0.0)),
            RuntimeValue::number(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn test_add_concatenates_strings() {
        assert_eq!(
            bin(BinOp::Add, RuntimeValue::string("a"), RuntimeValue::number(1.0)),
            RuntimeValue::string("a1")
        );
        assert_eq!(
            bin(BinOp::Add, RuntimeValue::number(1.0), RuntimeValue::boolean(true)),
            RuntimeValue::number(2.0)
        );
    }

    #[test]
    fn test_loose_vs_strict_equality() {
        let one = RuntimeValue::number(1.0);
        let text = RuntimeValue::string("1");
        assert_eq!(bin(BinOp::LooseEq, one.clone(), text.clone()), RuntimeValue::boolean(true));
        assert_eq!(bin(BinOp::StrictEq, one, text), RuntimeValue::boolean(false));
        assert_eq!(
            bin(BinOp::LooseEq, RuntimeValue::Null, RuntimeValue::Undefined),
            RuntimeValue::boolean(true)
        );
        assert_eq!(
            bin(BinOp::LooseEq, RuntimeValue::Null, RuntimeValue::number(0.0)),
            RuntimeValue::boolean(false)
        );
    }

    #[test]
    fn test_string_comparison_is_lexicographic() {
        assert_eq!(
            bin(BinOp::Lt, RuntimeValue::string("10"), RuntimeValue::string("9")),
            RuntimeValue::boolean(true)
        );
        assert_eq!(
            bin(BinOp::Lt, RuntimeValue::number(10.0), RuntimeValue::string("9")),
            RuntimeValue::boolean(false)
        );
        assert_eq!(
            bin(BinOp::Ge, RuntimeValue::number(f64::NAN), RuntimeValue::number(1.0)),
            RuntimeValue::boolean(false)
        );
    }

    #[test]
    fn test_bitwise_and_shifts() {
        assert_eq!(
            bin(BinOp::BitXor, RuntimeValue::number(5.0), RuntimeValue::number(3.0)),
            RuntimeValue::number(6.0)
        );
        assert_eq!(
            bin(BinOp::Shl, RuntimeValue::number(1.0), RuntimeValue::number(33.0)),
            RuntimeValue::number(2.0)
        );
        assert_eq!(
            bin(BinOp::UShr, RuntimeValue::number(-1.0), RuntimeValue::number(0.0)),
            RuntimeValue::number(4_294_967_295.0)
        );
    }

    #[test]
    fn test_compound_requires_primitives() {
        let mut heap = Heap::new();
        let obj = heap.alloc_object(IndexMap::new());
        assert_eq!(
            apply_compound(BinOp::Add, &obj, &RuntimeValue::number(1.0), &heap),
            RuntimeValue::Undefined
        );
        assert_eq!(
            apply_compound(BinOp::Add, &RuntimeValue::string("a"), &RuntimeValue::string("b"), &heap),
            RuntimeValue::string("ab")
        );
    }
}
