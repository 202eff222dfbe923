use super::binary::apply_compound;
use crate::interpreter::describe::expr_to_source;
use crate::interpreter::engine::{Interpreter, ProtoTarget};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::RuntimeValue;
use crate::parser::ast::*;
use crate::snapshot::StepKind;

impl Interpreter {
    /// Evaluate `target op value`.
    ///
    /// The target's base object and key are resolved before the right-hand
    /// side runs. Compound operators read the current value first.
    pub(crate) fn evaluate_assign(
        &mut self,
        op: &AssignOp,
        target: &Expression,
        value: &Expression,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        match target {
            Expression::Identifier { name, .. } => {
                let current = match op {
                    AssignOp::Compound(_) => Some(self.get_variable(name)),
                    AssignOp::Assign => None,
                };
                let rhs = self.evaluate_named(value, name)?;
                let result = match (op, current) {
                    (AssignOp::Compound(bin), Some(current)) => {
                        apply_compound(*bin, &current, &rhs, &self.heap)
                    }
                    _ => rhs,
                };
                self.check_string_value(&result, location)?;

                self.set_variable(name, result.clone(), location)?;
                self.record_step(
                    location,
                    StepKind::Assignment,
                    format!("{} {} {}", name, op.symbol(), self.fmt(&result)),
                )?;
                Ok(result)
            }

            Expression::Member {
                object, property, ..
            } => {
                if let Some((ctor, method)) = self.prototype_target(target) {
                    let rhs = self.evaluate_named(value, method)?;
                    self.prototypes.set(ctor, method, rhs.clone());
                    self.record_step(
                        location,
                        StepKind::Assignment,
                        format!("{}.prototype.{} = {}", ctor.name(), method, self.fmt(&rhs)),
                    )?;
                    return Ok(rhs);
                }

                let base = self.evaluate(object)?;
                let key = self.property_key(property)?;
                let current = match op {
                    AssignOp::Compound(_) => Some(self.read_property(&base, &key, location)?),
                    AssignOp::Assign => None,
                };
                let rhs = self.evaluate_named(value, &key)?;
                let result = match (op, current) {
                    (AssignOp::Compound(bin), Some(current)) => {
                        apply_compound(*bin, &current, &rhs, &self.heap)
                    }
                    _ => rhs,
                };
                self.check_string_value(&result, location)?;

                self.write_property(&base, &key, result.clone(), location)?;

                let kind = match base {
                    RuntimeValue::Array { .. } => Some(StepKind::ArrayModify),
                    RuntimeValue::Object { .. } => Some(StepKind::ObjectModify),
                    _ => None,
                };
                if let Some(kind) = kind {
                    self.record_step(
                        location,
                        kind,
                        format!("{} = {}", expr_to_source(target), self.fmt(&result)),
                    )?;
                }
                Ok(result)
            }

            _ => Err(RuntimeError::InvalidAssignmentTarget { location }),
        }
    }

    /// Evaluate a right-hand side; anonymous functions take `name`
    fn evaluate_named(&mut self, value: &Expression, name: &str) -> Result<RuntimeValue, RuntimeError> {
        match value.as_function() {
            Some(function) => Ok(self.make_function(function, Some(name))),
            None => self.evaluate(value),
        }
    }

    /// `Array.prototype.name`, `Object.prototype.name` or `String.prototype.name`
    /// with the constructor not shadowed by a binding
    fn prototype_target<'a>(&self, target: &'a Expression) -> Option<(ProtoTarget, &'a str)> {
        let Expression::Member {
            object,
            property: MemberProperty::Named(method),
            ..
        } = target
        else {
            return None;
        };
        let (ctor, "prototype") = object.as_static_member()? else {
            return None;
        };
        if self.is_bound(ctor) {
            return None;
        }
        ProtoTarget::from_name(ctor).map(|t| (t, method.as_str()))
    }
}
