//! Unary and update operator evaluation

use crate::interpreter::describe::expr_to_source;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{number_to_string, to_int32, RuntimeValue};
use crate::parser::ast::*;
use crate::snapshot::StepKind;

impl Interpreter {
    pub(crate) fn evaluate_unary(
        &mut self,
        op: UnaryOp,
        argument: &Expression,
    ) -> Result<RuntimeValue, RuntimeError> {
        // `typeof undeclared` is "undefined" since unknown names read as undefined
        let value = self.evaluate(argument)?;

        Ok(match op {
            UnaryOp::Not => RuntimeValue::boolean(!value.is_truthy()),
            UnaryOp::Neg => RuntimeValue::number(-self.to_number(&value)),
            UnaryOp::Plus => RuntimeValue::number(self.to_number(&value)),
            UnaryOp::BitNot => RuntimeValue::number(f64::from(!to_int32(self.to_number(&value)))),
            UnaryOp::Typeof => RuntimeValue::string(value.type_of()),
        })
    }

    /// `++x`, `x--`, `a[i]++`, `obj.count--`
    pub(crate) fn evaluate_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        argument: &Expression,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        let delta = match op {
            UpdateOp::Increment => 1.0,
            UpdateOp::Decrement => -1.0,
        };

        let (old, new) = match argument {
            Expression::Identifier { name, .. } => {
                let old = self.to_number(&self.get_variable(name));
                let new = old + delta;
                self.set_variable(name, RuntimeValue::number(new), location)?;
                (old, new)
            }
            Expression::Member {
                object, property, ..
            } => {
                let base = self.evaluate(object)?;
                let key = self.property_key(property)?;
                let current = self.read_property(&base, &key, location)?;
                let old = self.to_number(&current);
                let new = old + delta;
                self.write_property(&base, &key, RuntimeValue::number(new), location)?;
                (old, new)
            }
            _ => return Err(RuntimeError::InvalidAssignmentTarget { location }),
        };

        let target = expr_to_source(argument);
        self.record_step(
            location,
            StepKind::Assignment,
            format!(
                "{}{} → {} = {}",
                target,
                op.symbol(),
                target,
                number_to_string(new)
            ),
        )?;

        Ok(RuntimeValue::number(if prefix { new } else { old }))
    }
}
