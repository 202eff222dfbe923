// Expression evaluation: literals, identifiers, calls and `new`

use crate::interpreter::describe::expr_to_source;
use crate::interpreter::engine::{Interpreter, ProtoTarget};
use crate::interpreter::errors::RuntimeError;
use crate::memory::format::to_js_string;
use crate::memory::value::{FunctionValue, RuntimeValue};
use crate::parser::ast::*;
use crate::snapshot::StepKind;
use indexmap::IndexMap;

impl Interpreter {
    /// Evaluate an expression to a value
    pub(crate) fn evaluate(&mut self, expr: &Expression) -> Result<RuntimeValue, RuntimeError> {
        match expr {
            Expression::Number { value, .. } => Ok(RuntimeValue::number(*value)),
            Expression::String { value, .. } => Ok(RuntimeValue::string(value.clone())),
            Expression::Boolean { value, .. } => Ok(RuntimeValue::boolean(*value)),
            Expression::Null { .. } => Ok(RuntimeValue::Null),

            Expression::Template {
                quasis,
                expressions,
                location,
            } => {
                let mut out = String::new();
                for (i, quasi) in quasis.iter().enumerate() {
                    out.push_str(quasi);
                    if let Some(e) = expressions.get(i) {
                        let value = self.evaluate(e)?;
                        out.push_str(&to_js_string(&value, &self.heap));
                    }
                }
                let out = RuntimeValue::string(out);
                self.check_string_value(&out, *location)?;
                Ok(out)
            }

            Expression::Identifier { name, .. } => Ok(self.get_variable(name)),
            Expression::This { .. } => Ok(self.get_variable("this")),

            Expression::Array { elements, location } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(match element {
                        Some(e) => self.evaluate(e)?,
                        None => RuntimeValue::Undefined,
                    });
                }
                let array = self.heap.alloc_array(values);
                self.record_step(
                    *location,
                    StepKind::Expression,
                    format!("Create array: {}", self.fmt(&array)),
                )?;
                Ok(array)
            }

            Expression::Object {
                properties,
                location,
            } => {
                let mut map = IndexMap::new();
                for prop in properties {
                    let value = match &prop.value {
                        Expression::Function { function, .. } => {
                            self.make_function(function, Some(&prop.key))
                        }
                        other => self.evaluate(other)?,
                    };
                    map.insert(prop.key.clone(), value);
                }
                let object = self.heap.alloc_object(map);
                self.record_step(
                    *location,
                    StepKind::Expression,
                    format!("Create object: {}", self.fmt(&object)),
                )?;
                Ok(object)
            }

            Expression::Function { function, .. } => Ok(self.make_function(function, None)),

            Expression::Unary { op, argument, .. } => self.evaluate_unary(*op, argument),

            Expression::Update {
                op,
                prefix,
                argument,
                location,
            } => self.evaluate_update(*op, *prefix, argument, *location),

            Expression::Binary {
                op,
                left,
                right,
                location,
            } => self.evaluate_binary(expr, *op, left, right, *location),

            Expression::Logical {
                op, left, right, ..
            } => {
                let left = self.evaluate(left)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::Nullish => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expression::Assign {
                op,
                target,
                value,
                location,
            } => self.evaluate_assign(op, target, value, *location),

            Expression::Conditional {
                test,
                consequent,
                alternate,
                ..
            } => {
                if self.evaluate(test)?.is_truthy() {
                    self.evaluate(consequent)
                } else {
                    self.evaluate(alternate)
                }
            }

            Expression::Call {
                callee,
                arguments,
                location,
            } => self.evaluate_call(callee, arguments, *location),

            Expression::New {
                callee,
                arguments,
                location,
            } => self.evaluate_new(callee, arguments, *location),

            Expression::Member {
                object,
                property,
                location,
            } => self.evaluate_member(expr, object, property, *location),

            // No suspension: the awaited value is used directly
            Expression::Await { argument, .. } => self.evaluate(argument),
        }
    }

    pub(crate) fn evaluate_arguments(
        &mut self,
        arguments: &[Expression],
    ) -> Result<Vec<RuntimeValue>, RuntimeError> {
        arguments.iter().map(|a| self.evaluate(a)).collect()
    }

    fn evaluate_call(
        &mut self,
        callee: &Expression,
        arguments: &[Expression],
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        // console.log, Math.*, Array.isArray, ... unless shadowed by a binding
        if let Some((namespace, member)) = callee.as_static_member() {
            if !self.is_bound(namespace) {
                if let Some(builtin) = super::builtins::namespace_member(namespace, member) {
                    let RuntimeValue::Function(func) = builtin else {
                        return Err(RuntimeError::NotAFunction {
                            callee: expr_to_source(callee),
                            location,
                        });
                    };
                    let args = self.evaluate_arguments(arguments)?;
                    return self.call_native(&func.name, args, location);
                }
            }
        }

        if let Expression::Member {
            object, property, ..
        } = callee
        {
            let receiver = self.evaluate(object)?;
            let method = self.property_key(property)?;
            let args = self.evaluate_arguments(arguments)?;
            return self.call_method(receiver, &method, args, callee, location);
        }

        let func = self.evaluate(callee)?;
        let args = self.evaluate_arguments(arguments)?;
        match func {
            RuntimeValue::Function(f) => {
                let name = f.name.clone();
                self.call_function(&f, None, args, &name, true, location)
            }
            _ => Err(RuntimeError::NotAFunction {
                callee: expr_to_source(callee),
                location,
            }),
        }
    }

    /// `receiver.method(args)`: built-in methods first, then own function
    /// properties, then registered prototype methods
    fn call_method(
        &mut self,
        receiver: RuntimeValue,
        method: &str,
        args: Vec<RuntimeValue>,
        callee: &Expression,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        let prototype = match &receiver {
            RuntimeValue::Array { id } => {
                if let Some(result) = self.call_array_method(*id, method, &args, location)? {
                    return Ok(result);
                }
                Some(ProtoTarget::Array)
            }
            RuntimeValue::Primitive(_) if receiver.is_string() => {
                let s = receiver.as_str().unwrap_or_default().to_string();
                if let Some(result) = self.call_string_method(&s, method, &args, location)? {
                    return Ok(result);
                }
                Some(ProtoTarget::String)
            }
            RuntimeValue::Object { id } => {
                let own = self
                    .heap
                    .object(*id)
                    .and_then(|props| props.get(method))
                    .cloned();
                if let Some(RuntimeValue::Function(f)) = own {
                    return self.call_function(&f, Some(receiver.clone()), args, method, true, location);
                }
                Some(ProtoTarget::Object)
            }
            RuntimeValue::Null | RuntimeValue::Undefined => {
                return Err(RuntimeError::PropertyOfNullish {
                    value: self.fmt(&receiver),
                    property: method.to_string(),
                    location,
                });
            }
            _ => None,
        };

        let registered: Option<FunctionValue> =
            prototype.and_then(|target| self.prototypes.method(target, method).cloned());
        match registered {
            Some(f) => self.call_function(&f, Some(receiver), args, method, true, location),
            None => Err(RuntimeError::NotAFunction {
                callee: expr_to_source(callee),
                location,
            }),
        }
    }

    /// `new Ctor(args)` for `Array`, `Object` and user constructor functions
    fn evaluate_new(
        &mut self,
        callee: &Expression,
        arguments: &[Expression],
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        if let Some(name) = callee.as_identifier() {
            if !self.is_bound(name) {
                let args = self.evaluate_arguments(arguments)?;
                return match name {
                    "Array" => {
                        // A single numeric argument is a length
                        let length = match args.as_slice() {
                            [single] => single.as_number(),
                            _ => None,
                        };
                        let elements = match length {
                            Some(len) => {
                                let len = self.checked_array_length(len, location)?;
                                vec![RuntimeValue::Undefined; len]
                            }
                            None => {
                                self.check_array_length(args.len(), location)?;
                                args
                            }
                        };
                        let array = self.heap.alloc_array(elements);
                        self.record_step(
                            location,
                            StepKind::Expression,
                            format!("Create array: {}", self.fmt(&array)),
                        )?;
                        Ok(array)
                    }
                    "Object" => {
                        let object = self.heap.alloc_object(IndexMap::new());
                        self.record_step(
                            location,
                            StepKind::Expression,
                            format!("Create object: {}", self.fmt(&object)),
                        )?;
                        Ok(object)
                    }
                    _ => Err(RuntimeError::NotAConstructor {
                        callee: name.to_string(),
                        location,
                    }),
                };
            }
        }

        let constructor = self.evaluate(callee)?;
        let args = self.evaluate_arguments(arguments)?;
        match constructor {
            RuntimeValue::Function(f) if !f.is_native() && !is_arrow(&f) => {
                let instance = self.heap.alloc_object(IndexMap::new());
                let name = f.name.clone();
                let result =
                    self.call_function(&f, Some(instance.clone()), args, &name, true, location)?;
                // A constructor returning an object replaces the instance
                Ok(match result {
                    RuntimeValue::Object { .. } | RuntimeValue::Array { .. } => result,
                    _ => instance,
                })
            }
            _ => Err(RuntimeError::NotAConstructor {
                callee: expr_to_source(callee),
                location,
            }),
        }
    }
}

fn is_arrow(func: &FunctionValue) -> bool {
    func.node.as_ref().is_some_and(|n| n.is_arrow)
}
