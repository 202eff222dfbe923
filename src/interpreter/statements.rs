// Statement execution: declarations, control flow and loops

use crate::interpreter::engine::{Completion, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::format::to_js_string;
use crate::memory::value::RuntimeValue;
use crate::parser::ast::*;
use crate::snapshot::StepKind;

impl Interpreter {
    /// Execute a single statement
    pub(crate) fn execute_statement(&mut self, stmt: &Statement) -> Result<Completion, RuntimeError> {
        self.set_current_location(stmt.location());

        match stmt {
            Statement::VarDecl {
                kind,
                declarations,
                location,
            } => {
                for decl in declarations {
                    let value = match &decl.init {
                        // Anonymous functions take the name of their binding
                        Some(Expression::Function { function, .. }) => {
                            self.make_function(function, Some(&decl.name))
                        }
                        Some(init) => self.evaluate(init)?,
                        None => RuntimeValue::Undefined,
                    };
                    let text = self.fmt(&value);
                    self.declare_variable(*kind, &decl.name, value);
                    self.record_step(
                        *location,
                        StepKind::Declaration,
                        format!("Declare {} {} = {}", kind.keyword(), decl.name, text),
                    )?;
                }
                Ok(Completion::Normal)
            }

            Statement::FunctionDecl { function, location } => {
                // Already hoisted, just record the step
                if let Some(name) = &function.name {
                    self.record_step(
                        *location,
                        StepKind::Declaration,
                        format!("Function {} declared", name),
                    )?;
                }
                Ok(Completion::Normal)
            }

            Statement::Expression { expr, .. } => {
                self.evaluate(expr)?;
                Ok(Completion::Normal)
            }

            Statement::Return { argument, location } => {
                let value = match argument {
                    Some(expr) => self.evaluate(expr)?,
                    None => RuntimeValue::Undefined,
                };
                self.record_step(
                    *location,
                    StepKind::Return,
                    format!("Return {}", self.fmt(&value)),
                )?;
                if let Some(frame) = self.call_stack.current_frame_mut() {
                    frame.return_value = Some(value.clone());
                }
                Ok(Completion::Return(value))
            }

            Statement::If {
                test,
                consequent,
                alternate,
                location,
            } => {
                let test_value = self.evaluate(test)?;
                let condition = test_value.is_truthy();
                self.record_step(
                    *location,
                    StepKind::Branch,
                    format!(
                        "If condition: {} → {}",
                        self.fmt(&test_value),
                        if condition { "true branch" } else { "false branch" }
                    ),
                )?;

                if condition {
                    self.execute_statement(consequent)
                } else if let Some(alt) = alternate {
                    self.execute_statement(alt)
                } else {
                    Ok(Completion::Normal)
                }
            }

            Statement::Break { location } => {
                self.record_step(*location, StepKind::Branch, "Break statement".to_string())?;
                Ok(Completion::Break)
            }

            Statement::Continue { location } => {
                self.record_step(*location, StepKind::Branch, "Continue statement".to_string())?;
                Ok(Completion::Continue)
            }

            Statement::For {
                init,
                test,
                update,
                body,
                location,
            } => self.execute_for(init.as_deref(), test.as_ref(), update.as_ref(), body, *location),

            Statement::ForOf {
                kind,
                binding,
                iterable,
                body,
                location,
            } => self.execute_for_of(*kind, binding, iterable, body, *location),

            Statement::While {
                test,
                body,
                location,
            } => self.execute_while(test, body, *location),

            Statement::DoWhile {
                body,
                test,
                location,
            } => self.execute_do_while(body, test, *location),

            Statement::Block { body, .. } => self.execute_block(body, "block"),

            Statement::Throw { argument, location } => {
                let value = self.evaluate(argument)?;
                let text = match &value {
                    RuntimeValue::Primitive(_) => to_js_string(&value, &self.heap),
                    _ => self.fmt(&value),
                };
                Err(RuntimeError::Thrown {
                    value: text,
                    location: *location,
                })
            }

            Statement::Try {
                block, finalizer, ..
            } => {
                // Handlers never run: a runtime error ends the trace
                let completion = self.execute_block(block, "try")?;
                if let Some(finalizer) = finalizer {
                    match self.execute_block(finalizer, "finally")? {
                        Completion::Normal => {}
                        abrupt => return Ok(abrupt),
                    }
                }
                Ok(completion)
            }

            Statement::Empty { .. } => Ok(Completion::Normal),
        }
    }

    /// Run statements in a new block scope
    pub(crate) fn execute_block(
        &mut self,
        body: &[Statement],
        scope_name: &str,
    ) -> Result<Completion, RuntimeError> {
        self.push_block_scope(scope_name);
        self.hoist_functions(body);
        let completion = self.execute_sequence(body)?;
        self.pop_scope();
        Ok(completion)
    }

    /// Run statements in the current scope, stopping at the first abrupt completion
    fn execute_sequence(&mut self, body: &[Statement]) -> Result<Completion, RuntimeError> {
        for stmt in body {
            match self.execute_statement(stmt)? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    /// Loop bodies that are blocks run directly in the loop's scope
    fn execute_loop_body(&mut self, body: &Statement) -> Result<Completion, RuntimeError> {
        match body {
            Statement::Block { body, .. } => {
                self.hoist_functions(body);
                self.execute_sequence(body)
            }
            other => self.execute_statement(other),
        }
    }

    fn check_loop_limit(
        &self,
        iterations: usize,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if iterations >= self.limits.max_loop_iterations {
            return Err(RuntimeError::LoopLimitExceeded {
                limit: self.limits.max_loop_iterations,
                location,
            });
        }
        Ok(())
    }

    fn execute_for(
        &mut self,
        init: Option<&Statement>,
        test: Option<&Expression>,
        update: Option<&Expression>,
        body: &Statement,
        location: SourceLocation,
    ) -> Result<Completion, RuntimeError> {
        self.push_block_scope("for-loop");

        if let Some(init) = init {
            self.execute_statement(init)?;
        }
        self.record_step(
            location,
            StepKind::LoopStart,
            "For loop started".to_string(),
        )?;

        let mut iterations = 0;
        loop {
            if let Some(test) = test {
                let test_value = self.evaluate(test)?;
                if !test_value.is_truthy() {
                    self.record_step(
                        location,
                        StepKind::LoopEnd,
                        "For loop condition false, exiting".to_string(),
                    )?;
                    break;
                }
            }
            self.check_loop_limit(iterations, location)?;
            self.record_step(
                location,
                StepKind::LoopIteration,
                format!("For loop iteration {}", iterations + 1),
            )?;

            match self.execute_loop_body(body)? {
                Completion::Break => {
                    self.record_step(
                        location,
                        StepKind::LoopEnd,
                        "For loop exited via break".to_string(),
                    )?;
                    break;
                }
                Completion::Return(value) => {
                    self.pop_scope();
                    return Ok(Completion::Return(value));
                }
                Completion::Normal | Completion::Continue => {}
            }

            if let Some(update) = update {
                self.evaluate(update)?;
            }
            iterations += 1;
        }

        self.pop_scope();
        Ok(Completion::Normal)
    }

    fn execute_for_of(
        &mut self,
        kind: VarKind,
        binding: &str,
        iterable: &Expression,
        body: &Statement,
        location: SourceLocation,
    ) -> Result<Completion, RuntimeError> {
        self.push_block_scope("for-of-loop");

        let value = self.evaluate(iterable)?;
        let elements: Vec<RuntimeValue> = match &value {
            RuntimeValue::Array { id } => self.heap.array(*id).cloned().unwrap_or_default(),
            RuntimeValue::Primitive(_) if value.is_string() => value
                .as_str()
                .unwrap_or_default()
                .chars()
                .map(|c| RuntimeValue::string(c.to_string()))
                .collect(),
            _ => {
                return Err(RuntimeError::NotIterable {
                    value: self.fmt(&value),
                    location: iterable.location(),
                })
            }
        };

        self.record_step(
            location,
            StepKind::LoopStart,
            format!("For-of loop started over {} elements", elements.len()),
        )?;

        let mut broke = false;
        for (iterations, element) in elements.into_iter().enumerate() {
            self.check_loop_limit(iterations, location)?;
            self.declare_variable(kind, binding, element);
            self.record_step(
                location,
                StepKind::LoopIteration,
                format!("For-of loop iteration {}", iterations + 1),
            )?;

            match self.execute_loop_body(body)? {
                Completion::Break => {
                    self.record_step(
                        location,
                        StepKind::LoopEnd,
                        "For-of loop exited via break".to_string(),
                    )?;
                    broke = true;
                    break;
                }
                Completion::Return(value) => {
                    self.pop_scope();
                    return Ok(Completion::Return(value));
                }
                Completion::Normal | Completion::Continue => {}
            }
        }

        if !broke {
            self.record_step(
                location,
                StepKind::LoopEnd,
                "For-of loop completed".to_string(),
            )?;
        }

        self.pop_scope();
        Ok(Completion::Normal)
    }

    fn execute_while(
        &mut self,
        test: &Expression,
        body: &Statement,
        location: SourceLocation,
    ) -> Result<Completion, RuntimeError> {
        self.push_block_scope("while-loop");

        self.record_step(
            location,
            StepKind::LoopStart,
            "While loop started".to_string(),
        )?;

        let mut iterations = 0;
        loop {
            let test_value = self.evaluate(test)?;
            if !test_value.is_truthy() {
                self.record_step(
                    location,
                    StepKind::LoopEnd,
                    "While loop condition false, exiting".to_string(),
                )?;
                break;
            }
            self.check_loop_limit(iterations, location)?;
            self.record_step(
                location,
                StepKind::LoopIteration,
                format!("While loop iteration {}", iterations + 1),
            )?;

            match self.execute_loop_body(body)? {
                Completion::Break => {
                    self.record_step(
                        location,
                        StepKind::LoopEnd,
                        "While loop exited via break".to_string(),
                    )?;
                    break;
                }
                Completion::Return(value) => {
                    self.pop_scope();
                    return Ok(Completion::Return(value));
                }
                Completion::Normal | Completion::Continue => {}
            }
            iterations += 1;
        }

        self.pop_scope();
        Ok(Completion::Normal)
    }

    fn execute_do_while(
        &mut self,
        body: &Statement,
        test: &Expression,
        location: SourceLocation,
    ) -> Result<Completion, RuntimeError> {
        self.push_block_scope("do-while-loop");

        self.record_step(
            location,
            StepKind::LoopStart,
            "Do-while loop started".to_string(),
        )?;

        let mut iterations = 0;
        loop {
            self.check_loop_limit(iterations, location)?;
            self.record_step(
                location,
                StepKind::LoopIteration,
                format!("Do-while loop iteration {}", iterations + 1),
            )?;

            match self.execute_loop_body(body)? {
                Completion::Break => {
                    self.record_step(
                        location,
                        StepKind::LoopEnd,
                        "Do-while loop exited via break".to_string(),
                    )?;
                    break;
                }
                Completion::Return(value) => {
                    self.pop_scope();
                    return Ok(Completion::Return(value));
                }
                Completion::Normal | Completion::Continue => {}
            }
            iterations += 1;

            let test_value = self.evaluate(test)?;
            if !test_value.is_truthy() {
                self.record_step(
                    location,
                    StepKind::LoopEnd,
                    "Do-while loop condition false, exiting".to_string(),
                )?;
                break;
            }
        }

        self.pop_scope();
        Ok(Completion::Normal)
    }
}
