// Execution engine for the script interpreter

use crate::config::InterpreterLimits;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    format::format_value,
    heap::Heap,
    scope::{AssignError, ScopeArena, ScopeId, ScopeKind},
    stack::CallStack,
    value::{FunctionValue, RuntimeValue},
};
use crate::parser::ast::*;
use crate::parser::{parse_code, ParseError};
use crate::snapshot::{Console, ExecutionStep, StepKind, StepRecorder};
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of executing a statement
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Completion {
    Normal,
    Return(RuntimeValue),
    Break,
    Continue,
}

/// Constructor whose prototype a script can extend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtoTarget {
    Array,
    Object,
    String,
}

impl ProtoTarget {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "Array" => Some(ProtoTarget::Array),
            "Object" => Some(ProtoTarget::Object),
            "String" => Some(ProtoTarget::String),
            _ => None,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            ProtoTarget::Array => "Array",
            ProtoTarget::Object => "Object",
            ProtoTarget::String => "String",
        }
    }
}

/// Methods registered through `Ctor.prototype.name = fn`
#[derive(Debug, Default)]
pub(crate) struct Prototypes {
    methods: FxHashMap<(&'static str, String), RuntimeValue>,
}

impl Prototypes {
    pub(crate) fn set(&mut self, target: ProtoTarget, name: &str, value: RuntimeValue) {
        self.methods.insert((target.name(), name.to_string()), value);
    }

    /// A registered method, only if it is callable
    pub(crate) fn method(&self, target: ProtoTarget, name: &str) -> Option<&FunctionValue> {
        match self.methods.get(&(target.name(), name.to_string())) {
            Some(RuntimeValue::Function(f)) => Some(f),
            _ => None,
        }
    }
}

/// Result of [`interpret`]: the full trace plus everything logged
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub steps: Vec<ExecutionStep>,
    pub console_output: Vec<String>,
}

/// Parse and execute `source` with default limits
pub fn interpret(source: &str) -> Result<Execution, ParseError> {
    let program = parse_code(source)?;
    let mut interpreter = Interpreter::new();
    let steps = interpreter.execute(&program);
    Ok(Execution {
        steps,
        console_output: interpreter.console_output(),
    })
}

/// The tree-walking interpreter
///
/// Each call to [`execute`](Interpreter::execute) starts from a fresh heap,
/// scope arena and call stack, so identical programs produce identical traces.
pub struct Interpreter {
    pub(crate) limits: InterpreterLimits,

    /// Per-run arena for arrays and objects
    pub(crate) heap: Heap,

    /// Every scope created during the run
    pub(crate) scopes: ScopeArena,

    /// Active scope chain, global first
    pub(crate) chain: Vec<ScopeId>,

    pub(crate) call_stack: CallStack,

    /// Captured `console.log` output
    pub(crate) console: Console,

    recorder: StepRecorder,

    pub(crate) prototypes: Prototypes,

    /// Location of the statement being executed
    current_location: SourceLocation,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_limits(InterpreterLimits::default())
    }

    pub fn with_limits(limits: InterpreterLimits) -> Self {
        Interpreter {
            limits,
            heap: Heap::new(),
            scopes: ScopeArena::new(),
            chain: vec![ScopeArena::GLOBAL],
            call_stack: CallStack::new(),
            console: Console::new(),
            recorder: StepRecorder::new(limits.max_steps),
            prototypes: Prototypes::default(),
            current_location: SourceLocation::default(),
        }
    }

    pub fn limits(&self) -> &InterpreterLimits {
        &self.limits
    }

    /// Execute the entire program and collect all steps.
    ///
    /// Runtime errors never escape: they end the run with one terminal step
    /// of kind `error`.
    ///
    /// The tree walk recurses on the native stack once per script call, so
    /// the run happens on a dedicated thread whose stack is sized from
    /// `max_call_depth`. If that thread cannot be spawned the run falls back
    /// to the calling thread.
    pub fn execute(&mut self, program: &Program) -> Vec<ExecutionStep> {
        let stack_size = native_stack_size(&self.limits);
        let spawned = std::thread::scope(|scope| {
            std::thread::Builder::new()
                .name("jstrace-interpreter".to_string())
                .stack_size(stack_size)
                .spawn_scoped(scope, || self.execute_here(program))
                .map(|handle| handle.join())
        });
        match spawned {
            Ok(Ok(steps)) => steps,
            Ok(Err(panic)) => std::panic::resume_unwind(panic),
            Err(err) => {
                warn!("could not spawn interpreter thread: {}; running inline", err);
                self.execute_here(program)
            }
        }
    }

    fn execute_here(&mut self, program: &Program) -> Vec<ExecutionStep> {
        *self = Self::with_limits(self.limits);
        debug!("executing {} top-level statements", program.body.len());

        if let Err(err) = self.run_program(program) {
            if err.is_limit() {
                warn!("run stopped by resource limit: {}", err);
            } else {
                debug!("run stopped by runtime error: {}", err);
            }
            self.record_error(&err, program.location);
        }

        let steps = std::mem::replace(
            &mut self.recorder,
            StepRecorder::new(self.limits.max_steps),
        )
        .into_steps();
        debug!("recorded {} steps", steps.len());
        steps
    }

    /// Console output of the last run
    pub fn console_output(&self) -> Vec<String> {
        self.console.get_output()
    }

    fn run_program(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.hoist_functions(&program.body);

        for stmt in &program.body {
            if let Completion::Return(_) = self.execute_statement(stmt)? {
                break;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Step recording
    // ------------------------------------------------------------------

    /// Record a step at `location`
    pub(crate) fn record_step(
        &mut self,
        location: SourceLocation,
        kind: StepKind,
        description: String,
    ) -> Result<(), RuntimeError> {
        if !self.recorder.has_room() {
            return Err(RuntimeError::StepLimitExceeded {
                limit: self.recorder.max_steps(),
            });
        }
        let step = self.snapshot_step(location, kind, description);
        self.recorder.push(step);
        Ok(())
    }

    fn record_error(&mut self, err: &RuntimeError, fallback: SourceLocation) {
        let location = err.location().copied().unwrap_or(
            if self.current_location == SourceLocation::default() {
                fallback
            } else {
                self.current_location
            },
        );
        let step = self.snapshot_step(location, StepKind::Error, format!("Error: {}", err));
        self.recorder.push_terminal(step);
    }

    fn snapshot_step(
        &self,
        location: SourceLocation,
        kind: StepKind,
        description: String,
    ) -> ExecutionStep {
        let scopes = self.scopes.snapshot(&self.chain);
        let call_stack = self.call_stack.frames().to_vec();

        let roots = scopes
            .iter()
            .flat_map(|s| s.variables.values())
            .chain(call_stack.iter().flat_map(|f| {
                f.params
                    .values()
                    .chain(f.locals.values())
                    .chain(f.return_value.iter())
            }));
        let heap = self.heap.snapshot(roots);

        ExecutionStep {
            id: self.recorder.next_id(),
            kind,
            location,
            line: location.line,
            call_stack,
            scopes,
            heap,
            description,
            console_output: self.console.get_output(),
        }
    }

    /// Inspector rendering of a value against the live heap
    pub(crate) fn fmt(&self, value: &RuntimeValue) -> String {
        format_value(value, &self.heap, false)
    }

    pub(crate) fn fmt_list(&self, values: &[RuntimeValue]) -> String {
        values
            .iter()
            .map(|v| self.fmt(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn set_current_location(&mut self, location: SourceLocation) {
        self.current_location = location;
    }

    // ------------------------------------------------------------------
    // Scopes and variables
    // ------------------------------------------------------------------

    pub(crate) fn current_scope(&self) -> ScopeId {
        self.chain.last().copied().unwrap_or(ScopeArena::GLOBAL)
    }

    pub(crate) fn push_block_scope(&mut self, name: &str) {
        let id = self.scopes.push(ScopeKind::Block, name, &self.chain);
        self.chain.push(id);
    }

    pub(crate) fn pop_scope(&mut self) {
        if self.chain.len() > 1 {
            self.chain.pop();
        }
    }

    pub(crate) fn is_bound(&self, name: &str) -> bool {
        self.scopes.resolve(&self.chain, name).is_some()
    }

    /// Bind a new variable. `var` goes to the nearest function scope,
    /// everything else to the innermost scope.
    pub(crate) fn declare_variable(&mut self, kind: VarKind, name: &str, value: RuntimeValue) {
        let scope = match kind {
            VarKind::Var => self.scopes.nearest_function_scope(&self.chain),
            VarKind::Let | VarKind::Const => self.current_scope(),
        };
        self.scopes
            .declare(scope, name, value.clone(), kind == VarKind::Const);
        self.mirror_binding(scope, name, &value);
    }

    /// Read a variable; unknown names fall back to the global builtins and
    /// then to `undefined`
    pub(crate) fn get_variable(&self, name: &str) -> RuntimeValue {
        match self.scopes.lookup(&self.chain, name) {
            Some(value) => value.clone(),
            None => super::builtins::global_value(name).unwrap_or_default(),
        }
    }

    /// Assign to an existing variable, creating a global if it is undeclared
    pub(crate) fn set_variable(
        &mut self,
        name: &str,
        value: RuntimeValue,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let scope = self
            .scopes
            .assign(&self.chain, name, value.clone())
            .map_err(|e| match e {
                AssignError::Constant => RuntimeError::ConstAssignment {
                    name: name.to_string(),
                    location,
                },
            })?;
        self.mirror_binding(scope, name, &value);
        Ok(())
    }

    fn mirror_binding(&mut self, scope: ScopeId, name: &str, value: &RuntimeValue) {
        if let Some(function_scope) = self.scopes.owning_function_scope(scope) {
            self.call_stack.record_binding(function_scope, name, value);
        }
    }

    // ------------------------------------------------------------------
    // Size ceilings
    // ------------------------------------------------------------------

    /// Validate an array length requested by the script. Lengths JS rejects
    /// throw a `RangeError`; lengths past `max_array_length` end the run.
    pub(crate) fn checked_array_length(
        &self,
        length: f64,
        location: SourceLocation,
    ) -> Result<usize, RuntimeError> {
        if length.is_nan() || length < 0.0 || length.fract() != 0.0 || length > MAX_JS_ARRAY_LENGTH
        {
            return Err(RuntimeError::Thrown {
                value: "RangeError: Invalid array length".to_string(),
                location,
            });
        }
        let length = length as usize;
        self.check_array_length(length, location)?;
        Ok(length)
    }

    pub(crate) fn check_array_length(
        &self,
        length: usize,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if length > self.limits.max_array_length {
            return Err(RuntimeError::ArrayLengthExceeded {
                limit: self.limits.max_array_length,
                location,
            });
        }
        Ok(())
    }

    /// `length` counts UTF-16 code units
    pub(crate) fn check_string_length(
        &self,
        length: usize,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if length > self.limits.max_string_length {
            return Err(RuntimeError::StringLengthExceeded {
                limit: self.limits.max_string_length,
                location,
            });
        }
        Ok(())
    }

    /// Fail if `value` is a string longer than `max_string_length`
    pub(crate) fn check_string_value(
        &self,
        value: &RuntimeValue,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match value.as_str() {
            Some(s) => self.check_string_length(s.encode_utf16().count(), location),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    /// Create a function value closing over the active scope chain
    pub(crate) fn make_function(
        &self,
        node: &Arc<FunctionNode>,
        name_hint: Option<&str>,
    ) -> RuntimeValue {
        let name = node
            .name
            .as_deref()
            .or(name_hint)
            .unwrap_or("<anonymous>")
            .to_string();
        RuntimeValue::Function(FunctionValue {
            name,
            params: node.params.iter().map(|p| p.name.clone()).collect(),
            closure: self.chain.clone(),
            node: Some(Arc::clone(node)),
        })
    }

    /// Bind every function declaration of `body` in the innermost scope
    /// before any statement runs
    pub(crate) fn hoist_functions(&mut self, body: &[Statement]) {
        for stmt in body {
            if let Statement::FunctionDecl { function, .. } = stmt {
                if let Some(name) = function.name.as_deref() {
                    let value = self.make_function(function, None);
                    self.declare_variable(VarKind::Let, name, value);
                }
            }
        }
    }

    /// Invoke a function value.
    ///
    /// `display_name` names the frame; with `record` set, `Call` and
    /// `Return from` steps are recorded around the body.
    pub(crate) fn call_function(
        &mut self,
        func: &FunctionValue,
        this_value: Option<RuntimeValue>,
        args: Vec<RuntimeValue>,
        display_name: &str,
        record: bool,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        let Some(node) = func.node.clone() else {
            return self.call_native(&func.name, args, location);
        };

        if self.call_stack.depth() >= self.limits.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.limits.max_call_depth,
                location,
            });
        }

        // Switch to the captured chain plus a fresh function scope
        let mut callee_chain = func.closure.clone();
        let function_scope = self
            .scopes
            .push(ScopeKind::Function, display_name, &callee_chain);
        callee_chain.push(function_scope);
        let saved_chain = std::mem::replace(&mut self.chain, callee_chain);

        // Bind parameters, evaluating defaults for missing arguments
        let mut params = indexmap::IndexMap::new();
        let mut args = args.into_iter();
        for param in &node.params {
            let mut value = args.next().unwrap_or_default();
            if value == RuntimeValue::Undefined {
                if let Some(default) = &param.default {
                    value = self.evaluate(default)?;
                }
            }
            self.scopes
                .declare(function_scope, &param.name, value.clone(), false);
            params.insert(param.name.clone(), value);
        }

        let arg_text = self.fmt_list(&params.values().cloned().collect::<Vec<_>>());
        self.call_stack.push_frame(
            display_name,
            params,
            Some(location),
            node.body_location.line,
            function_scope,
        );
        if record {
            self.record_step(
                location,
                StepKind::Call,
                format!("Call {}({})", display_name, arg_text),
            )?;
        }

        // Arrow functions see `this` through their closure
        if let Some(this_value) = this_value.filter(|_| !node.is_arrow) {
            self.declare_variable(VarKind::Const, "this", this_value);
        }

        let result = match &node.body {
            FunctionBody::Block(statements) => {
                self.hoist_functions(statements);
                self.execute_function_body(statements)?
            }
            FunctionBody::Expression(expr) => self.evaluate(expr)?,
        };

        self.chain = saved_chain;
        self.call_stack.pop_frame();

        if record {
            self.record_step(
                location,
                StepKind::Return,
                format!("Return from {}: {}", display_name, self.fmt(&result)),
            )?;
        }
        Ok(result)
    }

    fn execute_function_body(
        &mut self,
        statements: &[Statement],
    ) -> Result<RuntimeValue, RuntimeError> {
        for stmt in statements {
            if let Completion::Return(value) = self.execute_statement(stmt)? {
                return Ok(value);
            }
        }
        Ok(RuntimeValue::Undefined)
    }

    /// Run a callback passed to a builtin; no call/return steps are recorded
    pub(crate) fn invoke_callback(
        &mut self,
        callback: &RuntimeValue,
        args: Vec<RuntimeValue>,
        location: SourceLocation,
    ) -> Result<RuntimeValue, RuntimeError> {
        let RuntimeValue::Function(func) = callback else {
            return Err(RuntimeError::NotAFunction {
                callee: self.fmt(callback),
                location,
            });
        };
        let name = if func.name == "<anonymous>" {
            "(callback)".to_string()
        } else {
            func.name.clone()
        };
        self.call_function(func, None, args, &name, false, location)
    }
}

/// Largest length a JS array can have, 2^32 - 1
const MAX_JS_ARRAY_LENGTH: f64 = 4_294_967_295.0;

/// Native stack reserved for the interpreter thread beyond script calls
const BASE_STACK_SIZE: usize = 8 * 1024 * 1024;
/// Native stack reserved per allowed script call
const STACK_SIZE_PER_CALL: usize = 256 * 1024;

fn native_stack_size(limits: &InterpreterLimits) -> usize {
    limits
        .max_call_depth
        .saturating_mul(STACK_SIZE_PER_CALL)
        .saturating_add(BASE_STACK_SIZE)
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
