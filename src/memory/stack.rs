//! Call stack implementation
//!
//! This module provides the call stack for function execution:
//! - [`CallStack`]: The call stack containing frames
//! - [`StackFrame`]: A single function's activation record
//!
//! Frames hold a display copy of the function's bindings (`params` and
//! `locals`). The bindings themselves live in the frame's function scope in the
//! [`ScopeArena`](super::scope::ScopeArena); the interpreter mirrors every
//! write into the owning frame with [`CallStack::record_binding`].

use super::scope::ScopeId;
use super::value::RuntimeValue;
use crate::parser::ast::SourceLocation;
use indexmap::IndexMap;
use serde::Serialize;

/// Stack frame for a function call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub id: usize,
    #[serde(rename = "name")]
    pub function_name: String,
    pub params: IndexMap<String, RuntimeValue>,
    pub locals: IndexMap<String, RuntimeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_site: Option<SourceLocation>,
    /// Line of the function body
    pub start_line: usize,
    /// 1 for the outermost call
    pub depth: usize,
    /// Set once the function has returned a value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<RuntimeValue>,
    #[serde(skip)]
    pub scope: ScopeId,
}

impl StackFrame {
    pub fn get_var(&self, name: &str) -> Option<&RuntimeValue> {
        self.locals.get(name).or_else(|| self.params.get(name))
    }
}

/// The call stack
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<StackFrame>,
    next_id: usize,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack::default()
    }

    /// Push a new stack frame and return its depth
    pub fn push_frame(
        &mut self,
        function_name: &str,
        params: IndexMap<String, RuntimeValue>,
        call_site: Option<SourceLocation>,
        start_line: usize,
        scope: ScopeId,
    ) -> usize {
        self.next_id += 1;
        let depth = self.frames.len() + 1;
        self.frames.push(StackFrame {
            id: self.next_id,
            function_name: function_name.to_string(),
            params,
            locals: IndexMap::new(),
            call_site,
            start_line,
            depth,
            return_value: None,
            scope,
        });
        depth
    }

    /// Pop the top stack frame
    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    /// Get the current (top) frame
    pub fn current_frame(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    /// Get a mutable reference to the current frame
    pub fn current_frame_mut(&mut self) -> Option<&mut StackFrame> {
        self.frames.last_mut()
    }

    /// Get all frames, outermost first
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Get the depth of the call stack
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Mirror a binding written in `function_scope` into the frame that owns
    /// that scope. Parameters stay in `params`; anything else is a local.
    pub fn record_binding(&mut self, function_scope: ScopeId, name: &str, value: &RuntimeValue) {
        let Some(frame) = self
            .frames
            .iter_mut()
            .rev()
            .find(|f| f.scope == function_scope)
        else {
            return;
        };

        if let Some(param) = frame.params.get_mut(name) {
            *param = value.clone();
        } else {
            frame.locals.insert(name.to_string(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_depth() {
        let mut stack = CallStack::new();
        assert_eq!(stack.push_frame("outer", IndexMap::new(), None, 1, 1), 1);
        assert_eq!(stack.push_frame("inner", IndexMap::new(), None, 3, 2), 2);
        assert_eq!(stack.current_frame().unwrap().function_name, "inner");

        let popped = stack.pop_frame().unwrap();
        assert_eq!(popped.depth, 2);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_frame_ids_keep_increasing() {
        let mut stack = CallStack::new();
        stack.push_frame("a", IndexMap::new(), None, 1, 1);
        stack.pop_frame();
        stack.push_frame("b", IndexMap::new(), None, 1, 2);
        assert_eq!(stack.current_frame().unwrap().id, 2);
    }

    #[test]
    fn test_record_binding_targets_owning_frame() {
        let mut stack = CallStack::new();
        let mut params = IndexMap::new();
        params.insert("n".to_string(), RuntimeValue::number(1.0));
        stack.push_frame("f", params, None, 1, 7);
        stack.push_frame("g", IndexMap::new(), None, 5, 9);

        stack.record_binding(7, "n", &RuntimeValue::number(2.0));
        stack.record_binding(7, "acc", &RuntimeValue::number(0.0));
        stack.record_binding(42, "ignored", &RuntimeValue::Null);

        let f = &stack.frames()[0];
        assert_eq!(f.params.get("n"), Some(&RuntimeValue::number(2.0)));
        assert_eq!(f.get_var("acc"), Some(&RuntimeValue::number(0.0)));
        assert!(stack.frames()[1].locals.is_empty());
    }
}
