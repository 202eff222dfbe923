//! Lexical scopes
//!
//! Scopes live in a [`ScopeArena`] for the whole run and are addressed by
//! [`ScopeId`]. A scope never owns its parent: `parent` is a lookup-only
//! back-reference used for display. Name resolution walks an explicit chain
//! (a list of ids, outermost first), which is what function values capture
//! as their closure.
//!
//! Scopes are never freed during a run, so a closure can keep using a scope
//! after the block or call that created it has finished.

use super::value::RuntimeValue;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Index of a scope in the arena
pub type ScopeId = usize;

/// Kind of binding context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

/// A variable binding context
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub id: ScopeId,
    #[serde(rename = "type")]
    pub kind: ScopeKind,
    pub name: String,
    pub variables: IndexMap<String, RuntimeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ScopeId>,
    #[serde(skip)]
    constants: FxHashSet<String>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, name: &str, parent: Option<ScopeId>) -> Self {
        Scope {
            id,
            kind,
            name: name.to_string(),
            variables: IndexMap::new(),
            parent,
            constants: FxHashSet::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RuntimeValue> {
        self.variables.get(name)
    }
}

/// Why an assignment was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    /// The binding was declared with `const`
    Constant,
}

/// All scopes created during a run
#[derive(Debug, Clone)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// The global scope, always present
    pub const GLOBAL: ScopeId = 0;

    pub fn new() -> Self {
        ScopeArena {
            scopes: vec![Scope::new(Self::GLOBAL, ScopeKind::Global, "Global", None)],
        }
    }

    /// Create a scope whose parent is the innermost scope of `chain`
    pub fn push(&mut self, kind: ScopeKind, name: &str, chain: &[ScopeId]) -> ScopeId {
        let id = self.scopes.len();
        self.scopes
            .push(Scope::new(id, kind, name, chain.last().copied()));
        id
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id)
    }

    /// Innermost scope of `chain` that binds `name`
    pub fn resolve(&self, chain: &[ScopeId], name: &str) -> Option<ScopeId> {
        chain
            .iter()
            .rev()
            .copied()
            .find(|id| self.scopes.get(*id).is_some_and(|s| s.variables.contains_key(name)))
    }

    /// Value bound to `name`, searching innermost to outermost
    pub fn lookup(&self, chain: &[ScopeId], name: &str) -> Option<&RuntimeValue> {
        self.resolve(chain, name)
            .and_then(|id| self.scopes[id].variables.get(name))
    }

    /// Bind `name` in `scope`, replacing any previous binding there
    pub fn declare(&mut self, scope: ScopeId, name: &str, value: RuntimeValue, is_const: bool) {
        if let Some(s) = self.scopes.get_mut(scope) {
            s.variables.insert(name.to_string(), value);
            if is_const {
                s.constants.insert(name.to_string());
            } else {
                s.constants.remove(name);
            }
        }
    }

    pub fn is_const(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes
            .get(scope)
            .is_some_and(|s| s.constants.contains(name))
    }

    /// Assign to an existing binding, or create a global one if `name` is
    /// not bound anywhere in `chain`. Returns the scope that was written.
    pub fn assign(
        &mut self,
        chain: &[ScopeId],
        name: &str,
        value: RuntimeValue,
    ) -> Result<ScopeId, AssignError> {
        let target = self.resolve(chain, name).unwrap_or(Self::GLOBAL);
        if self.is_const(target, name) {
            return Err(AssignError::Constant);
        }
        if let Some(s) = self.scopes.get_mut(target) {
            s.variables.insert(name.to_string(), value);
        }
        Ok(target)
    }

    /// Innermost function (or the global) scope of `chain`, where `var` binds
    pub fn nearest_function_scope(&self, chain: &[ScopeId]) -> ScopeId {
        chain
            .iter()
            .rev()
            .copied()
            .find(|id| {
                self.scopes
                    .get(*id)
                    .is_some_and(|s| s.kind != ScopeKind::Block)
            })
            .unwrap_or(Self::GLOBAL)
    }

    /// Function scope that encloses `id`, following parent links.
    /// `None` when the scope belongs to the top level.
    pub fn owning_function_scope(&self, id: ScopeId) -> Option<ScopeId> {
        let mut current = self.scopes.get(id);
        while let Some(scope) = current {
            match scope.kind {
                ScopeKind::Function => return Some(scope.id),
                ScopeKind::Global => return None,
                ScopeKind::Block => current = scope.parent.and_then(|p| self.scopes.get(p)),
            }
        }
        None
    }

    /// Owned copies of the scopes in `chain`, outermost first
    pub fn snapshot(&self, chain: &[ScopeId]) -> Vec<Scope> {
        chain
            .iter()
            .filter_map(|id| self.scopes.get(*id).cloned())
            .collect()
    }

    /// Total number of scopes created so far
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefers_innermost() {
        let mut arena = ScopeArena::new();
        let global = ScopeArena::GLOBAL;
        arena.declare(global, "x", RuntimeValue::number(1.0), false);
        let block = arena.push(ScopeKind::Block, "block", &[global]);
        arena.declare(block, "x", RuntimeValue::number(2.0), false);

        assert_eq!(
            arena.lookup(&[global, block], "x"),
            Some(&RuntimeValue::number(2.0))
        );
        assert_eq!(arena.lookup(&[global], "x"), Some(&RuntimeValue::number(1.0)));
        assert_eq!(arena.lookup(&[global, block], "y"), None);
    }

    #[test]
    fn test_assign_undeclared_creates_global() {
        let mut arena = ScopeArena::new();
        let f = arena.push(ScopeKind::Function, "f", &[ScopeArena::GLOBAL]);

        let written = arena
            .assign(&[ScopeArena::GLOBAL, f], "leak", RuntimeValue::boolean(true))
            .unwrap();
        assert_eq!(written, ScopeArena::GLOBAL);
        assert!(arena.get(f).unwrap().get("leak").is_none());
    }

    #[test]
    fn test_assign_const_is_rejected() {
        let mut arena = ScopeArena::new();
        arena.declare(ScopeArena::GLOBAL, "k", RuntimeValue::number(1.0), true);

        let result = arena.assign(&[ScopeArena::GLOBAL], "k", RuntimeValue::number(2.0));
        assert_eq!(result, Err(AssignError::Constant));
    }

    #[test]
    fn test_var_binds_in_function_scope() {
        let mut arena = ScopeArena::new();
        let f = arena.push(ScopeKind::Function, "f", &[ScopeArena::GLOBAL]);
        let block = arena.push(ScopeKind::Block, "block", &[ScopeArena::GLOBAL, f]);

        let chain = [ScopeArena::GLOBAL, f, block];
        assert_eq!(arena.nearest_function_scope(&chain), f);
        assert_eq!(arena.owning_function_scope(block), Some(f));
        assert_eq!(arena.owning_function_scope(ScopeArena::GLOBAL), None);
    }
}
