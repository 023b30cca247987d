// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct Environment {
    bindings: RefCell<HashMap<Rc<str>, Value>>,
    parent: Option<Rc<Environment>>,
}

/// Deliberately shallow: a frame's bindings can hold a `Proc` whose captured
/// environment is this very frame, so walking into binding values here would
/// recurse forever.
impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.bindings.borrow().len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl Environment {
    /// Creates a new global environment with no parent
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope (doesn't walk parent chain). Rebinding
    /// an existing name in the same frame is an update, not an error.
    pub fn define(&self, name: Rc<str>, value: Value) -> Option<Value> {
        self.bindings.borrow_mut().insert(name, value)
    }

    /// Looks up a symbol in THIS scope and parent scopes recursively
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub fn get_or_unbound(&self, name: &str) -> Result<Value, EvalError> {
        self.get(name).ok_or_else(|| EvalError::unbound_symbol(name))
    }

    /// Walks the chain updating the first frame that already binds `name`.
    /// Not a MAL special form (MAL has no `set!`); used internally for
    /// sequential `let*` binding visibility.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(Rc::from(name), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.set(name, value),
            None => Err(EvalError::unbound_symbol(name)),
        }
    }

    /// Follows the parent chain to the global frame, used by the `eval`
    /// builtin to discard the caller's lexical environment.
    pub fn root(self: &Rc<Self>) -> Rc<Self> {
        let mut current = Rc::clone(self);
        loop {
            let next = match &current.parent {
                Some(p) => Rc::clone(p),
                None => return current,
            };
            current = next;
        }
    }

    /// Bindings defined directly in this frame, for the `env` introspection
    /// builtin. Does not walk the parent chain.
    pub fn snapshot(&self) -> Vec<(Rc<str>, Value)> {
        self.bindings
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define(Rc::from("x"), Value::Int(42));
        assert_eq!(env.get("x").and_then(|v| v.as_int()), Some(42));
    }

    #[test]
    fn undefined_symbol() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn redefine_in_same_frame_is_an_update() {
        let env = Environment::new();
        env.define(Rc::from("x"), Value::Int(1));
        env.define(Rc::from("x"), Value::Int(2));
        assert_eq!(env.get("x").and_then(|v| v.as_int()), Some(2));
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define(Rc::from("x"), Value::Int(42));

        let child = Environment::with_parent(parent);
        child.define(Rc::from("x"), Value::Int(100));

        assert_eq!(child.get("x").and_then(|v| v.as_int()), Some(100));
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::new();
        parent.define(Rc::from("x"), Value::Int(42));
        let child = Environment::with_parent(parent);
        assert_eq!(child.get("x").and_then(|v| v.as_int()), Some(42));
    }

    #[test]
    fn multi_level_lookup() {
        let grandparent = Environment::new();
        grandparent.define(Rc::from("a"), Value::Int(1));
        let parent = Environment::with_parent(grandparent);
        parent.define(Rc::from("b"), Value::Int(2));
        let child = Environment::with_parent(parent);
        child.define(Rc::from("c"), Value::Int(3));

        assert_eq!(child.get("a").and_then(|v| v.as_int()), Some(1));
        assert_eq!(child.get("b").and_then(|v| v.as_int()), Some(2));
        assert_eq!(child.get("c").and_then(|v| v.as_int()), Some(3));
    }

    #[test]
    fn root_walks_to_global_frame() {
        let global = Environment::new();
        global.define(Rc::from("g"), Value::Int(7));
        let child = Environment::with_parent(Environment::with_parent(global));
        let root = child.root();
        assert_eq!(root.get("g").and_then(|v| v.as_int()), Some(7));
        assert!(root.snapshot().iter().any(|(k, _)| &**k == "g"));
    }
}
