//! Variable bindings, chained through parent scopes.
//!
//! Mirrors the source's symbol table: `set` always writes the current
//! frame (there is no separate declare/assign distinction - `var x = 1`
//! and a bare reassignment both just call this), while `get` walks the
//! parent chain looking for the nearest binding.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Writes `name` into this frame, shadowing (but not touching) any
    /// binding of the same name further up the chain.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub fn remove(&self, name: &str) {
        self.bindings.borrow_mut().remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let env = Environment::new();
        env.set("x", Value::number(42.0));
        assert!(env.get("x").unwrap().is_true());
    }

    #[test]
    fn undefined_is_none() {
        let env = Environment::new();
        assert!(env.get("missing").is_none());
    }

    #[test]
    fn child_shadows_without_mutating_parent() {
        let parent = Environment::new();
        parent.set("x", Value::number(1.0));

        let child = Environment::with_parent(parent.clone());
        child.set("x", Value::number(2.0));

        assert!(matches!(child.get("x").unwrap().kind, crate::value::ValueKind::Number(n) if n == 2.0));
        assert!(matches!(parent.get("x").unwrap().kind, crate::value::ValueKind::Number(n) if n == 1.0));
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::new();
        parent.set("x", Value::number(42.0));
        let child = Environment::with_parent(parent);
        assert!(matches!(child.get("x").unwrap().kind, crate::value::ValueKind::Number(n) if n == 42.0));
    }
}
