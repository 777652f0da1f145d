use std::collections::HashMap;

use super::value::Value;

/// Default cap on the number of distinct variables in a store
pub const DEFAULT_CAPACITY: usize = 1000;

/// Flat variable store
///
/// There is a single global scope; blocks do not introduce bindings of
/// their own. The store holds at most `capacity` distinct names, and
/// rebinding an existing name never counts against the cap.
#[derive(Debug, Clone)]
pub struct Environment {
    vars: HashMap<String, Value>,
    capacity: usize,
}

impl Environment {
    /// Creates a store with the default capacity
    pub fn new() -> Self {
        Environment::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a store that holds at most `capacity` distinct names
    pub fn with_capacity(capacity: usize) -> Self {
        Environment {
            vars: HashMap::new(),
            capacity,
        }
    }

    /// Reads a variable, returning a copy of its value
    pub fn get(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }

    /// Binds or rebinds a variable
    ///
    /// Returns `false` when the store is full and `name` is not already
    /// bound; the caller turns that into a positioned error.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if !self.vars.contains_key(name) && self.vars.len() >= self.capacity {
            return false;
        }
        self.vars.insert(name.to_string(), value);
        true
    }

    /// Number of distinct bound names
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no variable is bound
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// The store's capacity limit
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut env = Environment::new();
        assert!(env.set("x", Value::Int(5)));
        assert_eq!(env.get("x"), Some(Value::Int(5)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_rebind_replaces() {
        let mut env = Environment::new();
        assert!(env.set("x", Value::Int(1)));
        assert!(env.set("x", Value::Str("duo".to_string())));
        assert_eq!(env.get("x"), Some(Value::Str("duo".to_string())));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_capacity_blocks_new_names_only() {
        let mut env = Environment::with_capacity(2);
        assert!(env.set("a", Value::Int(1)));
        assert!(env.set("b", Value::Int(2)));
        assert!(!env.set("c", Value::Int(3)));
        // Rebinding an existing name still works at the cap.
        assert!(env.set("a", Value::Int(9)));
        assert_eq!(env.get("a"), Some(Value::Int(9)));
        assert_eq!(env.get("c"), None);
    }

    #[test]
    fn test_get_returns_copy() {
        let mut env = Environment::new();
        env.set("s", Value::Str("unum".to_string()));
        let copy = env.get("s").unwrap();
        env.set("s", Value::Str("aliud".to_string()));
        assert_eq!(copy, Value::Str("unum".to_string()));
    }
}
