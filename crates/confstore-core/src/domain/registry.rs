//! Registry of per-key configuration handlers.
//!
//! A handler is a callback bound to one exact `(section, key)` pair.  It is
//! called with the current string value whenever dispatch reaches that pair
//! (see [`ConfigStore::apply_config_logic`](crate::ConfigStore::apply_config_logic)).
//!
//! # Lookup structure
//!
//! Handlers live in a two-level map, `section → key → handler`, so a lookup
//! is two plain string hashes and no composite key type needs its own hash
//! function.  Matching is exact: no wildcards, no case folding.
//!
//! # What handlers may do
//!
//! Anything.  The registry only guarantees *that* and *when* a handler runs.
//! A handler that wants to report a problem returns [`HandlerError`]; the
//! caller of dispatch decides what to do with it.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Failure reported by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type returned by handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// A boxed handler callback.
///
/// `Send` so that a whole store can be moved into (or behind) a `Mutex` by
/// callers that need to share it between threads.
pub type ConfigHandler = Box<dyn FnMut(&str) -> HandlerResult + Send>;

/// Identity of a handler: an exact `(section, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerKey {
    pub section: String,
    pub key: String,
}

impl HandlerKey {
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.section, self.key)
    }
}

/// Mapping from `(section, key)` to at most one handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HashMap<String, ConfigHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `(section, key)`, replacing any existing one.
    ///
    /// No check is made that the pair exists in any document.  Returns `true`
    /// if an earlier handler was replaced.
    pub fn register<F>(&mut self, section: &str, key: &str, handler: F) -> bool
    where
        F: FnMut(&str) -> HandlerResult + Send + 'static,
    {
        self.handlers
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), Box::new(handler))
            .is_some()
    }

    /// Chainable form of [`register`](Self::register).
    pub fn with<F>(mut self, section: &str, key: &str, handler: F) -> Self
    where
        F: FnMut(&str) -> HandlerResult + Send + 'static,
    {
        self.register(section, key, handler);
        self
    }

    /// Removes the handler for `(section, key)`.  Returns `true` if one existed.
    pub fn unregister(&mut self, section: &str, key: &str) -> bool {
        let Some(by_key) = self.handlers.get_mut(section) else {
            return false;
        };
        let removed = by_key.remove(key).is_some();
        if by_key.is_empty() {
            self.handlers.remove(section);
        }
        removed
    }

    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.handlers
            .get(section)
            .is_some_and(|by_key| by_key.contains_key(key))
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Snapshot of all registered pairs, sorted.
    pub fn keys(&self) -> Vec<HandlerKey> {
        let mut keys: Vec<HandlerKey> = self
            .handlers
            .iter()
            .flat_map(|(section, by_key)| {
                by_key.keys().map(move |key| HandlerKey::new(section, key))
            })
            .collect();
        keys.sort();
        keys
    }

    /// Runs the handler for `(section, key)` with `value`.
    ///
    /// Returns `None` when no handler is registered for the pair.
    pub fn invoke(&mut self, section: &str, key: &str, value: &str) -> Option<HandlerResult> {
        let handler = self.handlers.get_mut(section)?.get_mut(key)?;
        Some(handler(value))
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Returns a handler that records every value it sees into `log`.
    fn recorder(log: &Arc<Mutex<Vec<String>>>) -> impl FnMut(&str) -> HandlerResult + Send {
        let log = Arc::clone(log);
        move |value: &str| {
            log.lock().expect("lock poisoned").push(value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_then_invoke_passes_value() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry.register("db", "host", recorder(&log));

        // Act
        let result = registry.invoke("db", "host", "x");

        // Assert
        assert_eq!(result, Some(Ok(())));
        assert_eq!(*log.lock().unwrap(), vec!["x".to_string()]);
    }

    #[test]
    fn test_invoke_without_handler_is_none() {
        let mut registry = HandlerRegistry::new().with("db", "host", |_| Ok(()));
        assert_eq!(registry.invoke("db", "port", "1"), None);
        assert_eq!(registry.invoke("other", "host", "1"), None);
    }

    #[test]
    fn test_register_replaces_existing_handler() {
        // Arrange
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        let replaced_initially = registry.register("a", "k", recorder(&first));

        // Act
        let replaced = registry.register("a", "k", recorder(&second));
        registry.invoke("a", "k", "v");

        // Assert
        assert!(!replaced_initially);
        assert!(replaced);
        assert_eq!(registry.len(), 1);
        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec!["v".to_string()]);
    }

    #[test]
    fn test_failing_handler_result_is_returned() {
        let mut registry =
            HandlerRegistry::new().with("a", "k", |v| Err(HandlerError::new(format!("bad {v}"))));
        assert_eq!(
            registry.invoke("a", "k", "1"),
            Some(Err(HandlerError::new("bad 1")))
        );
    }

    #[test]
    fn test_matching_is_exact() {
        let registry = HandlerRegistry::new().with("DB", "host", |_| Ok(()));
        assert!(registry.contains("DB", "host"));
        assert!(!registry.contains("db", "host"));
        assert!(!registry.contains("DB", "Host"));
    }

    #[test]
    fn test_pairs_that_would_collide_when_concatenated_stay_distinct() {
        let registry = HandlerRegistry::new()
            .with("ab", "c", |_| Ok(()))
            .with("a", "bc", |_| Ok(()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister_removes_only_that_pair() {
        // Arrange
        let mut registry = HandlerRegistry::new()
            .with("a", "x", |_| Ok(()))
            .with("a", "y", |_| Ok(()));

        // Act
        let removed = registry.unregister("a", "x");
        let removed_again = registry.unregister("a", "x");

        // Assert
        assert!(removed);
        assert!(!removed_again);
        assert!(registry.contains("a", "y"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_last_key_leaves_registry_empty() {
        let mut registry = HandlerRegistry::new().with("a", "x", |_| Ok(()));
        registry.unregister("a", "x");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_keys_are_sorted() {
        let registry = HandlerRegistry::new()
            .with("b", "k", |_| Ok(()))
            .with("a", "z", |_| Ok(()))
            .with("a", "m", |_| Ok(()));
        assert_eq!(
            registry.keys(),
            vec![
                HandlerKey::new("a", "m"),
                HandlerKey::new("a", "z"),
                HandlerKey::new("b", "k"),
            ]
        );
    }

    #[test]
    fn test_handler_key_display() {
        assert_eq!(HandlerKey::new("db", "host").to_string(), "[db] host");
    }
}
