//! Shared key/value store for passing data between nodes.
//!
//! A [`Blackboard`] owns only its local entries. A child scope (created for
//! a subtree) keeps an `Arc` link to its parent and falls back to it for
//! keys it cannot resolve locally. Links only point upwards, so a chain of
//! scopes can never form a cycle.

use std::any::{Any, type_name};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::BlackboardError;

type Entry = Arc<dyn Any + Send + Sync>;

/// Hierarchically scoped key/value store.
///
/// Values are type-erased and cloned out on read. Ticking is
/// single-threaded; the concurrent map only keeps trees `Send` so a host
/// can move them between threads between ticks.
#[derive(Default)]
pub struct Blackboard {
    entries: DashMap<String, Entry>,
    parent: Option<Arc<Blackboard>>,
}

impl Blackboard {
    /// Creates an empty root scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scope whose unresolved lookups go to `parent`.
    pub fn with_parent(parent: Arc<Blackboard>) -> Self {
        Self {
            entries: DashMap::new(),
            parent: Some(parent),
        }
    }

    /// Returns the parent scope, if any.
    pub fn parent(&self) -> Option<&Arc<Blackboard>> {
        self.parent.as_ref()
    }

    /// Reads a value of type `T`, searching this scope then its ancestors.
    ///
    /// # Errors
    ///
    /// - [`BlackboardError::NotFound`] if no scope holds `key`
    /// - [`BlackboardError::TypeMismatch`] if the nearest entry is not a `T`
    pub fn get<T>(&self, key: &str) -> Result<T, BlackboardError>
    where
        T: Clone + 'static,
    {
        let entry = self.lookup(key)?;
        entry
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Like [`get`](Self::get), but converts string entries with `FromStr`.
    ///
    /// Values written from text (command line, literal ports) are stored as
    /// `String`; this lets a node read them back as numbers, flags, etc.
    pub fn get_parsed<T>(&self, key: &str) -> Result<T, BlackboardError>
    where
        T: FromStr + Clone + 'static,
    {
        let entry = self.lookup(key)?;
        if let Some(value) = entry.downcast_ref::<T>() {
            return Ok(value.clone());
        }

        let text = entry
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| entry.downcast_ref::<&'static str>().copied());

        text.and_then(|s| s.parse::<T>().ok())
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Writes `value` into this scope, shadowing any ancestor entry.
    pub fn set<T>(&self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Returns `true` if this scope or an ancestor holds `key`.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key) || self.parent.as_ref().is_some_and(|p| p.has(key))
    }

    /// Removes `key` from this scope only. Returns `true` if it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Keys stored in this scope (ancestors excluded), sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    fn lookup(&self, key: &str) -> Result<Entry, BlackboardError> {
        if let Some(entry) = self.entries.get(key) {
            return Ok(Arc::clone(entry.value()));
        }
        match &self.parent {
            Some(parent) => parent.lookup(key),
            None => Err(BlackboardError::NotFound {
                key: key.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blackboard")
            .field("keys", &self.keys())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
