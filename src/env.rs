//! Environment variable lookup capability
//!
//! Flag resolution never reads the process environment directly; it goes
//! through this trait so tests can supply scoped values without mutating
//! global process state.

use std::collections::HashMap;

/// Key/value lookup backing environment-variable flag resolution.
pub trait EnvLookup {
    /// Value of `key`, or `None` when unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment table.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed in-memory table, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    entries: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder-style.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl EnvLookup for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}
