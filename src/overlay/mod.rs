//! File-sourced overlay values
//!
//! An [`OverlayMap`] is a flat name → value table decoded once at command
//! start, consulted by an [`OverlayResolver`] only for flags the primary
//! source did not explicitly set. Read-only after construction.

pub mod loader;
pub mod resolver;

pub use loader::load_overlay;
pub use resolver::OverlayResolver;

use crate::flag::{FlagKind, FlagValue};
use std::collections::HashMap;

/// Flat mapping from flag name to a typed value.
#[derive(Debug, Default, Clone)]
pub struct OverlayMap {
    entries: HashMap<String, FlagValue>,
}

impl OverlayMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from name/value pairs.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, FlagValue)>,
    {
        Self { entries: entries.into_iter().collect() }
    }

    pub(crate) fn insert(&mut self, name: String, value: FlagValue) {
        self.entries.insert(name, value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type-checked lookup: the entry for `name` if it is compatible with
    /// `kind`, else `None`.
    ///
    /// A string entry is accepted for a duration flag when it parses as a
    /// duration ("5s", "2m"); that is the one coercion, since duration
    /// values have no native representation in the overlay file formats.
    /// Incompatible entries are ignored with a warning, never an error.
    pub fn get_as(&self, name: &str, kind: FlagKind) -> Option<FlagValue> {
        let entry = self.entries.get(name)?;
        if kind.accepts(entry) {
            return Some(entry.clone());
        }
        if kind == FlagKind::Duration {
            if let FlagValue::Str(raw) = entry {
                if let Ok(parsed) = humantime::parse_duration(raw.trim()) {
                    return Some(FlagValue::Duration(parsed));
                }
            }
        }
        tracing::warn!(
            flag = name,
            expected = ?kind,
            found = ?entry.kind(),
            "ignoring overlay entry with mismatched type"
        );
        None
    }
}

impl FromIterator<(String, FlagValue)> for OverlayMap {
    fn from_iter<I: IntoIterator<Item = (String, FlagValue)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}
