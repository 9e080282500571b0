//! Read-only façade handed to command actions

use crate::flag::FlagValue;
use crate::source::FlagValueSource;
use std::time::Duration;

/// Per-invocation view over one flag value source.
///
/// Constructed by the command runner after parsing (and, when enabled,
/// overlay loading) and discarded when the action returns. Every lookup
/// forwards to the underlying source, which may itself be an
/// [`OverlayResolver`](crate::overlay::OverlayResolver).
pub struct ExecutionContext {
    source: Box<dyn FlagValueSource>,
}

impl ExecutionContext {
    pub fn new(source: Box<dyn FlagValueSource>) -> Self {
        Self { source }
    }

    /// True if a flag with this name is registered.
    pub fn has_flag(&self, name: &str) -> bool {
        self.source.has_flag(name)
    }

    /// True if the value was explicitly supplied.
    pub fn is_set(&self, name: &str) -> bool {
        self.source.is_set(name)
    }

    /// True if the flag currently holds its compiled-in default.
    pub fn is_default_value_set(&self, name: &str) -> bool {
        self.source.is_default_value_set(name)
    }

    /// True if the flag's associated environment variable supplied the value.
    pub fn is_env_var_set(&self, name: &str) -> bool {
        self.source.is_env_var_set(name)
    }

    /// Number of flags explicitly set on the command line.
    pub fn num_flags(&self) -> usize {
        self.source.num_flags()
    }

    /// Positional arguments left over after flag parsing.
    pub fn positional_args(&self) -> &[String] {
        self.source.positional_args()
    }

    pub fn int(&self, name: &str) -> i64 {
        self.source.int(name)
    }

    pub fn duration(&self, name: &str) -> Duration {
        self.source.duration(name)
    }

    pub fn float(&self, name: &str) -> f64 {
        self.source.float(name)
    }

    pub fn string(&self, name: &str) -> String {
        self.source.string(name)
    }

    pub fn string_list(&self, name: &str) -> Vec<String> {
        self.source.string_list(name)
    }

    pub fn int_list(&self, name: &str) -> Vec<i64> {
        self.source.int_list(name)
    }

    pub fn bool(&self, name: &str) -> bool {
        self.source.bool(name)
    }

    /// Boolean getter for flags registered with
    /// [`FlagSpec::bool_true`](crate::flag::FlagSpec::bool_true).
    pub fn bool_t(&self, name: &str) -> bool {
        self.source.bool_t(name)
    }

    /// The current value with its type tag, or `None` for an unknown flag.
    pub fn value(&self, name: &str) -> Option<FlagValue> {
        self.source.value(name)
    }
}
