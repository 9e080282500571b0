//! Flag value sources
//!
//! A [`FlagValueSource`] exposes typed flag values plus their provenance
//! facts (explicitly set, default in effect, env-var supplied) from one parse
//! result. [`ArgSource`] is the direct adapter over the argument parser; an
//! [`OverlayResolver`](crate::overlay::OverlayResolver) wraps any source and
//! adds file-sourced fallback values. Either can back an
//! [`ExecutionContext`](crate::context::ExecutionContext).

pub mod args;

pub use args::ArgSource;

use crate::flag::FlagValue;
use std::time::Duration;

/// Read contract over one parse result.
///
/// Typed getters return the type's zero/empty value for unknown flags —
/// never an error. Unknown-flag handling is a caller responsibility, not
/// this layer's.
pub trait FlagValueSource {
    /// True if a flag with this name is registered.
    fn has_flag(&self, name: &str) -> bool;

    /// True if the value was explicitly supplied (by argument or, for an
    /// overlay-wrapped source, by overlay presence).
    fn is_set(&self, name: &str) -> bool;

    /// True if the flag currently holds its compiled-in default.
    fn is_default_value_set(&self, name: &str) -> bool;

    /// True if the flag's associated environment variable supplied the value.
    fn is_env_var_set(&self, name: &str) -> bool;

    /// Number of flags explicitly set on the command line.
    fn num_flags(&self) -> usize;

    /// Positional arguments left over after flag parsing.
    fn positional_args(&self) -> &[String];

    fn int(&self, name: &str) -> i64;

    fn duration(&self, name: &str) -> Duration;

    fn float(&self, name: &str) -> f64;

    fn string(&self, name: &str) -> String;

    fn string_list(&self, name: &str) -> Vec<String>;

    fn int_list(&self, name: &str) -> Vec<i64>;

    fn bool(&self, name: &str) -> bool;

    /// Boolean getter for flags registered with
    /// [`FlagSpec::bool_true`](crate::flag::FlagSpec::bool_true).
    fn bool_t(&self, name: &str) -> bool;

    /// Opaque getter: the current value with its type tag, or `None` for an
    /// unknown flag.
    fn value(&self, name: &str) -> Option<FlagValue>;
}
