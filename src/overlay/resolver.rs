//! Overlay-resolving decorator
//!
//! Wraps any [`FlagValueSource`] together with an [`OverlayMap`] and applies
//! the fixed resolution precedence: explicit argument > environment variable
//! > overlay entry > compiled-in default.

use crate::flag::{FlagKind, FlagValue};
use crate::overlay::OverlayMap;
use crate::source::FlagValueSource;
use std::time::Duration;

/// Decorator that consults the overlay mapping only when the wrapped source
/// did not produce an explicit value.
///
/// Per typed getter: an env-var-supplied value wins outright; otherwise the
/// overlay is consulted when the wrapped value equals the type's zero value
/// or the wrapped source reports the default is still in effect. An explicit
/// zero-valued argument is therefore indistinguishable from "not set" and
/// cannot override an overlay entry — an accepted limitation of the
/// zero-value sentinel. Type-incompatible overlay entries are ignored and
/// the wrapped value stands.
pub struct OverlayResolver<S> {
    inner: S,
    overlay: OverlayMap,
}

impl<S: FlagValueSource> OverlayResolver<S> {
    pub fn new(inner: S, overlay: OverlayMap) -> Self {
        Self { inner, overlay }
    }

    /// Whether the overlay should be consulted for a flag whose wrapped
    /// value looks unset. Env vars outrank the overlay unconditionally.
    fn overlay_applies(&self, name: &str, value_is_zero: bool) -> bool {
        !self.inner.is_env_var_set(name)
            && (value_is_zero || self.inner.is_default_value_set(name))
    }
}

impl<S: FlagValueSource> FlagValueSource for OverlayResolver<S> {
    fn has_flag(&self, name: &str) -> bool {
        self.inner.has_flag(name)
    }

    /// Overlay presence counts as "set" for observability purposes.
    fn is_set(&self, name: &str) -> bool {
        self.inner.is_set(name) || self.overlay.contains(name)
    }

    fn is_default_value_set(&self, name: &str) -> bool {
        self.inner.is_default_value_set(name)
    }

    fn is_env_var_set(&self, name: &str) -> bool {
        self.inner.is_env_var_set(name)
    }

    fn num_flags(&self) -> usize {
        self.inner.num_flags()
    }

    fn positional_args(&self) -> &[String] {
        self.inner.positional_args()
    }

    fn int(&self, name: &str) -> i64 {
        let value = self.inner.int(name);
        if self.overlay_applies(name, value == 0) {
            if let Some(FlagValue::Int(overlay)) = self.overlay.get_as(name, FlagKind::Int) {
                return overlay;
            }
        }
        value
    }

    fn duration(&self, name: &str) -> Duration {
        let value = self.inner.duration(name);
        if self.overlay_applies(name, value == Duration::ZERO) {
            if let Some(FlagValue::Duration(overlay)) =
                self.overlay.get_as(name, FlagKind::Duration)
            {
                return overlay;
            }
        }
        value
    }

    fn float(&self, name: &str) -> f64 {
        let value = self.inner.float(name);
        if self.overlay_applies(name, value == 0.0) {
            if let Some(FlagValue::Float(overlay)) = self.overlay.get_as(name, FlagKind::Float) {
                return overlay;
            }
        }
        value
    }

    fn string(&self, name: &str) -> String {
        let value = self.inner.string(name);
        if self.overlay_applies(name, value.is_empty()) {
            if let Some(FlagValue::Str(overlay)) = self.overlay.get_as(name, FlagKind::String) {
                return overlay;
            }
        }
        value
    }

    fn string_list(&self, name: &str) -> Vec<String> {
        let value = self.inner.string_list(name);
        if self.overlay_applies(name, value.is_empty()) {
            if let Some(FlagValue::StringList(overlay)) =
                self.overlay.get_as(name, FlagKind::StringList)
            {
                return overlay;
            }
        }
        value
    }

    fn int_list(&self, name: &str) -> Vec<i64> {
        let value = self.inner.int_list(name);
        if self.overlay_applies(name, value.is_empty()) {
            if let Some(FlagValue::IntList(overlay)) = self.overlay.get_as(name, FlagKind::IntList)
            {
                return overlay;
            }
        }
        value
    }

    /// Overlay is consulted only while the wrapped value is `false`; the
    /// default-in-effect fact cannot disambiguate further for booleans.
    fn bool(&self, name: &str) -> bool {
        let value = self.inner.bool(name);
        if !self.inner.is_env_var_set(name) && !value {
            if let Some(FlagValue::Bool(overlay)) = self.overlay.get_as(name, FlagKind::Bool) {
                return overlay;
            }
        }
        value
    }

    /// Inverse zero-check of [`bool`](Self::bool): for a default-true flag
    /// the unset-looking state is `true`.
    fn bool_t(&self, name: &str) -> bool {
        let value = self.inner.bool_t(name);
        if !self.inner.is_env_var_set(name) && value {
            if let Some(FlagValue::Bool(overlay)) = self.overlay.get_as(name, FlagKind::BoolTrue) {
                return overlay;
            }
        }
        value
    }

    /// Opaque getter. The overlay entry must carry the same type tag as the
    /// wrapped value; a mismatch is surfaced loudly and the wrapped value
    /// stands — never an unchecked reinterpretation.
    fn value(&self, name: &str) -> Option<FlagValue> {
        let value = self.inner.value(name);
        if !self.inner.is_env_var_set(name)
            && (value.is_none() || self.inner.is_default_value_set(name))
        {
            if let Some(entry) = self.overlay.get(name) {
                match &value {
                    Some(current) if entry.kind() != current.kind() => {
                        let err = crate::error::Error::OverlayTypeMismatch {
                            name: name.to_string(),
                            expected: current.kind(),
                            found: entry.kind(),
                        };
                        tracing::error!(%err, "ignoring overlay entry");
                    }
                    _ => return Some(entry.clone()),
                }
            }
        }
        value
    }
}
