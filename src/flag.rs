//! Flag descriptors and the tagged value union

use std::time::Duration;

/// Semantic type of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Int,
    Duration,
    Float,
    String,
    StringList,
    IntList,
    Bool,
    /// Boolean whose compiled-in default is `true`; supplying the flag on the
    /// command line turns it off.
    BoolTrue,
}

impl FlagKind {
    /// The value a flag of this kind holds when nothing supplied it.
    ///
    /// For `BoolTrue` the unset-looking state is `true`, not `false` — the
    /// overlay resolution algorithm relies on this inversion.
    pub fn zero(self) -> FlagValue {
        match self {
            FlagKind::Int => FlagValue::Int(0),
            FlagKind::Duration => FlagValue::Duration(Duration::ZERO),
            FlagKind::Float => FlagValue::Float(0.0),
            FlagKind::String => FlagValue::Str(String::new()),
            FlagKind::StringList => FlagValue::StringList(Vec::new()),
            FlagKind::IntList => FlagValue::IntList(Vec::new()),
            FlagKind::Bool => FlagValue::Bool(false),
            FlagKind::BoolTrue => FlagValue::Bool(true),
        }
    }

    /// Whether a stored value is type-compatible with this kind.
    ///
    /// `Bool` and `BoolTrue` flags both carry plain boolean values.
    pub fn accepts(self, value: &FlagValue) -> bool {
        matches!(
            (self, value),
            (FlagKind::Int, FlagValue::Int(_))
                | (FlagKind::Duration, FlagValue::Duration(_))
                | (FlagKind::Float, FlagValue::Float(_))
                | (FlagKind::String, FlagValue::Str(_))
                | (FlagKind::StringList, FlagValue::StringList(_))
                | (FlagKind::IntList, FlagValue::IntList(_))
                | (FlagKind::Bool, FlagValue::Bool(_))
                | (FlagKind::BoolTrue, FlagValue::Bool(_))
        )
    }
}

/// A typed flag value.
///
/// Used both for compiled-in defaults and for overlay entries, so overlay
/// lookups are exhaustive matches instead of runtime casts.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Int(i64),
    Duration(Duration),
    Float(f64),
    Str(String),
    StringList(Vec<String>),
    IntList(Vec<i64>),
    Bool(bool),
}

impl FlagValue {
    /// The base kind of this value. Boolean values report [`FlagKind::Bool`]
    /// regardless of whether the owning flag defaults to true.
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::Int(_) => FlagKind::Int,
            FlagValue::Duration(_) => FlagKind::Duration,
            FlagValue::Float(_) => FlagKind::Float,
            FlagValue::Str(_) => FlagKind::String,
            FlagValue::StringList(_) => FlagKind::StringList,
            FlagValue::IntList(_) => FlagKind::IntList,
            FlagValue::Bool(_) => FlagKind::Bool,
        }
    }
}

/// Descriptor for one named flag: its semantic type, optional compiled-in
/// default, and optional associated environment variable.
#[derive(Debug, Clone)]
pub struct FlagSpec {
    pub name: String,
    pub kind: FlagKind,
    pub default: Option<FlagValue>,
    pub env_var: Option<String>,
    pub usage: String,
}

impl FlagSpec {
    /// Create a descriptor with no default and no environment variable.
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self { name: name.into(), kind, default: None, env_var: None, usage: String::new() }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Int)
    }

    pub fn duration(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Duration)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::String)
    }

    pub fn string_list(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::StringList)
    }

    pub fn int_list(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::IntList)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Bool)
    }

    /// A boolean flag that defaults to `true`; passing it on the command line
    /// sets it to `false`.
    pub fn bool_true(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::BoolTrue)
    }

    /// Set the compiled-in default value.
    pub fn default_value(mut self, value: FlagValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Associate an environment variable with this flag.
    pub fn env_var(mut self, var: impl Into<String>) -> Self {
        self.env_var = Some(var.into());
        self
    }

    /// Set the one-line help text.
    pub fn usage(mut self, text: impl Into<String>) -> Self {
        self.usage = text.into();
        self
    }

    /// The compiled-in default, falling back to the kind's zero value.
    pub(crate) fn effective_default(&self) -> FlagValue {
        self.default.clone().unwrap_or_else(|| self.kind.zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_per_kind() {
        assert_eq!(FlagKind::Int.zero(), FlagValue::Int(0));
        assert_eq!(FlagKind::Duration.zero(), FlagValue::Duration(Duration::ZERO));
        assert_eq!(FlagKind::String.zero(), FlagValue::Str(String::new()));
        assert_eq!(FlagKind::Bool.zero(), FlagValue::Bool(false));
        // The default-true boolean's unset-looking state is inverted.
        assert_eq!(FlagKind::BoolTrue.zero(), FlagValue::Bool(true));
    }

    #[test]
    fn test_accepts_matches_tags() {
        assert!(FlagKind::Int.accepts(&FlagValue::Int(3)));
        assert!(!FlagKind::Int.accepts(&FlagValue::Str("3".into())));
        assert!(FlagKind::Bool.accepts(&FlagValue::Bool(true)));
        assert!(FlagKind::BoolTrue.accepts(&FlagValue::Bool(false)));
        assert!(!FlagKind::Float.accepts(&FlagValue::Int(1)));
    }

    #[test]
    fn test_effective_default_prefers_declared() {
        let spec = FlagSpec::int("port").default_value(FlagValue::Int(8080));
        assert_eq!(spec.effective_default(), FlagValue::Int(8080));
        assert_eq!(FlagSpec::int("port").effective_default(), FlagValue::Int(0));
    }
}
