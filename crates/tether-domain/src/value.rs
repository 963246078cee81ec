//! Value module - typed argument values and their parameter types

use std::fmt;
use std::time::Duration;

/// Type of a single operation parameter
///
/// The set is deliberately small: each type has exactly one natural
/// default (see [`ParamType::default_value`]) used when synthesizing
/// arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamType {
    /// Boolean flag
    Bool,

    /// 32-bit signed integer
    I32,

    /// 64-bit signed integer
    I64,

    /// Owned string
    Text,

    /// Time span
    Duration,

    /// Nullable string reference
    OptionalText,
}

impl ParamType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Bool => "bool",
            ParamType::I32 => "i32",
            ParamType::I64 => "i64",
            ParamType::Text => "String",
            ParamType::Duration => "Duration",
            ParamType::OptionalText => "Option<String>",
        }
    }

    /// Natural default value for this type
    ///
    /// - integers: `0`
    /// - text: empty string
    /// - bool: `false`
    /// - duration: zero
    /// - optional reference: `None`
    pub fn default_value(&self) -> Value {
        match self {
            ParamType::Bool => Value::Bool(false),
            ParamType::I32 => Value::I32(0),
            ParamType::I64 => Value::I64(0),
            ParamType::Text => Value::Text(String::new()),
            ParamType::Duration => Value::Duration(Duration::ZERO),
            ParamType::OptionalText => Value::OptionalText(None),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed argument value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Boolean flag
    Bool(bool),

    /// 32-bit signed integer
    I32(i32),

    /// 64-bit signed integer
    I64(i64),

    /// Owned string
    Text(String),

    /// Time span
    Duration(Duration),

    /// Nullable string reference
    OptionalText(Option<String>),
}

impl Value {
    /// Parameter type this value inhabits
    pub fn param_type(&self) -> ParamType {
        match self {
            Value::Bool(_) => ParamType::Bool,
            Value::I32(_) => ParamType::I32,
            Value::I64(_) => ParamType::I64,
            Value::Text(_) => ParamType::Text,
            Value::Duration(_) => ParamType::Duration,
            Value::OptionalText(_) => ParamType::OptionalText,
        }
    }

    /// Integer view of the value, widened to `i64`
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Value-equality used when comparing forwarded arguments
    ///
    /// Integers compare numerically regardless of width, so `I32(1)` matches
    /// `I64(1)`. Every other variant compares structurally.
    pub fn matches(&self, other: &Value) -> bool {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}i32", v),
            Value::I64(v) => write!(f, "{}i64", v),
            Value::Text(v) => write!(f, "{:?}", v),
            Value::Duration(v) => write!(f, "{:?}", v),
            Value::OptionalText(Some(v)) => write!(f, "Some({:?})", v),
            Value::OptionalText(None) => f.write_str("None"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        Value::OptionalText(v)
    }
}

/// Documented precondition on a parameter
///
/// Operations reject arguments that violate their precondition. Argument
/// synthesis checks the precondition up front so a missing provider entry
/// is reported as a test-authoring error instead of a spurious failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precondition {
    /// Strictly greater than zero
    Positive,

    /// Zero or greater
    NonNegative,

    /// Non-empty text
    NonEmpty,
}

impl Precondition {
    /// Human-readable description
    pub fn as_str(&self) -> &'static str {
        match self {
            Precondition::Positive => "must be positive",
            Precondition::NonNegative => "must not be negative",
            Precondition::NonEmpty => "must not be empty",
        }
    }

    /// Check whether a value satisfies this precondition
    ///
    /// Values of a type the precondition does not speak about are accepted.
    pub fn is_satisfied_by(&self, value: &Value) -> bool {
        match (self, value) {
            (Precondition::Positive, Value::Duration(d)) => !d.is_zero(),
            (Precondition::Positive, v) => v.as_integer().is_none_or(|n| n > 0),
            (Precondition::NonNegative, v) => v.as_integer().is_none_or(|n| n >= 0),
            (Precondition::NonEmpty, Value::Text(s)) => !s.is_empty(),
            (Precondition::NonEmpty, Value::OptionalText(Some(s))) => !s.is_empty(),
            (Precondition::NonEmpty, _) => true,
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_table() {
        assert_eq!(ParamType::Bool.default_value(), Value::Bool(false));
        assert_eq!(ParamType::I32.default_value(), Value::I32(0));
        assert_eq!(ParamType::I64.default_value(), Value::I64(0));
        assert_eq!(ParamType::Text.default_value(), Value::Text(String::new()));
        assert_eq!(ParamType::Duration.default_value(), Value::Duration(Duration::ZERO));
        assert_eq!(ParamType::OptionalText.default_value(), Value::OptionalText(None));
    }

    #[test]
    fn test_default_matches_type() {
        for ty in [
            ParamType::Bool,
            ParamType::I32,
            ParamType::I64,
            ParamType::Text,
            ParamType::Duration,
            ParamType::OptionalText,
        ] {
            assert_eq!(ty.default_value().param_type(), ty);
        }
    }

    #[test]
    fn test_numeric_matching_across_widths() {
        assert!(Value::I32(1).matches(&Value::I64(1)));
        assert!(!Value::I32(1).matches(&Value::I64(2)));
        assert!(!Value::I32(0).matches(&Value::Bool(false)));
        assert!(Value::Text("a".into()).matches(&Value::Text("a".into())));
    }

    #[test]
    fn test_preconditions() {
        assert!(!Precondition::Positive.is_satisfied_by(&Value::I32(0)));
        assert!(Precondition::Positive.is_satisfied_by(&Value::I32(1)));
        assert!(!Precondition::Positive.is_satisfied_by(&Value::Duration(Duration::ZERO)));
        assert!(Precondition::NonNegative.is_satisfied_by(&Value::I64(0)));
        assert!(!Precondition::NonNegative.is_satisfied_by(&Value::I64(-1)));
        assert!(!Precondition::NonEmpty.is_satisfied_by(&Value::Text(String::new())));
        assert!(Precondition::NonEmpty.is_satisfied_by(&Value::Bool(false)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::I32(42).to_string(), "42i32");
        assert_eq!(Value::OptionalText(None).to_string(), "None");
        assert_eq!(ParamType::OptionalText.to_string(), "Option<String>");
    }

    proptest! {
        #[test]
        fn prop_integer_matching_is_numeric(n in any::<i32>()) {
            prop_assert!(Value::I32(n).matches(&Value::I64(i64::from(n))));
            prop_assert!(Value::I64(i64::from(n)).matches(&Value::I32(n)));
        }

        #[test]
        fn prop_positive_agrees_with_sign(n in any::<i64>()) {
            prop_assert_eq!(Precondition::Positive.is_satisfied_by(&Value::I64(n)), n > 0);
        }
    }
}
