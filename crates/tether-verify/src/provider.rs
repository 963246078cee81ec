//! Argument providers
//!
//! A provider supplies a value for a specific operation parameter when the
//! type's natural default is unsuitable, e.g. a size that must be positive.

use std::collections::HashMap;
use tether_domain::{OperationDescriptor, ParamType, Value};

/// Strategy mapping (operation, position, type) to an argument value
///
/// Returning `None` falls back to the type's default value.
pub trait ArgumentProvider {
    /// Value for parameter `position` of `operation`, if any
    fn provide(&self, operation: &OperationDescriptor, position: usize, ty: ParamType) -> Option<Value>;
}

impl<F> ArgumentProvider for F
where
    F: Fn(&OperationDescriptor, usize, ParamType) -> Option<Value>,
{
    fn provide(&self, operation: &OperationDescriptor, position: usize, ty: ParamType) -> Option<Value> {
        self(operation, position, ty)
    }
}

/// Pin a closure's signature so it can be used as a provider
///
/// # Examples
///
/// ```
/// use tether_domain::Value;
/// use tether_verify::provider;
///
/// let provider = provider::from_fn(|op, _pos, _ty| {
///     (op.name == "max_inbound_metadata_size").then_some(Value::I32(1))
/// });
/// # let _ = provider;
/// ```
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&OperationDescriptor, usize, ParamType) -> Option<Value>,
{
    f
}

/// Provider that never supplies anything
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultArguments;

impl ArgumentProvider for DefaultArguments {
    fn provide(&self, _operation: &OperationDescriptor, _position: usize, _ty: ParamType) -> Option<Value> {
        None
    }
}

/// Table of values keyed by operation name, parameter position and type
///
/// The type is taken from the supplied value, so overloads sharing a name
/// get separate entries and an entry only applies to parameters of its own
/// type.
#[derive(Debug, Clone, Default)]
pub struct ProvidedArguments {
    values: HashMap<(String, usize, ParamType), Value>,
}

impl ProvidedArguments {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply `value` for parameter `position` of `operation`
    ///
    /// Applies to overloads whose parameter at `position` has the value's
    /// type.
    pub fn with(mut self, operation: &str, position: usize, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.values
            .insert((operation.to_string(), position, value.param_type()), value);
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the table is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ArgumentProvider for ProvidedArguments {
    fn provide(&self, operation: &OperationDescriptor, position: usize, ty: ParamType) -> Option<Value> {
        self.values.get(&(operation.name.to_string(), position, ty)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_domain::ParamSpec;

    const SIZE: &[ParamSpec] = &[ParamSpec::new("bytes", ParamType::I32)];
    const OP: OperationDescriptor = OperationDescriptor::fluent("max_size", SIZE);

    #[test]
    fn test_default_arguments() {
        assert_eq!(DefaultArguments.provide(&OP, 0, ParamType::I32), None);
    }

    #[test]
    fn test_table() {
        let provider = ProvidedArguments::new().with("max_size", 0, 1i32);
        assert_eq!(provider.provide(&OP, 0, ParamType::I32), Some(Value::I32(1)));
        assert_eq!(provider.provide(&OP, 1, ParamType::I32), None);
    }

    #[test]
    fn test_table_distinguishes_overloads() {
        const WIDE: &[ParamSpec] = &[ParamSpec::new("bytes", ParamType::I64)];
        const WIDE_OP: OperationDescriptor = OperationDescriptor::fluent("max_size", WIDE);

        let provider = ProvidedArguments::new()
            .with("max_size", 0, 1i32)
            .with("max_size", 0, 2i64);

        assert_eq!(provider.len(), 2);
        assert_eq!(provider.provide(&OP, 0, ParamType::I32), Some(Value::I32(1)));
        assert_eq!(provider.provide(&WIDE_OP, 0, ParamType::I64), Some(Value::I64(2)));
    }

    #[test]
    fn test_table_entry_ignored_for_other_types() {
        let provider = ProvidedArguments::new().with("max_size", 0, 1i64);
        assert_eq!(provider.provide(&OP, 0, ParamType::I32), None);
    }

    #[test]
    fn test_closure() {
        let provider = from_fn(|op, pos, _ty| {
            (op.name == "max_size" && pos == 0).then_some(Value::I32(7))
        });
        assert_eq!(provider.provide(&OP, 0, ParamType::I32), Some(Value::I32(7)));
    }
}
