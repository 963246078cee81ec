//! Typed access to a dynamically supplied argument list

use crate::error::DispatchError;
use crate::operation::OperationDescriptor;
use crate::value::{ParamType, Value};
use std::time::Duration;

/// Argument list checked against an operation's declared parameters
///
/// Construction validates arity and every argument's type, so the typed
/// accessors only fail when asked for the wrong type at a position.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    operation: &'a OperationDescriptor,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Check `values` against the parameters of `operation`
    pub fn new(operation: &'a OperationDescriptor, values: &'a [Value]) -> Result<Self, DispatchError> {
        if values.len() != operation.params.len() {
            return Err(DispatchError::ArityMismatch {
                operation: operation.name.to_string(),
                expected: operation.params.len(),
                actual: values.len(),
            });
        }

        for (index, (param, value)) in operation.params.iter().zip(values).enumerate() {
            if value.param_type() != param.ty {
                return Err(DispatchError::TypeMismatch {
                    operation: operation.name.to_string(),
                    index,
                    expected: param.ty,
                    actual: value.param_type(),
                });
            }
        }

        Ok(Self { operation, values })
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for zero-parameter operations
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn mismatch(&self, index: usize, expected: ParamType) -> DispatchError {
        match self.values.get(index) {
            Some(v) => DispatchError::TypeMismatch {
                operation: self.operation.name.to_string(),
                index,
                expected,
                actual: v.param_type(),
            },
            None => DispatchError::ArityMismatch {
                operation: self.operation.name.to_string(),
                expected: index + 1,
                actual: self.values.len(),
            },
        }
    }

    /// Boolean at `index`
    pub fn bool(&self, index: usize) -> Result<bool, DispatchError> {
        match self.values.get(index) {
            Some(Value::Bool(v)) => Ok(*v),
            _ => Err(self.mismatch(index, ParamType::Bool)),
        }
    }

    /// `i32` at `index`
    pub fn i32(&self, index: usize) -> Result<i32, DispatchError> {
        match self.values.get(index) {
            Some(Value::I32(v)) => Ok(*v),
            _ => Err(self.mismatch(index, ParamType::I32)),
        }
    }

    /// `i64` at `index`
    pub fn i64(&self, index: usize) -> Result<i64, DispatchError> {
        match self.values.get(index) {
            Some(Value::I64(v)) => Ok(*v),
            _ => Err(self.mismatch(index, ParamType::I64)),
        }
    }

    /// Owned string at `index`
    pub fn text(&self, index: usize) -> Result<String, DispatchError> {
        match self.values.get(index) {
            Some(Value::Text(v)) => Ok(v.clone()),
            _ => Err(self.mismatch(index, ParamType::Text)),
        }
    }

    /// Duration at `index`
    pub fn duration(&self, index: usize) -> Result<Duration, DispatchError> {
        match self.values.get(index) {
            Some(Value::Duration(v)) => Ok(*v),
            _ => Err(self.mismatch(index, ParamType::Duration)),
        }
    }

    /// Optional string at `index`
    pub fn optional_text(&self, index: usize) -> Result<Option<String>, DispatchError> {
        match self.values.get(index) {
            Some(Value::OptionalText(v)) => Ok(v.clone()),
            _ => Err(self.mismatch(index, ParamType::OptionalText)),
        }
    }
}
