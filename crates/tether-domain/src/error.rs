//! Dispatch error types

use crate::value::ParamType;
use thiserror::Error;

/// Errors raised when an operation is invoked by descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The interface declares no operation with this name and signature
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Wrong number of arguments
    #[error("Operation {operation} takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// Operation name
        operation: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Argument does not inhabit the declared parameter type
    #[error("Operation {operation} argument {index}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Operation name
        operation: String,
        /// Parameter position
        index: usize,
        /// Declared type
        expected: ParamType,
        /// Supplied type
        actual: ParamType,
    },
}
