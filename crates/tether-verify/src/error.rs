//! Verification error types

use crate::report::VerificationReport;
use tether_domain::{OperationId, ParamType, Precondition, Value};
use thiserror::Error;

/// A single broken expectation, reported against one operation
///
/// Variants fall into four groups: contract violations (the call did not
/// reach the delegate intact), identity violations (a fluent operation did
/// not hand back the wrapper), pass-through violations (the terminal
/// operation changed the delegate's product) and configuration errors (the
/// test's provider or exclusions are incomplete).
#[derive(Debug, Error)]
pub enum Violation {
    /// The delegate recorded no invocation at all
    #[error("{operation} was not forwarded to the delegate")]
    NotForwarded {
        /// Operation invoked on the wrapper
        operation: OperationId,
    },

    /// The delegate recorded a different operation instead
    #[error("{operation} was forwarded as {actual}")]
    WrongOperation {
        /// Operation invoked on the wrapper
        operation: OperationId,
        /// Operation the delegate received
        actual: OperationId,
    },

    /// The delegate received the operation more than once
    #[error("{operation} was forwarded {count} times, expected once")]
    ForwardedMoreThanOnce {
        /// Operation invoked on the wrapper
        operation: OperationId,
        /// Number of matching invocations
        count: usize,
    },

    /// The delegate received a different number of arguments
    #[error("{operation} was forwarded with {actual} argument(s), expected {expected}")]
    ArgumentCountMismatch {
        /// Operation invoked on the wrapper
        operation: OperationId,
        /// Arguments passed to the wrapper
        expected: usize,
        /// Arguments the delegate received
        actual: usize,
    },

    /// An argument changed on its way to the delegate
    #[error("{operation} argument {index}: expected {expected}, delegate received {actual}")]
    ArgumentMismatch {
        /// Operation invoked on the wrapper
        operation: OperationId,
        /// Parameter position
        index: usize,
        /// Value passed to the wrapper
        expected: Value,
        /// Value the delegate received
        actual: Value,
    },

    /// An excluded operation reached the delegate anyway
    #[error("{operation} is excluded from forwarding but reached the delegate")]
    UnexpectedForward {
        /// Excluded operation
        operation: OperationId,
    },

    /// An exclusion names an operation the interface does not declare
    #[error("Exclusion {operation} matches no declared operation")]
    UnknownExclusion {
        /// Excluded operation id
        operation: OperationId,
    },

    /// A fluent operation returned something other than the wrapper itself
    #[error("{operation} did not return the builder it was invoked on")]
    NotSelf {
        /// Operation invoked on the wrapper
        operation: OperationId,
    },

    /// The terminal operation did not hand back the delegate's product
    #[error("{operation} did not return the delegate's product unchanged")]
    ProductNotPassedThrough {
        /// Terminal operation
        operation: OperationId,
    },

    /// The synthesized default violates a documented precondition
    #[error(
        "{operation} parameter {index} ({param}) {precondition}, but no provider value was given \
         and the default {value} does not satisfy it"
    )]
    PreconditionUnmet {
        /// Operation being verified
        operation: OperationId,
        /// Parameter position
        index: usize,
        /// Parameter name
        param: &'static str,
        /// Documented precondition
        precondition: Precondition,
        /// Synthesized value
        value: Value,
    },

    /// The provider supplied a value that violates a documented precondition
    #[error("{operation} parameter {index} ({param}) {precondition}, provider supplied {value}")]
    ProvidedValueRejected {
        /// Operation being verified
        operation: OperationId,
        /// Parameter position
        index: usize,
        /// Parameter name
        param: &'static str,
        /// Documented precondition
        precondition: Precondition,
        /// Provided value
        value: Value,
    },

    /// The provider supplied a value of the wrong type
    #[error("{operation} parameter {index}: provider supplied {actual}, parameter is {expected}")]
    ProviderTypeMismatch {
        /// Operation being verified
        operation: OperationId,
        /// Parameter position
        index: usize,
        /// Declared type
        expected: ParamType,
        /// Provided type
        actual: ParamType,
    },

    /// Invoking the operation on the wrapper failed
    #[error("{operation} failed when invoked on the wrapper: {source}")]
    InvocationFailed {
        /// Operation invoked on the wrapper
        operation: OperationId,
        /// Underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Violation {
    /// Operation the violation is reported against
    pub fn operation(&self) -> &OperationId {
        match self {
            Violation::NotForwarded { operation }
            | Violation::WrongOperation { operation, .. }
            | Violation::ForwardedMoreThanOnce { operation, .. }
            | Violation::ArgumentCountMismatch { operation, .. }
            | Violation::ArgumentMismatch { operation, .. }
            | Violation::UnexpectedForward { operation }
            | Violation::UnknownExclusion { operation }
            | Violation::NotSelf { operation }
            | Violation::ProductNotPassedThrough { operation }
            | Violation::PreconditionUnmet { operation, .. }
            | Violation::ProvidedValueRejected { operation, .. }
            | Violation::ProviderTypeMismatch { operation, .. }
            | Violation::InvocationFailed { operation, .. } => operation,
        }
    }

    /// Category this violation belongs to
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::NotForwarded { .. }
            | Violation::WrongOperation { .. }
            | Violation::ForwardedMoreThanOnce { .. }
            | Violation::ArgumentCountMismatch { .. }
            | Violation::ArgumentMismatch { .. }
            | Violation::UnexpectedForward { .. } => ViolationKind::Contract,
            Violation::NotSelf { .. } => ViolationKind::Identity,
            Violation::ProductNotPassedThrough { .. } => ViolationKind::PassThrough,
            Violation::UnknownExclusion { .. }
            | Violation::PreconditionUnmet { .. }
            | Violation::ProvidedValueRejected { .. }
            | Violation::ProviderTypeMismatch { .. }
            | Violation::InvocationFailed { .. } => ViolationKind::Configuration,
        }
    }
}

/// Violation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// Call did not reach the delegate intact
    Contract,

    /// Fluent operation did not return the wrapper
    Identity,

    /// Terminal operation altered the delegate's product
    PassThrough,

    /// Provider or exclusions incomplete
    Configuration,
}

/// A failed verification run
#[derive(Debug, Error)]
pub enum VerificationError {
    /// At least one operation violated its contract
    #[error("{0}")]
    Failed(VerificationReport),
}
