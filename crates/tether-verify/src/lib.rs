//! Tether Forwarding Verifier
//!
//! Mechanically proves the forwarding contract of a delegating builder:
//! every operation of an interface, except an explicit exclusion set, must
//! reach the wrapped delegate with the same arguments, and every fluent
//! operation must return the wrapper itself.
//!
//! The verifier needs three things from a test:
//! - the interface, as a type implementing [`tether_domain::Dispatch`] for
//!   the wrapper
//! - the [`tether_domain::Recorder`] the wrapper's delegate records into
//! - optionally, [`Exclusions`] and an [`ArgumentProvider`]
//!
//! Violations are collected per operation, so one broken method does not
//! hide the others. See [`ForwardingVerifier`].

#![warn(missing_docs)]

mod error;
mod exclusions;
pub mod provider;
mod report;
mod synthesis;
mod verifier;

pub use error::{VerificationError, Violation, ViolationKind};
pub use exclusions::Exclusions;
pub use provider::{ArgumentProvider, DefaultArguments, ProvidedArguments};
pub use report::{Check, OperationReport, Outcome, VerificationReport};
pub use synthesis::{compare_arguments, synthesize_arguments};
pub use verifier::{verify_methods_forwarded, ForwardingVerifier};
