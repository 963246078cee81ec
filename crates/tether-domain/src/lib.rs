//! Tether Domain Layer
//!
//! This crate contains the model shared by every other Tether crate. It
//! describes configurable interfaces as data so that their operations can be
//! enumerated and invoked by name without runtime reflection.
//!
//! ## Key Concepts
//!
//! - **Operation descriptor**: name, ordered parameter specs and kind
//!   (fluent setter or terminal operation) of one interface operation
//! - **Operation id**: name plus parameter-type signature
//! - **Value**: a typed argument value, one variant per parameter type
//! - **Invocation / Recorder**: the observable call log of a delegate
//! - **Interface / Dispatch**: the seams a concrete builder interface plugs into
//!
//! ## Architecture
//!
//! - Pure data and traits, no I/O
//! - Operation tables are `&'static` and declared at compile time
//! - Concrete interfaces live in other crates (`tether-channel`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod args;
pub mod error;
pub mod invocation;
pub mod operation;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use args::Args;
pub use error::DispatchError;
pub use invocation::{Invocation, Recorder};
pub use operation::{OperationDescriptor, OperationId, OperationKind, ParamSpec};
pub use traits::{Dispatch, InstanceAddr, Interface, Returned};
pub use value::{ParamType, Precondition, Value};
