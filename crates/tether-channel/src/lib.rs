//! Tether Channel Builders
//!
//! The managed channel builder interface, its operation table, and the
//! builders implementing it:
//!
//! - [`ForwardingChannelBuilder`] / [`InboundLimitedBuilder`]: delegating
//!   builders that forward every operation except
//!   `max_inbound_message_size`, which they keep locally
//! - [`RecordingChannelBuilder`]: records invocations, for verification
//! - [`TonicChannelBuilder`]: builds lazily connecting tonic channels
//!
//! [`ChannelConfig`] loads builder settings from TOML and applies them
//! through the same operations.
//!
//! ## Verifying a delegating builder
//!
//! ```
//! use tether_channel::{ChannelBuilderInterface, ForwardingChannelBuilder, RecordingChannelBuilder};
//! use tether_domain::{ParamType, Recorder};
//! use tether_verify::{Exclusions, ForwardingVerifier, ProvidedArguments};
//!
//! let recorder = Recorder::new();
//! let mut wrapper = ForwardingChannelBuilder::new(RecordingChannelBuilder::new(recorder.clone()));
//!
//! let exclusions = Exclusions::new().with("max_inbound_message_size", [ParamType::I32]);
//! let provider = ProvidedArguments::new().with("max_inbound_metadata_size", 0, 1i32);
//!
//! ForwardingVerifier::new(recorder)
//!     .with_exclusions(exclusions)
//!     .with_provider(provider)
//!     .verify_forwarding::<ChannelBuilderInterface, _>(&mut wrapper)
//!     .assert_success();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod channel;
pub mod config;
pub mod error;
pub mod forwarding;
pub mod interface;
pub mod recording;
pub mod transport;

// Re-exports for convenience
pub use builder::{ManagedChannelBuilder, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_METADATA_SIZE, OPERATIONS};
pub use channel::{ChannelHandle, ManagedChannel};
pub use config::ChannelConfig;
pub use error::{ChannelError, ConfigError};
pub use forwarding::{
    ChannelBuilderDelegation, ForwardingChannelBuilder, InboundLimitedBuilder, InboundLimitedChannel,
    LocalSettings,
};
pub use interface::ChannelBuilderInterface;
pub use recording::{RecordingChannelBuilder, StubChannel};
pub use transport::{ChannelSettings, TonicChannel, TonicChannelBuilder};
