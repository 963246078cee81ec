//! The managed channel builder interface
//!
//! The trait, its operation table and its by-name dispatch are generated
//! from the single declaration list at the bottom of this module, so an
//! operation cannot be added to one without the others.

use crate::channel::ChannelHandle;
use crate::error::ChannelError;
use std::time::Duration;
use tether_domain::{Args, InstanceAddr, OperationDescriptor, ParamSpec, ParamType, Precondition};

/// Default cap on inbound message size: 4 MiB
pub const DEFAULT_MAX_MESSAGE_SIZE: i32 = 4 * 1024 * 1024;

/// Default cap on inbound metadata size: 8 KiB
pub const DEFAULT_MAX_METADATA_SIZE: i32 = 8192;

macro_rules! positional_arg {
    ($args:ident, Bool) => {
        $args.bool(0)?
    };
    ($args:ident, I32) => {
        $args.i32(0)?
    };
    ($args:ident, I64) => {
        $args.i64(0)?
    };
    ($args:ident, Text) => {
        $args.text(0)?
    };
    ($args:ident, Duration) => {
        $args.duration(0)?
    };
    ($args:ident, OptionalText) => {
        $args.optional_text(0)?
    };
}

macro_rules! managed_channel_builder {
    (
        $(#[$trait_meta:meta])*
        pub trait ManagedChannelBuilder {
            $(
                $(#[$meta:meta])*
                fn $name:ident(&mut self $(, $arg:ident: $ty:ty as $pty:ident $(where $pre:ident)?)?);
            )*
        }
    ) => {
        $(#[$trait_meta])*
        pub trait ManagedChannelBuilder {
            $(
                $(#[$meta])*
                fn $name(&mut self $(, $arg: $ty)?) -> Result<&mut Self, ChannelError>;
            )*

            /// Build the channel
            fn build(&mut self) -> Result<ChannelHandle, ChannelError>;
        }

        /// Every operation declared on [`ManagedChannelBuilder`], in declaration order
        pub const OPERATIONS: &[OperationDescriptor] = &[
            $(
                OperationDescriptor::fluent(stringify!($name), {
                    const PARAMS: &[ParamSpec] = &[$(
                        ParamSpec::new(stringify!($arg), ParamType::$pty)
                            $(.requiring(Precondition::$pre))?
                    )?];
                    PARAMS
                }),
            )*
            OperationDescriptor::terminal("build", &[]),
        ];

        /// Invoke the fluent operation `name`; `None` if there is no such operation
        pub(crate) fn dispatch_fluent<B: ManagedChannelBuilder>(
            target: &mut B,
            name: &str,
            args: &Args<'_>,
        ) -> Result<Option<InstanceAddr>, ChannelError> {
            let builder = match name {
                $(
                    stringify!($name) => target.$name($(positional_arg!(args, $pty))?)?,
                )*
                _ => return Ok(None),
            };
            Ok(Some(InstanceAddr::of(&*builder)))
        }
    };
}

managed_channel_builder! {
    /// Configures and builds a [`ManagedChannel`](crate::ManagedChannel)
    ///
    /// Every method except [`build`](ManagedChannelBuilder::build) is fluent: on
    /// success it returns the very builder it was invoked on, so calls chain
    /// with `?`.
    ///
    /// Preconditions are part of the contract and are mirrored in the
    /// operation table ([`OPERATIONS`]); implementations that validate
    /// reject violations with [`ChannelError::InvalidArgument`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tether_channel::{ManagedChannelBuilder, TonicChannelBuilder};
    ///
    /// # fn main() -> Result<(), tether_channel::ChannelError> {
    /// let mut builder = TonicChannelBuilder::for_target("localhost:50051");
    /// builder
    ///     .use_plaintext()?
    ///     .user_agent("tether-demo/0.1".to_string())?
    ///     .max_inbound_message_size(16 * 1024 * 1024)?;
    /// let channel = builder.build()?;
    /// # let _ = channel;
    /// # Ok(())
    /// # }
    /// ```
    pub trait ManagedChannelBuilder {
        /// Prefix for the user-agent header
        fn user_agent(&mut self, agent: String as Text);

        /// Authority to present instead of the target's
        fn override_authority(&mut self, authority: String as Text);

        /// Use an insecure transport
        fn use_plaintext(&mut self);

        /// Use a secure transport (the default)
        fn use_transport_security(&mut self);

        /// Load-balancing policy used when the service config names none
        fn default_load_balancing_policy(&mut self, policy: String as Text);

        /// Accept compressed streams
        fn enable_full_stream_decompression(&mut self);

        /// Idle time after which the channel drops its connections
        fn idle_timeout(&mut self, timeout: Duration as Duration);

        /// Interval between keep-alive pings
        fn keep_alive_time(&mut self, time: Duration as Duration);

        /// Time to wait for a keep-alive acknowledgement
        fn keep_alive_timeout(&mut self, timeout: Duration as Duration);

        /// Keep pinging while no call is in flight
        fn keep_alive_without_calls(&mut self, enable: bool as Bool);

        /// Largest inbound message accepted; must not be negative
        fn max_inbound_message_size(&mut self, bytes: i32 as I32 where NonNegative);

        /// Largest inbound metadata accepted; must be positive
        fn max_inbound_metadata_size(&mut self, bytes: i32 as I32 where Positive);

        /// Cap on retry attempts per call; must not be negative
        fn max_retry_attempts(&mut self, attempts: i32 as I32 where NonNegative);

        /// Cap on hedged attempts per call; must not be negative
        fn max_hedged_attempts(&mut self, attempts: i32 as I32 where NonNegative);

        /// Memory shared by all calls for retry buffering; must not be negative
        fn retry_buffer_size(&mut self, bytes: i64 as I64 where NonNegative);

        /// Memory one call may use for retry buffering; must not be negative
        fn per_rpc_buffer_limit(&mut self, bytes: i64 as I64 where NonNegative);

        /// Enable transparent retries
        fn enable_retry(&mut self);

        /// Disable transparent retries
        fn disable_retry(&mut self);

        /// Trace events kept per channel; must not be negative
        fn max_trace_events(&mut self, max_events: i32 as I32 where NonNegative);

        /// Service config (JSON object text) used until name resolution supplies one
        fn default_service_config(&mut self, config: Option<String> as OptionalText);

        /// Ignore service configs from name resolution
        fn disable_service_config_lookup(&mut self);
    }
}
