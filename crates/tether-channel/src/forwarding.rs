//! Delegating channel builders
//!
//! A delegating builder implements [`ManagedChannelBuilder`] by forwarding
//! every call to an inner builder of the same interface. Implement
//! [`ChannelBuilderDelegation`] and the forwarding implementation comes for
//! free through the blanket impl below.
//!
//! Each operation goes through an `on_*` hook on the delegation trait. The
//! hooks forward by default, so overriding one moves that operation into the
//! override set (operations that do NOT forward). Out of the box the set is:
//! - `max_inbound_message_size`: stored in [`LocalSettings`], default
//!   [`DEFAULT_MAX_MESSAGE_SIZE`], so the wrapping layer can enforce it
//!   itself.
//!
//! Whatever a hook does, the blanket impl returns the wrapper itself.
//!
//! `build` forwards through [`ChannelBuilderDelegation::build_channel`],
//! which passes the delegate's product through unchanged unless overridden.

use crate::builder::{ManagedChannelBuilder, DEFAULT_MAX_MESSAGE_SIZE};
use crate::channel::{ChannelHandle, ManagedChannel};
use crate::error::ChannelError;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Settings a delegating builder keeps for itself instead of forwarding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSettings {
    /// Largest inbound message accepted, in bytes
    ///
    /// Default: [`DEFAULT_MAX_MESSAGE_SIZE`] (4 MiB)
    pub max_inbound_message_size: i32,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            max_inbound_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Access to the pieces a delegating builder is made of
///
/// Only [`delegate`](Self::delegate) and
/// [`local_settings`](Self::local_settings) are required. Override an
/// `on_*` hook to keep that operation local.
///
/// # Examples
///
/// ```
/// use tether_channel::{
///     ChannelBuilderDelegation, ChannelError, LocalSettings, ManagedChannelBuilder,
///     RecordingChannelBuilder,
/// };
/// use tether_domain::Recorder;
///
/// struct AgentPinning {
///     delegate: RecordingChannelBuilder,
///     local: LocalSettings,
/// }
///
/// impl ChannelBuilderDelegation for AgentPinning {
///     type Delegate = RecordingChannelBuilder;
///
///     fn delegate(&mut self) -> &mut RecordingChannelBuilder {
///         &mut self.delegate
///     }
///
///     fn local_settings(&mut self) -> &mut LocalSettings {
///         &mut self.local
///     }
///
///     fn on_user_agent(&mut self, _agent: String) -> Result<(), ChannelError> {
///         Ok(())
///     }
/// }
///
/// let recorder = Recorder::new();
/// let mut builder = AgentPinning {
///     delegate: RecordingChannelBuilder::new(recorder.clone()),
///     local: LocalSettings::default(),
/// };
/// builder.user_agent("ignored".to_string()).unwrap().use_plaintext().unwrap();
/// assert_eq!(recorder.len(), 1);
/// ```
pub trait ChannelBuilderDelegation {
    /// Builder receiving forwarded calls
    type Delegate: ManagedChannelBuilder;

    /// The current delegate
    ///
    /// Called on every forwarded operation, so an implementation may swap
    /// delegates between calls.
    fn delegate(&mut self) -> &mut Self::Delegate;

    /// Locally held settings
    fn local_settings(&mut self) -> &mut LocalSettings;

    /// Handle `user_agent`; forwards by default
    fn on_user_agent(&mut self, agent: String) -> Result<(), ChannelError> {
        self.delegate().user_agent(agent)?;
        Ok(())
    }

    /// Handle `override_authority`; forwards by default
    fn on_override_authority(&mut self, authority: String) -> Result<(), ChannelError> {
        self.delegate().override_authority(authority)?;
        Ok(())
    }

    /// Handle `use_plaintext`; forwards by default
    fn on_use_plaintext(&mut self) -> Result<(), ChannelError> {
        self.delegate().use_plaintext()?;
        Ok(())
    }

    /// Handle `use_transport_security`; forwards by default
    fn on_use_transport_security(&mut self) -> Result<(), ChannelError> {
        self.delegate().use_transport_security()?;
        Ok(())
    }

    /// Handle `default_load_balancing_policy`; forwards by default
    fn on_default_load_balancing_policy(&mut self, policy: String) -> Result<(), ChannelError> {
        self.delegate().default_load_balancing_policy(policy)?;
        Ok(())
    }

    /// Handle `enable_full_stream_decompression`; forwards by default
    fn on_enable_full_stream_decompression(&mut self) -> Result<(), ChannelError> {
        self.delegate().enable_full_stream_decompression()?;
        Ok(())
    }

    /// Handle `idle_timeout`; forwards by default
    fn on_idle_timeout(&mut self, timeout: Duration) -> Result<(), ChannelError> {
        self.delegate().idle_timeout(timeout)?;
        Ok(())
    }

    /// Handle `keep_alive_time`; forwards by default
    fn on_keep_alive_time(&mut self, time: Duration) -> Result<(), ChannelError> {
        self.delegate().keep_alive_time(time)?;
        Ok(())
    }

    /// Handle `keep_alive_timeout`; forwards by default
    fn on_keep_alive_timeout(&mut self, timeout: Duration) -> Result<(), ChannelError> {
        self.delegate().keep_alive_timeout(timeout)?;
        Ok(())
    }

    /// Handle `keep_alive_without_calls`; forwards by default
    fn on_keep_alive_without_calls(&mut self, enable: bool) -> Result<(), ChannelError> {
        self.delegate().keep_alive_without_calls(enable)?;
        Ok(())
    }

    /// Handle `max_inbound_message_size`; stores the value in [`LocalSettings`]
    fn on_max_inbound_message_size(&mut self, bytes: i32) -> Result<(), ChannelError> {
        if bytes < 0 {
            return Err(ChannelError::invalid(
                "max_inbound_message_size",
                format!("{} must not be negative", bytes),
            ));
        }
        self.local_settings().max_inbound_message_size = bytes;
        Ok(())
    }

    /// Handle `max_inbound_metadata_size`; forwards by default
    fn on_max_inbound_metadata_size(&mut self, bytes: i32) -> Result<(), ChannelError> {
        self.delegate().max_inbound_metadata_size(bytes)?;
        Ok(())
    }

    /// Handle `max_retry_attempts`; forwards by default
    fn on_max_retry_attempts(&mut self, attempts: i32) -> Result<(), ChannelError> {
        self.delegate().max_retry_attempts(attempts)?;
        Ok(())
    }

    /// Handle `max_hedged_attempts`; forwards by default
    fn on_max_hedged_attempts(&mut self, attempts: i32) -> Result<(), ChannelError> {
        self.delegate().max_hedged_attempts(attempts)?;
        Ok(())
    }

    /// Handle `retry_buffer_size`; forwards by default
    fn on_retry_buffer_size(&mut self, bytes: i64) -> Result<(), ChannelError> {
        self.delegate().retry_buffer_size(bytes)?;
        Ok(())
    }

    /// Handle `per_rpc_buffer_limit`; forwards by default
    fn on_per_rpc_buffer_limit(&mut self, bytes: i64) -> Result<(), ChannelError> {
        self.delegate().per_rpc_buffer_limit(bytes)?;
        Ok(())
    }

    /// Handle `enable_retry`; forwards by default
    fn on_enable_retry(&mut self) -> Result<(), ChannelError> {
        self.delegate().enable_retry()?;
        Ok(())
    }

    /// Handle `disable_retry`; forwards by default
    fn on_disable_retry(&mut self) -> Result<(), ChannelError> {
        self.delegate().disable_retry()?;
        Ok(())
    }

    /// Handle `max_trace_events`; forwards by default
    fn on_max_trace_events(&mut self, max_events: i32) -> Result<(), ChannelError> {
        self.delegate().max_trace_events(max_events)?;
        Ok(())
    }

    /// Handle `default_service_config`; forwards by default
    fn on_default_service_config(&mut self, config: Option<String>) -> Result<(), ChannelError> {
        self.delegate().default_service_config(config)?;
        Ok(())
    }

    /// Handle `disable_service_config_lookup`; forwards by default
    fn on_disable_service_config_lookup(&mut self) -> Result<(), ChannelError> {
        self.delegate().disable_service_config_lookup()?;
        Ok(())
    }

    /// Produce the channel for `build`
    ///
    /// Returns the delegate's product unchanged by default. Override to
    /// validate or decorate it.
    fn build_channel(&mut self) -> Result<ChannelHandle, ChannelError> {
        self.delegate().build()
    }
}

impl<T: ChannelBuilderDelegation> ManagedChannelBuilder for T {
    fn user_agent(&mut self, agent: String) -> Result<&mut Self, ChannelError> {
        self.on_user_agent(agent)?;
        Ok(self)
    }

    fn override_authority(&mut self, authority: String) -> Result<&mut Self, ChannelError> {
        self.on_override_authority(authority)?;
        Ok(self)
    }

    fn use_plaintext(&mut self) -> Result<&mut Self, ChannelError> {
        self.on_use_plaintext()?;
        Ok(self)
    }

    fn use_transport_security(&mut self) -> Result<&mut Self, ChannelError> {
        self.on_use_transport_security()?;
        Ok(self)
    }

    fn default_load_balancing_policy(&mut self, policy: String) -> Result<&mut Self, ChannelError> {
        self.on_default_load_balancing_policy(policy)?;
        Ok(self)
    }

    fn enable_full_stream_decompression(&mut self) -> Result<&mut Self, ChannelError> {
        self.on_enable_full_stream_decompression()?;
        Ok(self)
    }

    fn idle_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ChannelError> {
        self.on_idle_timeout(timeout)?;
        Ok(self)
    }

    fn keep_alive_time(&mut self, time: Duration) -> Result<&mut Self, ChannelError> {
        self.on_keep_alive_time(time)?;
        Ok(self)
    }

    fn keep_alive_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ChannelError> {
        self.on_keep_alive_timeout(timeout)?;
        Ok(self)
    }

    fn keep_alive_without_calls(&mut self, enable: bool) -> Result<&mut Self, ChannelError> {
        self.on_keep_alive_without_calls(enable)?;
        Ok(self)
    }

    fn max_inbound_message_size(&mut self, bytes: i32) -> Result<&mut Self, ChannelError> {
        self.on_max_inbound_message_size(bytes)?;
        Ok(self)
    }

    fn max_inbound_metadata_size(&mut self, bytes: i32) -> Result<&mut Self, ChannelError> {
        self.on_max_inbound_metadata_size(bytes)?;
        Ok(self)
    }

    fn max_retry_attempts(&mut self, attempts: i32) -> Result<&mut Self, ChannelError> {
        self.on_max_retry_attempts(attempts)?;
        Ok(self)
    }

    fn max_hedged_attempts(&mut self, attempts: i32) -> Result<&mut Self, ChannelError> {
        self.on_max_hedged_attempts(attempts)?;
        Ok(self)
    }

    fn retry_buffer_size(&mut self, bytes: i64) -> Result<&mut Self, ChannelError> {
        self.on_retry_buffer_size(bytes)?;
        Ok(self)
    }

    fn per_rpc_buffer_limit(&mut self, bytes: i64) -> Result<&mut Self, ChannelError> {
        self.on_per_rpc_buffer_limit(bytes)?;
        Ok(self)
    }

    fn enable_retry(&mut self) -> Result<&mut Self, ChannelError> {
        self.on_enable_retry()?;
        Ok(self)
    }

    fn disable_retry(&mut self) -> Result<&mut Self, ChannelError> {
        self.on_disable_retry()?;
        Ok(self)
    }

    fn max_trace_events(&mut self, max_events: i32) -> Result<&mut Self, ChannelError> {
        self.on_max_trace_events(max_events)?;
        Ok(self)
    }

    fn default_service_config(&mut self, config: Option<String>) -> Result<&mut Self, ChannelError> {
        self.on_default_service_config(config)?;
        Ok(self)
    }

    fn disable_service_config_lookup(&mut self) -> Result<&mut Self, ChannelError> {
        self.on_disable_service_config_lookup()?;
        Ok(self)
    }

    fn build(&mut self) -> Result<ChannelHandle, ChannelError> {
        self.build_channel()
    }
}

/// Delegating builder over any [`ManagedChannelBuilder`]
///
/// Forwards everything except the override set and passes `build` through.
///
/// # Examples
///
/// ```
/// use tether_channel::{ForwardingChannelBuilder, ManagedChannelBuilder, RecordingChannelBuilder};
/// use tether_domain::Recorder;
///
/// let recorder = Recorder::new();
/// let mut builder = ForwardingChannelBuilder::new(RecordingChannelBuilder::new(recorder.clone()));
///
/// builder.use_plaintext().unwrap().max_inbound_message_size(42).unwrap();
///
/// assert_eq!(builder.local().max_inbound_message_size, 42);
/// assert_eq!(recorder.len(), 1);
/// ```
#[derive(Debug)]
pub struct ForwardingChannelBuilder<D> {
    delegate: D,
    local: LocalSettings,
}

impl<D: ManagedChannelBuilder> ForwardingChannelBuilder<D> {
    /// Wrap `delegate`
    pub fn new(delegate: D) -> Self {
        Self {
            delegate,
            local: LocalSettings::default(),
        }
    }

    /// Locally held settings
    pub fn local(&self) -> &LocalSettings {
        &self.local
    }

    /// Swap in a new delegate, returning the old one
    ///
    /// Local settings are kept.
    pub fn replace_delegate(&mut self, delegate: D) -> D {
        debug!("Replacing channel builder delegate");
        std::mem::replace(&mut self.delegate, delegate)
    }

    /// Unwrap the delegate
    pub fn into_delegate(self) -> D {
        self.delegate
    }
}

impl<D: ManagedChannelBuilder> ChannelBuilderDelegation for ForwardingChannelBuilder<D> {
    type Delegate = D;

    fn delegate(&mut self) -> &mut D {
        &mut self.delegate
    }

    fn local_settings(&mut self) -> &mut LocalSettings {
        &mut self.local
    }
}

/// Delegating builder that stamps its inbound message limit on the product
///
/// Same forwarding as [`ForwardingChannelBuilder`], but `build` wraps the
/// delegate's channel in an [`InboundLimitedChannel`] carrying the locally
/// stored `max_inbound_message_size`.
#[derive(Debug)]
pub struct InboundLimitedBuilder<D> {
    delegate: D,
    local: LocalSettings,
}

impl<D: ManagedChannelBuilder> InboundLimitedBuilder<D> {
    /// Wrap `delegate`
    pub fn new(delegate: D) -> Self {
        Self {
            delegate,
            local: LocalSettings::default(),
        }
    }

    /// Locally held settings
    pub fn local(&self) -> &LocalSettings {
        &self.local
    }
}

impl<D: ManagedChannelBuilder> ChannelBuilderDelegation for InboundLimitedBuilder<D> {
    type Delegate = D;

    fn delegate(&mut self) -> &mut D {
        &mut self.delegate
    }

    fn local_settings(&mut self) -> &mut LocalSettings {
        &mut self.local
    }

    fn build_channel(&mut self) -> Result<ChannelHandle, ChannelError> {
        let inner = self.delegate.build()?;
        debug!(
            "Limiting inbound messages on {} to {} bytes",
            inner.authority(),
            self.local.max_inbound_message_size
        );
        Ok(Arc::new(InboundLimitedChannel {
            inner,
            max_inbound_message_size: self.local.max_inbound_message_size,
        }))
    }
}

/// A channel with an inbound message limit imposed by its builder
#[derive(Debug)]
pub struct InboundLimitedChannel {
    inner: ChannelHandle,
    max_inbound_message_size: i32,
}

impl InboundLimitedChannel {
    /// The decorated channel
    pub fn inner(&self) -> &ChannelHandle {
        &self.inner
    }
}

impl ManagedChannel for InboundLimitedChannel {
    fn authority(&self) -> String {
        self.inner.authority()
    }

    fn max_inbound_message_size(&self) -> Option<i32> {
        Some(self.max_inbound_message_size)
    }

    fn shutdown(&self) {
        self.inner.shutdown();
    }

    fn is_shutdown(&self) -> bool {
        self.inner.is_shutdown()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingChannelBuilder, StubChannel};
    use tether_domain::{OperationId, ParamType, Recorder, Value};

    fn wrapper() -> (Recorder, ForwardingChannelBuilder<RecordingChannelBuilder>) {
        let recorder = Recorder::new();
        let builder = ForwardingChannelBuilder::new(RecordingChannelBuilder::new(recorder.clone()));
        (recorder, builder)
    }

    #[test]
    fn test_default_local_settings() {
        let (_, builder) = wrapper();
        assert_eq!(builder.local().max_inbound_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(DEFAULT_MAX_MESSAGE_SIZE, 4 * 1024 * 1024);
    }

    #[test]
    fn test_max_inbound_message_size_stays_local() {
        let (recorder, mut builder) = wrapper();

        builder.max_inbound_message_size(42).unwrap();

        assert_eq!(builder.local().max_inbound_message_size, 42);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_negative_message_size_rejected() {
        let (_, mut builder) = wrapper();

        let err = builder.max_inbound_message_size(-1).unwrap_err();

        assert!(matches!(
            err,
            ChannelError::InvalidArgument { operation: "max_inbound_message_size", .. }
        ));
        assert_eq!(builder.local().max_inbound_message_size, DEFAULT_MAX_MESSAGE_SIZE);
    }

    #[test]
    fn test_fluent_call_forwards_and_returns_wrapper() {
        let (recorder, mut builder) = wrapper();
        let addr = std::ptr::from_ref(&builder).cast::<()>();

        let returned = builder.use_plaintext().unwrap();

        assert!(std::ptr::eq(std::ptr::from_ref(returned).cast::<()>(), addr));
        let calls = recorder.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, OperationId::new("use_plaintext", []));
        assert!(calls[0].args.is_empty());
    }

    #[test]
    fn test_arguments_forwarded_unchanged() {
        let (recorder, mut builder) = wrapper();

        builder
            .keep_alive_time(Duration::from_secs(30))
            .unwrap()
            .default_service_config(Some("{}".to_string()))
            .unwrap();

        let calls = recorder.invocations();
        assert_eq!(calls[0].args, vec![Value::Duration(Duration::from_secs(30))]);
        assert_eq!(
            calls[1].operation,
            OperationId::new("default_service_config", [ParamType::OptionalText])
        );
        assert_eq!(calls[1].args, vec![Value::OptionalText(Some("{}".to_string()))]);
    }

    #[test]
    fn test_delegate_errors_propagate_unchanged() {
        let recorder = Recorder::new();
        let delegate = RecordingChannelBuilder::new(recorder.clone()).fail_on("user_agent");
        let mut builder = ForwardingChannelBuilder::new(delegate);

        let err = builder.user_agent("agent".to_string()).unwrap_err();

        assert!(matches!(err, ChannelError::Rejected { ref operation } if operation == "user_agent"));
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_build_passes_product_through() {
        let (_, mut builder) = wrapper();
        let expected: ChannelHandle = Arc::new(StubChannel::new("passthrough.test:443"));
        builder.replace_delegate(
            RecordingChannelBuilder::new(Recorder::new()).with_product(Arc::clone(&expected)),
        );

        let built = builder.build().unwrap();

        assert!(Arc::ptr_eq(&built, &expected));
    }

    #[test]
    fn test_replace_delegate_keeps_local_settings() {
        let (old_recorder, mut builder) = wrapper();
        builder.max_inbound_message_size(7).unwrap();

        let new_recorder = Recorder::new();
        builder.replace_delegate(RecordingChannelBuilder::new(new_recorder.clone()));
        builder.enable_retry().unwrap();

        assert_eq!(builder.local().max_inbound_message_size, 7);
        assert!(old_recorder.is_empty());
        assert_eq!(new_recorder.len(), 1);
    }

    #[derive(Debug)]
    struct RetryPinned {
        delegate: RecordingChannelBuilder,
        local: LocalSettings,
        retries: Option<i32>,
    }

    impl ChannelBuilderDelegation for RetryPinned {
        type Delegate = RecordingChannelBuilder;

        fn delegate(&mut self) -> &mut RecordingChannelBuilder {
            &mut self.delegate
        }

        fn local_settings(&mut self) -> &mut LocalSettings {
            &mut self.local
        }

        fn on_max_retry_attempts(&mut self, attempts: i32) -> Result<(), ChannelError> {
            self.retries = Some(attempts);
            Ok(())
        }
    }

    #[test]
    fn test_overridden_hook_keeps_operation_local() {
        let recorder = Recorder::new();
        let mut builder = RetryPinned {
            delegate: RecordingChannelBuilder::new(recorder.clone()),
            local: LocalSettings::default(),
            retries: None,
        };
        let addr = std::ptr::from_ref(&builder).cast::<()>();

        let returned = builder.max_retry_attempts(5).unwrap();
        assert!(std::ptr::eq(std::ptr::from_ref(returned).cast::<()>(), addr));
        builder.max_inbound_message_size(64).unwrap().enable_retry().unwrap();

        assert_eq!(builder.retries, Some(5));
        assert_eq!(builder.local.max_inbound_message_size, 64);
        let calls = recorder.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation.name(), "enable_retry");
    }

    #[test]
    fn test_inbound_limited_builder_decorates_product() {
        let recorder = Recorder::new();
        let mut builder = InboundLimitedBuilder::new(RecordingChannelBuilder::new(recorder.clone()));

        builder.max_inbound_message_size(1024).unwrap();
        let channel = builder.build().unwrap();

        assert_eq!(builder.local().max_inbound_message_size, 1024);
        assert_eq!(channel.max_inbound_message_size(), Some(1024));
        assert_eq!(channel.authority(), "recording.invalid");
        channel.shutdown();
        assert!(channel.is_shutdown());

        let limited = channel
            .downcast_ref::<InboundLimitedChannel>()
            .expect("product should be decorated");
        assert!(limited.inner().is::<StubChannel>());
    }
}
