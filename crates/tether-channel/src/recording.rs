//! Recording delegate stand-in
//!
//! [`RecordingChannelBuilder`] accepts every operation, records it into a
//! [`Recorder`] and returns itself. `build` returns a product fixed up
//! front, so tests can check that wrappers pass it through untouched.

use crate::builder::ManagedChannelBuilder;
use crate::channel::{ChannelHandle, ManagedChannel};
use crate::error::ChannelError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tether_domain::{OperationId, Recorder, Value};

/// Channel builder that records its invocations
///
/// Performs no validation, like a mock.
#[derive(Debug)]
pub struct RecordingChannelBuilder {
    recorder: Recorder,
    product: ChannelHandle,
    failures: HashSet<String>,
}

impl RecordingChannelBuilder {
    /// Record into `recorder`; `build` returns a [`StubChannel`]
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            product: Arc::new(StubChannel::new("recording.invalid")),
            failures: HashSet::new(),
        }
    }

    /// Make `build` return `product`
    pub fn with_product(mut self, product: ChannelHandle) -> Self {
        self.product = product;
        self
    }

    /// Make `operation` fail with [`ChannelError::Rejected`] after recording
    pub fn fail_on(mut self, operation: &str) -> Self {
        self.failures.insert(operation.to_string());
        self
    }

    /// The product `build` returns
    pub fn product(&self) -> &ChannelHandle {
        &self.product
    }

    /// The invocation log
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    fn record(&mut self, operation: &str, args: Vec<Value>) -> Result<(), ChannelError> {
        let id = OperationId::new(operation, args.iter().map(Value::param_type));
        self.recorder.record(id, args);

        if self.failures.contains(operation) {
            return Err(ChannelError::Rejected {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

impl ManagedChannelBuilder for RecordingChannelBuilder {
    fn user_agent(&mut self, agent: String) -> Result<&mut Self, ChannelError> {
        self.record("user_agent", vec![Value::Text(agent)])?;
        Ok(self)
    }

    fn override_authority(&mut self, authority: String) -> Result<&mut Self, ChannelError> {
        self.record("override_authority", vec![Value::Text(authority)])?;
        Ok(self)
    }

    fn use_plaintext(&mut self) -> Result<&mut Self, ChannelError> {
        self.record("use_plaintext", vec![])?;
        Ok(self)
    }

    fn use_transport_security(&mut self) -> Result<&mut Self, ChannelError> {
        self.record("use_transport_security", vec![])?;
        Ok(self)
    }

    fn default_load_balancing_policy(&mut self, policy: String) -> Result<&mut Self, ChannelError> {
        self.record("default_load_balancing_policy", vec![Value::Text(policy)])?;
        Ok(self)
    }

    fn enable_full_stream_decompression(&mut self) -> Result<&mut Self, ChannelError> {
        self.record("enable_full_stream_decompression", vec![])?;
        Ok(self)
    }

    fn idle_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ChannelError> {
        self.record("idle_timeout", vec![Value::Duration(timeout)])?;
        Ok(self)
    }

    fn keep_alive_time(&mut self, time: Duration) -> Result<&mut Self, ChannelError> {
        self.record("keep_alive_time", vec![Value::Duration(time)])?;
        Ok(self)
    }

    fn keep_alive_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ChannelError> {
        self.record("keep_alive_timeout", vec![Value::Duration(timeout)])?;
        Ok(self)
    }

    fn keep_alive_without_calls(&mut self, enable: bool) -> Result<&mut Self, ChannelError> {
        self.record("keep_alive_without_calls", vec![Value::Bool(enable)])?;
        Ok(self)
    }

    fn max_inbound_message_size(&mut self, bytes: i32) -> Result<&mut Self, ChannelError> {
        self.record("max_inbound_message_size", vec![Value::I32(bytes)])?;
        Ok(self)
    }

    fn max_inbound_metadata_size(&mut self, bytes: i32) -> Result<&mut Self, ChannelError> {
        self.record("max_inbound_metadata_size", vec![Value::I32(bytes)])?;
        Ok(self)
    }

    fn max_retry_attempts(&mut self, attempts: i32) -> Result<&mut Self, ChannelError> {
        self.record("max_retry_attempts", vec![Value::I32(attempts)])?;
        Ok(self)
    }

    fn max_hedged_attempts(&mut self, attempts: i32) -> Result<&mut Self, ChannelError> {
        self.record("max_hedged_attempts", vec![Value::I32(attempts)])?;
        Ok(self)
    }

    fn retry_buffer_size(&mut self, bytes: i64) -> Result<&mut Self, ChannelError> {
        self.record("retry_buffer_size", vec![Value::I64(bytes)])?;
        Ok(self)
    }

    fn per_rpc_buffer_limit(&mut self, bytes: i64) -> Result<&mut Self, ChannelError> {
        self.record("per_rpc_buffer_limit", vec![Value::I64(bytes)])?;
        Ok(self)
    }

    fn enable_retry(&mut self) -> Result<&mut Self, ChannelError> {
        self.record("enable_retry", vec![])?;
        Ok(self)
    }

    fn disable_retry(&mut self) -> Result<&mut Self, ChannelError> {
        self.record("disable_retry", vec![])?;
        Ok(self)
    }

    fn max_trace_events(&mut self, max_events: i32) -> Result<&mut Self, ChannelError> {
        self.record("max_trace_events", vec![Value::I32(max_events)])?;
        Ok(self)
    }

    fn default_service_config(&mut self, config: Option<String>) -> Result<&mut Self, ChannelError> {
        self.record("default_service_config", vec![Value::OptionalText(config)])?;
        Ok(self)
    }

    fn disable_service_config_lookup(&mut self) -> Result<&mut Self, ChannelError> {
        self.record("disable_service_config_lookup", vec![])?;
        Ok(self)
    }

    fn build(&mut self) -> Result<ChannelHandle, ChannelError> {
        self.record("build", vec![])?;
        Ok(Arc::clone(&self.product))
    }
}

/// Inert channel used as a fixed product
#[derive(Debug)]
pub struct StubChannel {
    authority: String,
    shutdown: AtomicBool,
}

impl StubChannel {
    /// Create a stub presenting `authority`
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            shutdown: AtomicBool::new(false),
        }
    }
}

impl ManagedChannel for StubChannel {
    fn authority(&self) -> String {
        self.authority.clone()
    }

    fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::OPERATIONS;
    use crate::interface::ChannelBuilderInterface;
    use tether_domain::{Dispatch, Returned};

    #[test]
    fn test_records_with_signature() {
        let recorder = Recorder::new();
        let mut builder = RecordingChannelBuilder::new(recorder.clone());

        builder.max_retry_attempts(3).unwrap().retry_buffer_size(10).unwrap();

        let calls = recorder.invocations();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].to_string(), "max_retry_attempts[3i32]");
        assert_eq!(calls[1].to_string(), "retry_buffer_size[10i64]");
    }

    #[test]
    fn test_every_operation_is_recorded_under_its_id() {
        let recorder = Recorder::new();
        let mut builder = RecordingChannelBuilder::new(recorder.clone());

        for op in OPERATIONS {
            let args: Vec<Value> = op.params.iter().map(|p| p.ty.default_value()).collect();
            let returned =
                <ChannelBuilderInterface as Dispatch<RecordingChannelBuilder>>::dispatch(&mut builder, op, &args)
                    .unwrap();
            if op.is_fluent() {
                assert!(matches!(returned, Returned::Builder(_)));
            }

            let calls = recorder.take();
            assert_eq!(calls.len(), 1, "{} should be recorded once", op);
            assert_eq!(calls[0].operation, op.id());
            assert_eq!(calls[0].args, args);
        }
    }

    #[test]
    fn test_build_returns_fixed_product() {
        let product: ChannelHandle = Arc::new(StubChannel::new("fixed:1"));
        let mut builder = RecordingChannelBuilder::new(Recorder::new()).with_product(Arc::clone(&product));

        let first = builder.build().unwrap();
        let second = builder.build().unwrap();

        assert!(Arc::ptr_eq(&first, &product));
        assert!(Arc::ptr_eq(&second, &product));
        assert_eq!(builder.recorder().len(), 2);
    }

    #[test]
    fn test_fail_on_records_then_fails() {
        let recorder = Recorder::new();
        let mut builder = RecordingChannelBuilder::new(recorder.clone()).fail_on("build");

        assert!(matches!(builder.build(), Err(ChannelError::Rejected { .. })));
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_stub_channel_shutdown() {
        let channel = StubChannel::new("stub:80");
        assert!(!channel.is_shutdown());
        channel.shutdown();
        channel.shutdown();
        assert!(channel.is_shutdown());
        assert_eq!(channel.authority(), "stub:80");
        assert_eq!(channel.max_inbound_message_size(), None);
    }

    #[test]
    fn test_handle_downcasts_to_stub() {
        let handle: ChannelHandle = Arc::new(StubChannel::new("stub:81"));

        let stub = handle.downcast_ref::<StubChannel>().expect("handle should hold a stub");

        assert_eq!(stub.authority, "stub:81");
        assert!(handle.is::<StubChannel>());
        assert!(handle.downcast_ref::<crate::InboundLimitedChannel>().is_none());
    }
}
