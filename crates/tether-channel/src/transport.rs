//! tonic-backed channel builder
//!
//! [`TonicChannelBuilder`] validates each setting as it arrives and only
//! touches tonic in `build`, where the settings are mapped onto an
//! [`Endpoint`] and a lazily connecting [`Channel`] is created.
//!
//! Transport security is the default and uses rustls with the webpki root
//! store. A secure builder never falls back to cleartext: an explicit
//! `http://` target is rejected unless `use_plaintext` was called, and an
//! explicit `https://` target is rejected if it was.
//!
//! Only the target, user agent, authority, transport choice and keep-alive
//! settings reach the tonic endpoint. The remaining settings are validated
//! and recorded in [`ChannelSettings`] for callers to act on; tonic's
//! endpoint has no counterpart for them.

use crate::builder::{ManagedChannelBuilder, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_METADATA_SIZE};
use crate::channel::{ChannelHandle, ManagedChannel};
use crate::error::ChannelError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint, Uri};
use tracing::debug;

/// Idle timeouts at or above this disable idle mode
const MAX_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Idle timeouts below this are raised to it
const MIN_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings gathered by a [`TonicChannelBuilder`]
///
/// Fields marked "recorded only" are validated and kept but not applied to
/// the tonic endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    /// Dial target, with or without scheme
    pub target: String,
    /// User-agent prefix
    pub user_agent: Option<String>,
    /// Authority override
    pub authority: Option<String>,
    /// Insecure transport
    pub plaintext: bool,
    /// Load-balancing policy name; recorded only
    pub load_balancing_policy: String,
    /// Accept compressed streams; recorded only
    pub full_stream_decompression: bool,
    /// `None` disables idle mode; recorded only
    pub idle_timeout: Option<Duration>,
    /// `None` disables keep-alive pings
    pub keep_alive_time: Option<Duration>,
    /// Keep-alive acknowledgement timeout
    pub keep_alive_timeout: Option<Duration>,
    /// Ping without calls in flight
    pub keep_alive_without_calls: bool,
    /// Inbound message cap in bytes
    ///
    /// Reported through [`ManagedChannel::max_inbound_message_size`]; apply
    /// it to generated clients with `max_decoding_message_size`.
    pub max_inbound_message_size: i32,
    /// Inbound metadata cap in bytes; recorded only
    pub max_inbound_metadata_size: i32,
    /// Transparent retries enabled; recorded only
    pub retry_enabled: bool,
    /// Retry attempt cap; recorded only
    pub max_retry_attempts: i32,
    /// Hedged attempt cap; recorded only
    pub max_hedged_attempts: i32,
    /// Shared retry buffer in bytes; recorded only
    pub retry_buffer_size: i64,
    /// Per-call retry buffer in bytes; recorded only
    pub per_rpc_buffer_limit: i64,
    /// Trace events kept, 0 disables tracing; recorded only
    pub max_trace_events: i32,
    /// Default service config, validated JSON object text; recorded only
    pub default_service_config: Option<String>,
    /// Accept service configs from name resolution; recorded only
    pub service_config_lookup: bool,
}

impl ChannelSettings {
    fn for_target(target: String) -> Self {
        Self {
            target,
            user_agent: None,
            authority: None,
            plaintext: false,
            load_balancing_policy: "pick_first".to_string(),
            full_stream_decompression: false,
            idle_timeout: Some(Duration::from_secs(30 * 60)),
            keep_alive_time: None,
            keep_alive_timeout: Some(Duration::from_secs(20)),
            keep_alive_without_calls: false,
            max_inbound_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_inbound_metadata_size: DEFAULT_MAX_METADATA_SIZE,
            retry_enabled: true,
            max_retry_attempts: 5,
            max_hedged_attempts: 5,
            retry_buffer_size: 16 * 1024 * 1024,
            per_rpc_buffer_limit: 1024 * 1024,
            max_trace_events: 0,
            default_service_config: None,
            service_config_lookup: true,
        }
    }

    fn scheme(&self) -> &'static str {
        if self.plaintext {
            "http"
        } else {
            "https"
        }
    }

    /// Target with a scheme, adding one from the transport choice if missing
    pub fn uri(&self) -> String {
        if self.target.contains("://") {
            self.target.clone()
        } else {
            format!("{}://{}", self.scheme(), self.target)
        }
    }
}

/// Channel builder producing tonic channels
#[derive(Debug, Clone)]
pub struct TonicChannelBuilder {
    settings: ChannelSettings,
}

impl TonicChannelBuilder {
    /// Start a builder for `target` (`host:port` or a full URI)
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            settings: ChannelSettings::for_target(target.into()),
        }
    }

    /// Settings gathered so far
    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    fn endpoint(&self) -> Result<Endpoint, ChannelError> {
        let settings = &self.settings;
        let uri = settings.uri();
        let scheme = uri.split_once("://").map(|(scheme, _)| scheme);
        if scheme != Some(settings.scheme()) {
            return Err(ChannelError::InvalidTarget(format!(
                "{} conflicts with {} transport",
                uri,
                if settings.plaintext { "plaintext" } else { "secure" }
            )));
        }

        let mut endpoint = Endpoint::from_shared(uri)?;

        if let Some(agent) = &settings.user_agent {
            endpoint = endpoint.user_agent(agent.clone())?;
        }

        let mut server_name = None;
        if let Some(authority) = &settings.authority {
            let origin: Uri = format!("{}://{}", settings.scheme(), authority)
                .parse()
                .map_err(|e| ChannelError::InvalidTarget(format!("{}: {}", authority, e)))?;
            server_name = origin.host().map(str::to_string);
            endpoint = endpoint.origin(origin);
        }

        if !settings.plaintext {
            let mut tls = ClientTlsConfig::new().with_webpki_roots();
            if let Some(name) = server_name {
                tls = tls.domain_name(name);
            }
            endpoint = endpoint.tls_config(tls)?;
        }

        if let Some(interval) = settings.keep_alive_time {
            endpoint = endpoint
                .http2_keep_alive_interval(interval)
                .keep_alive_while_idle(settings.keep_alive_without_calls);
            if let Some(timeout) = settings.keep_alive_timeout {
                endpoint = endpoint.keep_alive_timeout(timeout);
            }
        }

        Ok(endpoint)
    }

    /// Create a lazily connecting [`TonicChannel`]
    ///
    /// Same as [`build`](ManagedChannelBuilder::build) without erasing the
    /// channel type. Must be called inside a tokio runtime.
    pub fn build_tonic(&self) -> Result<TonicChannel, ChannelError> {
        let endpoint = self.endpoint()?;
        let authority = match &self.settings.authority {
            Some(authority) => authority.clone(),
            None => endpoint
                .uri()
                .authority()
                .map(|a| a.to_string())
                .ok_or_else(|| ChannelError::InvalidTarget(self.settings.target.clone()))?,
        };

        debug!(
            "Building {} tonic channel to {} (authority {})",
            if self.settings.plaintext { "plaintext" } else { "TLS" },
            endpoint.uri(),
            authority
        );

        Ok(TonicChannel {
            channel: endpoint.connect_lazy(),
            authority,
            settings: self.settings.clone(),
            shutdown: AtomicBool::new(false),
        })
    }
}

fn non_negative_i32(operation: &'static str, value: i32) -> Result<i32, ChannelError> {
    if value < 0 {
        return Err(ChannelError::invalid(operation, format!("{} must not be negative", value)));
    }
    Ok(value)
}

fn non_negative_i64(operation: &'static str, value: i64) -> Result<i64, ChannelError> {
    if value < 0 {
        return Err(ChannelError::invalid(operation, format!("{} must not be negative", value)));
    }
    Ok(value)
}

fn non_empty(operation: &'static str, value: String) -> Result<String, ChannelError> {
    if value.is_empty() {
        return Err(ChannelError::invalid(operation, "must not be empty"));
    }
    Ok(value)
}

impl ManagedChannelBuilder for TonicChannelBuilder {
    fn user_agent(&mut self, agent: String) -> Result<&mut Self, ChannelError> {
        self.settings.user_agent = Some(agent);
        Ok(self)
    }

    fn override_authority(&mut self, authority: String) -> Result<&mut Self, ChannelError> {
        self.settings.authority = Some(non_empty("override_authority", authority)?);
        Ok(self)
    }

    fn use_plaintext(&mut self) -> Result<&mut Self, ChannelError> {
        self.settings.plaintext = true;
        Ok(self)
    }

    fn use_transport_security(&mut self) -> Result<&mut Self, ChannelError> {
        self.settings.plaintext = false;
        Ok(self)
    }

    fn default_load_balancing_policy(&mut self, policy: String) -> Result<&mut Self, ChannelError> {
        self.settings.load_balancing_policy = non_empty("default_load_balancing_policy", policy)?;
        Ok(self)
    }

    fn enable_full_stream_decompression(&mut self) -> Result<&mut Self, ChannelError> {
        self.settings.full_stream_decompression = true;
        Ok(self)
    }

    fn idle_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ChannelError> {
        self.settings.idle_timeout = if timeout.is_zero() || timeout >= MAX_IDLE_TIMEOUT {
            None
        } else {
            Some(timeout.max(MIN_IDLE_TIMEOUT))
        };
        Ok(self)
    }

    fn keep_alive_time(&mut self, time: Duration) -> Result<&mut Self, ChannelError> {
        self.settings.keep_alive_time = (!time.is_zero()).then_some(time);
        Ok(self)
    }

    fn keep_alive_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ChannelError> {
        self.settings.keep_alive_timeout = (!timeout.is_zero()).then_some(timeout);
        Ok(self)
    }

    fn keep_alive_without_calls(&mut self, enable: bool) -> Result<&mut Self, ChannelError> {
        self.settings.keep_alive_without_calls = enable;
        Ok(self)
    }

    fn max_inbound_message_size(&mut self, bytes: i32) -> Result<&mut Self, ChannelError> {
        self.settings.max_inbound_message_size = non_negative_i32("max_inbound_message_size", bytes)?;
        Ok(self)
    }

    fn max_inbound_metadata_size(&mut self, bytes: i32) -> Result<&mut Self, ChannelError> {
        if bytes <= 0 {
            return Err(ChannelError::invalid(
                "max_inbound_metadata_size",
                format!("{} must be positive", bytes),
            ));
        }
        self.settings.max_inbound_metadata_size = bytes;
        Ok(self)
    }

    fn max_retry_attempts(&mut self, attempts: i32) -> Result<&mut Self, ChannelError> {
        self.settings.max_retry_attempts = non_negative_i32("max_retry_attempts", attempts)?;
        Ok(self)
    }

    fn max_hedged_attempts(&mut self, attempts: i32) -> Result<&mut Self, ChannelError> {
        self.settings.max_hedged_attempts = non_negative_i32("max_hedged_attempts", attempts)?;
        Ok(self)
    }

    fn retry_buffer_size(&mut self, bytes: i64) -> Result<&mut Self, ChannelError> {
        self.settings.retry_buffer_size = non_negative_i64("retry_buffer_size", bytes)?;
        Ok(self)
    }

    fn per_rpc_buffer_limit(&mut self, bytes: i64) -> Result<&mut Self, ChannelError> {
        self.settings.per_rpc_buffer_limit = non_negative_i64("per_rpc_buffer_limit", bytes)?;
        Ok(self)
    }

    fn enable_retry(&mut self) -> Result<&mut Self, ChannelError> {
        self.settings.retry_enabled = true;
        Ok(self)
    }

    fn disable_retry(&mut self) -> Result<&mut Self, ChannelError> {
        self.settings.retry_enabled = false;
        Ok(self)
    }

    fn max_trace_events(&mut self, max_events: i32) -> Result<&mut Self, ChannelError> {
        self.settings.max_trace_events = non_negative_i32("max_trace_events", max_events)?;
        Ok(self)
    }

    fn default_service_config(&mut self, config: Option<String>) -> Result<&mut Self, ChannelError> {
        if let Some(text) = &config {
            let parsed: serde_json::Value = serde_json::from_str(text)?;
            if !parsed.is_object() {
                return Err(ChannelError::invalid(
                    "default_service_config",
                    "service config must be a JSON object",
                ));
            }
        }
        self.settings.default_service_config = config;
        Ok(self)
    }

    fn disable_service_config_lookup(&mut self) -> Result<&mut Self, ChannelError> {
        self.settings.service_config_lookup = false;
        Ok(self)
    }

    /// Create a lazily connecting channel
    ///
    /// Must be called inside a tokio runtime. The handle downcasts to
    /// [`TonicChannel`].
    fn build(&mut self) -> Result<ChannelHandle, ChannelError> {
        Ok(Arc::new(self.build_tonic()?))
    }
}

/// Channel built by [`TonicChannelBuilder`]
///
/// Reach it from a [`ChannelHandle`] with
/// `handle.downcast_ref::<TonicChannel>()`.
#[derive(Debug)]
pub struct TonicChannel {
    channel: Channel,
    authority: String,
    settings: ChannelSettings,
    shutdown: AtomicBool,
}

impl TonicChannel {
    /// The tonic channel, for constructing generated clients
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// Settings the channel was built with
    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }
}

impl ManagedChannel for TonicChannel {
    fn authority(&self) -> String {
        self.authority.clone()
    }

    fn max_inbound_message_size(&self) -> Option<i32> {
        Some(self.settings.max_inbound_message_size)
    }

    fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            debug!("Shutting down channel to {}", self.authority);
        }
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
