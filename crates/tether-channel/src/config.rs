//! Channel configuration loaded from TOML
//!
//! A [`ChannelConfig`] is applied through the fluent operations of any
//! [`ManagedChannelBuilder`], so configured values take the same path as
//! values set in code, forwarding layers included.

use crate::builder::ManagedChannelBuilder;
use crate::error::{ChannelError, ConfigError};
use crate::transport::TonicChannelBuilder;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Channel configuration
///
/// ```toml
/// target = "localhost:50051"
/// plaintext = true
/// user_agent = "tether/0.1"
/// keep_alive_time_secs = 30
/// max_inbound_message_size = 16777216
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    /// Dial target (e.g., "localhost:50051")
    pub target: String,

    /// User-agent prefix
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Authority override
    #[serde(default)]
    pub authority: Option<String>,

    /// Use an insecure transport (default: false)
    #[serde(default)]
    pub plaintext: bool,

    /// Idle timeout in seconds
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,

    /// Keep-alive ping interval in seconds
    #[serde(default)]
    pub keep_alive_time_secs: Option<u64>,

    /// Keep-alive acknowledgement timeout in seconds
    #[serde(default)]
    pub keep_alive_timeout_secs: Option<u64>,

    /// Ping while no call is in flight
    #[serde(default)]
    pub keep_alive_without_calls: Option<bool>,

    /// Inbound message cap in bytes
    #[serde(default)]
    pub max_inbound_message_size: Option<i32>,

    /// Inbound metadata cap in bytes
    #[serde(default)]
    pub max_inbound_metadata_size: Option<i32>,

    /// Retry attempt cap; 0 disables retries
    #[serde(default)]
    pub max_retry_attempts: Option<i32>,

    /// Default load-balancing policy
    #[serde(default)]
    pub load_balancing_policy: Option<String>,

    /// Default service config as JSON text
    #[serde(default)]
    pub service_config: Option<String>,
}

impl ChannelConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ChannelConfig = toml::from_str(contents)?;

        // Validate required fields
        if config.target.is_empty() {
            return Err(ConfigError::MissingField("target".to_string()));
        }

        Ok(config)
    }

    /// Create a configuration for `target` with nothing else set
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    /// Drive `builder` through the operations this configuration sets
    ///
    /// Unset fields are skipped, leaving the builder's own defaults.
    pub fn apply<B: ManagedChannelBuilder>(&self, builder: &mut B) -> Result<(), ChannelError> {
        if self.plaintext {
            builder.use_plaintext()?;
        }
        if let Some(agent) = &self.user_agent {
            builder.user_agent(agent.clone())?;
        }
        if let Some(authority) = &self.authority {
            builder.override_authority(authority.clone())?;
        }
        if let Some(secs) = self.idle_timeout_secs {
            builder.idle_timeout(Duration::from_secs(secs))?;
        }
        if let Some(secs) = self.keep_alive_time_secs {
            builder.keep_alive_time(Duration::from_secs(secs))?;
        }
        if let Some(secs) = self.keep_alive_timeout_secs {
            builder.keep_alive_timeout(Duration::from_secs(secs))?;
        }
        if let Some(enable) = self.keep_alive_without_calls {
            builder.keep_alive_without_calls(enable)?;
        }
        if let Some(bytes) = self.max_inbound_message_size {
            builder.max_inbound_message_size(bytes)?;
        }
        if let Some(bytes) = self.max_inbound_metadata_size {
            builder.max_inbound_metadata_size(bytes)?;
        }
        match self.max_retry_attempts {
            Some(0) => {
                builder.disable_retry()?;
            }
            Some(attempts) => {
                builder.max_retry_attempts(attempts)?;
            }
            None => {}
        }
        if let Some(policy) = &self.load_balancing_policy {
            builder.default_load_balancing_policy(policy.clone())?;
        }
        if self.service_config.is_some() {
            builder.default_service_config(self.service_config.clone())?;
        }

        debug!("Applied channel configuration for {}", self.target);
        Ok(())
    }

    /// A [`TonicChannelBuilder`] for the target with this configuration applied
    pub fn builder(&self) -> Result<TonicChannelBuilder, ConfigError> {
        let mut builder = TonicChannelBuilder::for_target(self.target.clone());
        self.apply(&mut builder)?;
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config = ChannelConfig::from_toml_str(r#"target = "localhost:50051""#).unwrap();

        assert_eq!(config, ChannelConfig::for_target("localhost:50051"));
        assert!(!config.plaintext);
    }

    #[test]
    fn test_empty_target_is_missing() {
        let result = ChannelConfig::from_toml_str(r#"target = """#);
        assert!(matches!(result, Err(ConfigError::MissingField(ref field)) if field == "target"));
    }

    #[test]
    fn test_absent_target_fails_parse() {
        let result = ChannelConfig::from_toml_str("plaintext = true");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_builder_applies_settings() {
        let config = ChannelConfig::from_toml_str(
            r#"
            target = "localhost:50051"
            plaintext = true
            idle_timeout_secs = 120
            max_retry_attempts = 0
            load_balancing_policy = "round_robin"
            "#,
        )
        .unwrap();

        let builder = config.builder().unwrap();
        let settings = builder.settings();

        assert!(settings.plaintext);
        assert_eq!(settings.idle_timeout, Some(Duration::from_secs(120)));
        assert!(!settings.retry_enabled);
        assert_eq!(settings.load_balancing_policy, "round_robin");
    }

    #[test]
    fn test_builder_surfaces_rejected_value() {
        let mut config = ChannelConfig::for_target("localhost:50051");
        config.max_inbound_metadata_size = Some(0);

        assert!(matches!(
            config.builder(),
            Err(ConfigError::Channel(ChannelError::InvalidArgument { .. }))
        ));
    }
}
