//! Error types for channel builders and their configuration

use tether_domain::DispatchError;
use thiserror::Error;

/// Errors raised by channel builder operations
#[derive(Debug, Error)]
pub enum ChannelError {
    /// An argument broke the operation's documented precondition
    #[error("Invalid argument to {operation}: {reason}")]
    InvalidArgument {
        /// Operation name
        operation: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Target or authority could not be turned into a URI
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Default service config is not a JSON object
    #[error("Invalid service config: {0}")]
    InvalidServiceConfig(#[from] serde_json::Error),

    /// tonic rejected the endpoint settings
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Operation invoked by descriptor with unusable arguments
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A delegate refused the operation
    #[error("Delegate rejected {operation}")]
    Rejected {
        /// Operation name
        operation: String,
    },
}

impl ChannelError {
    pub(crate) fn invalid(operation: &'static str, reason: impl Into<String>) -> Self {
        ChannelError::InvalidArgument {
            operation,
            reason: reason.into(),
        }
    }
}

/// Channel configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A configured value was rejected by the builder
    #[error("Configuration rejected: {0}")]
    Channel(#[from] ChannelError),
}
