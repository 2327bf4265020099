//! Error types for voxlink.

pub mod category;

pub use category::ErrorCategory;

use thiserror::Error;

/// Primary error type for all adapter, bridge and configuration operations.
#[derive(Error, Debug)]
pub enum VoxError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol parse error: {0}")]
    ProtocolParse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl VoxError {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::Settings(_) => ErrorCategory::Configuration,
            Self::Transport(_) | Self::Network(_) | Self::Io(_) => ErrorCategory::Transport,
            Self::ProtocolParse(_) | Self::Serialization(_) => ErrorCategory::ProtocolParse,
            Self::UnsupportedOperation(_) => ErrorCategory::Unsupported,
            Self::NotInitialized(_) | Self::NotConnected(_) => ErrorCategory::State,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                _ => ErrorCategory::Api,
            },
            Self::InvalidArgument(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether a caller could reasonably retry the failed operation.
    ///
    /// Nothing inside the crate acts on this; retry policy belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => matches!(self.category(), ErrorCategory::Transport),
        }
    }
}

impl From<toml::de::Error> for VoxError {
    fn from(err: toml::de::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

impl From<toml::ser::Error> for VoxError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, VoxError>;
