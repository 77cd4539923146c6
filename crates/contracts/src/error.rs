//! Layered error definitions
//!
//! Categorized by source: config / frontier / feed / codec

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Frontier Errors =====
    /// Frontier backend failed to hand out requests
    #[error("frontier error: {message}")]
    Frontier { message: String },

    // ===== Feed Errors =====
    /// Partition availability query failed
    #[error("feed '{feed}' partition query error: {message}")]
    Partitions { feed: String, message: String },

    /// Producer rejected a message
    #[error("feed '{feed}' publish error: {message}")]
    Publish { feed: String, message: String },

    /// Producer already closed
    #[error("feed '{feed}' producer is closed")]
    ProducerClosed { feed: String },

    // ===== Codec Errors =====
    /// Request could not be encoded
    #[error("encoding error: {message}")]
    Encoding { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create frontier error
    pub fn frontier(message: impl Into<String>) -> Self {
        Self::Frontier {
            message: message.into(),
        }
    }

    /// Create partition query error
    pub fn partitions(feed: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Partitions {
            feed: feed.into(),
            message: message.into(),
        }
    }

    /// Create publish error
    pub fn publish(feed: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Publish {
            feed: feed.into(),
            message: message.into(),
        }
    }

    /// Create encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}
