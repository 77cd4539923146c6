//! Batch generator error types

use thiserror::Error;

/// Batch generator errors
#[derive(Debug, Error)]
pub enum BatchGeneratorError {
    /// Batch generation switched off by configuration
    #[error("batch generator is not configured: {reason}")]
    NotConfigured { reason: String },

    /// Configuration value out of range
    #[error("invalid batch generator config '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    /// Cycle requested after the producer was released
    #[error("batch generator is closed")]
    Closed,

    /// Frontier, oracle or producer failure
    #[error("collaborator error: {0}")]
    Collaborator(#[from] contracts::ContractError),
}

impl BatchGeneratorError {
    /// Create a not-configured error
    pub fn not_configured(reason: impl Into<String>) -> Self {
        Self::NotConfigured {
            reason: reason.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
