//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Seed file not found
    #[error("Seed file not found: {path}")]
    SeedsNotFound { path: String },

    /// Seed line could not be decoded
    #[error("Invalid seed at line {line}: {message}")]
    SeedParse { line: usize, message: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] contracts::ContractError),

    /// Batch generator could not be built or failed mid-cycle
    #[error("Dispatch failed: {0}")]
    Generator(#[from] batch_generator::BatchGeneratorError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn seeds_not_found(path: &Path) -> Self {
        Self::SeedsNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn seed_parse(line: usize, message: impl Into<String>) -> Self {
        Self::SeedParse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
