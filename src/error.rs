//! Error types for astsql.

use thiserror::Error;

/// The main error type for translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Node encountered in a clause where it cannot appear.
    #[error("Structural error: {0}")]
    Structural(String),

    /// Construct the target dialect cannot express.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Full-join emulation cannot preserve the statement's semantics.
    #[error("Full join emulation infeasible: {0}")]
    EmulationInfeasible(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TranslateError {
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn infeasible(message: impl Into<String>) -> Self {
        Self::EmulationInfeasible(message.into())
    }
}

/// Result type alias for translation.
pub type TranslateResult<T> = Result<T, TranslateError>;
