//! Error types for NewsCheck operations

use crate::analysis::AnalysisError;
use crate::capability::{RegistryError, ResolutionError};

/// Result type for NewsCheck operations
pub type Result<T> = std::result::Result<T, NewsCheckError>;

/// Error types for the NewsCheck crate
///
/// Invocation failures never show up here: the guarded invoker turns them
/// into [`CapabilityOutcome::Unavailable`](crate::capability::CapabilityOutcome).
#[derive(Debug, thiserror::Error)]
pub enum NewsCheckError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider registration failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Capability could not be resolved
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Article rejected before dispatch
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for NewsCheckError {
    fn from(s: String) -> Self {
        NewsCheckError::Other(s)
    }
}

impl From<&str> for NewsCheckError {
    fn from(s: &str) -> Self {
        NewsCheckError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for NewsCheckError {
    fn from(err: anyhow::Error) -> Self {
        NewsCheckError::Other(err.to_string())
    }
}
