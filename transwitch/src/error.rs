/// Error types for the translation coordinator and its backends
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum MtError {
    /// `translator()` was used while no backend is selected
    #[error("Translate not found: no active translation source")]
    NoActiveBackend,
    /// Source name rejected by the registry
    #[error("Invalid source: {0}")]
    InvalidSource(String),
    /// A registered factory failed to build its backend
    #[error("Backend initialization error: {0}")]
    BackendInit(String),
    /// Error reported by a backend while translating
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// Transport-level failure talking to a remote backend
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Backend call exceeded the configured request timeout (milliseconds)
    #[error("Request timed out after {0}ms")]
    Timeout(u64),
    /// Cache storage failure
    #[error("Storage error: {0}")]
    StorageError(String),
    /// Backend could not produce a link
    #[error("Link error: {0}")]
    LinkError(String),
    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Result type for translation operations
pub type MtResult<T> = Result<T, MtError>;
