//! Error types for fetch operations.

use thiserror::Error;

/// Errors that can occur while fetching remote documents.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered outside 2xx.
    #[error("http status {0}")]
    Status(u16),

    /// Transport-level failure (connect, timeout, closed source).
    #[error("transport error: {0}")]
    Transport(String),

    /// The manifest document was rejected.
    #[error("manifest error: {0}")]
    Manifest(#[from] grantseal_policy::PolicyError),

    /// A response body did not parse.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
