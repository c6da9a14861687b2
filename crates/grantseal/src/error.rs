//! Error types for the verifier.

use grantseal_core::CoreError;
use grantseal_policy::Rejection;
use grantseal_remote::FetchError;
use thiserror::Error;

/// Errors that can occur during verifier operations.
#[derive(Debug, Error)]
pub enum GrantError {
    /// Encoding, decoding, or compact-token verification error.
    #[error("codec error: {0}")]
    Core(#[from] CoreError),

    /// Manifest fetch or decode error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Signature held, policy did not.
    #[error("grant rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Embedded seal did not verify.
    #[error("invalid seal on grant {grant_id}")]
    InvalidSeal { grant_id: String },
}

/// Result type for verifier operations.
pub type Result<T> = std::result::Result<T, GrantError>;
