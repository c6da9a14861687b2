//! Error and outcome types for the policy module.

use thiserror::Error;

/// A policy rejection. Expected, not exceptional: callers turn these into
/// diagnostic responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// `exp` is not later than now.
    #[error("grant expired at {exp} (now {now})")]
    Expired { exp: String, now: String },

    /// `exp` does not use the fixed timestamp profile, so it cannot be compared.
    #[error("timestamp {0:?} is not in YYYY-MM-DDTHH:MM:SS.sssZ form")]
    InvalidTimestamp(String),

    /// `seal.kid` is not the required key id.
    #[error("kid mismatch: expected {expected}, got {actual:?}")]
    KidMismatch {
        expected: String,
        actual: Option<String>,
    },

    /// `grant_id` is listed in the revocation manifest.
    #[error("grant {0} has been revoked")]
    Revoked(String),
}

impl Rejection {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::Expired { .. } => "expired",
            Rejection::InvalidTimestamp(_) => "invalid_timestamp",
            Rejection::KidMismatch { .. } => "kid_mismatch",
            Rejection::Revoked(_) => "revoked",
        }
    }
}

/// Errors reading a revocation manifest.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Manifest JSON could not be parsed.
    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    /// Manifest carries a different `kind`.
    #[error("manifest kind mismatch: expected {expected}, got {actual}")]
    ManifestKindMismatch {
        expected: &'static str,
        actual: String,
    },
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
