//! Error types for Grantseal Core.

use thiserror::Error;

/// Errors raised while encoding, decoding, or verifying grants.
///
/// Policy outcomes (expiry, key id, revocation) are not errors; they live in
/// `grantseal-policy` as first-class results.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value outside the canonical model reached the encoder.
    #[error("unsupported type in canonical encoding: {0}")]
    UnsupportedType(String),

    /// Base64 or base64url input could not be decoded.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A public key was not 32 bytes long.
    #[error("invalid public key length: expected 32 bytes, got {0}")]
    InvalidPublicKey(usize),

    /// Compact token does not start with `v4.public.`.
    #[error("invalid token prefix")]
    InvalidPrefix,

    /// Compact token body is too short to carry a signature.
    #[error("invalid token body: {0} bytes, need at least 64")]
    InvalidBody(usize),

    /// Ed25519 verification over the digest failed.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// Decoded payload carries a different `kind` than expected.
    #[error("payload kind mismatch: expected {expected}, got {actual:?}")]
    PayloadKindMismatch {
        expected: &'static str,
        actual: Option<String>,
    },

    /// Payload is not JSON or is missing grant fields.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
