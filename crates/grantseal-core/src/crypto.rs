//! Cryptographic primitives for Grantseal.
//!
//! Messages are hashed with BLAKE3 and the 32-byte digest is what Ed25519
//! signs. Keys and signatures cross the wire as base64.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Standard alphabet, emits padding, accepts input with or without it.
const B64_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// URL-safe alphabet, no padding on output, accepts input with or without it.
const B64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as standard base64 with padding.
pub fn base64_encode(bytes: &[u8]) -> String {
    B64_STANDARD.encode(bytes)
}

/// Decode standard base64, padding optional.
pub fn base64_decode(s: &str) -> Result<Vec<u8>> {
    B64_STANDARD
        .decode(s)
        .map_err(|e| CoreError::MalformedEncoding(e.to_string()))
}

/// Encode bytes as unpadded base64url.
pub fn base64url_encode(bytes: &[u8]) -> String {
    B64_URL.encode(bytes)
}

/// Decode base64url, padding optional.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>> {
    B64_URL
        .decode(s)
        .map_err(|e| CoreError::MalformedEncoding(e.to_string()))
}

/// A 32-byte BLAKE3 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Compute the BLAKE3 digest of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake3({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Compute the digest that gets signed.
pub fn digest(data: &[u8]) -> Digest {
    Digest::hash(data)
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a byte slice of exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidPublicKey(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Parse from standard base64 (the form keys are distributed in).
    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_slice(&base64_decode(s)?)
    }

    pub fn to_base64(&self) -> String {
        base64_encode(&self.0)
    }

    /// Verify a signature over a digest.
    ///
    /// Returns `false` for bad signatures and for bytes that are not a valid
    /// curve point.
    pub fn verify_digest(&self, digest: &Digest, signature: &Ed25519Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let sig = Signature::from_bytes(&signature.0);
        verifying_key.verify(digest.as_bytes(), &sig).is_ok()
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl From<[u8; 32]> for Ed25519PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    pub const LEN: usize = 64;

    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parse from a slice; `None` unless it is exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base64(&self) -> String {
        base64_encode(&self.0)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

impl From<[u8; 64]> for Ed25519Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

/// Verify `signature` over `digest` with `public_key`, all as raw bytes.
pub fn verify(signature: &[u8; 64], digest: &[u8; 32], public_key: &[u8; 32]) -> bool {
    Ed25519PublicKey(*public_key)
        .verify_digest(&Digest(*digest), &Ed25519Signature(*signature))
}

/// An issuer keypair.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create from a base64 seed, as issuers store it.
    pub fn from_seed_base64(s: &str) -> Result<Self> {
        let bytes = base64_decode(s)?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::MalformedEncoding(format!("seed is {} bytes", bytes.len())))?;
        Ok(Self::from_seed(&seed))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a digest.
    pub fn sign_digest(&self, digest: &Digest) -> Ed25519Signature {
        let sig = self.signing_key.sign(digest.as_bytes());
        Ed25519Signature(sig.to_bytes())
    }

    /// Hash `message` and sign the digest.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        self.sign_digest(&Digest::hash(message))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}
