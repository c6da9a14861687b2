//! The two wire encodings of a grant.
//!
//! - **Embedded seal**: the grant document carries `seal.sig`. Verification
//!   answers `Ok(true)` / `Ok(false)`; only encoding problems are errors.
//! - **Compact token**: `v4.public.` + base64url(payload || sig). Any
//!   verification failure is an error.
//!
//! Callers branch on which of the two they hold.

use bytes::Bytes;

use crate::canonical;
use crate::crypto::{
    base64_decode, base64url_decode, base64url_encode, Digest, Ed25519PublicKey,
    Ed25519Signature, Keypair,
};
use crate::error::{CoreError, Result};
use crate::grant::{fields, AccessGrant, Seal, GRANT_KIND};
use crate::value::Value;

/// Prefix of every compact public token.
pub const COMPACT_PREFIX: &str = "v4.public.";

/// Canonical bytes a seal signs: the document with `seal.sig` set to `""`.
pub fn signing_bytes(document: &Value) -> Result<Vec<u8>> {
    let mut unsigned = document.clone();
    if let Some(sig) = unsigned
        .get_mut(fields::SEAL)
        .and_then(|seal| seal.get_mut(fields::SIG))
    {
        *sig = Value::String(String::new());
    }
    canonical::encode(&unsigned)
}

/// Verify an embedded-seal grant document.
///
/// Returns `Ok(false)` for a wrong `kind`, a missing seal, or a signature that
/// does not verify. Base64 and canonicalization failures are errors.
pub fn verify_embedded_value(document: &Value, public_key: &Ed25519PublicKey) -> Result<bool> {
    if document.get(fields::KIND).and_then(Value::as_str) != Some(GRANT_KIND) {
        tracing::debug!("embedded grant rejected: kind mismatch");
        return Ok(false);
    }
    let Some(sig_b64) = document
        .get_path(&[fields::SEAL, fields::SIG])
        .and_then(Value::as_str)
    else {
        tracing::debug!("embedded grant rejected: no seal signature");
        return Ok(false);
    };

    let sig_bytes = base64_decode(sig_b64)?;
    let Some(signature) = Ed25519Signature::from_slice(&sig_bytes) else {
        tracing::debug!(len = sig_bytes.len(), "embedded grant rejected: bad signature length");
        return Ok(false);
    };

    let message = signing_bytes(document)?;
    let ok = public_key.verify_digest(&Digest::hash(&message), &signature);
    if !ok {
        tracing::warn!("embedded grant signature did not verify");
    }
    Ok(ok)
}

/// Verify a typed grant's embedded seal.
pub fn verify_embedded(grant: &AccessGrant, public_key: &Ed25519PublicKey) -> Result<bool> {
    verify_embedded_value(&grant.to_value(), public_key)
}

/// Verify a raw JSON grant document without going through [`AccessGrant`].
pub fn verify_embedded_json(bytes: &[u8], public_key: &Ed25519PublicKey) -> Result<bool> {
    verify_embedded_value(&canonical::parse(bytes)?, public_key)
}

/// Sign `grant` in place: sets the seal to `kid` and fills `seal.sig`.
pub fn seal_grant(keypair: &Keypair, kid: &str, grant: &mut AccessGrant) -> Result<()> {
    // Never sign over an existing signature.
    grant.seal = Some(Seal::unsigned(kid));
    let message = canonical::encode(&grant.to_value())?;
    let signature = keypair.sign_digest(&Digest::hash(&message));
    if let Some(seal) = grant.seal.as_mut() {
        seal.sig = signature.to_base64();
    }
    Ok(())
}

/// A compact token split into its parts. Nothing is verified yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactToken {
    /// Canonical JSON payload bytes.
    pub payload: Bytes,
    /// Trailing Ed25519 signature.
    pub signature: Ed25519Signature,
}

impl CompactToken {
    /// Check the prefix, decode the body, split off the trailing signature.
    pub fn parse(token: &str) -> Result<Self> {
        let blob = token
            .strip_prefix(COMPACT_PREFIX)
            .ok_or(CoreError::InvalidPrefix)?;
        let body = base64url_decode(blob)?;
        if body.len() < Ed25519Signature::LEN {
            return Err(CoreError::InvalidBody(body.len()));
        }

        let split = body.len() - Ed25519Signature::LEN;
        let signature = Ed25519Signature::from_slice(&body[split..])
            .ok_or(CoreError::InvalidBody(body.len()))?;
        let mut body = Bytes::from(body);
        let payload = body.split_to(split);
        Ok(Self { payload, signature })
    }

    /// Verify the signature over the payload digest.
    pub fn verify(&self, public_key: &Ed25519PublicKey) -> Result<()> {
        if public_key.verify_digest(&Digest::hash(&self.payload), &self.signature) {
            Ok(())
        } else {
            Err(CoreError::SignatureVerificationFailed)
        }
    }

    /// Parse the payload and check its kind. Call only after [`Self::verify`].
    pub fn grant(&self) -> Result<AccessGrant> {
        let value = canonical::parse(&self.payload)?;
        let kind = value.get(fields::KIND).and_then(Value::as_str);
        if kind != Some(GRANT_KIND) {
            return Err(CoreError::PayloadKindMismatch {
                expected: GRANT_KIND,
                actual: kind.map(str::to_string),
            });
        }
        AccessGrant::from_value(&value)
    }

    /// Re-assemble the wire form.
    pub fn to_token(&self) -> String {
        let mut body = Vec::with_capacity(self.payload.len() + Ed25519Signature::LEN);
        body.extend_from_slice(&self.payload);
        body.extend_from_slice(self.signature.as_bytes());
        format!("{COMPACT_PREFIX}{}", base64url_encode(&body))
    }
}

/// Decode and verify a compact token.
///
/// Errors: `InvalidPrefix`, `MalformedEncoding`, `InvalidBody`,
/// `SignatureVerificationFailed`, `MalformedPayload`, `PayloadKindMismatch`.
pub fn decode_compact(token: &str, public_key: &Ed25519PublicKey) -> Result<AccessGrant> {
    let parsed = CompactToken::parse(token)?;
    if let Err(e) = parsed.verify(public_key) {
        tracing::warn!(key = ?public_key, "compact token signature did not verify");
        return Err(e);
    }
    parsed.grant()
}

/// Issue a compact token for `grant`. The seal is not part of the payload.
pub fn issue_compact(keypair: &Keypair, grant: &AccessGrant) -> Result<String> {
    let mut unsealed = grant.to_value();
    if let Some(map) = unsealed.as_object_mut() {
        map.remove(fields::SEAL);
    }
    let payload = canonical::encode(&unsealed)?;
    let signature = keypair.sign_digest(&Digest::hash(&payload));
    Ok(CompactToken {
        payload: Bytes::from(payload),
        signature,
    }
    .to_token())
}
