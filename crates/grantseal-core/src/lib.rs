//! # Grantseal Core
//!
//! Pure primitives for Grantseal: canonical JSON, digests, signatures, and the
//! two wire encodings of an access grant.
//!
//! This crate contains no I/O and no policy. It turns values into bytes,
//! bytes into digests, and tells you whether a signature over a digest holds.
//!
//! ## Key Types
//!
//! - [`Value`] - The closed value model the canonical encoder accepts
//! - [`AccessGrant`] / [`Seal`] - The signed authorization record
//! - [`Digest`] - BLAKE3 digest, the thing Ed25519 actually signs
//! - [`CompactToken`] - `v4.public.` detached-signature framing
//!
//! ## Canonicalization
//!
//! See [`canonical`]. Any divergence in key order, number text, or string
//! normalization silently breaks every signature, so the encoder is frozen.

pub mod canonical;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod grant;
pub mod value;

pub use canonical::{canonical_json, compute_cid, encode, encode_to_string, parse};
pub use codec::{
    decode_compact, issue_compact, seal_grant, signing_bytes, verify_embedded,
    verify_embedded_json, verify_embedded_value, CompactToken, COMPACT_PREFIX,
};
pub use crypto::{digest, verify, Digest, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use error::{CoreError, Result};
pub use grant::{AccessGrant, Seal, GRANT_KIND, SEAL_ALG};
pub use value::{Map, Value};
