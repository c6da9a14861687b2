//! # Grantseal
//!
//! Verify signed access grants and decide whether a request may proceed.
//!
//! ## Overview
//!
//! An issuer seals an access grant with Ed25519 over the BLAKE3 digest of its
//! canonical JSON. A verifier holding the issuer's public key can:
//!
//! - **Verify** an embedded-seal document (`Ok(true)` / `Ok(false)`) or decode a
//!   `v4.public.` compact token (any failure is an error)
//! - **Validate** expiry, key id, and revocation
//! - **Decide** on a concrete request: IP binding and byte-range caps, answered
//!   as [`Decision::Allow`] or [`Decision::Ask`] with hints
//!
//! ## Usage
//!
//! ```rust,no_run
//! use grantseal::{RequestContext, Verifier, VerifierConfig};
//!
//! fn example(public_key_b64: &str, token: &str) -> grantseal::Result<()> {
//!     let verifier = Verifier::from_base64(
//!         public_key_b64,
//!         VerifierConfig::new().with_required_kid("issuer-2026"),
//!     )?;
//!
//!     // Signature and policy in one go
//!     let grant = verifier.open_compact(token)?;
//!     println!("grant {} for {}", grant.grant_id, grant.sub);
//!
//!     // Or decide on a specific request
//!     let request = RequestContext::new().with_range("bytes=0-99");
//!     let decision = verifier.check_compact(token, &request)?;
//!     assert!(decision.is_allow());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `grantseal::core` - Canonical JSON, digests, keys, grant codecs
//! - `grantseal::policy` - Expiry, key id, revocation, constraints
//! - `grantseal::remote` - Manifest and health fetch seams

pub mod config;
pub mod decision;
pub mod error;
pub mod verifier;

// Re-export component crates
pub use grantseal_core as core;
pub use grantseal_policy as policy;
pub use grantseal_remote as remote;

// Re-export main types for convenience
pub use config::VerifierConfig;
pub use decision::{summarize_poi, Decision, Poi};
pub use error::{GrantError, Result};
pub use verifier::Verifier;

// Re-export commonly used component types
pub use grantseal_core::{
    canonical_json, compute_cid, issue_compact, seal_grant, AccessGrant, Ed25519PublicKey,
    Keypair, Seal, Value,
};
pub use grantseal_policy::{ip_hash, Rejection, RequestContext, RevocationCache, RevocationManifest};
pub use grantseal_remote::{HealthReport, HealthStatus, ManifestSource};
