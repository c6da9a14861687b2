//! The Verifier: unified API for checking access grants.
//!
//! Signature verification and policy stay separate steps here too. The
//! `open_*` and `check_*` calls compose them for the common case.

use std::sync::Arc;

use grantseal_core::grant::fields;
use grantseal_core::{
    decode_compact, parse, verify_embedded, verify_embedded_json, verify_embedded_value,
    AccessGrant, Ed25519PublicKey, Value,
};
use grantseal_policy::{
    byte_range_max, check_constraints, GrantValidator, Rejection, RequestContext, RevocationCache,
};
use grantseal_remote::{refresh, ManifestSource};

use crate::config::VerifierConfig;
use crate::decision::{Decision, Poi};
use crate::error::{GrantError, Result};

/// Verifies grants issued under one public key.
#[derive(Debug, Clone)]
pub struct Verifier {
    /// Issuer key.
    public_key: Ed25519PublicKey,
    /// Configuration.
    config: VerifierConfig,
    /// Revocation manifest, shared with whoever refreshes it.
    revocations: Arc<RevocationCache>,
}

impl Verifier {
    /// Create a verifier with an empty revocation cache.
    pub fn new(public_key: Ed25519PublicKey, config: VerifierConfig) -> Self {
        Self {
            public_key,
            config,
            revocations: Arc::new(RevocationCache::new()),
        }
    }

    /// Create a verifier from a standard-base64 public key.
    pub fn from_base64(public_key: &str, config: VerifierConfig) -> Result<Self> {
        Ok(Self::new(Ed25519PublicKey::from_base64(public_key)?, config))
    }

    /// Share an existing revocation cache.
    pub fn with_revocations(mut self, revocations: Arc<RevocationCache>) -> Self {
        self.revocations = revocations;
        self
    }

    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn revocations(&self) -> &Arc<RevocationCache> {
        &self.revocations
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signature
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify an embedded seal. `Ok(false)` means the seal does not hold.
    pub fn verify_embedded(&self, grant: &AccessGrant) -> Result<bool> {
        Ok(verify_embedded(grant, &self.public_key)?)
    }

    /// Verify an embedded seal on a raw JSON document.
    pub fn verify_embedded_json(&self, document: &[u8]) -> Result<bool> {
        Ok(verify_embedded_json(document, &self.public_key)?)
    }

    /// Decode and verify a compact token. Policy is not applied.
    pub fn decode_compact(&self, token: &str) -> Result<AccessGrant> {
        let grant = decode_compact(token, &self.public_key)?;
        tracing::debug!(grant_id = %grant.grant_id, "compact token verified");
        Ok(grant)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Policy
    // ─────────────────────────────────────────────────────────────────────────

    fn validator(&self) -> GrantValidator<'_> {
        GrantValidator::new(&self.revocations).with_options(self.config.validation_options())
    }

    /// Apply expiry, key id, and revocation to an already verified grant.
    pub fn validate(&self, grant: &AccessGrant) -> Result<()> {
        Ok(self.validator().validate(grant)?)
    }

    /// Every policy rejection and constraint violation, as a decision.
    ///
    /// Assumes the signature already verified.
    pub fn decide(&self, grant: &AccessGrant, request: &RequestContext) -> Decision {
        let rejections = self.validator().rejections(grant);
        let violations = check_constraints(grant, &self.effective_request(grant, request));
        if rejections.is_empty() && violations.is_empty() {
            return Decision::Allow;
        }

        let codes: Vec<String> = rejections
            .iter()
            .map(Rejection::code)
            .chain(violations.iter().map(|v| v.reason.as_str()))
            .map(str::to_string)
            .collect();
        tracing::warn!(
            grant_id = %grant.grant_id,
            kid = grant.kid().unwrap_or_default(),
            reason = %codes[0],
            "grant needs attention"
        );
        let hints = violations.into_iter().map(|v| v.hint).collect();
        Decision::Ask {
            poi: Poi {
                reason: codes.first().cloned(),
                violations: codes,
                hints,
            },
        }
    }

    /// Fall back to the configured byte cap when neither side sets one.
    fn effective_request(&self, grant: &AccessGrant, request: &RequestContext) -> RequestContext {
        let mut request = request.clone();
        if request.byte_range_max.is_none() && byte_range_max(grant).is_none() {
            request.byte_range_max = self.config.byte_range_max;
        }
        request
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Composed
    // ─────────────────────────────────────────────────────────────────────────

    /// Parse an embedded-seal document, verify it, and apply policy.
    pub fn open_embedded(&self, document: &[u8]) -> Result<AccessGrant> {
        let grant = self.verified_embedded(document)?;
        self.validate(&grant)?;
        Ok(grant)
    }

    /// Decode a compact token and apply policy.
    pub fn open_compact(&self, token: &str) -> Result<AccessGrant> {
        let grant = self.decode_compact(token)?;
        self.validate(&grant)?;
        Ok(grant)
    }

    /// Verify an embedded-seal document and decide on `request`.
    ///
    /// A bad seal is an error, not a decision: there is nothing to ask about.
    pub fn check_embedded(&self, document: &[u8], request: &RequestContext) -> Result<Decision> {
        let grant = self.verified_embedded(document)?;
        Ok(self.decide(&grant, request))
    }

    /// Verify a compact token and decide on `request`.
    pub fn check_compact(&self, token: &str, request: &RequestContext) -> Result<Decision> {
        let grant = self.decode_compact(token)?;
        Ok(self.decide(&grant, request))
    }

    fn verified_embedded(&self, document: &[u8]) -> Result<AccessGrant> {
        let value = parse(document)?;
        let grant_id = value
            .get(fields::GRANT_ID)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if !verify_embedded_value(&value, &self.public_key)? {
            return Err(GrantError::InvalidSeal { grant_id });
        }
        let grant = AccessGrant::from_value(&value)?;
        tracing::debug!(
            grant_id = %grant.grant_id,
            kid = grant.kid().unwrap_or_default(),
            "embedded seal verified"
        );
        Ok(grant)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Revocation
    // ─────────────────────────────────────────────────────────────────────────

    /// Refresh the revocation manifest. Returns how many grants it revokes.
    ///
    /// On failure the previous manifest stays in place.
    pub async fn refresh_revocations<S>(&self, source: &S) -> Result<usize>
    where
        S: ManifestSource + ?Sized,
    {
        let manifest = refresh(&self.revocations, source).await?;
        Ok(manifest.len())
    }
}
