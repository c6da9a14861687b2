//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use grantseal_core::{issue_compact, seal_grant, AccessGrant, Ed25519PublicKey, Keypair, Value};
use grantseal_policy::{format_timestamp, RevocationCache, RevocationManifest};

/// An issuer keypair plus a revocation cache, with a pinned clock.
pub struct TestFixture {
    pub keypair: Keypair,
    pub kid: String,
    pub revocations: Arc<RevocationCache>,
    pub now: DateTime<Utc>,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_keypair(Keypair::from_seed(&seed))
    }

    fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            kid: "test-kid".to_string(),
            revocations: Arc::new(RevocationCache::new()),
            // Whole milliseconds, so the profile round-trips exactly.
            now: DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap_or_default(),
        }
    }

    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = kid.into();
        self
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// `now + offset` in the timestamp profile.
    pub fn at(&self, offset: Duration) -> String {
        format_timestamp(self.now + offset)
    }

    /// An unsealed grant issued now that expires after `ttl`.
    pub fn grant(&self, grant_id: &str, ttl: Duration) -> AccessGrant {
        AccessGrant::new(grant_id, "user:test", self.at(Duration::zero()), self.at(ttl), "nonce")
    }

    /// Same as [`Self::grant`] with `resource.constraints` set.
    pub fn grant_with_constraints(&self, grant_id: &str, ttl: Duration, constraints: Value) -> AccessGrant {
        self.grant(grant_id, ttl)
            .with_resource(Value::object().with("constraints", constraints))
    }

    /// Seal a grant with the fixture key.
    pub fn seal(&self, mut grant: AccessGrant) -> AccessGrant {
        if let Err(e) = seal_grant(&self.keypair, &self.kid, &mut grant) {
            panic!("fixture grant must seal: {e}");
        }
        grant
    }

    /// Issue a compact token for a grant with the fixture key.
    pub fn compact(&self, grant: &AccessGrant) -> String {
        match issue_compact(&self.keypair, grant) {
            Ok(token) => token,
            Err(e) => panic!("fixture grant must encode: {e}"),
        }
    }

    /// Install a manifest revoking `grant_ids`.
    pub fn revoke(&self, grant_ids: &[&str]) {
        self.revocations
            .set(RevocationManifest::new(self.at(Duration::zero()), grant_ids.iter().copied()));
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixtures with distinct deterministic keys, for key-mismatch tests.
pub fn multi_issuer_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed).with_kid(format!("issuer-{i}"))
        })
        .collect()
}
