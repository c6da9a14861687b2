//! Revocation manifest (GRL) and the cache that holds the current one.
//!
//! The cache holds at most one manifest. Installing a new manifest replaces the
//! old one wholesale; there is no merge and no manifest expiry here. Refresh
//! cadence belongs to whoever calls [`RevocationCache::set`].
//!
//! `sig` is carried but not verified: manifest signatures are a known gap.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};

/// Discriminator every manifest must carry.
pub const MANIFEST_KIND: &str = "revocation.manifest.v1";

/// The authoritative list of revoked grant ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationManifest {
    pub kind: String,
    pub updated_at: String,
    pub grants: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
}

impl RevocationManifest {
    /// Build a manifest from revoked ids.
    pub fn new<I, S>(updated_at: impl Into<String>, grants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: MANIFEST_KIND.to_string(),
            updated_at: updated_at.into(),
            grants: grants.into_iter().map(Into::into).collect(),
            sig: None,
        }
    }

    /// Parse a manifest document and check its kind.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(bytes)
            .map_err(|e| PolicyError::MalformedManifest(e.to_string()))?;
        if manifest.kind != MANIFEST_KIND {
            return Err(PolicyError::ManifestKindMismatch {
                expected: MANIFEST_KIND,
                actual: manifest.kind,
            });
        }
        Ok(manifest)
    }

    pub fn contains(&self, grant_id: &str) -> bool {
        self.grants.contains(grant_id)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Holds the most recently installed manifest.
///
/// Thread-safe via RwLock. Readers get an `Arc` snapshot, so a concurrent
/// `set` never exposes a half-written manifest.
#[derive(Debug, Default)]
pub struct RevocationCache {
    current: RwLock<Option<Arc<RevocationManifest>>>,
}

impl RevocationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache with a manifest already installed.
    pub fn with_manifest(manifest: RevocationManifest) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(manifest))),
        }
    }

    /// The current manifest, if any.
    pub fn get(&self) -> Option<Arc<RevocationManifest>> {
        // A poisoned lock still holds a whole manifest: writes are a single swap.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current manifest.
    pub fn set(&self, manifest: RevocationManifest) -> Arc<RevocationManifest> {
        let manifest = Arc::new(manifest);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::clone(&manifest));
        tracing::debug!(
            updated_at = %manifest.updated_at,
            revoked = manifest.len(),
            "installed revocation manifest"
        );
        manifest
    }

    /// Drop the current manifest.
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether `grant_id` is revoked by the current manifest.
    ///
    /// With no manifest installed nothing is revoked.
    pub fn is_revoked(&self, grant_id: &str) -> bool {
        self.get().is_some_and(|m| m.contains(grant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_cache() {
        let cache = RevocationCache::new();
        assert!(cache.get().is_none());
        assert!(!cache.is_revoked("g1"));
    }

    #[test]
    fn test_set_and_query() {
        let cache = RevocationCache::new();
        cache.set(RevocationManifest::new("2026-01-01T00:00:00.000Z", ["g1", "g2"]));
        assert!(cache.is_revoked("g1"));
        assert!(cache.is_revoked("g2"));
        assert!(!cache.is_revoked("g3"));
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let cache = RevocationCache::with_manifest(RevocationManifest::new(
            "2026-01-01T00:00:00.000Z",
            ["g1"],
        ));
        cache.set(RevocationManifest::new("2026-01-02T00:00:00.000Z", ["g2"]));
        assert!(!cache.is_revoked("g1"));
        assert!(cache.is_revoked("g2"));

        cache.clear();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let cache = RevocationCache::new();
        cache.set(RevocationManifest::new("t1", ["old"]));
        let snapshot = cache.get().unwrap();
        cache.set(RevocationManifest::new("t2", ["new"]));
        assert!(snapshot.contains("old"));
        assert!(cache.is_revoked("new"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_manifests() {
        let cache = Arc::new(RevocationCache::new());
        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..200 {
                    let ids: Vec<String> = (0..10).map(|j| format!("g{i}-{j}")).collect();
                    cache.set(RevocationManifest::new(format!("t{i}"), ids));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..500 {
                        if let Some(m) = cache.get() {
                            assert_eq!(m.len(), 10);
                            let generation = m.updated_at.trim_start_matches('t');
                            assert!(m.contains(&format!("g{generation}-9")));
                        }
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
    }

    #[test]
    fn test_manifest_json() {
        let json = br#"{"kind":"revocation.manifest.v1","updated_at":"2026-01-01T00:00:00.000Z","grants":["a","b","a"],"sig":"xyz"}"#;
        let m = RevocationManifest::from_json(json).unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.contains("a"));
        assert_eq!(m.sig.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_manifest_kind_checked() {
        let json = br#"{"kind":"access.grant.v1","updated_at":"x","grants":[]}"#;
        assert!(matches!(
            RevocationManifest::from_json(json),
            Err(PolicyError::ManifestKindMismatch { .. })
        ));
        assert!(matches!(
            RevocationManifest::from_json(b"[]"),
            Err(PolicyError::MalformedManifest(_))
        ));
    }
}
