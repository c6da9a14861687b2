//! Revocation manifest sources.
//!
//! A source hands back a parsed manifest; how it gets the bytes is up to the
//! implementation. HTTP clients can use [`manifest_from_response`] so status
//! handling stays the same everywhere.

use std::sync::Arc;

use async_trait::async_trait;
use grantseal_policy::{RevocationCache, RevocationManifest};

use crate::error::{FetchError, Result};

/// Well-known path of the revocation manifest, relative to the issuer origin.
pub const GRL_PATH: &str = "/.well-known/logline/grl.json";

/// Anything that can produce the current revocation manifest.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_manifest(&self) -> Result<RevocationManifest>;
}

/// Turn an HTTP response into a manifest.
pub fn manifest_from_response(status: u16, body: &[u8]) -> Result<RevocationManifest> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Status(status));
    }
    Ok(RevocationManifest::from_json(body)?)
}

/// Fetch from `source` and install the result into `cache`.
///
/// On failure the previous manifest stays in place.
pub async fn refresh<S>(cache: &RevocationCache, source: &S) -> Result<Arc<RevocationManifest>>
where
    S: ManifestSource + ?Sized,
{
    match source.fetch_manifest().await {
        Ok(manifest) => Ok(cache.set(manifest)),
        Err(e) => {
            tracing::warn!(error = %e, "revocation manifest refresh failed, keeping previous");
            Err(e)
        }
    }
}

/// A source backed by canned responses, for tests and offline use.
pub mod memory {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    /// Raw response: status and body.
    #[derive(Debug, Clone)]
    pub struct Response {
        pub status: u16,
        pub body: Vec<u8>,
    }

    /// Replays queued responses in order, then repeats the last one.
    #[derive(Debug, Default)]
    pub struct MemorySource {
        responses: Mutex<VecDeque<Response>>,
        last: Mutex<Option<Response>>,
    }

    impl MemorySource {
        pub fn new() -> Self {
            Self::default()
        }

        /// A source that always serves `manifest`.
        pub fn serving(manifest: &RevocationManifest) -> Result<Self> {
            let body = serde_json::to_vec(manifest).map_err(|e| FetchError::Decode(e.to_string()))?;
            Ok(Self {
                responses: Mutex::new(VecDeque::from([Response { status: 200, body }])),
                last: Mutex::new(None),
            })
        }

        /// Queue a response.
        pub async fn push(&self, status: u16, body: impl Into<Vec<u8>>) {
            self.responses.lock().await.push_back(Response {
                status,
                body: body.into(),
            });
        }
    }

    #[async_trait]
    impl ManifestSource for MemorySource {
        async fn fetch_manifest(&self) -> Result<RevocationManifest> {
            let next = self.responses.lock().await.pop_front();
            let mut last = self.last.lock().await;
            if let Some(response) = next {
                *last = Some(response);
            }
            match last.as_ref() {
                Some(r) => manifest_from_response(r.status, &r.body),
                None => Err(FetchError::Transport("no response queued".into())),
            }
        }
    }
}
