//! Verifier configuration.

use chrono::{DateTime, Utc};
use grantseal_policy::ValidationOptions;

/// Configuration for the [`Verifier`](crate::Verifier).
#[derive(Debug, Clone, Default)]
pub struct VerifierConfig {
    /// Key id every seal must name. `None` accepts any.
    pub required_kid: Option<String>,
    /// Byte-range cap used when neither the request nor the grant sets one.
    pub byte_range_max: Option<u64>,
    /// Fixed evaluation instant. `None` reads the wall clock per call.
    pub now: Option<DateTime<Utc>>,
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_required_kid(mut self, kid: impl Into<String>) -> Self {
        self.required_kid = Some(kid.into());
        self
    }

    pub fn with_byte_range_max(mut self, max: u64) -> Self {
        self.byte_range_max = Some(max);
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// The policy half of this configuration.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            required_kid: self.required_kid.clone(),
            now: self.now,
        }
    }
}
