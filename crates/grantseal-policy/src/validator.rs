//! Post-signature policy: expiry, key id, revocation.
//!
//! Run these only on grants whose signature already verified. They are kept
//! apart from the codecs so callers can ask for signature-only verification.

use chrono::{DateTime, Utc};

use grantseal_core::AccessGrant;

use crate::error::Rejection;
use crate::revocation::RevocationCache;
use crate::timestamp::{format_timestamp, is_profile_timestamp};

/// Reject unless `exp` is strictly later than `now`.
pub fn check_expiry(grant: &AccessGrant, now: DateTime<Utc>) -> Result<(), Rejection> {
    if !is_profile_timestamp(&grant.exp) {
        return Err(Rejection::InvalidTimestamp(grant.exp.clone()));
    }
    let now = format_timestamp(now);
    // Same fixed-width profile on both sides, so string order is time order.
    if grant.exp.as_str() > now.as_str() {
        Ok(())
    } else {
        Err(Rejection::Expired {
            exp: grant.exp.clone(),
            now,
        })
    }
}

/// Reject unless `seal.kid` equals `required`. `None` accepts any key id.
pub fn check_kid(grant: &AccessGrant, required: Option<&str>) -> Result<(), Rejection> {
    let Some(expected) = required else {
        return Ok(());
    };
    match grant.kid() {
        Some(kid) if kid == expected => Ok(()),
        actual => Err(Rejection::KidMismatch {
            expected: expected.to_string(),
            actual: actual.map(str::to_string),
        }),
    }
}

/// Reject if the cached manifest lists `grant_id`.
pub fn check_revocation(grant: &AccessGrant, revocations: &RevocationCache) -> Result<(), Rejection> {
    if revocations.is_revoked(&grant.grant_id) {
        Err(Rejection::Revoked(grant.grant_id.clone()))
    } else {
        Ok(())
    }
}

/// Options for a validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Key id the seal must name.
    pub required_kid: Option<String>,
    /// Evaluation instant. Defaults to the wall clock.
    pub now: Option<DateTime<Utc>>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_required_kid(mut self, kid: impl Into<String>) -> Self {
        self.required_kid = Some(kid.into());
        self
    }

    /// Evaluate as of `now` instead of the wall clock.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

/// Applies the policy checks against one revocation cache.
#[derive(Debug, Clone)]
pub struct GrantValidator<'a> {
    revocations: &'a RevocationCache,
    options: ValidationOptions,
}

impl<'a> GrantValidator<'a> {
    pub fn new(revocations: &'a RevocationCache) -> Self {
        Self {
            revocations,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    fn now(&self) -> DateTime<Utc> {
        self.options.now.unwrap_or_else(Utc::now)
    }

    /// First failing check, in order: expiry, key id, revocation.
    pub fn validate(&self, grant: &AccessGrant) -> Result<(), Rejection> {
        let result = check_expiry(grant, self.now())
            .and_then(|()| check_kid(grant, self.options.required_kid.as_deref()))
            .and_then(|()| check_revocation(grant, self.revocations));
        if let Err(rejection) = &result {
            tracing::warn!(
                grant_id = %grant.grant_id,
                reason = rejection.code(),
                "grant rejected by policy"
            );
        }
        result
    }

    /// Every failing check, for diagnostic responses.
    pub fn rejections(&self, grant: &AccessGrant) -> Vec<Rejection> {
        [
            check_expiry(grant, self.now()),
            check_kid(grant, self.options.required_kid.as_deref()),
            check_revocation(grant, self.revocations),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }
}
