//! Resource constraints carried in `resource.constraints`.
//!
//! Each check returns `Ok(())` or a [`ConstraintViolation`] with a reason code
//! and a hint a client can act on. Checks are independent of each other and of
//! the policy checks in [`crate::validator`].

use std::fmt;

use grantseal_core::grant::fields;
use grantseal_core::{AccessGrant, Digest, Value};
use thiserror::Error;

/// Machine-checkable violation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationReason {
    IpHashMismatch,
    ByteRangeExceedsLimit,
}

impl ViolationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationReason::IpHashMismatch => "ip_hash_mismatch",
            ViolationReason::ByteRangeExceedsLimit => "byte_range_exceeds_limit",
        }
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed constraint with a remediation hint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: {hint}")]
pub struct ConstraintViolation {
    pub reason: ViolationReason,
    pub hint: String,
}

/// IP binding marker: `iphash:` + hex(BLAKE3(ip)).
pub fn ip_hash(ip: &str) -> String {
    format!("iphash:{}", Digest::hash(ip.as_bytes()).to_hex())
}

/// Check `resource.constraints.ip_hash` against the caller's observed IP.
///
/// No constraint (or an empty one) passes.
pub fn check_ip(grant: &AccessGrant, client_ip: &str) -> Result<(), ConstraintViolation> {
    let want = match grant.constraints().and_then(|c| c.get(fields::IP_HASH)) {
        None | Some(Value::Null) | Some(Value::Absent) => return Ok(()),
        Some(Value::String(s)) if s.is_empty() => return Ok(()),
        Some(other) => other,
    };
    if want.as_str() == Some(ip_hash(client_ip).as_str()) {
        return Ok(());
    }
    Err(ConstraintViolation {
        reason: ViolationReason::IpHashMismatch,
        hint: "use X-Client-IP or request a new grant for this IP".to_string(),
    })
}

/// Parse `bytes=<start>-<end>`; `None` for anything else.
pub fn parse_range(range: &str) -> Option<(u64, u64)> {
    let (start, end) = range.strip_prefix("bytes=")?.split_once('-')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(start) || !digits(end) {
        return None;
    }
    Some((start.parse().ok()?, end.parse().ok()?))
}

/// Check a requested range against a byte limit.
///
/// A missing or zero limit, a missing request, or a malformed range all pass:
/// there is nothing to enforce.
pub fn check_byte_range(
    byte_range_max: Option<u64>,
    requested_range: Option<&str>,
) -> Result<(), ConstraintViolation> {
    let (Some(max), Some(range)) = (byte_range_max.filter(|m| *m > 0), requested_range) else {
        return Ok(());
    };
    let Some((start, end)) = parse_range(range) else {
        return Ok(());
    };
    if end < start {
        return Ok(());
    }

    let size = u128::from(end) - u128::from(start) + 1;
    if size <= u128::from(max) {
        return Ok(());
    }
    let suggested_end = u128::from(start) + u128::from(max) - 1;
    Err(ConstraintViolation {
        reason: ViolationReason::ByteRangeExceedsLimit,
        hint: format!("request <= {max} bytes (e.g., bytes={start}-{suggested_end})"),
    })
}

/// `resource.constraints.byte_range_max` of a grant.
pub fn byte_range_max(grant: &AccessGrant) -> Option<u64> {
    grant
        .constraints()
        .and_then(|c| c.get(fields::BYTE_RANGE_MAX))
        .and_then(Value::as_u64)
}

/// What the caller observed about the request being authorized.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Observed client IP. `None` checks as the empty address, so an IP-bound
    /// grant fails.
    pub client_ip: Option<String>,
    /// `Range` header value, e.g. `bytes=0-99`.
    pub range: Option<String>,
    /// Overrides the grant's `byte_range_max` when set.
    pub byte_range_max: Option<u64>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_byte_range_max(mut self, max: u64) -> Self {
        self.byte_range_max = Some(max);
        self
    }
}

/// Run every constraint check and collect the violations.
pub fn check_constraints(grant: &AccessGrant, request: &RequestContext) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();
    if let Err(v) = check_ip(grant, request.client_ip.as_deref().unwrap_or_default()) {
        violations.push(v);
    }
    let max = request.byte_range_max.or_else(|| byte_range_max(grant));
    if let Err(v) = check_byte_range(max, request.range.as_deref()) {
        violations.push(v);
    }
    violations
}
