//! # Grantseal Policy
//!
//! What happens after a grant's signature verifies.
//!
//! ## Overview
//!
//! - **Expiry**: `exp` must be strictly later than now, both in the fixed
//!   `YYYY-MM-DDTHH:MM:SS.sssZ` profile
//! - **Key id**: `seal.kid` must match the configured key id, if any
//! - **Revocation**: `grant_id` must not appear in the cached manifest
//! - **Constraints**: IP binding and byte-range caps from `resource.constraints`
//!
//! Rejections and violations are values, not errors. A caller that wants to
//! answer "ask again, because..." gets every reason with a hint.

pub mod constraints;
pub mod error;
pub mod revocation;
pub mod timestamp;
pub mod validator;

pub use constraints::{
    byte_range_max, check_byte_range, check_constraints, check_ip, ip_hash, parse_range,
    ConstraintViolation, RequestContext, ViolationReason,
};
pub use error::{PolicyError, Rejection, Result};
pub use revocation::{RevocationCache, RevocationManifest, MANIFEST_KIND};
pub use timestamp::{format_timestamp, is_profile_timestamp, now_timestamp, TIMESTAMP_FORMAT};
pub use validator::{check_expiry, check_kid, check_revocation, GrantValidator, ValidationOptions};
