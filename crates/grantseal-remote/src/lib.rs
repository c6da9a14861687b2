//! # Grantseal Remote
//!
//! Async seams for the two documents a verifier pulls from an issuer:
//!
//! - the revocation manifest at [`GRL_PATH`], installed into a
//!   [`RevocationCache`](grantseal_policy::RevocationCache) by [`refresh`]
//! - the health report at [`HEALTH_PATH`]
//!
//! No HTTP client is bundled. Implement [`ManifestSource`] or [`HealthSource`]
//! over whatever client you already have.

pub mod error;
pub mod health;
pub mod source;

pub use error::{FetchError, Result};
pub use health::{check_health, HealthReport, HealthSource, HealthStatus, HEALTH_PATH};
pub use source::{manifest_from_response, memory::MemorySource, refresh, ManifestSource, GRL_PATH};
