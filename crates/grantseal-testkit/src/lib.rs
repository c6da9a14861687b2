//! # Grantseal Testkit
//!
//! Testing utilities for Grantseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Canonical encodings every implementation must reproduce
//! - **Generators**: Proptest strategies for values and grants
//! - **Fixtures**: An issuer key, a revocation cache, and a pinned clock
//!
//! ## Golden Vectors
//!
//! ```rust
//! use grantseal_testkit::vectors::{all_vectors, encode_vector};
//!
//! for vector in all_vectors() {
//!     assert_eq!(encode_vector(&vector).unwrap(), vector.expected);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use grantseal_testkit::generators::value;
//!
//! proptest! {
//!     #[test]
//!     fn encoding_is_deterministic(v in value()) {
//!         prop_assert_eq!(encode(&v).unwrap(), encode(&v).unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use chrono::Duration;
//! use grantseal_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let grant = fixture.seal(fixture.grant("g1", Duration::minutes(5)));
//! let token = fixture.compact(&grant);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_issuer_fixtures, TestFixture};
pub use generators::{grant_from_params, GrantParams};
pub use vectors::{all_vectors, encode_vector, verify_all_vectors, GoldenVector};
