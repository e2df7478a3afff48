//! Cryptographic primitives for sealed envelopes.
//!
//! This module provides:
//! - The supported HMAC digest algorithms (`algorithm`)
//! - Digest computation and constant-time verification (`digest`)
//! - Zeroizing secret key storage (`keys`)
//! - Keyfile generation and loading (`keyfile`)

pub mod algorithm;
pub mod digest;
pub mod keyfile;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{compute_digest, Algorithm, SecretKey, ...};
pub use algorithm::Algorithm;
pub use digest::{compute_digest, digests_match, verify_digest};
pub use keyfile::{generate_keyfile, load_keyfile};
pub use keys::SecretKey;
