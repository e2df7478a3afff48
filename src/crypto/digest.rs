//! Keyed digest computation and constant-time comparison.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha224, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use super::algorithm::Algorithm;
use crate::errors::{EnvelopeError, Result};

/// Compute `HMAC(key, message)` with the chosen algorithm.
///
/// HMAC accepts keys of any length (including empty), so the error
/// path only exists because the `hmac` API is fallible in general.
pub fn compute_digest(key: &[u8], message: &[u8], algorithm: Algorithm) -> Result<Vec<u8>> {
    match algorithm {
        Algorithm::Sha224 => mac::<Hmac<Sha224>>(key, message),
        Algorithm::Sha256 => mac::<Hmac<Sha256>>(key, message),
        Algorithm::Sha384 => mac::<Hmac<Sha384>>(key, message),
        Algorithm::Sha512 => mac::<Hmac<Sha512>>(key, message),
    }
}

fn mac<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .map_err(|e| EnvelopeError::Hmac(format!("invalid HMAC key: {e}")))?;

    mac.update(message);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compare two digests without short-circuiting on the first differing
/// byte.  Buffers of different length never match.
pub fn digests_match(stored: &[u8], computed: &[u8]) -> bool {
    stored.ct_eq(computed).into()
}

/// Recompute the digest over `message` and check it against `stored`.
pub fn verify_digest(key: &[u8], message: &[u8], stored: &[u8], algorithm: Algorithm) -> Result<()> {
    let computed = compute_digest(key, message, algorithm)?;

    if digests_match(stored, &computed) {
        Ok(())
    } else {
        Err(EnvelopeError::DigestMismatch)
    }
}
