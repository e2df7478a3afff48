//! Secret key handling.
//!
//! The HMAC key is the only sensitive value the envelope codec touches.
//! `SecretKey` owns it and wipes the buffer when dropped, so every exit
//! path (including early `?` returns) releases a zeroed allocation.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of generated keys (256 bits).
pub const GENERATED_KEY_LEN: usize = 32;

/// Number of base64 characters shown by `fingerprint`.
const FINGERPRINT_LEN: usize = 16;

/// An HMAC key that zeroes its memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Wrap raw key bytes.  Any length is accepted, including empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Generate a fresh random 32-byte key.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A short, non-reversible identifier for the key (base64 SHA-256
    /// prefix), safe to print.
    pub fn fingerprint(&self) -> String {
        let hash = Sha256::digest(&self.bytes);
        let mut encoded = BASE64.encode(hash);
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }
}

impl From<&[u8]> for SecretKey {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("len", &self.bytes.len())
            .field("bytes", &"<redacted>")
            .finish()
    }
}
