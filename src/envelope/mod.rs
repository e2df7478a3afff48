//! Envelope module — tamper-evident framing of serialized values.
//!
//! This module provides:
//! - The wire format and its parser (`format`)
//! - Expiration timestamps and clocks (`expiration`)
//! - Pluggable payload codecs (`codec`)
//! - The high-level `Sealer` (`sealer`)
//!
//! The free functions below seal and open JSON payloads against the
//! system clock with a caller-chosen algorithm.  Use [`Sealer`] to swap
//! the codec or the clock.

pub mod codec;
pub mod expiration;
pub mod format;
pub mod sealer;

use std::io::{Read, Write};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::crypto::{Algorithm, SecretKey};
use crate::errors::Result;

// Re-export the most commonly used items.
#[cfg(feature = "bincode")]
pub use codec::BincodeCodec;
pub use codec::{Codec, JsonCodec};
pub use expiration::{Clock, FixedClock, SystemClock};
pub use format::{EnvelopeSummary, Frame};
pub use sealer::Sealer;

/// Seal `value` with `key` under `algorithm`, as JSON.
pub fn seal<T: Serialize + ?Sized>(
    key: &[u8],
    value: &T,
    algorithm: Algorithm,
    ttl: Option<Duration>,
) -> Result<Vec<u8>> {
    sealer(key, algorithm).seal(value, ttl)
}

/// Open an envelope produced by [`seal`] with the same key and algorithm.
pub fn open<T: DeserializeOwned>(key: &[u8], envelope: &[u8], algorithm: Algorithm) -> Result<T> {
    sealer(key, algorithm).open(envelope)
}

/// Seal `value` and write the envelope to `writer`.
pub fn dump<T, W>(
    key: &[u8],
    value: &T,
    algorithm: Algorithm,
    ttl: Option<Duration>,
    writer: W,
) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    sealer(key, algorithm).seal_to_writer(value, ttl, writer)
}

/// Read an envelope from `reader` and open it.
pub fn load<T, R>(key: &[u8], reader: R, algorithm: Algorithm) -> Result<T>
where
    T: DeserializeOwned,
    R: Read,
{
    sealer(key, algorithm).open_from_reader(reader)
}

fn sealer(key: &[u8], algorithm: Algorithm) -> Sealer {
    Sealer::new(SecretKey::from(key)).with_algorithm(algorithm)
}
