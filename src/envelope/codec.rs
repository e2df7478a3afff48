//! Payload codecs.
//!
//! The envelope never looks inside its payload; a `Codec` turns values
//! into bytes before sealing and back after a successful open.  Encode
//! failures surface as `Serialization`, decode failures as `Payload`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{EnvelopeError, Result};

/// A symmetric, deterministic value serializer.
pub trait Codec {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON payloads via `serde_json`.  The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| EnvelopeError::Serialization(format!("json: {e}")))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| EnvelopeError::Payload(format!("json: {e}")))
    }
}

/// Compact binary payloads via `bincode`.
#[cfg(feature = "bincode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

#[cfg(feature = "bincode")]
impl Codec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(|e| EnvelopeError::Serialization(format!("bincode: {e}")))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes).map_err(|e| EnvelopeError::Payload(format!("bincode: {e}")))
    }
}
