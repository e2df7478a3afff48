//! Wire framing of a sealed envelope.
//!
//! An envelope has this layout (`_` is the single byte `0x5F`):
//!
//! ```text
//! <digest_len: ASCII decimal>_<digest: raw bytes>_<flag: 0|1>_[<expires_at: decimal float>_]<payload>
//! ```
//!
//! - **Digest length**: tells the parser how many raw bytes to take,
//!   so the digest may itself contain the separator byte.
//! - **Digest**: HMAC over the *message* (everything after the second
//!   separator).
//! - **Flag**: `1` if an expiration timestamp follows, `0` otherwise.
//! - **Expiration**: absolute Unix time in seconds, present iff flag is `1`.
//! - **Payload**: opaque codec output.
//!
//! Parsing here is purely structural.  Nothing returned by
//! [`Frame::parse`] is authenticated until the digest is verified.

use super::expiration::parse_timestamp;
use crate::errors::{EnvelopeError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Field separator.
pub const SEPARATOR: u8 = b'_';

/// Flag value when an expiration timestamp is present.
pub const FLAG_EXPIRING: &[u8] = b"1";

/// Flag value when the envelope never expires.
pub const FLAG_PERMANENT: &[u8] = b"0";

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Build the message the digest is computed over:
/// `flag _ [timestamp _] payload`.
///
/// Sealing and verification both go through this function, so the
/// signed bytes are reconstructed identically on both sides.
pub fn build_message(timestamp: Option<&[u8]>, payload: &[u8]) -> Vec<u8> {
    let ts_len = timestamp.map_or(0, |ts| ts.len() + 1);
    let mut message = Vec::with_capacity(2 + ts_len + payload.len());

    match timestamp {
        Some(ts) => {
            message.extend_from_slice(FLAG_EXPIRING);
            message.push(SEPARATOR);
            message.extend_from_slice(ts);
            message.push(SEPARATOR);
        }
        None => {
            message.extend_from_slice(FLAG_PERMANENT);
            message.push(SEPARATOR);
        }
    }

    message.extend_from_slice(payload);
    message
}

/// Frame a digest and its message: `len(digest) _ digest _ message`.
pub fn write_envelope(digest: &[u8], message: &[u8]) -> Vec<u8> {
    let len_field = digest.len().to_string();
    let mut buf = Vec::with_capacity(len_field.len() + digest.len() + message.len() + 2);

    buf.extend_from_slice(len_field.as_bytes());
    buf.push(SEPARATOR);
    buf.extend_from_slice(digest);
    buf.push(SEPARATOR);
    buf.extend_from_slice(message);
    buf
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// A parsed, borrowed, **unverified** view of an envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    digest: &'a [u8],
    timestamp: Option<&'a [u8]>,
    expires_at: Option<f64>,
    payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Split an envelope into its fields, failing fast on the first
    /// structural problem.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        // --- Digest length ---
        let (len_field, rest) = split_at_separator(data)
            .ok_or_else(|| EnvelopeError::Format("missing digest length".into()))?;
        let digest_len = parse_digest_len(len_field)?;

        // --- Digest: exactly `digest_len` bytes, then a separator ---
        let digest = rest
            .get(..digest_len)
            .ok_or_else(|| EnvelopeError::Format("digest shorter than declared length".into()))?;
        match rest.get(digest_len) {
            Some(&SEPARATOR) => {}
            _ => {
                return Err(EnvelopeError::Format(
                    "digest not followed by a separator".into(),
                ))
            }
        }
        let rest = &rest[digest_len + 1..];

        // --- Expiration flag ---
        let (flag, rest) = split_at_separator(rest)
            .ok_or_else(|| EnvelopeError::Format("missing expiration flag".into()))?;

        let (timestamp, expires_at, payload) = match flag {
            FLAG_PERMANENT => (None, None, rest),
            FLAG_EXPIRING => {
                let (ts, payload) = split_at_separator(rest).ok_or_else(|| {
                    EnvelopeError::Format("missing expiration timestamp".into())
                })?;
                (Some(ts), Some(parse_timestamp(ts)?), payload)
            }
            _ => return Err(EnvelopeError::InvalidFlag),
        };

        Ok(Self {
            digest,
            timestamp,
            expires_at,
            payload,
        })
    }

    /// The stored digest bytes.
    pub fn digest(&self) -> &'a [u8] {
        self.digest
    }

    /// Whether the flag announced an expiration timestamp.
    pub fn has_expiration(&self) -> bool {
        self.timestamp.is_some()
    }

    /// The expiration timestamp exactly as written on the wire.
    pub fn timestamp_text(&self) -> Option<&'a [u8]> {
        self.timestamp
    }

    /// The parsed expiration, in seconds since the Unix epoch.
    pub fn expires_at(&self) -> Option<f64> {
        self.expires_at
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Rebuild the signed message from the parsed fields.
    pub fn message(&self) -> Vec<u8> {
        build_message(self.timestamp, self.payload)
    }

    /// Header fields for display.  Not authenticated.
    pub fn summary(&self) -> EnvelopeSummary {
        EnvelopeSummary {
            digest_len: self.digest.len(),
            has_expiration: self.has_expiration(),
            expires_at: self.expires_at,
            payload_len: self.payload.len(),
        }
    }
}

/// Unverified header information about an envelope, for inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSummary {
    pub digest_len: usize,
    pub has_expiration: bool,
    pub expires_at: Option<f64>,
    pub payload_len: usize,
}

/// Split at the first separator, dropping the separator itself.
fn split_at_separator(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = data.iter().position(|&b| b == SEPARATOR)?;
    Some((&data[..pos], &data[pos + 1..]))
}

/// The length field must be a non-empty run of ASCII digits that fits
/// in `usize`.  Signs, whitespace and underscores are rejected.
fn parse_digest_len(field: &[u8]) -> Result<usize> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(EnvelopeError::Format("digest length is not a number".into()));
    }

    // All bytes are ASCII digits, so this is valid UTF-8.
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| EnvelopeError::Format("digest length out of range".into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
