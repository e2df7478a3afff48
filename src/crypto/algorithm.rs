//! Digest algorithm identifiers.
//!
//! Every algorithm is an HMAC over a SHA-2 hash.  The algorithm is not
//! recorded in the envelope, so sealer and opener must agree on it
//! out of band.

use std::fmt;
use std::str::FromStr;

use crate::errors::EnvelopeError;

/// HMAC variants supported by the envelope codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    /// All supported algorithms, weakest first.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
    ];

    /// Length in bytes of the digest this algorithm produces.
    pub fn output_len(self) -> usize {
        match self {
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
        }
    }

    /// Lowercase name, as used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = EnvelopeError;

    /// Accepts `sha256`, `SHA-256`, `hmac-sha256` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "");
        let name = normalized.strip_prefix("hmac").unwrap_or(&normalized);

        match name {
            "sha224" => Ok(Algorithm::Sha224),
            "sha256" => Ok(Algorithm::Sha256),
            "sha384" => Ok(Algorithm::Sha384),
            "sha512" => Ok(Algorithm::Sha512),
            _ => Err(EnvelopeError::UnknownAlgorithm(s.to_string())),
        }
    }
}
