use thiserror::Error;

/// All errors that can occur while sealing or opening envelopes.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    // --- Parsing errors ---
    #[error("Malformed envelope: {0}")]
    Format(String),

    #[error("Invalid expiration flag — it must be 1 or 0")]
    InvalidFlag,

    #[error("Invalid expiration timestamp: {0}")]
    InvalidExpiration(String),

    // --- Verification errors ---
    #[error("Envelope expired on {expired_at}")]
    Expired { expired_at: String },

    #[error("Digest verification failed — envelope was tampered with or signed with another key")]
    DigestMismatch,

    // --- Payload errors ---
    #[error("Payload could not be deserialized: {0}")]
    Payload(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Crypto errors ---
    #[error("HMAC error: {0}")]
    Hmac(String),

    #[error("Unknown digest algorithm '{0}' — supported: sha224, sha256, sha384, sha512")]
    UnknownAlgorithm(String),

    // --- Keyfile errors ---
    #[error("Keyfile error: {0}")]
    Keyfile(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    #[error("Invalid duration '{0}' — use a format like 90s, 30m, 24h or 7d")]
    InvalidDuration(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl EnvelopeError {
    /// True for every failure that means "do not trust this data":
    /// framing, flag, timestamp, expiry, digest and payload errors.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Format(_)
                | Self::InvalidFlag
                | Self::InvalidExpiration(_)
                | Self::Expired { .. }
                | Self::DigestMismatch
                | Self::Payload(_)
        )
    }
}

/// Convenience type alias for envelope results.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_classified() {
        assert!(EnvelopeError::Format("x".into()).is_rejection());
        assert!(EnvelopeError::InvalidFlag.is_rejection());
        assert!(EnvelopeError::DigestMismatch.is_rejection());
        assert!(EnvelopeError::Expired {
            expired_at: "then".into()
        }
        .is_rejection());
        assert!(!EnvelopeError::Serialization("x".into()).is_rejection());
        assert!(!EnvelopeError::Config("x".into()).is_rejection());
    }

    #[test]
    fn digest_mismatch_message_reveals_nothing() {
        let msg = EnvelopeError::DigestMismatch.to_string();
        assert!(!msg.contains("Expected"));
        assert!(!msg.chars().any(|c| c.is_ascii_digit()));
    }
}
