//! Keyfiles: the on-disk form of a shared HMAC key.
//!
//! A keyfile holds the raw key bytes and nothing else.  Generated
//! keyfiles are 32 random bytes, but any non-empty file is accepted
//! when loading so existing shared secrets can be used as-is.

use std::fs;
use std::path::Path;

use super::keys::SecretKey;
use crate::errors::{EnvelopeError, Result};

/// Generate a new random keyfile and write it to `path`.
///
/// The file is written with restrictive permissions (owner-only read).
/// Returns the key so the caller can use it immediately.
pub fn generate_keyfile(path: &Path) -> Result<SecretKey> {
    if path.exists() {
        return Err(EnvelopeError::Keyfile(format!(
            "keyfile already exists at {}",
            path.display()
        )));
    }

    let key = SecretKey::generate();

    // Ensure the parent directory exists.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                EnvelopeError::Keyfile(format!("cannot create keyfile directory: {e}"))
            })?;
        }
    }

    fs::write(path, key.as_bytes())
        .map_err(|e| EnvelopeError::Keyfile(format!("failed to write keyfile: {e}")))?;

    // On Unix, restrict permissions to owner-only read/write.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).map_err(|e| {
            EnvelopeError::Keyfile(format!("failed to set keyfile permissions: {e}"))
        })?;
    }

    tracing::debug!(path = %path.display(), "generated keyfile");

    Ok(key)
}

/// Load a keyfile from disk.  Empty files are rejected.
pub fn load_keyfile(path: &Path) -> Result<SecretKey> {
    if !path.exists() {
        return Err(EnvelopeError::Keyfile(format!(
            "keyfile not found at {}",
            path.display()
        )));
    }

    let data = fs::read(path)
        .map_err(|e| EnvelopeError::Keyfile(format!("failed to read keyfile: {e}")))?;

    if data.is_empty() {
        return Err(EnvelopeError::Keyfile(format!(
            "keyfile at {} is empty",
            path.display()
        )));
    }

    Ok(SecretKey::new(data))
}
