//! Sealing and opening envelopes.
//!
//! `Sealer` bundles the four things both directions need (key, digest
//! algorithm, payload codec, clock) so that callers can write
//! `sealer.seal(&value, None)` and `sealer.open::<T>(&bytes)`.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::codec::{Codec, JsonCodec};
use super::expiration::{check_not_expired, expires_at, render_timestamp, Clock, SystemClock};
use super::format::{build_message, write_envelope, Frame};
use crate::crypto::{compute_digest, verify_digest, Algorithm, SecretKey};
use crate::errors::Result;

/// Seals values into envelopes and opens them again.
///
/// A `Sealer` holds no mutable state, so one instance can be shared
/// between threads (e.g. behind an `Arc`).
#[derive(Debug, Clone)]
pub struct Sealer<C = JsonCodec, K = SystemClock> {
    /// The shared HMAC key (zeroized on drop).
    key: SecretKey,

    algorithm: Algorithm,

    codec: C,

    clock: K,
}

impl Sealer {
    /// A sealer with HMAC-SHA256, JSON payloads and the system clock.
    pub fn new(key: SecretKey) -> Self {
        Self {
            key,
            algorithm: Algorithm::default(),
            codec: JsonCodec,
            clock: SystemClock,
        }
    }
}

impl<C, K> Sealer<C, K> {
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Swap the payload codec.
    pub fn with_codec<C2: Codec>(self, codec: C2) -> Sealer<C2, K> {
        Sealer {
            key: self.key,
            algorithm: self.algorithm,
            codec,
            clock: self.clock,
        }
    }

    /// Swap the time source used for both stamping and checking expiry.
    pub fn with_clock<K2: Clock>(self, clock: K2) -> Sealer<C, K2> {
        Sealer {
            key: self.key,
            algorithm: self.algorithm,
            codec: self.codec,
            clock,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Printable identifier of the key in use.
    pub fn key_fingerprint(&self) -> String {
        self.key.fingerprint()
    }
}

impl<C: Codec, K: Clock> Sealer<C, K> {
    // ------------------------------------------------------------------
    // Sealing
    // ------------------------------------------------------------------

    /// Serialize `value` and seal it.  With `ttl`, the envelope stops
    /// opening once the clock passes `now + ttl`.
    pub fn seal<T: Serialize + ?Sized>(&self, value: &T, ttl: Option<Duration>) -> Result<Vec<u8>> {
        let payload = self.codec.encode(value)?;
        self.seal_bytes(&payload, ttl)
    }

    /// Seal an already-serialized payload.
    pub fn seal_bytes(&self, payload: &[u8], ttl: Option<Duration>) -> Result<Vec<u8>> {
        let timestamp = ttl.map(|ttl| render_timestamp(expires_at(self.clock.now(), ttl)));
        let message = build_message(timestamp.as_deref().map(str::as_bytes), payload);

        let digest = compute_digest(self.key.as_bytes(), &message, self.algorithm)?;

        tracing::debug!(
            algorithm = %self.algorithm,
            codec = self.codec.name(),
            payload_len = payload.len(),
            expires_at = timestamp.as_deref(),
            "sealed envelope"
        );

        Ok(write_envelope(&digest, &message))
    }

    /// Serialize `value` and write the envelope to `writer`.
    pub fn seal_to_writer<T, W>(&self, value: &T, ttl: Option<Duration>, mut writer: W) -> Result<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        let envelope = self.seal(value, ttl)?;
        writer.write_all(&envelope)?;
        writer.flush()?;
        Ok(())
    }

    /// Seal `value` into a file **atomically**.
    ///
    /// The envelope is written to a temp file in the same directory and
    /// then renamed over `path`, so readers never see a half-written
    /// envelope.
    pub fn seal_to_file<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let envelope = self.seal(value, ttl)?;
        write_atomic(path, &envelope)
    }

    // ------------------------------------------------------------------
    // Opening
    // ------------------------------------------------------------------

    /// Verify an envelope and deserialize its payload.
    pub fn open<T: DeserializeOwned>(&self, envelope: &[u8]) -> Result<T> {
        let payload = self.open_bytes(envelope)?;
        self.codec.decode(payload)
    }

    /// Verify an envelope and return its raw payload, borrowed from
    /// `envelope`.
    ///
    /// Order of checks: framing, then the digest, then expiry.  The
    /// expiry comparison only runs on an authenticated timestamp.
    pub fn open_bytes<'a>(&self, envelope: &'a [u8]) -> Result<&'a [u8]> {
        let result = self.verify(envelope);

        match &result {
            Ok(payload) => tracing::debug!(
                algorithm = %self.algorithm,
                payload_len = payload.len(),
                "opened envelope"
            ),
            Err(e) => tracing::debug!(algorithm = %self.algorithm, error = %e, "rejected envelope"),
        }

        result
    }

    fn verify<'a>(&self, envelope: &'a [u8]) -> Result<&'a [u8]> {
        let frame = Frame::parse(envelope)?;

        verify_digest(
            self.key.as_bytes(),
            &frame.message(),
            frame.digest(),
            self.algorithm,
        )?;

        if let Some(expiry) = frame.expires_at() {
            check_not_expired(expiry, self.clock.now())?;
        }

        Ok(frame.payload())
    }

    /// Read `reader` to the end and open the envelope it contains.
    pub fn open_from_reader<T, R>(&self, mut reader: R) -> Result<T>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.open(&data)
    }

    /// Read and open an envelope file.
    pub fn open_file<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let data = fs::read(path)?;
        self.open(&data)
    }
}

// ---------------------------------------------------------------------------
// Atomic file writes
// ---------------------------------------------------------------------------

/// Write `data` to `path` through a uniquely named temp file in the same
/// directory, then rename it into place.
///
/// Concurrent writers to one path each use their own temp file, so the
/// last rename wins with a complete envelope.  The temp file is removed
/// if either step fails.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = temp_path_for(path);

    let result = fs::write(&tmp_path, data).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        tracing::debug!(path = %path.display(), error = %e, "atomic write failed");
        return Err(e.into());
    }

    Ok(())
}

/// `.<name>.<pid>.<random>.tmp` next to `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path.file_name().unwrap_or_default().to_string_lossy();

    parent.join(format!(
        ".{name}.{}.{:016x}.tmp",
        std::process::id(),
        rand::random::<u64>()
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::expiration::FixedClock;
    use crate::errors::EnvelopeError;

    fn sealer() -> Sealer {
        Sealer::new(SecretKey::new(b"K".to_vec()))
    }

    #[test]
    fn seal_then_open() {
        let s = sealer();
        let envelope = s.seal(&vec!["a", "b"], None).unwrap();
        let back: Vec<String> = s.open(&envelope).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }

    #[test]
    fn envelope_layout_without_expiration() {
        let envelope = sealer().seal_bytes(b"payload", None).unwrap();
        assert!(envelope.starts_with(b"32_"));
        assert!(envelope.ends_with(b"_0_payload"));
        assert_eq!(envelope.len(), 3 + 32 + 1 + 2 + 7);
    }

    #[test]
    fn envelope_layout_with_expiration() {
        let s = sealer().with_clock(FixedClock::at(1_626_566_400.0));
        let envelope = s.seal_bytes(b"payload", Some(Duration::from_secs(60))).unwrap();
        assert!(envelope.ends_with(b"_1_1626566460_payload"));
    }

    #[test]
    fn sub_microsecond_expiry_opens_at_its_instant() {
        let t0 = 1_626_566_400.123_456_3;
        let ttl = Duration::from_secs(60);
        let envelope = sealer()
            .with_clock(FixedClock::at(t0))
            .seal(&"v", Some(ttl))
            .unwrap();

        let deadline = expires_at(t0, ttl);
        assert_eq!(Frame::parse(&envelope).unwrap().expires_at(), Some(deadline));

        let at_deadline = sealer().with_clock(FixedClock::at(deadline));
        assert_eq!(at_deadline.open::<String>(&envelope).unwrap(), "v");

        let just_after = sealer().with_clock(FixedClock::at(deadline + 1e-6));
        assert!(matches!(
            just_after.open::<String>(&envelope),
            Err(EnvelopeError::Expired { .. })
        ));
    }

    #[test]
    fn digest_covers_message() {
        let s = sealer();
        let envelope = s.seal_bytes(b"payload", None).unwrap();
        let frame = Frame::parse(&envelope).unwrap();
        let expected = compute_digest(b"K", b"0_payload", Algorithm::Sha256).unwrap();
        assert_eq!(frame.digest(), expected.as_slice());
    }

    #[test]
    fn open_bytes_borrows_payload() {
        let s = sealer();
        let envelope = s.seal_bytes(b"raw bytes", None).unwrap();
        assert_eq!(s.open_bytes(&envelope).unwrap(), b"raw bytes");
    }

    #[test]
    fn algorithm_must_match() {
        let s = sealer().with_algorithm(Algorithm::Sha512);
        let envelope = s.seal(&1u8, None).unwrap();
        assert!(envelope.starts_with(b"64_"));

        let other = sealer().with_algorithm(Algorithm::Sha256);
        assert!(matches!(
            other.open::<u8>(&envelope),
            Err(EnvelopeError::DigestMismatch)
        ));
    }

    #[test]
    fn expired_envelope_is_rejected_after_digest_check() {
        let s = sealer().with_clock(FixedClock::at(1_000.0));
        let envelope = s.seal(&"v", Some(Duration::from_secs(10))).unwrap();

        let later = s.clone().with_clock(FixedClock::at(1_011.0));
        assert!(matches!(
            later.open::<String>(&envelope),
            Err(EnvelopeError::Expired { .. })
        ));

        // A forged envelope with an expired timestamp reports the
        // digest failure, not the expiry.
        let forger = Sealer::new(SecretKey::new(b"other".to_vec())).with_clock(FixedClock::at(1_000.0));
        let forged = forger.seal(&"v", Some(Duration::from_secs(10))).unwrap();
        assert!(matches!(
            later.open::<String>(&forged),
            Err(EnvelopeError::DigestMismatch)
        ));
    }

    #[test]
    fn payload_error_after_authentication() {
        let s = sealer();
        let envelope = s.seal_bytes(b"not json", None).unwrap();
        assert!(matches!(
            s.open::<u32>(&envelope),
            Err(EnvelopeError::Payload(_))
        ));
    }

    #[test]
    fn writer_and_reader_round_trip() {
        let s = sealer();
        let mut buf = Vec::new();
        s.seal_to_writer(&("x", 1), None, &mut buf).unwrap();
        let back: (String, i32) = s.open_from_reader(buf.as_slice()).unwrap();
        assert_eq!(back, ("x".to_string(), 1));
    }

    #[test]
    fn file_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("value.sealed");
        let s = sealer();

        s.seal_to_file(&path, &42u64, None).unwrap();
        assert_eq!(s.open_file::<u64>(&path).unwrap(), 42);
        assert_eq!(leftover_temp_files(tmp.path()), 0);
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn temp_paths_are_unique_per_write() {
        let path = Path::new("dir/value.sealed");
        let a = temp_path_for(path);
        let b = temp_path_for(path);
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("dir")));
        assert!(a
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(".value.sealed."));
        assert_eq!(temp_path_for(Path::new("bare")).parent(), Some(Path::new(".")));
    }

    #[test]
    fn concurrent_seals_to_one_path_leave_a_complete_envelope() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("shared.sealed");
        let s = sealer();

        std::thread::scope(|scope| {
            for i in 0..8u64 {
                let (s, path) = (&s, &path);
                scope.spawn(move || {
                    for _ in 0..10 {
                        s.seal_to_file(path, &vec![i; 4_096], None).unwrap();
                    }
                });
            }
        });

        let values: Vec<u64> = s.open_file(&path).unwrap();
        assert_eq!(values.len(), 4_096);
        assert!(values.iter().all(|v| *v == values[0]));
        assert_eq!(leftover_temp_files(tmp.path()), 0);
    }

    #[cfg(unix)]
    #[test]
    fn failed_rename_removes_temp_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        // Renaming a file over a non-empty directory fails.
        let target = tmp.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner"), b"x").unwrap();

        let result = sealer().seal_to_file(&target, &1u8, None);
        assert!(matches!(result, Err(EnvelopeError::Io(_))));
        assert_eq!(leftover_temp_files(tmp.path()), 0);
        assert!(target.is_dir());
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("value.sealed");

        assert!(matches!(
            write_atomic(&path, b"data"),
            Err(EnvelopeError::Io(_))
        ));
        assert_eq!(leftover_temp_files(tmp.path()), 0);
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            sealer().open_file::<u64>(&tmp.path().join("missing")),
            Err(EnvelopeError::Io(_))
        ));
    }
}
