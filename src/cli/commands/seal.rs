//! `sealenv seal` — wrap a JSON value in a signed envelope.

use std::path::Path;

use crate::cli::output;
use crate::cli::{build_sealer, load_settings, read_input, resolve_expiration, write_stdout, Cli};
use crate::envelope::expiration::format_timestamp;
use crate::envelope::sealer::write_atomic;
use crate::envelope::Frame;
use crate::errors::{EnvelopeError, Result};

/// Execute the `seal` command.
pub fn execute(
    cli: &Cli,
    input: &str,
    output_path: Option<&str>,
    expires_in: Option<&str>,
) -> Result<()> {
    let settings = load_settings(cli)?;
    let sealer = build_sealer(cli, &settings)?;
    let ttl = resolve_expiration(expires_in, &settings)?;

    // The input must be valid JSON; it is re-serialized canonically.
    let data = read_input(input)?;
    let value: serde_json::Value = serde_json::from_slice(&data)
        .map_err(|e| EnvelopeError::CommandFailed(format!("input is not valid JSON: {e}")))?;

    let envelope = sealer.seal(&value, ttl)?;

    match output_path {
        Some(dest) => {
            write_atomic(Path::new(dest), &envelope)?;
            output::success(&format!(
                "Sealed {} with {} (key {})",
                dest,
                sealer.algorithm(),
                sealer.key_fingerprint()
            ));
            if let Some(until) = sealed_expiry(&envelope)? {
                output::info(&format!("Expires at {until}"));
            }
        }
        None => write_stdout(&envelope)?,
    }

    Ok(())
}

/// The expiration written into `envelope`, formatted for display.
fn sealed_expiry(envelope: &[u8]) -> Result<Option<String>> {
    Ok(Frame::parse(envelope)?.expires_at().map(format_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::crypto::SecretKey;
    use crate::envelope::{FixedClock, Sealer};

    #[test]
    fn expiry_is_read_from_the_sealed_envelope() {
        let sealer =
            Sealer::new(SecretKey::new(b"k".to_vec())).with_clock(FixedClock::at(1_626_566_400.0));

        let envelope = sealer.seal(&1u8, Some(Duration::from_secs(60))).unwrap();
        assert_eq!(
            sealed_expiry(&envelope).unwrap().as_deref(),
            Some("2021-07-18T00:01:00+00:00")
        );

        let permanent = sealer.seal(&1u8, None).unwrap();
        assert_eq!(sealed_expiry(&permanent).unwrap(), None);
    }
}
