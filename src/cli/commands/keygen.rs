//! `sealenv keygen` — create a random shared keyfile.

use std::path::PathBuf;

use crate::cli::output;
use crate::cli::{default_keyfile_path, load_settings, Cli};
use crate::crypto::generate_keyfile;
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute(cli: &Cli, path: Option<&str>) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = match path {
        Some(p) => PathBuf::from(p),
        None => default_keyfile_path(cli, &settings),
    };

    let key = generate_keyfile(&path)?;

    output::success(&format!(
        "Keyfile written to {} (fingerprint {})",
        path.display(),
        key.fingerprint()
    ));
    output::tip("Share it with every party that must seal or open envelopes.");
    output::tip(&format!(
        "Pass `--keyfile {}` or set `keyfile` in .sealenv.toml.",
        path.display()
    ));

    Ok(())
}
