//! `sealenv open` — verify an envelope and print the value inside.

use std::fs;

use crate::cli::output;
use crate::cli::{build_sealer, load_settings, read_input, write_stdout, Cli};
use crate::errors::{EnvelopeError, Result};

/// Execute the `open` command.
pub fn execute(cli: &Cli, input: &str, output_path: Option<&str>) -> Result<()> {
    let settings = load_settings(cli)?;
    let sealer = build_sealer(cli, &settings)?;

    let data = read_input(input)?;
    let value: serde_json::Value = sealer.open(&data)?;

    let mut rendered = serde_json::to_string_pretty(&value)
        .map_err(|e| EnvelopeError::Serialization(format!("json: {e}")))?;
    rendered.push('\n');

    match output_path {
        Some(dest) => {
            fs::write(dest, rendered)?;
            output::success(&format!("Verified envelope, value written to {dest}"));
        }
        None => write_stdout(rendered.as_bytes())?,
    }

    Ok(())
}
