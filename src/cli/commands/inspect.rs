//! `sealenv inspect` — show an envelope's framing without a key.

use crate::cli::output;
use crate::cli::{read_input, Cli};
use crate::envelope::Frame;
use crate::errors::Result;

/// Execute the `inspect` command.
pub fn execute(_cli: &Cli, input: &str) -> Result<()> {
    let data = read_input(input)?;
    let frame = Frame::parse(&data)?;

    output::print_summary_table(&frame.summary());
    output::warning("Header fields are unverified — use `sealenv open` to authenticate.");

    Ok(())
}
