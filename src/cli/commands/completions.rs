//! `sealenv completions` — generate shell completion scripts.
//!
//! Usage:
//!   sealenv completions bash > ~/.bash_completion.d/sealenv
//!   sealenv completions zsh > "${fpath[1]}/_sealenv"

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{EnvelopeError, Result};

/// Execute the `completions` command.
pub fn execute(shell: &str) -> Result<()> {
    let shell = parse_shell(shell)?;
    write_completions(shell, &mut io::stdout())
}

/// Render the completion script for `shell` into `out`.
pub fn write_completions<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "sealenv", &mut *out);
    out.flush()?;
    Ok(())
}

/// Map a shell name (case-insensitive, `ps`/`pwsh` accepted) to `Shell`.
fn parse_shell(name: &str) -> Result<Shell> {
    let shell = match name.to_ascii_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "elvish" => Shell::Elvish,
        "powershell" | "pwsh" | "ps" => Shell::PowerShell,
        other => {
            return Err(EnvelopeError::CommandFailed(format!(
                "unknown shell '{other}' — supported: bash, zsh, fish, powershell, elvish"
            )))
        }
    };
    Ok(shell)
}
