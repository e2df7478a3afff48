//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::crypto::{load_keyfile, Algorithm, SecretKey};
use crate::envelope::expiration::parse_duration;
use crate::envelope::Sealer;
use crate::errors::{EnvelopeError, Result};

/// Environment variable holding the shared key when no keyfile is used.
pub const KEY_ENV_VAR: &str = "SEALENV_KEY";

/// sealenv CLI: tamper-evident envelopes for JSON values.
#[derive(Parser)]
#[command(
    name = "sealenv",
    about = "Seal JSON values in tamper-evident HMAC envelopes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the shared keyfile
    #[arg(short, long, global = true)]
    pub keyfile: Option<String>,

    /// Digest algorithm: sha224, sha256, sha384 or sha512 (default: from config, else sha256)
    #[arg(short, long, global = true)]
    pub algorithm: Option<String>,

    /// Directory containing .sealenv.toml (default: current directory)
    #[arg(long, default_value = ".", global = true)]
    pub config_dir: String,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Seal a JSON value (use `-` to read stdin)
    Seal {
        /// JSON file to seal
        input: String,

        /// Write the envelope here (raw bytes go to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Make the envelope expire after a duration (e.g. 90s, 30m, 24h, 7d)
        #[arg(short, long)]
        expires_in: Option<String>,
    },

    /// Verify an envelope and print its JSON value (use `-` to read stdin)
    Open {
        /// Envelope file to open
        input: String,

        /// Write the JSON value here (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show an envelope's header fields without verifying it
    Inspect {
        /// Envelope file to inspect
        input: String,
    },

    /// Generate a new random keyfile
    Keygen {
        /// Path for the keyfile (default: configured keyfile, else <config_dir>/sealenv.key)
        path: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.sealenv.toml` from the configured directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(Path::new(&cli.config_dir))
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise `default_level` (from settings) is used.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Get the shared key, trying in order:
/// 1. `--keyfile`
/// 2. `keyfile` in `.sealenv.toml`
/// 3. `SEALENV_KEY` env var (CI/CD)
pub fn resolve_key(cli: &Cli, settings: &Settings) -> Result<SecretKey> {
    if let Some(path) = &cli.keyfile {
        return load_keyfile(Path::new(path));
    }

    if let Some(path) = settings.keyfile_path(Path::new(&cli.config_dir)) {
        return load_keyfile(&path);
    }

    match std::env::var(KEY_ENV_VAR) {
        Ok(key) if !key.is_empty() => Ok(SecretKey::new(key.into_bytes())),
        _ => Err(EnvelopeError::CommandFailed(format!(
            "no key available — pass --keyfile, set `keyfile` in {} or export {KEY_ENV_VAR}",
            Settings::FILE_NAME
        ))),
    }
}

/// `--algorithm` overrides the config file.
pub fn resolve_algorithm(cli: &Cli, settings: &Settings) -> Result<Algorithm> {
    match &cli.algorithm {
        Some(name) => name.parse(),
        None => settings.algorithm(),
    }
}

/// `--expires-in` overrides the config file's `default_expiration`.
pub fn resolve_expiration(flag: Option<&str>, settings: &Settings) -> Result<Option<Duration>> {
    match flag {
        Some(value) => parse_duration(value).map(Some),
        None => settings.default_expiration(),
    }
}

/// Build a sealer from the CLI arguments and settings.
pub fn build_sealer(cli: &Cli, settings: &Settings) -> Result<Sealer> {
    let key = resolve_key(cli, settings)?;
    let algorithm = resolve_algorithm(cli, settings)?;
    Ok(Sealer::new(key).with_algorithm(algorithm))
}

/// Default keyfile location for `keygen`.
pub fn default_keyfile_path(cli: &Cli, settings: &Settings) -> PathBuf {
    let dir = Path::new(&cli.config_dir);
    settings
        .keyfile_path(dir)
        .unwrap_or_else(|| dir.join("sealenv.key"))
}

/// Read a whole input file, or stdin for `-`.
pub fn read_input(input: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if input == "-" {
        std::io::stdin().read_to_end(&mut data)?;
    } else {
        let path = Path::new(input);
        if !path.exists() {
            return Err(EnvelopeError::CommandFailed(format!(
                "input file not found: {}",
                path.display()
            )));
        }
        data = std::fs::read(path)?;
    }
    Ok(data)
}

/// Write raw bytes to stdout.
pub fn write_stdout(data: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(data)?;
    stdout.flush()?;
    Ok(())
}
