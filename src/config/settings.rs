use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::Algorithm;
use crate::envelope::expiration::parse_duration;
use crate::errors::{EnvelopeError, Result};

/// Project-level configuration, loaded from `.sealenv.toml`.
///
/// Every field has a sensible default so the tool works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Digest algorithm name (default: "sha256").
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Lifetime applied when `seal` is run without `--expires-in`
    /// (e.g. "24h").  No expiration when unset.
    #[serde(default)]
    pub default_expiration: Option<String>,

    /// Keyfile used when `--keyfile` is not given, relative to the
    /// config directory.
    #[serde(default)]
    pub keyfile: Option<String>,

    /// Fallback log filter when `RUST_LOG` is not set (default: "warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_algorithm() -> String {
    Algorithm::default().name().to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            default_expiration: None,
            keyfile: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    pub const FILE_NAME: &'static str = ".sealenv.toml";

    /// Load settings from `<config_dir>/.sealenv.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            EnvelopeError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// The configured digest algorithm.
    pub fn algorithm(&self) -> Result<Algorithm> {
        self.algorithm
            .parse()
            .map_err(|_| EnvelopeError::Config(format!("unknown algorithm '{}'", self.algorithm)))
    }

    /// The configured default lifetime, if any.
    pub fn default_expiration(&self) -> Result<Option<Duration>> {
        self.default_expiration
            .as_deref()
            .map(parse_duration)
            .transpose()
    }

    /// Resolve the configured keyfile against the config directory.
    pub fn keyfile_path(&self, config_dir: &Path) -> Option<PathBuf> {
        self.keyfile.as_ref().map(|p| config_dir.join(p))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
