//! Configuration loaded from `.sealenv.toml`.

pub mod settings;

pub use settings::Settings;
