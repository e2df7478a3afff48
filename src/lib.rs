pub mod cli;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod errors;

pub use envelope::{dump, load, open, seal, Sealer};
pub use errors::{EnvelopeError, Result};
