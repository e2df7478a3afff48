//! One module per `sealenv` subcommand.

pub mod completions;
pub mod inspect;
pub mod keygen;
pub mod open;
pub mod seal;
