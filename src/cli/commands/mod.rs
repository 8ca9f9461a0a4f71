//! Subcommand implementations.

pub mod generate;
pub mod schema;
pub mod stats;
