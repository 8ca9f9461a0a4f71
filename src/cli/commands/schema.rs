//! Schema command implementation.
//!
//! Prints the JSON Schema of the configuration file, for editor completion
//! and validation of `qreport.yaml`.

use crate::config::ReportConfig;
use crate::error::Result;
use schemars::schema::RootSchema;
use schemars::schema_for;

#[must_use]
pub fn config_schema() -> RootSchema {
    schema_for!(ReportConfig)
}

/// Execute the schema command.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn execute() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config_schema())?);
    Ok(())
}
