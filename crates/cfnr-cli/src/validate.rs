//! # Validate Subcommand
//!
//! Runs a resource's properties schema against a sample event without
//! deploying anything, printing the same diagnostic the controller would
//! see as the failure reason.

use std::path::PathBuf;

use cfnr_schema::PropertiesSchema;
use clap::Args;

use crate::{load_document, load_event};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Properties schema (JSON or YAML, Draft 4).
    #[arg(long)]
    pub schema: PathBuf,

    /// Event whose properties are checked (JSON or YAML).
    #[arg(long)]
    pub event: PathBuf,
}

/// Execute the validate subcommand. Returns 1 on a violation.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<u8> {
    let schema = PropertiesSchema::new(load_document(&args.schema)?)?;
    let event = load_event(&args.event)?;

    match schema.validate_event(&event) {
        Ok(()) => {
            println!("OK: {} properties are valid", event.logical_resource_id);
            Ok(0)
        }
        Err(violation) => {
            tracing::debug!(field = violation.field, "schema violation");
            println!("FAIL: {}", violation.field);
            println!("{violation}");
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{write, EVENT_JSON};

    fn args(schema: &str) -> (tempfile::TempDir, tempfile::TempDir, ValidateArgs) {
        let (schema_dir, schema) = write("schema.yaml", schema);
        let (event_dir, event) = write("event.json", EVENT_JSON);
        (schema_dir, event_dir, ValidateArgs { schema, event })
    }

    #[test]
    fn valid_properties_exit_zero() {
        let (_s, _e, args) = args("required: [Name]\nproperties:\n  Name: {type: string}\n");
        assert_eq!(run_validate(&args).unwrap(), 0);
    }

    #[test]
    fn violation_exits_one() {
        let (_s, _e, args) = args("required: [Validating]\n");
        assert_eq!(run_validate(&args).unwrap(), 1);
    }

    #[test]
    fn broken_schema_is_an_error() {
        let (_s, _e, args) = args("required: not-a-list\n");
        assert!(run_validate(&args).is_err());
    }
}
