//! # cfnr-cli — Operator Tooling for Custom Resources
//!
//! Provides the `cfnr` command-line interface.
//!
//! ## Subcommands
//!
//! - `cfnr respond`: Complete a deferred request from a saved event.
//! - `cfnr validate`: Check an event's properties against a resource schema.
//!
//! ```bash
//! cfnr respond --event saved.json success --physical-resource-id db-1 --data Endpoint=db.local
//! cfnr respond --event saved.json --dry-run failed --reason "restore timed out"
//! cfnr validate --schema bucket.schema.yaml --event event.json
//! ```

pub mod respond;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use cfnr_core::Event;
use serde_json::Value;

/// Read a JSON or YAML document. Files ending in `.yaml`/`.yml` are parsed
/// as YAML, everything else as JSON.
pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON {}", path.display()))
    }
}

/// Load a saved custom resource event.
pub fn load_event(path: &Path) -> anyhow::Result<Event> {
    let value = load_document(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("{} is not a custom resource event", path.display()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{write, EVENT_JSON};

    #[test]
    fn loads_json_event() {
        let (_dir, path) = write("event.json", EVENT_JSON);
        let event = load_event(&path).unwrap();
        assert_eq!(event.request_id, "2");
        assert_eq!(event.property_str("Name"), Some("bucket"));
    }

    #[test]
    fn loads_yaml_document() {
        let (_dir, path) = write("schema.yaml", "required:\n  - Name\n");
        let doc = load_document(&path).unwrap();
        assert_eq!(doc, serde_json::json!({"required": ["Name"]}));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_document(Path::new("/nonexistent/event.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/event.json"));
    }

    #[test]
    fn document_without_event_fields_is_rejected() {
        let (_dir, path) = write("event.json", r#"{"RequestType": "Create"}"#);
        let err = load_event(&path).unwrap_err();
        assert!(err.to_string().contains("is not a custom resource event"));
    }
}
