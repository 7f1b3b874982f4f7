//! # Properties Schema Validation
//!
//! Runtime validation of `ResourceProperties` / `OldResourceProperties`
//! against a resource's declared JSON Schema (Draft 4).
//!
//! ## Diagnostics
//!
//! A [`Violation`] renders as a multi-line report: the violation message,
//! the keyword that failed, the schema fragment holding that keyword, and
//! the offending instance. This text becomes the `Reason` of the `FAILED`
//! response, which CloudFormation shows in the stack events.
//!
//! ## Schema Resolution
//!
//! Internal `$ref`s (`#/definitions/<name>`) are resolved by the jsonschema
//! crate natively. Any other URI is refused by [`OfflineRetriever`].

use std::fmt;

use cfnr_core::Event;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

/// Event keys validated against the schema, in check order.
const RESOURCE_PROPERTIES: &str = "ResourceProperties";
const OLD_RESOURCE_PROPERTIES: &str = "OldResourceProperties";

/// Retriever that refuses every external `$ref`.
///
/// Prevents the jsonschema crate from making network or filesystem requests
/// while a stack operation is waiting on us.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema references are not supported: {}", uri.as_str()).into())
    }
}

/// The declared schema could not be compiled.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema is not a valid Draft 4 schema, or references something
    /// that cannot be resolved offline.
    #[error("invalid properties schema: {reason}")]
    Invalid {
        /// Compiler diagnostic.
        reason: String,
    },
}

/// A single schema violation with structured context.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Human-readable description, e.g. `"Bucket" is a required property`.
    pub message: String,
    /// Schema keyword that failed, e.g. `required`.
    pub keyword: String,
    /// JSON Pointer into the schema.
    pub schema_path: String,
    /// JSON Pointer into the instance.
    pub instance_path: String,
    /// The schema object holding the failing keyword.
    pub schema_fragment: Value,
    /// The instance value that failed.
    pub instance: Value,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        writeln!(f)?;
        writeln!(f, "Failed validating {:?} in schema:", self.keyword)?;
        writeln!(f, "{}", indent(&self.schema_fragment))?;
        writeln!(f)?;
        if self.instance_path.is_empty() {
            writeln!(f, "On instance:")?;
        } else {
            writeln!(f, "On instance at {}:", self.instance_path)?;
        }
        write!(f, "{}", indent(&self.instance))
    }
}

/// A violation found while checking an event, tagged with the event key.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesViolation {
    /// `ResourceProperties` or `OldResourceProperties`.
    pub field: &'static str,
    /// The first violation found in that field.
    pub violation: Violation,
}

impl fmt::Display for PropertiesViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.violation.fmt(f)
    }
}

impl std::error::Error for PropertiesViolation {}

/// A compiled properties schema.
///
/// `Send + Sync`; compile once and share across invocations.
pub struct PropertiesSchema {
    schema: Value,
    validator: Validator,
}

impl fmt::Debug for PropertiesSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertiesSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl PropertiesSchema {
    /// Compile a Draft 4 schema.
    ///
    /// The schema should allow `ServiceToken`, which CloudFormation always
    /// includes in `ResourceProperties`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Invalid`] when the schema does not compile.
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft4)
            .with_retriever(OfflineRetriever)
            .build(&schema)
            .map_err(|e| SchemaError::Invalid {
                reason: e.to_string(),
            })?;
        Ok(Self { schema, validator })
    }

    /// The schema as declared.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate one instance, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`Violation`] reported by the validator.
    pub fn validate(&self, instance: &Value) -> Result<(), Violation> {
        let Some(error) = self.validator.iter_errors(instance).next() else {
            return Ok(());
        };

        let schema_path = error.schema_path.to_string();
        let (parent, keyword) = split_pointer(&schema_path);
        let schema_fragment = resolve_fragment(&self.schema, parent).clone();

        Err(Violation {
            message: error.to_string(),
            keyword,
            instance_path: error.instance_path.to_string(),
            schema_path,
            schema_fragment,
            instance: error.instance.into_owned(),
        })
    }

    /// Validate an event's properties.
    ///
    /// `ResourceProperties` is always checked; a missing value is checked as
    /// an empty object. `OldResourceProperties` is checked only when present.
    /// Checking stops at the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`PropertiesViolation`] found.
    pub fn validate_event(&self, event: &Event) -> Result<(), PropertiesViolation> {
        let empty = Value::Object(serde_json::Map::new());
        let current = event.resource_properties.as_ref().unwrap_or(&empty);

        self.validate(current).map_err(|violation| PropertiesViolation {
            field: RESOURCE_PROPERTIES,
            violation,
        })?;

        if let Some(old) = &event.old_resource_properties {
            self.validate(old).map_err(|violation| PropertiesViolation {
                field: OLD_RESOURCE_PROPERTIES,
                violation,
            })?;
        }

        Ok(())
    }
}

/// Split a JSON Pointer into its parent pointer and unescaped last token.
fn split_pointer(pointer: &str) -> (&str, String) {
    match pointer.rfind('/') {
        Some(idx) => (
            &pointer[..idx],
            unescape_token(&pointer[idx + 1..]),
        ),
        None => ("", pointer.to_string()),
    }
}

/// Follow a validation path through `schema` to the object it names.
///
/// The path records the route the validator took, so a `$ref` token means
/// "continue at the reference target" rather than "the `$ref` member". Local
/// references (`#/...`) are followed; anything else stops the walk at the
/// node holding the reference.
fn resolve_fragment<'a>(schema: &'a Value, path: &str) -> &'a Value {
    let mut node = schema;
    for token in path.split('/').skip(1).map(unescape_token) {
        let next = match node {
            Value::Object(map) => match map.get(token.as_str()) {
                Some(Value::String(reference)) if token == "$ref" => reference
                    .strip_prefix('#')
                    .and_then(|pointer| schema.pointer(pointer)),
                child => child,
            },
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(child) => node = child,
            None => break,
        }
    }
    node
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn indent(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    pretty
        .lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
