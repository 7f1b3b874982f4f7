//! # cfnr-schema — Resource Property Validation
//!
//! Optional structural validation of a custom resource's properties before
//! any operation runs.
//!
//! A resource declares a JSON Schema (Draft 4) for its properties. The
//! schema is compiled once, when the resource is registered, so a broken
//! schema fails at startup rather than on the first stack operation. At
//! dispatch time [`PropertiesSchema::validate_event`] checks
//! `ResourceProperties` and then, if present, `OldResourceProperties`,
//! stopping at the first violation.
//!
//! ## Crate Policy
//!
//! - Depends only on `cfnr-core` internally.
//! - No network access: external `$ref` URIs are refused, not fetched.
//! - A violation is data, not a fault. The dispatcher turns it into a
//!   `FAILED` response carrying the diagnostic text.

pub mod validate;

pub use validate::{PropertiesSchema, PropertiesViolation, SchemaError, Violation};
