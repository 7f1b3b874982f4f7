//! # Handler Errors
//!
//! Everything that can end an invocation abnormally. An error raised inside
//! the responder scope is reported to the controller as a `FAILED`
//! envelope first and then returned to the invocation's caller.

use std::error::Error as _;

use cfnr_callback::{ConfigError, DeliveryError};
use cfnr_core::{CoercionError, ConstructionError};
use cfnr_schema::SchemaError;
use thiserror::Error;

/// Errors from handling one custom resource request.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The resource's create/update/delete returned an error.
    #[error(transparent)]
    Operation(anyhow::Error),

    /// The operation returned nothing, or an unrecognized shape.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// A response value could not be built.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// `RequestType` is not `Create`, `Update` or `Delete`.
    #[error("Unknown request type {0:?}")]
    UnknownRequestType(String),

    /// The raw event could not be parsed.
    #[error("invalid event: {0}")]
    InvalidEvent(#[source] serde_json::Error),

    /// An operation panicked.
    #[error("Handler panicked: {0}")]
    Panicked(String),

    /// `respond` was called after the terminal response.
    #[error("a response was already sent for request {request_id}")]
    AlreadyResponded { request_id: String },

    /// The scope closed without a response under the strict policy.
    #[error("No response sent")]
    NoResponseSent,

    /// The controller did not acknowledge the response.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The resource declared a schema that does not compile.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl HandlerError {
    /// Text for the `Reason` of the synthesized `FAILED` response.
    ///
    /// The error's own message, or with `verbose` its full diagnostic chain
    /// (and the backtrace, when one was captured for an operation error).
    pub fn failure_reason(&self, verbose: bool) -> String {
        if !verbose {
            return self.to_string();
        }
        if let Self::Operation(err) = self {
            return format!("{err:?}");
        }

        let mut reason = self.to_string();
        let mut source = self.source();
        if source.is_some() {
            reason.push_str("\n\nCaused by:");
        }
        while let Some(err) = source {
            reason.push_str("\n    ");
            reason.push_str(&err.to_string());
            source = err.source();
        }
        reason
    }
}
