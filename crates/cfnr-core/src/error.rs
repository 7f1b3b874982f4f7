//! # Error Hierarchy
//!
//! Structured errors for response construction and handler-output coercion,
//! built with `thiserror`.
//!
//! Both kinds are fatal to the current operation and are never retried. The
//! responder converts them into a delivered `FAILED` envelope at scope exit
//! and then hands them back to the invocation's caller.

use thiserror::Error;

/// A response value could not be constructed.
///
/// Carries the offending input so that a resource author can see exactly
/// what was rejected without reproducing the invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Physical resource id is empty or longer than the controller accepts.
    #[error("physical_resource_id must be a string between 1 and {max} characters (got {length})")]
    PhysicalResourceIdLength {
        /// Length of the rejected id, in characters.
        length: usize,
        /// Upper bound, in characters.
        max: usize,
    },

    /// Physical resource id supplied as a non-string JSON value.
    #[error("physical_resource_id must be a string, got {0}")]
    PhysicalResourceIdType(String),

    /// `Success` data supplied as something other than a JSON object.
    #[error("data must be a mapping of strings, got {0}")]
    DataType(String),

    /// A `Success` data entry whose value is not a string.
    #[error("{key:?}={value} must be strings")]
    NonStringData {
        /// The entry key.
        key: String,
        /// The rejected value, rendered as JSON.
        value: String,
    },

    /// `Failed` reason supplied as a non-string JSON value.
    #[error("reason must be a string, got {0}")]
    ReasonType(String),
}

/// A handler returned something that cannot be turned into a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// The operation produced no value at all.
    #[error("No response returned")]
    NoResponse,

    /// The operation produced a value of an unrecognized shape.
    #[error("Unexpected response {0}")]
    Unexpected(String),

    /// The value had a recognized shape but its contents were invalid.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}
