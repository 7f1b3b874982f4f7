#![deny(missing_docs)]

//! # cfnr-core — Foundational Types for CloudFormation Custom Resources
//!
//! This crate defines the values every other crate in the workspace passes
//! around. It has no internal crate dependencies. Externally it uses only `serde`,
//! `serde_json`, `thiserror`, and `chrono`.
//!
//! ## Design Principles
//!
//! 1. **Responses are validated on construction.** A [`Success`] or
//!    [`Failed`] value always carries a [`PhysicalResourceId`] of 1 to 1024
//!    characters. There is no way to build one that the controller would
//!    reject for its identifier.
//!
//! 2. **One closed set of handler return shapes.** Resource authors return a
//!    [`HandlerOutput`]; [`coerce`] turns it into a canonical [`Response`]
//!    or a [`CoercionError`]. No runtime type introspection.
//!
//! 3. **The event is read-only input.** [`Event`] is deserialized once per
//!    invocation and borrowed by every later stage. It is also `Serialize`
//!    so callers can persist it for deferred completion.

pub mod coerce;
pub mod error;
pub mod event;
pub mod response;

// Re-export primary types at crate root for ergonomic imports.
pub use coerce::{coerce, HandlerOutput};
pub use error::{CoercionError, ConstructionError};
pub use event::{Event, InvocationContext, RequestType, DEFAULT_PHYSICAL_RESOURCE_ID};
pub use response::{
    Deferred, Envelope, Failed, PhysicalResourceId, Response, ResponseStatus, Success,
    MAX_PHYSICAL_RESOURCE_ID_LENGTH,
};
