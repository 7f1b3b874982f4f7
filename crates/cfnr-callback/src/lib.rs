//! # cfnr-callback — Response Delivery to the Controller
//!
//! Sends a custom resource's terminal response back to CloudFormation:
//! an HTTP `PUT` of the JSON envelope to the event's presigned
//! `ResponseURL`.
//!
//! ## Acknowledgement
//!
//! Only HTTP 200 counts as delivered. Any other status, and any transport
//! failure, is a [`DeliveryError`] returned to the caller. Nothing is
//! retried here.
//!
//! ## Credentials
//!
//! The `ResponseURL` query string is a presigned signature. It is never
//! logged and never included in error messages; see [`redact_url`].

pub mod client;
pub mod config;
pub mod error;

pub use client::{deliver, redact_url, HttpCallback, ResponseSink};
pub use config::{CallbackConfig, ConfigError};
pub use error::DeliveryError;
