//! # Custom Resource Events
//!
//! The request object CloudFormation hands to a custom resource provider,
//! plus the per-invocation host context that travels alongside it.
//!
//! `RequestType` is kept as the raw string on [`Event`] so that an event
//! with an unrecognized request type still parses. The dispatcher rejects
//! it loudly inside the responder scope, which means the controller is
//! still told about the failure.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::MAX_PHYSICAL_RESOURCE_ID_LENGTH;

/// Physical resource id reported when the event carries no prior id.
pub const DEFAULT_PHYSICAL_RESOURCE_ID: &str = "n/a";

/// The lifecycle phase a request asks the provider to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Create a new resource.
    Create,
    /// Update an existing resource in place or by replacement.
    Update,
    /// Delete a resource.
    Delete,
}

impl RequestType {
    /// Wire name of the request type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(other.to_string()),
        }
    }
}

/// A custom resource request as delivered by CloudFormation.
///
/// Keys not modeled here are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    /// Raw `RequestType`; see [`Event::request_type`] for the parsed form.
    #[serde(default)]
    pub request_type: String,
    /// ARN of the stack the resource belongs to.
    pub stack_id: String,
    /// Unique id of this request, echoed in the response.
    pub request_id: String,
    /// Template-local name of the resource.
    pub logical_resource_id: String,
    /// Presigned callback URL the response is PUT to.
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    /// Id reported by a previous response. Present on update and delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    /// Template resource type, e.g. `Custom::S3Object`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// ARN of the provider the request was routed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
    /// Properties declared in the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_properties: Option<Value>,
    /// Properties before the update. Present on update only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Value>,
}

impl Event {
    /// Parse the `RequestType` field.
    ///
    /// # Errors
    ///
    /// Returns the raw value when it is not `Create`, `Update` or `Delete`.
    pub fn request_type(&self) -> Result<RequestType, String> {
        self.request_type.parse()
    }

    /// Physical resource id to report when no response supplies one.
    ///
    /// Uses the prior `PhysicalResourceId` when the event carries a usable
    /// one, otherwise [`DEFAULT_PHYSICAL_RESOURCE_ID`].
    pub fn fallback_physical_resource_id(&self) -> &str {
        match self.physical_resource_id.as_deref() {
            Some(id) if (1..=MAX_PHYSICAL_RESOURCE_ID_LENGTH).contains(&id.chars().count()) => id,
            _ => DEFAULT_PHYSICAL_RESOURCE_ID,
        }
    }

    /// A property from `ResourceProperties`, if present.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.resource_properties.as_ref()?.get(name)
    }

    /// A string property from `ResourceProperties`, if present and a string.
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.property(name)?.as_str()
    }
}

/// Host-provided context for one invocation.
///
/// The engine never interprets it; it is handed through to the resource's
/// operations unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Host request id (e.g. the Lambda request id).
    #[serde(default)]
    pub request_id: Option<String>,
    /// Name of the function serving the request.
    #[serde(default)]
    pub function_name: Option<String>,
    /// Point in time after which the host will stop the invocation.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl InvocationContext {
    /// Time left before the deadline, or `None` when no deadline is known.
    ///
    /// Returns `Some(Duration::ZERO)` once the deadline has passed.
    pub fn remaining_time(&self) -> Option<Duration> {
        let deadline = self.deadline?;
        Some((deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }
}
