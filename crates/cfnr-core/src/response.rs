//! # Response Values
//!
//! The three outcomes of a lifecycle operation and the envelope they are
//! delivered in.
//!
//! - [`Success`]: the resource exists under a physical id, with optional
//!   string-to-string output attributes (`Fn::GetAtt` targets).
//! - [`Failed`]: the operation failed. A physical id is still mandatory;
//!   when none is meaningful the event's prior id or `"n/a"` is used.
//! - [`Deferred`]: no response now. A later, out-of-band invocation holding
//!   a copy of the event will complete the request.
//!
//! ## Validation
//!
//! Identifier bounds are enforced at construction. The controller rejects a
//! physical id that is empty or longer than
//! [`MAX_PHYSICAL_RESOURCE_ID_LENGTH`] characters, so such values cannot be
//! represented here at all.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConstructionError;
use crate::event::Event;

/// Maximum length of a physical resource id, in characters.
pub const MAX_PHYSICAL_RESOURCE_ID_LENGTH: usize = 1024;

// ---------------------------------------------------------------------------
// Physical resource id
// ---------------------------------------------------------------------------

/// Identity of the concrete provisioned thing, echoed back to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PhysicalResourceId(String);

impl PhysicalResourceId {
    /// Validate and wrap a physical resource id.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::PhysicalResourceIdLength`] when the id is
    /// empty or longer than [`MAX_PHYSICAL_RESOURCE_ID_LENGTH`] characters.
    pub fn new(id: impl Into<String>) -> Result<Self, ConstructionError> {
        let id = id.into();
        let length = id.chars().count();
        if !(1..=MAX_PHYSICAL_RESOURCE_ID_LENGTH).contains(&length) {
            return Err(ConstructionError::PhysicalResourceIdLength {
                length,
                max: MAX_PHYSICAL_RESOURCE_ID_LENGTH,
            });
        }
        Ok(Self(id))
    }

    /// Validate a physical resource id supplied as dynamic JSON.
    ///
    /// # Errors
    ///
    /// Rejects non-string values as well as out-of-bounds strings.
    pub fn from_json(value: &Value) -> Result<Self, ConstructionError> {
        match value {
            Value::String(s) => Self::new(s.as_str()),
            other => Err(ConstructionError::PhysicalResourceIdType(other.to_string())),
        }
    }

    /// Access the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PhysicalResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhysicalResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhysicalResourceId {
    type Error = ConstructionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PhysicalResourceId {
    type Error = ConstructionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// The `Status` field of a delivered envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Failed,
}

impl ResponseStatus {
    /// Wire value of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Success / Failed / Deferred
// ---------------------------------------------------------------------------

/// A successful outcome.
///
/// See <http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/crpg-ref-responses.html>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success {
    physical_resource_id: PhysicalResourceId,
    data: BTreeMap<String, String>,
}

impl Success {
    /// Build a success response with output attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] when the physical id is out of bounds.
    pub fn new<I, K, V>(physical_resource_id: impl Into<String>, data: I) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(Self {
            physical_resource_id: PhysicalResourceId::new(physical_resource_id)?,
            data: data.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        })
    }

    /// Build a success response with no output attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] when the physical id is out of bounds.
    pub fn with_id(physical_resource_id: impl Into<String>) -> Result<Self, ConstructionError> {
        Ok(Self {
            physical_resource_id: PhysicalResourceId::new(physical_resource_id)?,
            data: BTreeMap::new(),
        })
    }

    /// Build a success response from dynamic JSON values.
    ///
    /// `data` must be an object whose values are all strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] for a non-string or out-of-bounds id, a
    /// non-object `data`, or any non-string data value.
    pub fn from_json(physical_resource_id: &Value, data: &Value) -> Result<Self, ConstructionError> {
        let physical_resource_id = PhysicalResourceId::from_json(physical_resource_id)?;
        let entries = data
            .as_object()
            .ok_or_else(|| ConstructionError::DataType(data.to_string()))?;

        let mut out = BTreeMap::new();
        for (key, value) in entries {
            match value {
                Value::String(s) => {
                    out.insert(key.clone(), s.clone());
                }
                other => {
                    return Err(ConstructionError::NonStringData {
                        key: key.clone(),
                        value: other.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            physical_resource_id,
            data: out,
        })
    }

    /// The reported physical id.
    pub fn physical_resource_id(&self) -> &PhysicalResourceId {
        &self.physical_resource_id
    }

    /// Output attributes.
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Key/value form of this response for the envelope.
    pub fn as_envelope_fields(&self) -> Map<String, Value> {
        let data: Map<String, Value> = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let mut fields = Map::new();
        fields.insert("Status".into(), ResponseStatus::Success.as_str().into());
        fields.insert(
            "PhysicalResourceId".into(),
            self.physical_resource_id.as_str().into(),
        );
        fields.insert("Data".into(), Value::Object(data));
        fields
    }
}

/// A failed outcome.
///
/// The controller requires a physical id even on failure. For a failed
/// create there is often nothing meaningful to report. Either generate the
/// intended id before creating and send it, or send `"n/a"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    physical_resource_id: PhysicalResourceId,
    reason: String,
}

impl Failed {
    /// Build a failure response.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] when the physical id is out of bounds.
    pub fn new(physical_resource_id: impl Into<String>, reason: impl Into<String>) -> Result<Self, ConstructionError> {
        Ok(Self {
            physical_resource_id: PhysicalResourceId::new(physical_resource_id)?,
            reason: reason.into(),
        })
    }

    /// Build a failure response from dynamic JSON values.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] for a non-string or out-of-bounds id or
    /// a non-string reason.
    pub fn from_json(physical_resource_id: &Value, reason: &Value) -> Result<Self, ConstructionError> {
        let physical_resource_id = PhysicalResourceId::from_json(physical_resource_id)?;
        let reason = reason
            .as_str()
            .ok_or_else(|| ConstructionError::ReasonType(reason.to_string()))?;
        Ok(Self {
            physical_resource_id,
            reason: reason.to_string(),
        })
    }

    /// The reported physical id.
    pub fn physical_resource_id(&self) -> &PhysicalResourceId {
        &self.physical_resource_id
    }

    /// Human-readable failure reason shown in the stack events.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Key/value form of this response for the envelope.
    pub fn as_envelope_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("Status".into(), ResponseStatus::Failed.as_str().into());
        fields.insert(
            "PhysicalResourceId".into(),
            self.physical_resource_id.as_str().into(),
        );
        fields.insert("Reason".into(), self.reason.clone().into());
        fields
    }
}

/// A deferred outcome: the response will be sent later, out of band.
///
/// Keep a copy of the event. Completing the request later looks like:
///
/// ```ignore
/// let mut responder = Responder::new(&event, &sink, settings);
/// responder.success("123", [("other", "data")])?;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deferred;

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// The canonical outcome of one lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// See [`Success`].
    Success(Success),
    /// See [`Failed`].
    Failed(Failed),
    /// See [`Deferred`].
    Deferred(Deferred),
}

impl Response {
    /// Envelope status, or `None` for a deferred response.
    pub fn status(&self) -> Option<ResponseStatus> {
        match self {
            Self::Success(_) => Some(ResponseStatus::Success),
            Self::Failed(_) => Some(ResponseStatus::Failed),
            Self::Deferred(_) => None,
        }
    }

    /// Whether delivery is suppressed.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Reported physical id, or `None` for a deferred response.
    pub fn physical_resource_id(&self) -> Option<&PhysicalResourceId> {
        match self {
            Self::Success(s) => Some(s.physical_resource_id()),
            Self::Failed(f) => Some(f.physical_resource_id()),
            Self::Deferred(_) => None,
        }
    }

    /// Key/value form for the envelope, or `None` for a deferred response.
    pub fn as_envelope_fields(&self) -> Option<Map<String, Value>> {
        match self {
            Self::Success(s) => Some(s.as_envelope_fields()),
            Self::Failed(f) => Some(f.as_envelope_fields()),
            Self::Deferred(_) => None,
        }
    }
}

impl From<Success> for Response {
    fn from(value: Success) -> Self {
        Self::Success(value)
    }
}

impl From<Failed> for Response {
    fn from(value: Failed) -> Self {
        Self::Failed(value)
    }
}

impl From<Deferred> for Response {
    fn from(value: Deferred) -> Self {
        Self::Deferred(value)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The wire payload PUT to the event's `ResponseURL`.
///
/// Response fields plus `StackId`, `RequestId` and `LogicalResourceId`
/// copied verbatim from the event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    /// Combine response fields with the event's correlation fields.
    pub fn new(event: &Event, mut fields: Map<String, Value>) -> Self {
        fields.insert("StackId".into(), event.stack_id.clone().into());
        fields.insert("RequestId".into(), event.request_id.clone().into());
        fields.insert(
            "LogicalResourceId".into(),
            event.logical_resource_id.clone().into(),
        );
        Self(fields)
    }

    /// Envelope for a terminal response, or `None` for a deferred one.
    pub fn for_response(event: &Event, response: &Response) -> Option<Self> {
        response
            .as_envelope_fields()
            .map(|fields| Self::new(event, fields))
    }

    /// Access the envelope fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Serialize to the JSON body sent to the controller.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization failures.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Consume the envelope and return it as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
