//! # Handler Output Coercion
//!
//! Resource operations may return the common case tersely (just a physical
//! id, or an id with output attributes) and still take explicit control
//! (custom failure reason, deferral) when they need it. [`HandlerOutput`]
//! is the closed set of accepted shapes; [`coerce`] maps each one to a
//! canonical [`Response`].
//!
//! | Shape | Result |
//! |-------|--------|
//! | `"id"` | `Success(id, {})` |
//! | `("id", data)` | `Success(id, data)` |
//! | `Success` / `Failed` / `Deferred` / `Response` | unchanged |
//! | `()` / `None` / JSON `null` | `CoercionError::NoResponse` |
//! | JSON `"id"` / `["id", {..}]` | as the typed forms above |
//! | any other JSON | `CoercionError::Unexpected` |

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::error::CoercionError;
use crate::response::{Deferred, Failed, Response, Success};

/// The value a resource operation hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// A bare physical id.
    PhysicalResourceId(String),
    /// A physical id with output attributes.
    WithData(String, BTreeMap<String, String>),
    /// An explicit response.
    Response(Response),
    /// Dynamically-shaped output, e.g. from a scripted operation.
    Json(Value),
    /// The operation produced nothing.
    Nothing,
}

/// Normalize handler output into a canonical [`Response`].
///
/// # Errors
///
/// - [`CoercionError::NoResponse`] when nothing was returned.
/// - [`CoercionError::Unexpected`] for an unrecognized JSON shape. The
///   message includes the offending value.
/// - [`CoercionError::Construction`] when a recognized shape carries an
///   invalid id or non-string data.
pub fn coerce(output: HandlerOutput) -> Result<Response, CoercionError> {
    match output {
        HandlerOutput::PhysicalResourceId(id) => Ok(Success::with_id(id)?.into()),
        HandlerOutput::WithData(id, data) => Ok(Success::new(id, data)?.into()),
        HandlerOutput::Response(response) => Ok(response),
        HandlerOutput::Nothing => Err(CoercionError::NoResponse),
        HandlerOutput::Json(value) => coerce_json(value),
    }
}

fn coerce_json(value: Value) -> Result<Response, CoercionError> {
    match value {
        Value::String(id) => Ok(Success::with_id(id)?.into()),
        Value::Array(ref pair) if pair.len() == 2 && pair[0].is_string() && pair[1].is_object() => {
            Ok(Success::from_json(&pair[0], &pair[1])?.into())
        }
        Value::Null => Err(CoercionError::NoResponse),
        other => Err(CoercionError::Unexpected(other.to_string())),
    }
}

impl From<&str> for HandlerOutput {
    fn from(value: &str) -> Self {
        Self::PhysicalResourceId(value.to_string())
    }
}

impl From<String> for HandlerOutput {
    fn from(value: String) -> Self {
        Self::PhysicalResourceId(value)
    }
}

impl<S: Into<String>> From<(S, BTreeMap<String, String>)> for HandlerOutput {
    fn from((id, data): (S, BTreeMap<String, String>)) -> Self {
        Self::WithData(id.into(), data)
    }
}

impl<S: Into<String>> From<(S, HashMap<String, String>)> for HandlerOutput {
    fn from((id, data): (S, HashMap<String, String>)) -> Self {
        Self::WithData(id.into(), data.into_iter().collect())
    }
}

impl From<Response> for HandlerOutput {
    fn from(value: Response) -> Self {
        Self::Response(value)
    }
}

impl From<Success> for HandlerOutput {
    fn from(value: Success) -> Self {
        Self::Response(value.into())
    }
}

impl From<Failed> for HandlerOutput {
    fn from(value: Failed) -> Self {
        Self::Response(value.into())
    }
}

impl From<Deferred> for HandlerOutput {
    fn from(value: Deferred) -> Self {
        Self::Response(value.into())
    }
}

impl From<()> for HandlerOutput {
    fn from(_: ()) -> Self {
        Self::Nothing
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<HandlerOutput>> From<Option<T>> for HandlerOutput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nothing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_becomes_success_without_data() {
        let response = coerce("abc".into()).unwrap();
        assert_eq!(response, Response::Success(Success::with_id("abc").unwrap()));
    }

    #[test]
    fn id_and_data_pair_becomes_success() {
        let data = BTreeMap::from([("k".to_string(), "v".to_string())]);
        let response = coerce(("abc", data.clone()).into()).unwrap();
        assert_eq!(
            response,
            Response::Success(Success::new("abc", data).unwrap())
        );
    }

    #[test]
    fn hash_map_data_is_accepted() {
        let data = HashMap::from([("k".to_string(), "v".to_string())]);
        let response = coerce(("abc".to_string(), data).into()).unwrap();
        assert_eq!(response.physical_resource_id().unwrap().as_str(), "abc");
    }

    #[test]
    fn explicit_responses_pass_through() {
        let failed = Failed::new("PhysicalResourceId", "Broken").unwrap();
        assert_eq!(
            coerce(failed.clone().into()).unwrap(),
            Response::Failed(failed)
        );
        assert_eq!(
            coerce(Deferred.into()).unwrap(),
            Response::Deferred(Deferred)
        );
    }

    #[test]
    fn nothing_is_no_response_returned() {
        let err = coerce(().into()).unwrap_err();
        assert_eq!(err, CoercionError::NoResponse);
        assert_eq!(err.to_string(), "No response returned");

        let none: Option<String> = None;
        assert_eq!(coerce(none.into()).unwrap_err(), CoercionError::NoResponse);
        assert_eq!(coerce(json!(null).into()).unwrap_err(), CoercionError::NoResponse);
    }

    #[test]
    fn some_value_is_coerced() {
        let response = coerce(Some("abc").into()).unwrap();
        assert_eq!(response.physical_resource_id().unwrap().as_str(), "abc");
    }

    #[test]
    fn json_shapes_mirror_typed_shapes() {
        let response = coerce(json!("abc").into()).unwrap();
        assert_eq!(response, Response::Success(Success::with_id("abc").unwrap()));

        let response = coerce(json!(["abc", {"k": "v"}]).into()).unwrap();
        assert_eq!(
            response,
            Response::Success(Success::new("abc", [("k", "v")]).unwrap())
        );
    }

    #[test]
    fn unrecognized_json_reports_the_value() {
        let err = coerce(json!({"object": true}).into()).unwrap_err();
        assert_eq!(err, CoercionError::Unexpected(r#"{"object":true}"#.into()));
        assert!(err.to_string().starts_with("Unexpected response "));

        let err = coerce(json!(["a", "b", "c"]).into()).unwrap_err();
        assert!(matches!(err, CoercionError::Unexpected(_)));
    }

    #[test]
    fn pair_with_non_string_data_is_a_construction_error() {
        let err = coerce(json!(["abc", {"k": 1}]).into()).unwrap_err();
        assert!(matches!(err, CoercionError::Construction(_)));
    }

    #[test]
    fn invalid_id_is_a_construction_error() {
        let err = coerce("".into()).unwrap_err();
        assert!(matches!(err, CoercionError::Construction(_)));
    }
}
