//! # Dispatcher
//!
//! Routes an event to the resource operation matching its `RequestType`.
//!
//! 1. Validate properties against the declared schema, if any. A violation
//!    becomes a `FAILED` response and the operation is never invoked.
//! 2. Select `create`, `update` or `delete`. Any other request type is a
//!    hard error.
//! 3. Invoke the operation once.
//! 4. Coerce its output into a canonical [`Response`].

use cfnr_core::{coerce, Event, Failed, InvocationContext, RequestType, Response};
use cfnr_schema::{PropertiesSchema, SchemaError};

use crate::error::HandlerError;
use crate::resource::CustomResource;

/// A resource paired with its compiled properties schema.
#[derive(Debug)]
pub struct Dispatcher<R> {
    resource: R,
    schema: Option<PropertiesSchema>,
}

impl<R: CustomResource> Dispatcher<R> {
    /// Register a resource, compiling its properties schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the declared schema does not compile.
    pub fn new(resource: R) -> Result<Self, SchemaError> {
        let schema = resource
            .properties_schema()
            .map(PropertiesSchema::new)
            .transpose()?;
        Ok(Self { resource, schema })
    }

    /// The registered resource.
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// The compiled properties schema, if one was declared.
    pub fn schema(&self) -> Option<&PropertiesSchema> {
        self.schema.as_ref()
    }

    /// Validate, route, invoke and coerce.
    ///
    /// # Errors
    ///
    /// - [`HandlerError::UnknownRequestType`] for an unrecognized request.
    /// - [`HandlerError::Operation`] when the operation fails.
    /// - [`HandlerError::Coercion`] when its output has no usable shape.
    pub fn dispatch(
        &self,
        event: &Event,
        context: &InvocationContext,
    ) -> Result<Response, HandlerError> {
        if let Some(schema) = &self.schema {
            if let Err(violation) = schema.validate_event(event) {
                tracing::warn!(
                    request_id = %event.request_id,
                    field = violation.field,
                    keyword = %violation.violation.keyword,
                    "resource properties failed schema validation"
                );
                let failed = Failed::new(event.fallback_physical_resource_id(), violation.to_string())?;
                return Ok(failed.into());
            }
        }

        let request_type = event
            .request_type()
            .map_err(HandlerError::UnknownRequestType)?;

        tracing::info!(
            request_id = %event.request_id,
            logical_resource_id = %event.logical_resource_id,
            %request_type,
            "dispatching request"
        );

        let output = match request_type {
            RequestType::Create => self.resource.create(event, context),
            RequestType::Update => self.resource.update(event, context),
            RequestType::Delete => self.resource.delete(event, context),
        }
        .map_err(HandlerError::Operation)?;

        Ok(coerce(output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfnr_core::{Deferred, HandlerOutput, Success};
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use crate::resource::OperationResult;

    /// Records which operation ran and returns a fixed output.
    #[derive(Default)]
    struct Probe {
        calls: Mutex<Vec<RequestType>>,
        schema: Option<Value>,
    }

    impl Probe {
        fn record(&self, kind: RequestType) -> OperationResult {
            self.calls.lock().push(kind);
            Ok(HandlerOutput::from(format!("{kind}-id")))
        }
    }

    impl CustomResource for Probe {
        fn create(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            self.record(RequestType::Create)
        }

        fn update(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            self.record(RequestType::Update)
        }

        fn delete(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            self.record(RequestType::Delete)
        }

        fn properties_schema(&self) -> Option<Value> {
            self.schema.clone()
        }
    }

    fn event(request_type: &str) -> Event {
        serde_json::from_value(json!({
            "RequestType": request_type,
            "StackId": "1",
            "RequestId": "2",
            "LogicalResourceId": "3",
            "ResponseURL": "http://response",
            "ResourceProperties": {}
        }))
        .unwrap()
    }

    #[test]
    fn each_request_type_routes_to_its_operation_exactly_once() {
        for kind in [RequestType::Create, RequestType::Update, RequestType::Delete] {
            let dispatcher = Dispatcher::new(Probe::default()).unwrap();
            let response = dispatcher
                .dispatch(&event(kind.as_str()), &InvocationContext::default())
                .unwrap();

            assert_eq!(*dispatcher.resource().calls.lock(), vec![kind]);
            assert_eq!(
                response,
                Response::Success(Success::with_id(format!("{kind}-id")).unwrap())
            );
        }
    }

    #[test]
    fn unknown_request_type_fails_loudly() {
        let dispatcher = Dispatcher::new(Probe::default()).unwrap();
        let err = dispatcher
            .dispatch(&event("Rollback"), &InvocationContext::default())
            .unwrap_err();
        assert!(matches!(err, HandlerError::UnknownRequestType(ref t) if t == "Rollback"));
        assert!(dispatcher.resource().calls.lock().is_empty());
    }

    #[test]
    fn invalid_schema_fails_at_registration() {
        let probe = Probe {
            schema: Some(json!({"required": "not-an-array"})),
            ..Default::default()
        };
        assert!(Dispatcher::new(probe).is_err());
    }

    #[test]
    fn schema_violation_short_circuits_dispatch() {
        let probe = Probe {
            schema: Some(json!({"required": ["Validating"]})),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(probe).unwrap();
        let response = dispatcher
            .dispatch(&event("Create"), &InvocationContext::default())
            .unwrap();

        match response {
            Response::Failed(failed) => {
                assert_eq!(failed.physical_resource_id().as_str(), "n/a");
                assert!(failed.reason().contains("Validating"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(dispatcher.resource().calls.lock().is_empty());
    }

    #[test]
    fn schema_violation_reuses_prior_physical_id() {
        let probe = Probe {
            schema: Some(json!({"required": ["Validating"]})),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(probe).unwrap();
        let mut ev = event("Delete");
        ev.physical_resource_id = Some("Existing".into());

        let response = dispatcher.dispatch(&ev, &InvocationContext::default()).unwrap();
        assert_eq!(response.physical_resource_id().unwrap().as_str(), "Existing");
    }

    #[test]
    fn schema_violation_wins_over_unknown_request_type() {
        let probe = Probe {
            schema: Some(json!({"required": ["Validating"]})),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(probe).unwrap();
        let response = dispatcher
            .dispatch(&event("Rollback"), &InvocationContext::default())
            .unwrap();
        assert!(matches!(response, Response::Failed(_)));
    }

    struct Returns(fn() -> OperationResult);

    impl CustomResource for Returns {
        fn create(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            (self.0)()
        }

        fn update(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            (self.0)()
        }

        fn delete(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            (self.0)()
        }
    }

    #[test]
    fn deferred_output_passes_through() {
        let dispatcher = Dispatcher::new(Returns(|| Ok(Deferred.into()))).unwrap();
        let response = dispatcher
            .dispatch(&event("Create"), &InvocationContext::default())
            .unwrap();
        assert!(response.is_deferred());
    }

    #[test]
    fn no_output_is_a_coercion_error() {
        let dispatcher = Dispatcher::new(Returns(|| Ok(().into()))).unwrap();
        let err = dispatcher
            .dispatch(&event("Create"), &InvocationContext::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "No response returned");
    }

    #[test]
    fn operation_errors_are_propagated() {
        let dispatcher =
            Dispatcher::new(Returns(|| Err(anyhow::anyhow!("Couldn't create")))).unwrap();
        let err = dispatcher
            .dispatch(&event("Create"), &InvocationContext::default())
            .unwrap_err();
        assert!(matches!(err, HandlerError::Operation(_)));
        assert_eq!(err.to_string(), "Couldn't create");
    }
}
