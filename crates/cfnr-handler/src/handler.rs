//! # Handler Facade
//!
//! The single entry point a host calls once per invocation. It opens a
//! responder scope, dispatches the event, sends the coerced response and
//! closes the scope. Whatever happens inside (an error, a missing
//! response, a panic) the controller receives exactly one terminal
//! response unless the operation deferred.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use cfnr_callback::{HttpCallback, ResponseSink};
use cfnr_core::{Event, InvocationContext, Response};
use serde_json::Value;

use crate::config::{HandlerConfig, ResponderSettings};
use crate::dispatch::Dispatcher;
use crate::error::HandlerError;
use crate::resource::CustomResource;
use crate::responder::Responder;

/// A registered custom resource ready to handle events.
pub struct Handler<R> {
    dispatcher: Dispatcher<R>,
    sink: Arc<dyn ResponseSink>,
    settings: ResponderSettings,
}

impl<R> std::fmt::Debug for Handler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<R: CustomResource> Handler<R> {
    /// Register `resource`, delivering responses over HTTP.
    ///
    /// # Errors
    ///
    /// Fails if the resource's schema does not compile or the HTTP client
    /// cannot be built.
    pub fn new(resource: R, config: &HandlerConfig) -> Result<Self, HandlerError> {
        let sink = HttpCallback::new(&config.callback)?;
        Self::with_sink(resource, Arc::new(sink), config.responder)
    }

    /// Register `resource` with a caller-supplied delivery sink.
    ///
    /// # Errors
    ///
    /// Fails if the resource's schema does not compile.
    pub fn with_sink(
        resource: R,
        sink: Arc<dyn ResponseSink>,
        settings: ResponderSettings,
    ) -> Result<Self, HandlerError> {
        Ok(Self {
            dispatcher: Dispatcher::new(resource)?,
            sink,
            settings,
        })
    }

    /// The registered resource.
    pub fn resource(&self) -> &R {
        self.dispatcher.resource()
    }

    /// Handle one event.
    ///
    /// Returns the response that was sent (or `Deferred`). On error the
    /// controller has already been sent a `FAILED` response where possible.
    /// A panicking operation is reported as `FAILED` and then resumed.
    ///
    /// # Errors
    ///
    /// Any [`HandlerError`] raised while dispatching or delivering.
    pub fn handle(
        &self,
        event: &Event,
        context: &InvocationContext,
    ) -> Result<Response, HandlerError> {
        let span = tracing::info_span!(
            "custom_resource",
            request_id = %event.request_id,
            logical_resource_id = %event.logical_resource_id,
            request_type = %event.request_type,
        );
        let _entered = span.enter();

        let mut responder = Responder::new(event, &*self.sink, self.settings);
        let dispatched =
            panic::catch_unwind(AssertUnwindSafe(|| self.dispatcher.dispatch(event, context)));

        let outcome = match dispatched {
            Ok(result) => result.and_then(|response| {
                responder.respond(&response)?;
                Ok(response)
            }),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(panic = %message, "operation panicked");
                // close(Err(e)) always hands e back; a failed delivery is logged inside it.
                match responder.close(Err::<(), _>(HandlerError::Panicked(message))) {
                    Err(HandlerError::Panicked(_)) => {}
                    other => tracing::error!(?other, "unexpected result reporting panic"),
                }
                panic::resume_unwind(payload);
            }
        };

        if let Err(err) = &outcome {
            tracing::error!(error = %err, "request failed");
        }
        responder.close(outcome)
    }

    /// Parse a raw JSON event and handle it.
    ///
    /// An event that does not parse has no usable `ResponseURL`, so nothing
    /// can be sent to the controller.
    ///
    /// # Errors
    ///
    /// [`HandlerError::InvalidEvent`] for a malformed event, otherwise as
    /// [`Handler::handle`].
    pub fn handle_value(
        &self,
        event: Value,
        context: &InvocationContext,
    ) -> Result<Response, HandlerError> {
        let event: Event = serde_json::from_value(event).map_err(|err| {
            tracing::error!(error = %err, "event could not be parsed; no response sent");
            HandlerError::InvalidEvent(err)
        })?;
        self.handle(&event, context)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfnr_core::HandlerOutput;
    use serde_json::json;

    use crate::resource::OperationResult;
    use crate::testing::RecordingSink;

    struct Named;

    impl CustomResource for Named {
        fn create(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            Ok(HandlerOutput::from("Named"))
        }

        fn update(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            panic!("boom")
        }

        fn delete(&self, _: &Event, _: &InvocationContext) -> OperationResult {
            Ok(HandlerOutput::Nothing)
        }
    }

    fn raw_event(request_type: &str) -> Value {
        json!({
            "RequestType": request_type,
            "StackId": "1",
            "RequestId": "2",
            "LogicalResourceId": "3",
            "ResponseURL": "http://response",
            "ResourceProperties": {}
        })
    }

    fn handler(sink: &Arc<RecordingSink>) -> Handler<Named> {
        Handler::with_sink(Named, sink.clone(), ResponderSettings::default()).unwrap()
    }

    #[test]
    fn handle_value_parses_and_responds() {
        let sink = Arc::new(RecordingSink::new());
        let response = handler(&sink)
            .handle_value(raw_event("Create"), &InvocationContext::default())
            .unwrap();

        assert_eq!(response.physical_resource_id().unwrap().as_str(), "Named");
        assert_eq!(sink.count(), 1);
        assert_eq!(sink.deliveries()[0].body["Status"], "SUCCESS");
    }

    #[test]
    fn malformed_event_sends_nothing() {
        let sink = Arc::new(RecordingSink::new());
        let err = handler(&sink)
            .handle_value(json!({"RequestType": "Create"}), &InvocationContext::default())
            .unwrap_err();

        assert!(matches!(err, HandlerError::InvalidEvent(_)));
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn panic_is_reported_then_resumed() {
        let sink = Arc::new(RecordingSink::new());
        let handler = handler(&sink);
        let event: Event = serde_json::from_value(raw_event("Update")).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.handle(&event, &InvocationContext::default())
        }));

        assert!(result.is_err());
        let deliveries = sink.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].body["Status"], "FAILED");
        assert_eq!(deliveries[0].body["Reason"], "Handler panicked: boom");
        assert_eq!(deliveries[0].body["PhysicalResourceId"], "n/a");
    }

    #[test]
    fn panic_still_resumes_when_report_is_rejected() {
        let sink = Arc::new(RecordingSink::rejecting(403));
        let handler = handler(&sink);
        let event: Event = serde_json::from_value(raw_event("Update")).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.handle(&event, &InvocationContext::default())
        }));

        let payload = result.unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");
        assert_eq!(sink.count(), 1);
        assert_eq!(sink.deliveries()[0].body["Reason"], "Handler panicked: boom");
    }

    #[test]
    fn handler_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Handler<Named>>();
    }

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        let static_str: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(static_str.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
