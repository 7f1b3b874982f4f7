//! HTTP delivery of response envelopes.
//!
//! The controller hands every event a presigned `ResponseURL`. A response
//! is delivered by PUTting the JSON envelope to it; only HTTP 200 counts as
//! an acknowledgement. There is no retry: a failed delivery is reported to
//! the caller, which decides what to do with the invocation.

use std::sync::Arc;

use cfnr_core::{Envelope, Event};
use url::Url;

use crate::config::CallbackConfig;
use crate::error::DeliveryError;

/// Destination for serialized response envelopes.
///
/// [`HttpCallback`] is the production implementation. Tests substitute a
/// recording sink.
pub trait ResponseSink: Send + Sync {
    /// PUT `body` to `url`, succeeding only on acknowledgement.
    fn put(&self, url: &str, body: &str) -> Result<(), DeliveryError>;
}

impl<T: ResponseSink + ?Sized> ResponseSink for Arc<T> {
    fn put(&self, url: &str, body: &str) -> Result<(), DeliveryError> {
        (**self).put(url, body)
    }
}

impl<T: ResponseSink + ?Sized> ResponseSink for &T {
    fn put(&self, url: &str, body: &str) -> Result<(), DeliveryError> {
        (**self).put(url, body)
    }
}

/// Blocking HTTP client for the controller callback.
#[derive(Debug, Clone)]
pub struct HttpCallback {
    http: reqwest::blocking::Client,
}

impl HttpCallback {
    /// Build a callback client from configuration.
    ///
    /// Must not be called from inside an async runtime; the blocking client
    /// owns its own.
    pub fn new(config: &CallbackConfig) -> Result<Self, DeliveryError> {
        let mut builder = reqwest::blocking::Client::builder().timeout(config.timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let http = builder
            .build()
            .map_err(|e| DeliveryError::Client(e.without_url()))?;
        Ok(Self { http })
    }
}

impl ResponseSink for HttpCallback {
    fn put(&self, url: &str, body: &str) -> Result<(), DeliveryError> {
        let redacted = redact_url(url);
        let parsed = Url::parse(url).map_err(|e| DeliveryError::InvalidUrl {
            url: redacted.clone(),
            reason: e.to_string(),
        })?;

        // Presigned URLs are signed without a content type; do not add one.
        let resp = self
            .http
            .put(parsed)
            .body(body.to_owned())
            .send()
            .map_err(|e| DeliveryError::Http {
                url: redacted.clone(),
                source: e.without_url(),
            })?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().unwrap_or_default();
            tracing::error!(url = %redacted, status, "controller rejected response");
            return Err(DeliveryError::UnexpectedStatus {
                url: redacted,
                status,
                body,
            });
        }

        tracing::debug!(url = %redacted, "controller acknowledged response");
        Ok(())
    }
}

/// Serialize `envelope` and deliver it to the event's `ResponseURL`.
pub fn deliver(
    sink: &dyn ResponseSink,
    event: &Event,
    envelope: &Envelope,
) -> Result<(), DeliveryError> {
    let body = envelope.to_json()?;
    tracing::debug!(
        request_id = %event.request_id,
        logical_resource_id = %event.logical_resource_id,
        body = %body,
        "sending response envelope"
    );
    sink.put(&event.response_url, &body)
}

/// Strip the query string and fragment from a URL for logging.
///
/// Unparseable input is replaced wholesale rather than echoed.
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let had_query = parsed.query().is_some();
            parsed.set_query(None);
            parsed.set_fragment(None);
            if had_query {
                format!("{parsed}?[REDACTED]")
            } else {
                parsed.to_string()
            }
        }
        Err(_) => "[unparseable URL]".to_string(),
    }
}
