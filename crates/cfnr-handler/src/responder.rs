//! # Responder
//!
//! Owns the guarantee that exactly one terminal response reaches the
//! controller for an event. The controller blocks until it hears back, so
//! every path that would leave it waiting (an error, a forgotten response,
//! a panic) is turned into a delivered `FAILED` envelope.
//!
//! ## State Machine
//!
//! ```text
//!   Open ──respond(Success|Failed)──▶ Responded   (envelope delivered)
//!   Open ──respond(Deferred)────────▶ Responded   (nothing delivered)
//!   Open ──close(Ok)────────────────▶ Responded   (FAILED "No response sent")
//!   Open ──close(Err(e))────────────▶ Responded   (FAILED e, then Err(e) returned)
//!   Open ──drop─────────────────────▶ Responded   (FAILED, logged on error)
//!   Responded ──close / drop────────▶ no-op
//! ```
//!
//! The state moves to `Responded` before delivery is attempted, so a failed
//! delivery is reported once and never followed by a second envelope.
//!
//! ## Usage
//!
//! ```ignore
//! let mut responder = Responder::new(&event, &sink, settings);
//! let outcome = do_work(&event).and_then(|r| responder.respond(&r));
//! responder.close(outcome)?;
//! ```

use cfnr_callback::{deliver, ResponseSink};
use cfnr_core::{Deferred, Envelope, Event, Failed, Response, Success};

use crate::config::{NoResponsePolicy, ResponderSettings};
use crate::error::HandlerError;

/// Reason sent when the scope closes without a response.
pub const NO_RESPONSE_SENT: &str = "No response sent";

/// Responder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderState {
    /// No terminal response yet.
    Open,
    /// A terminal response was delivered, attempted, or deferred.
    Responded,
}

/// Scoped responder for a single event.
pub struct Responder<'a> {
    event: &'a Event,
    sink: &'a dyn ResponseSink,
    settings: ResponderSettings,
    state: ResponderState,
}

impl std::fmt::Debug for Responder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("request_id", &self.event.request_id)
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> Responder<'a> {
    /// Open a responder scope over `event`.
    pub fn new(event: &'a Event, sink: &'a dyn ResponseSink, settings: ResponderSettings) -> Self {
        Self {
            event,
            sink,
            settings,
            state: ResponderState::Open,
        }
    }

    /// Current state.
    pub fn state(&self) -> ResponderState {
        self.state
    }

    /// The event this responder answers.
    pub fn event(&self) -> &Event {
        self.event
    }

    /// Send the terminal response.
    ///
    /// `Success` and `Failed` are delivered to the event's `ResponseURL`;
    /// `Deferred` only closes the responder.
    ///
    /// # Errors
    ///
    /// - [`HandlerError::AlreadyResponded`] if a terminal response was
    ///   already sent. Nothing is delivered.
    /// - [`HandlerError::Delivery`] if the controller did not acknowledge.
    pub fn respond(&mut self, response: &Response) -> Result<(), HandlerError> {
        if self.state == ResponderState::Responded {
            return Err(HandlerError::AlreadyResponded {
                request_id: self.event.request_id.clone(),
            });
        }
        self.state = ResponderState::Responded;

        let Some(envelope) = Envelope::for_response(self.event, response) else {
            tracing::info!(
                request_id = %self.event.request_id,
                logical_resource_id = %self.event.logical_resource_id,
                "response deferred; nothing sent"
            );
            return Ok(());
        };

        deliver(self.sink, self.event, &envelope)?;
        tracing::info!(
            request_id = %self.event.request_id,
            logical_resource_id = %self.event.logical_resource_id,
            status = ?response.status(),
            physical_resource_id = ?response.physical_resource_id().map(|id| id.as_str()),
            "response delivered"
        );
        Ok(())
    }

    /// Send a `SUCCESS` response.
    pub fn success<I, K, V>(
        &mut self,
        physical_resource_id: impl Into<String>,
        data: I,
    ) -> Result<(), HandlerError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let success = Success::new(physical_resource_id, data)?;
        self.respond(&success.into())
    }

    /// Send a `FAILED` response.
    pub fn failed(
        &mut self,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<(), HandlerError> {
        let failed = Failed::new(physical_resource_id, reason)?;
        self.respond(&failed.into())
    }

    /// Defer the response. Nothing is delivered.
    pub fn defer(&mut self) -> Result<(), HandlerError> {
        self.respond(&Deferred.into())
    }

    /// Close the scope, enforcing the single-response guarantee.
    ///
    /// If a response was already sent, `outcome` passes through untouched.
    /// Otherwise a `FAILED` response is synthesized with the event's prior
    /// physical id (or `"n/a"`):
    ///
    /// - `Ok`: reason "No response sent". Under
    ///   [`NoResponsePolicy::Strict`] the call then fails with
    ///   [`HandlerError::NoResponseSent`].
    /// - `Err(e)`: reason is `e`'s message (its full chain in verbose mode).
    ///   `e` is returned unchanged; a delivery failure at this point is
    ///   logged, not substituted.
    ///
    /// # Errors
    ///
    /// Returns the original error, a delivery error for the synthesized
    /// response on the `Ok` path, or `NoResponseSent` under the strict policy.
    pub fn close<T>(mut self, outcome: Result<T, HandlerError>) -> Result<T, HandlerError> {
        if self.state == ResponderState::Responded {
            return outcome;
        }

        match outcome {
            Ok(value) => {
                tracing::warn!(
                    request_id = %self.event.request_id,
                    logical_resource_id = %self.event.logical_resource_id,
                    "scope closed without a response"
                );
                self.send_fallback(NO_RESPONSE_SENT.to_string())?;
                match self.settings.no_response {
                    NoResponsePolicy::Report => Ok(value),
                    NoResponsePolicy::Strict => Err(HandlerError::NoResponseSent),
                }
            }
            Err(err) => {
                tracing::warn!(
                    request_id = %self.event.request_id,
                    logical_resource_id = %self.event.logical_resource_id,
                    error = %err,
                    "reporting failure to controller"
                );
                let reason = err.failure_reason(self.settings.verbose_failures);
                if let Err(delivery) = self.send_fallback(reason) {
                    tracing::error!(
                        request_id = %self.event.request_id,
                        error = %delivery,
                        "could not report failure to controller"
                    );
                }
                Err(err)
            }
        }
    }

    fn send_fallback(&mut self, reason: String) -> Result<(), HandlerError> {
        let failed = Failed::new(self.event.fallback_physical_resource_id(), reason)?;
        self.respond(&failed.into())
    }
}

impl Drop for Responder<'_> {
    fn drop(&mut self) {
        if self.state == ResponderState::Responded {
            return;
        }
        let reason = if std::thread::panicking() {
            "Handler panicked"
        } else {
            NO_RESPONSE_SENT
        };
        tracing::warn!(
            request_id = %self.event.request_id,
            reason,
            "responder dropped while open"
        );
        if let Err(err) = self.send_fallback(reason.to_string()) {
            tracing::error!(
                request_id = %self.event.request_id,
                error = %err,
                "could not report failure to controller"
            );
        }
    }
}
