//! Test doubles for resource authors.
//!
//! [`RecordingSink`] captures every delivery instead of sending it, so a
//! resource's behavior can be asserted end to end without a controller.

use cfnr_callback::{DeliveryError, ResponseSink};
use parking_lot::Mutex;
use serde_json::Value;

/// One captured delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Destination URL.
    pub url: String,
    /// Parsed envelope body.
    pub body: Value,
}

/// A [`ResponseSink`] that records deliveries in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
    reject_with: Option<u16>,
}

impl RecordingSink {
    /// A sink that acknowledges every delivery.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records every delivery and then rejects it with `status`.
    pub fn rejecting(status: u16) -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            reject_with: Some(status),
        }
    }

    /// All deliveries so far, oldest first.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// Number of deliveries so far.
    pub fn count(&self) -> usize {
        self.deliveries.lock().len()
    }
}

impl ResponseSink for RecordingSink {
    fn put(&self, url: &str, body: &str) -> Result<(), DeliveryError> {
        let parsed = serde_json::from_str(body)?;
        self.deliveries.lock().push(Delivery {
            url: url.to_string(),
            body: parsed,
        });
        match self.reject_with {
            Some(status) => Err(DeliveryError::UnexpectedStatus {
                url: url.to_string(),
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}
