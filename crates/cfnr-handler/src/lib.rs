//! # cfnr-handler — Custom Resource Request Handling
//!
//! Turns a resource type's `create`/`update`/`delete` implementations into
//! a complete CloudFormation custom resource handler.
//!
//! ## Flow
//!
//! ```text
//! Event ──▶ Handler::handle
//!             ├─ Responder opened (exactly one terminal response)
//!             ├─ Dispatcher: schema check ─▶ route ─▶ operation ─▶ coerce
//!             ├─ Responder::respond(response)
//!             └─ Responder::close(outcome)   FAILED fallback if still open
//! ```
//!
//! ## Example
//!
//! ```ignore
//! struct Bucket;
//!
//! impl CustomResource for Bucket {
//!     fn create(&self, event: &Event, _: &InvocationContext) -> OperationResult {
//!         let name = event.property_str("Name").context("Name is required")?;
//!         let data = BTreeMap::from([("Arn".to_string(), format!("arn:aws:s3:::{name}"))]);
//!         Ok((name, data).into())
//!     }
//!     fn update(&self, event: &Event, ctx: &InvocationContext) -> OperationResult {
//!         self.create(event, ctx)
//!     }
//!     fn delete(&self, event: &Event, _: &InvocationContext) -> OperationResult {
//!         Ok(event.fallback_physical_resource_id().into())
//!     }
//! }
//!
//! let handler = Handler::new(Bucket, &HandlerConfig::from_env()?)?;
//! handler.handle_value(raw_event, &InvocationContext::default())?;
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod resource;
pub mod responder;
pub mod testing;

pub use config::{HandlerConfig, NoResponsePolicy, ResponderSettings};
pub use dispatch::Dispatcher;
pub use error::HandlerError;
pub use handler::Handler;
pub use resource::{CustomResource, OperationResult};
pub use responder::{Responder, ResponderState, NO_RESPONSE_SENT};
