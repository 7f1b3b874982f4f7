//! # Custom Resource Capability
//!
//! The trait a concrete resource type implements. All three lifecycle
//! operations are required methods, so an incomplete resource does not
//! compile.
//!
//! AWS docs:
//! - Create: <http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/crpg-ref-requesttypes-create.html>
//! - Update: <http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/crpg-ref-requesttypes-update.html>
//! - Delete: <http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/crpg-ref-requesttypes-delete.html>

use cfnr_core::{Event, HandlerOutput, InvocationContext};
use serde_json::Value;

/// Result of a lifecycle operation.
///
/// Any error type converts into `anyhow::Error`, so operations can use `?`
/// on whatever their SDK returns.
pub type OperationResult = anyhow::Result<HandlerOutput>;

/// A resource type managed through CloudFormation.
///
/// Each operation must return one of the [`HandlerOutput`] shapes: a
/// physical id, an id with output attributes, or an explicit
/// `Success`/`Failed`/`Deferred`. Returning `Deferred` means a later,
/// out-of-band call completes the request using a saved copy of the event.
pub trait CustomResource: Send + Sync {
    /// Handle a `Create` request.
    fn create(&self, event: &Event, context: &InvocationContext) -> OperationResult;

    /// Handle an `Update` request.
    fn update(&self, event: &Event, context: &InvocationContext) -> OperationResult;

    /// Handle a `Delete` request.
    fn delete(&self, event: &Event, context: &InvocationContext) -> OperationResult;

    /// Optional Draft 4 JSON Schema for `ResourceProperties` and
    /// `OldResourceProperties`.
    ///
    /// Include `{"ServiceToken": {"type": "string"}}` in the root
    /// properties; CloudFormation always sends it.
    fn properties_schema(&self) -> Option<Value> {
        None
    }
}
