//! Choreographed step handlers.
//!
//! Each handler subscribes to exactly the event kind(s) that mean "my
//! prerequisite is satisfied", performs one unit of work against its
//! collaborator, and publishes one result event — a success variant, or
//! `OrderFailed` with a reason. Handlers are deliberately not idempotent:
//! a replayed input event produces duplicate downstream effects.

pub mod inventory;
pub mod notification;
pub mod payment;
pub mod shipping;

pub use inventory::InventoryHandler;
pub use notification::NotificationHandler;
pub use payment::PaymentHandler;
pub use shipping::ShippingHandler;

use std::future::Future;
use std::time::Duration;

use collaborators::CollaboratorError;

/// Bounds a collaborator call; a timeout is folded into the unreachable
/// class, so handlers treat it exactly like a negative response.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, CollaboratorError>>,
) -> Result<T, CollaboratorError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Unreachable(format!(
            "call timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}
