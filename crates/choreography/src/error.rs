//! Handler error type.

use collaborators::CollaboratorError;
use common::OrderId;
use thiserror::Error;

/// Errors a handler can return to the bus.
///
/// A returned error is reported on the bus's delivery-failure side channel
/// and logged; it is never propagated to the publisher and never stops
/// delivery to the remaining handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler needed an order snapshot that was never stored.
    #[error("unknown order: {0}")]
    UnknownOrder(OrderId),

    /// A collaborator call failed in a way the handler does not translate
    /// into a workflow event.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
