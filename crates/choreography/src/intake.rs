//! Order intake: store, then publish.

use common::OrderId;
use domain::{Order, OrderError, OrderRequest};

use crate::bus::EventBus;
use crate::events::WorkflowEvent;
use crate::store::OrderStore;

/// Entry point of the choreographed workflow.
///
/// Validates the request locally, stores the snapshot, and publishes
/// `OrderCreated`. Everything after that is handler reactions.
pub struct OrderIntake {
    store: OrderStore,
    bus: EventBus,
}

impl OrderIntake {
    /// Creates an intake over the given store and bus.
    pub fn new(store: OrderStore, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Places an order and starts the workflow.
    ///
    /// Returns the order id immediately after the `OrderCreated` cascade
    /// has been dispatched; completion or failure is signaled later via
    /// `OrderCompleted` / `OrderFailed` events.
    #[tracing::instrument(skip(self, request))]
    pub async fn place_order(&self, request: OrderRequest) -> Result<OrderId, OrderError> {
        let order = Order::from_request(request)?;
        let order_id = order.id();

        self.store.insert(order.clone());
        tracing::info!(%order_id, total = %order.total(), "order stored, publishing OrderCreated");
        self.bus.publish(WorkflowEvent::order_created(order)).await;

        Ok(order_id)
    }
}
