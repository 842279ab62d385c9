//! Payment handler: charges once inventory is confirmed available.

use async_trait::async_trait;
use collaborators::PaymentService;

use crate::bus::{EventBus, EventHandler};
use crate::config::ChoreographyConfig;
use crate::error::HandlerError;
use crate::events::WorkflowEvent;
use crate::handlers::bounded;

/// Reacts to `InventoryChecked { available: true }` with a charge.
///
/// `available: false` events are ignored — the inventory handler already
/// published the terminal `OrderFailed` for those.
pub struct PaymentHandler<P: PaymentService> {
    payment: P,
    config: ChoreographyConfig,
}

impl<P: PaymentService> PaymentHandler<P> {
    /// Creates the handler over a payment collaborator.
    pub fn new(payment: P, config: ChoreographyConfig) -> Self {
        Self { payment, config }
    }
}

#[async_trait]
impl<P: PaymentService> EventHandler for PaymentHandler<P> {
    fn name(&self) -> &'static str {
        "payment_handler"
    }

    async fn handle(&self, event: &WorkflowEvent, bus: &EventBus) -> Result<(), HandlerError> {
        let WorkflowEvent::InventoryChecked(data) = event else {
            return Ok(());
        };
        if !data.available {
            return Ok(());
        }
        let order = &data.order;

        match bounded(
            self.config.step_timeout,
            self.payment
                .charge(order.id(), order.customer_id(), order.total()),
        )
        .await
        {
            Ok(result) => {
                bus.publish(WorkflowEvent::payment_processed(
                    order.clone(),
                    true,
                    Some(result.transaction_id),
                ))
                .await;
            }
            Err(e) => {
                bus.publish(WorkflowEvent::payment_processed(order.clone(), false, None))
                    .await;
                bus.publish(WorkflowEvent::order_failed(
                    order.id(),
                    "payment",
                    e.to_string(),
                ))
                .await;
            }
        }
        Ok(())
    }
}
