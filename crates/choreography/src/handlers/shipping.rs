//! Shipping handler: schedules once stock is held.

use async_trait::async_trait;
use collaborators::ShippingService;

use crate::bus::{EventBus, EventHandler};
use crate::config::ChoreographyConfig;
use crate::error::HandlerError;
use crate::events::WorkflowEvent;
use crate::handlers::bounded;

/// Reacts to `InventoryReserved` with a shipment schedule.
pub struct ShippingHandler<S: ShippingService> {
    shipping: S,
    config: ChoreographyConfig,
}

impl<S: ShippingService> ShippingHandler<S> {
    /// Creates the handler over a shipping collaborator.
    pub fn new(shipping: S, config: ChoreographyConfig) -> Self {
        Self { shipping, config }
    }
}

#[async_trait]
impl<S: ShippingService> EventHandler for ShippingHandler<S> {
    fn name(&self) -> &'static str {
        "shipping_handler"
    }

    async fn handle(&self, event: &WorkflowEvent, bus: &EventBus) -> Result<(), HandlerError> {
        let WorkflowEvent::InventoryReserved(data) = event else {
            return Ok(());
        };
        let order = &data.order;

        match bounded(
            self.config.step_timeout,
            self.shipping
                .schedule(order.id(), order.shipping_address(), order.priority()),
        )
        .await
        {
            Ok(result) => {
                bus.publish(WorkflowEvent::shipping_scheduled(
                    order.id(),
                    result.tracking_number,
                    result.estimated_delivery,
                ))
                .await;
            }
            Err(e) => {
                bus.publish(WorkflowEvent::order_failed(
                    order.id(),
                    "shipping_schedule",
                    e.to_string(),
                ))
                .await;
            }
        }
        Ok(())
    }
}
