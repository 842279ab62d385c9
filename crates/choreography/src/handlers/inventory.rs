//! Inventory handler: availability check and reservation.

use async_trait::async_trait;
use collaborators::InventoryService;
use futures_util::future::join_all;

use crate::bus::{EventBus, EventHandler};
use crate::config::ChoreographyConfig;
use crate::error::HandlerError;
use crate::events::WorkflowEvent;
use crate::handlers::bounded;

/// Reacts to `OrderCreated` with an availability check and to successful
/// `PaymentProcessed` with a stock reservation.
pub struct InventoryHandler<I: InventoryService> {
    inventory: I,
    config: ChoreographyConfig,
}

impl<I: InventoryService> InventoryHandler<I> {
    /// Creates the handler over an inventory collaborator.
    pub fn new(inventory: I, config: ChoreographyConfig) -> Self {
        Self { inventory, config }
    }
}

#[async_trait]
impl<I: InventoryService> EventHandler for InventoryHandler<I> {
    fn name(&self) -> &'static str {
        "inventory_handler"
    }

    async fn handle(&self, event: &WorkflowEvent, bus: &EventBus) -> Result<(), HandlerError> {
        match event {
            WorkflowEvent::OrderCreated(data) => {
                let order = &data.order;
                // Per-line-item checks run concurrently; the order is
                // available only if every item is (logical AND).
                let checks = join_all(
                    order
                        .items()
                        .iter()
                        .map(|item| self.inventory.check_item(&item.product_id, item.quantity)),
                );
                let outcome = bounded(self.config.step_timeout, async {
                    checks.await.into_iter().collect::<Result<Vec<_>, _>>()
                })
                .await;

                match outcome {
                    Ok(flags) => {
                        let available = flags.iter().all(|&a| a);
                        bus.publish(WorkflowEvent::inventory_checked(order.clone(), available))
                            .await;
                        if !available {
                            bus.publish(WorkflowEvent::order_failed(
                                order.id(),
                                "inventory_check",
                                "insufficient stock for one or more items",
                            ))
                            .await;
                        }
                    }
                    Err(e) => {
                        bus.publish(WorkflowEvent::order_failed(
                            order.id(),
                            "inventory_check",
                            e.to_string(),
                        ))
                        .await;
                    }
                }
            }
            WorkflowEvent::PaymentProcessed(data) if data.success => {
                let order = &data.order;
                match bounded(
                    self.config.step_timeout,
                    self.inventory.reserve(order.id(), order.items()),
                )
                .await
                {
                    Ok(result) => {
                        bus.publish(WorkflowEvent::inventory_reserved(
                            order.clone(),
                            result.reservation_id,
                        ))
                        .await;
                    }
                    Err(e) => {
                        bus.publish(WorkflowEvent::order_failed(
                            order.id(),
                            "inventory_reservation",
                            e.to_string(),
                        ))
                        .await;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
