//! Notification handler: emails the customer on terminal events.

use async_trait::async_trait;
use collaborators::NotificationService;

use crate::bus::{EventBus, EventHandler};
use crate::config::ChoreographyConfig;
use crate::error::HandlerError;
use crate::events::WorkflowEvent;
use crate::handlers::bounded;
use crate::store::OrderStore;

/// Reacts to `OrderCompleted` and `OrderFailed` by sending the customer
/// email. Publishes nothing; a send failure is returned to the bus and
/// surfaces on the delivery-failure side channel.
pub struct NotificationHandler<N: NotificationService> {
    notification: N,
    store: OrderStore,
    config: ChoreographyConfig,
}

impl<N: NotificationService> NotificationHandler<N> {
    /// Creates the handler over a notification collaborator and the
    /// order store used to look up the contact email.
    pub fn new(notification: N, store: OrderStore, config: ChoreographyConfig) -> Self {
        Self {
            notification,
            store,
            config,
        }
    }
}

#[async_trait]
impl<N: NotificationService> EventHandler for NotificationHandler<N> {
    fn name(&self) -> &'static str {
        "notification_handler"
    }

    async fn handle(&self, event: &WorkflowEvent, _bus: &EventBus) -> Result<(), HandlerError> {
        let (subject, body) = match event {
            WorkflowEvent::OrderCompleted(data) => (
                "Order confirmed",
                format!("Your order {} has been completed.", data.order_id),
            ),
            WorkflowEvent::OrderFailed(data) => (
                "Order failed",
                format!(
                    "Your order {} could not be completed: {}",
                    data.order_id, data.reason
                ),
            ),
            _ => return Ok(()),
        };

        let order_id = event.order_id();
        let order = self
            .store
            .get(order_id)
            .ok_or(HandlerError::UnknownOrder(order_id))?;

        bounded(
            self.config.step_timeout,
            self.notification
                .send(order.contact_email(), subject, &body),
        )
        .await?;
        Ok(())
    }
}
