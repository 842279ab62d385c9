//! Shipping service contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Address, Priority};

use crate::error::CollaboratorError;

/// Result of a successfully scheduled shipment.
#[derive(Debug, Clone)]
pub struct ShipmentResult {
    /// The tracking number assigned by the shipping service.
    pub tracking_number: String,
    /// Estimated delivery date derived from the order priority.
    pub estimated_delivery: DateTime<Utc>,
}

/// Contract for the shipping collaborator.
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Schedules a shipment to the given address.
    async fn schedule(
        &self,
        order_id: OrderId,
        address: &Address,
        priority: Priority,
    ) -> Result<ShipmentResult, CollaboratorError>;
}

#[derive(Debug, Default)]
struct InMemoryShippingState {
    shipments: HashMap<String, OrderId>,
    next_id: u32,
    fail_on_schedule: bool,
    unreachable: bool,
    latency: Option<Duration>,
}

/// In-memory shipping service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShippingService {
    state: Arc<RwLock<InMemoryShippingState>>,
}

impl InMemoryShippingService {
    /// Creates a new in-memory shipping service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline the next schedule call.
    pub fn set_fail_on_schedule(&self, fail: bool) {
        self.state.write().unwrap().fail_on_schedule = fail;
    }

    /// Configures the service to be unreachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.write().unwrap().unreachable = unreachable;
    }

    /// Configures a response delay for every call.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Returns the number of scheduled shipments.
    pub fn shipment_count(&self) -> usize {
        self.state.read().unwrap().shipments.len()
    }

    /// Returns true if a shipment exists with the given tracking number.
    pub fn has_shipment(&self, tracking_number: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .shipments
            .contains_key(tracking_number)
    }

    async fn simulate_endpoint(&self) -> Result<(), CollaboratorError> {
        let (latency, unreachable) = {
            let state = self.state.read().unwrap();
            (state.latency, state.unreachable)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if unreachable {
            return Err(CollaboratorError::Unreachable(
                "shipping service did not respond".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ShippingService for InMemoryShippingService {
    async fn schedule(
        &self,
        order_id: OrderId,
        _address: &Address,
        priority: Priority,
    ) -> Result<ShipmentResult, CollaboratorError> {
        self.simulate_endpoint().await?;
        let mut state = self.state.write().unwrap();

        if state.fail_on_schedule {
            return Err(CollaboratorError::Rejected(
                "no carrier capacity".to_string(),
            ));
        }

        state.next_id += 1;
        let tracking_number = format!("TRK-{:04}", state.next_id);
        state.shipments.insert(tracking_number.clone(), order_id);

        Ok(ShipmentResult {
            tracking_number,
            estimated_delivery: Utc::now() + chrono::Duration::days(priority.delivery_days()),
        })
    }
}
