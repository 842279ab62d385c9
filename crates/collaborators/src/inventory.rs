//! Inventory service contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::OrderId;
use domain::{LineItem, Money, ProductId};

use crate::error::CollaboratorError;

/// Result of a successful price quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    /// Sum of quoted line totals.
    pub total: Money,
    /// Number of lines quoted.
    pub line_count: usize,
}

/// Result of a successful inventory reservation.
#[derive(Debug, Clone)]
pub struct ReservationResult {
    /// The reservation ID assigned by the inventory service.
    pub reservation_id: String,
}

/// Contract for the inventory collaborator.
///
/// `check_item` and `quote` are pure reads; `reserve` places a hold that
/// must be released via `release` if the workflow aborts afterwards.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Checks whether the requested quantity of a product is in stock.
    async fn check_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<bool, CollaboratorError>;

    /// Quotes a price for the given line items.
    async fn quote(&self, items: &[LineItem]) -> Result<PriceQuote, CollaboratorError>;

    /// Places a hold on stock for the given order items.
    async fn reserve(
        &self,
        order_id: OrderId,
        items: &[LineItem],
    ) -> Result<ReservationResult, CollaboratorError>;

    /// Releases a previously placed hold.
    async fn release(&self, reservation_id: &str) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    stock: HashMap<ProductId, u32>,
    reservations: HashMap<String, OrderId>,
    next_id: u32,
    fail_on_reserve: bool,
    unreachable: bool,
    latency: Option<Duration>,
}

/// In-memory inventory service for testing.
///
/// Unknown products are treated as amply stocked; call `set_stock` to pin
/// a level. `set_fail_on_reserve` simulates a business rejection,
/// `set_unreachable` an infrastructure failure, and `set_latency` a slow
/// endpoint for timeout tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryService {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryService {
    /// Creates a new in-memory inventory service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the available stock level for a product.
    pub fn set_stock(&self, product_id: impl Into<ProductId>, quantity: u32) {
        self.state
            .write()
            .unwrap()
            .stock
            .insert(product_id.into(), quantity);
    }

    /// Configures the service to reject the next reserve call.
    pub fn set_fail_on_reserve(&self, fail: bool) {
        self.state.write().unwrap().fail_on_reserve = fail;
    }

    /// Configures the service to be unreachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.write().unwrap().unreachable = unreachable;
    }

    /// Configures a response delay for every call.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Returns the number of active reservations.
    pub fn reservation_count(&self) -> usize {
        self.state.read().unwrap().reservations.len()
    }

    /// Returns true if a reservation exists with the given ID.
    pub fn has_reservation(&self, reservation_id: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .reservations
            .contains_key(reservation_id)
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
                "inventory service did not respond".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    async fn check_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<bool, CollaboratorError> {
        self.simulate_endpoint().await?;
        let state = self.state.read().unwrap();
        let available = state
            .stock
            .get(product_id)
            .map_or(true, |&level| level >= quantity);
        Ok(available)
    }

    async fn quote(&self, items: &[LineItem]) -> Result<PriceQuote, CollaboratorError> {
        self.simulate_endpoint().await?;
        let total = items
            .iter()
            .fold(Money::zero(), |acc, item| acc.add(item.line_total()));
        Ok(PriceQuote {
            total,
            line_count: items.len(),
        })
    }

    async fn reserve(
        &self,
        order_id: OrderId,
        items: &[LineItem],
    ) -> Result<ReservationResult, CollaboratorError> {
        self.simulate_endpoint().await?;
        let mut state = self.state.write().unwrap();

        if state.fail_on_reserve {
            return Err(CollaboratorError::Rejected(
                "insufficient stock to hold".to_string(),
            ));
        }
        for item in items {
            if let Some(&level) = state.stock.get(&item.product_id) {
                if level < item.quantity {
                    return Err(CollaboratorError::Rejected(format!(
                        "insufficient stock for {}",
                        item.product_id
                    )));
                }
            }
        }

        state.next_id += 1;
        let reservation_id = format!("RES-{:04}", state.next_id);
        state.reservations.insert(reservation_id.clone(), order_id);

        Ok(ReservationResult { reservation_id })
    }

    async fn release(&self, reservation_id: &str) -> Result<(), CollaboratorError> {
        self.simulate_endpoint().await?;
        let mut state = self.state.write().unwrap();
        state.reservations.remove(reservation_id);
        Ok(())
    }
}
