//! In-process order snapshot store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use common::OrderId;
use domain::Order;

/// Shared, in-process store of order snapshots.
///
/// The intake writes each order once before publishing `OrderCreated`;
/// handlers that need the snapshot later (notification) read from here.
/// Nothing survives the process — persistence is out of scope.
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl OrderStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an order snapshot.
    pub fn insert(&self, order: Order) {
        self.orders.write().unwrap().insert(order.id(), order);
    }

    /// Returns a clone of the stored snapshot, if any.
    pub fn get(&self, order_id: OrderId) -> Option<Order> {
        self.orders.read().unwrap().get(&order_id).cloned()
    }

    /// Returns the number of stored orders.
    pub fn len(&self) -> usize {
        self.orders.read().unwrap().len()
    }

    /// Returns true if no orders are stored.
    pub fn is_empty(&self) -> bool {
        self.orders.read().unwrap().is_empty()
    }
}
