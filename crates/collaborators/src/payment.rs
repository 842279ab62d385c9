//! Payment service contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use domain::Money;

use crate::error::CollaboratorError;

/// Result of a successful charge.
#[derive(Debug, Clone)]
pub struct PaymentResult {
    /// The transaction ID assigned by the payment service.
    pub transaction_id: String,
}

/// Contract for the payment collaborator.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charges a customer for an order.
    async fn charge(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        amount: Money,
    ) -> Result<PaymentResult, CollaboratorError>;

    /// Reverses a previously captured transaction.
    async fn reverse(&self, transaction_id: &str) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    transactions: HashMap<String, (OrderId, CustomerId, Money)>,
    next_id: u32,
    fail_on_charge: bool,
    fail_on_reverse: bool,
    unreachable: bool,
    latency: Option<Duration>,
}

/// In-memory payment service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline the next charge call.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().unwrap().fail_on_charge = fail;
    }

    /// Configures the service to fail reversal calls.
    pub fn set_fail_on_reverse(&self, fail: bool) {
        self.state.write().unwrap().fail_on_reverse = fail;
    }

    /// Configures the service to be unreachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.write().unwrap().unreachable = unreachable;
    }

    /// Configures a response delay for every call.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Returns the number of captured (unreversed) transactions.
    pub fn transaction_count(&self) -> usize {
        self.state.read().unwrap().transactions.len()
    }

    /// Returns true if a transaction exists with the given ID.
    pub fn has_transaction(&self, transaction_id: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .transactions
            .contains_key(transaction_id)
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
                "payment service did not respond".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn charge(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        amount: Money,
    ) -> Result<PaymentResult, CollaboratorError> {
        self.simulate_endpoint().await?;
        let mut state = self.state.write().unwrap();

        if state.fail_on_charge {
            return Err(CollaboratorError::Rejected("payment declined".to_string()));
        }

        state.next_id += 1;
        let transaction_id = format!("PAY-{:04}", state.next_id);
        state
            .transactions
            .insert(transaction_id.clone(), (order_id, customer_id, amount));

        Ok(PaymentResult { transaction_id })
    }

    async fn reverse(&self, transaction_id: &str) -> Result<(), CollaboratorError> {
        self.simulate_endpoint().await?;
        let mut state = self.state.write().unwrap();
        if state.fail_on_reverse {
            return Err(CollaboratorError::Rejected(
                "reversal refused by processor".to_string(),
            ));
        }
        state.transactions.remove(transaction_id);
        Ok(())
    }
}
