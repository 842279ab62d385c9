//! Loyalty service contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::CustomerId;

use crate::error::CollaboratorError;

/// Result of a successful loyalty award.
#[derive(Debug, Clone)]
pub struct LoyaltyResult {
    /// The customer's point balance after the award.
    pub balance: u64,
}

/// Contract for the loyalty collaborator.
///
/// The orchestrator treats this step as best-effort: a failed award is
/// logged but never aborts the workflow.
#[async_trait]
pub trait LoyaltyService: Send + Sync {
    /// Awards points to a customer.
    async fn award(
        &self,
        customer_id: CustomerId,
        points: u64,
    ) -> Result<LoyaltyResult, CollaboratorError>;
}

#[derive(Debug, Default)]
struct InMemoryLoyaltyState {
    balances: HashMap<CustomerId, u64>,
    fail_on_award: bool,
    unreachable: bool,
    latency: Option<Duration>,
}

/// In-memory loyalty service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoyaltyService {
    state: Arc<RwLock<InMemoryLoyaltyState>>,
}

impl InMemoryLoyaltyService {
    /// Creates a new in-memory loyalty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline the next award call.
    pub fn set_fail_on_award(&self, fail: bool) {
        self.state.write().unwrap().fail_on_award = fail;
    }

    /// Configures the service to be unreachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.write().unwrap().unreachable = unreachable;
    }

    /// Configures a response delay for every call.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Returns the point balance for a customer.
    pub fn balance(&self, customer_id: CustomerId) -> u64 {
        self.state
            .read()
            .unwrap()
            .balances
            .get(&customer_id)
            .copied()
            .unwrap_or(0)
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
                "loyalty service did not respond".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LoyaltyService for InMemoryLoyaltyService {
    async fn award(
        &self,
        customer_id: CustomerId,
        points: u64,
    ) -> Result<LoyaltyResult, CollaboratorError> {
        self.simulate_endpoint().await?;
        let mut state = self.state.write().unwrap();

        if state.fail_on_award {
            return Err(CollaboratorError::Rejected(
                "loyalty account suspended".to_string(),
            ));
        }

        let balance = state.balances.entry(customer_id).or_insert(0);
        *balance += points;
        Ok(LoyaltyResult { balance: *balance })
    }
}
