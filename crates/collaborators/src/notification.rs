//! Notification service contract and in-memory implementation.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CollaboratorError;

/// A notification captured by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    /// Recipient email address.
    pub email: String,
    /// Message subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// Contract for the notification collaborator.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Sends an email notification.
    async fn send(&self, email: &str, subject: &str, body: &str)
    -> Result<(), CollaboratorError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<SentNotification>,
    fail_on_send: bool,
    unreachable: bool,
    latency: Option<Duration>,
}

/// In-memory notification service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    /// Creates a new in-memory notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline the next send call.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Configures the service to be unreachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.write().unwrap().unreachable = unreachable;
    }

    /// Configures a response delay for every call.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Returns the number of notifications sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns a copy of all sent notifications, in send order.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.state.read().unwrap().sent.clone()
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
                "notification service did not respond".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send(
        &self,
        email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), CollaboratorError> {
        self.simulate_endpoint().await?;
        let mut state = self.state.write().unwrap();

        if state.fail_on_send {
            return Err(CollaboratorError::Rejected(
                "recipient mailbox rejected the message".to_string(),
            ));
        }

        state.sent.push(SentNotification {
            email: email.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
