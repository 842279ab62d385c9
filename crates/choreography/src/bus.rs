//! In-process publish/subscribe event bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::HandlerError;
use crate::events::{EventKind, WorkflowEvent};

/// A handler registered with the bus for one or more event kinds.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Stable handler name, used in logs and delivery-failure reports.
    fn name(&self) -> &'static str;

    /// Reacts to one event. Follow-on events are published through `bus`.
    async fn handle(&self, event: &WorkflowEvent, bus: &EventBus) -> Result<(), HandlerError>;
}

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A handler failure observed during dispatch.
///
/// The bus catches handler errors instead of propagating them to the
/// publisher; this report is the explicit side channel through which a
/// supervising component can observe them.
#[derive(Debug)]
pub struct DeliveryFailure {
    /// The kind of the event being dispatched.
    pub kind: EventKind,
    /// The correlated order.
    pub order_id: OrderId,
    /// The handler that failed.
    pub handler: &'static str,
    /// The handler's error, rendered.
    pub error: String,
}

struct Subscription {
    id: SubscriptionId,
    handler: Arc<dyn EventHandler>,
}

struct BusInner {
    registry: RwLock<HashMap<EventKind, Vec<Subscription>>>,
    failures: mpsc::UnboundedSender<DeliveryFailure>,
    next_id: AtomicU64,
}

/// In-process publish/subscribe bus, the substrate choreography runs on.
///
/// Dispatch is per-event-kind and in registration order. A handler error
/// is caught, logged, and reported on the side channel; it neither stops
/// delivery to the remaining handlers nor reaches the publisher, so a
/// publish must never be taken as proof of successful processing. There is
/// no retry and no persistence beyond the process lifetime.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates a bus and the receiving end of its delivery-failure channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeliveryFailure>) {
        let (failures, failure_rx) = mpsc::unbounded_channel();
        let bus = Self {
            inner: Arc::new(BusInner {
                registry: RwLock::new(HashMap::new()),
                failures,
                next_id: AtomicU64::new(0),
            }),
        };
        (bus, failure_rx)
    }

    /// Registers a handler for one event kind.
    pub fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut registry = self.inner.registry.write().unwrap();
        registry
            .entry(kind)
            .or_default()
            .push(Subscription { id, handler });
        id
    }

    /// Registers a handler for several event kinds at once.
    pub fn subscribe_many(
        &self,
        kinds: &[EventKind],
        handler: Arc<dyn EventHandler>,
    ) -> Vec<SubscriptionId> {
        kinds
            .iter()
            .map(|&kind| self.subscribe(kind, Arc::clone(&handler)))
            .collect()
    }

    /// Removes one subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut registry = self.inner.registry.write().unwrap();
        match registry.get_mut(&kind) {
            Some(subs) => {
                let before = subs.len();
                subs.retain(|s| s.id != id);
                subs.len() < before
            }
            None => false,
        }
    }

    /// Returns the number of handlers subscribed to a kind.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner
            .registry
            .read()
            .unwrap()
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Delivers the event to every handler currently subscribed to its
    /// kind, in registration order.
    ///
    /// Returns a boxed future so handlers can publish follow-on events
    /// from inside `handle` (the cascade is depth-first). The future
    /// resolves once every directly and transitively triggered handler
    /// has run.
    pub fn publish(&self, event: WorkflowEvent) -> BoxFuture<'static, ()> {
        let bus = self.clone();
        Box::pin(async move {
            metrics::counter!("events_published_total").increment(1);
            tracing::debug!(
                kind = %event.kind(),
                order_id = %event.order_id(),
                "event published"
            );

            // Snapshot the handler list so dispatch sees a consistent set
            // even if a handler (un)subscribes mid-cascade.
            let handlers: Vec<Arc<dyn EventHandler>> = {
                let registry = bus.inner.registry.read().unwrap();
                registry
                    .get(&event.kind())
                    .map(|subs| subs.iter().map(|s| Arc::clone(&s.handler)).collect())
                    .unwrap_or_default()
            };

            for handler in handlers {
                if let Err(error) = handler.handle(&event, &bus).await {
                    metrics::counter!("handler_failures_total").increment(1);
                    tracing::warn!(
                        handler = handler.name(),
                        kind = %event.kind(),
                        order_id = %event.order_id(),
                        error = %error,
                        "handler failed during dispatch"
                    );
                    let _ = bus.inner.failures.send(DeliveryFailure {
                        kind: event.kind(),
                        order_id: event.order_id(),
                        handler: handler.name(),
                        error: error.to_string(),
                    });
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collaborators::CollaboratorError;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<(&'static str, EventKind)>>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn handle(&self, event: &WorkflowEvent, _: &EventBus) -> Result<(), HandlerError> {
            self.seen.lock().unwrap().push((self.name, event.kind()));
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl EventHandler for Failing {
        fn name(&self) -> &'static str {
            "failing_handler"
        }

        async fn handle(&self, _: &WorkflowEvent, _: &EventBus) -> Result<(), HandlerError> {
            Err(HandlerError::Collaborator(CollaboratorError::Unreachable(
                "boom".to_string(),
            )))
        }
    }

    fn completed_event() -> WorkflowEvent {
        WorkflowEvent::order_completed(OrderId::new())
    }

    #[tokio::test]
    async fn test_dispatch_is_in_registration_order() {
        let (bus, _failures) = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            EventKind::OrderCompleted,
            Arc::new(Recorder {
                name: "first",
                seen: seen.clone(),
            }),
        );
        bus.subscribe(
            EventKind::OrderCompleted,
            Arc::new(Recorder {
                name: "second",
                seen: seen.clone(),
            }),
        );

        bus.publish(completed_event()).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].0, "second");
    }

    #[tokio::test]
    async fn test_dispatch_is_per_kind() {
        let (bus, _failures) = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            EventKind::OrderFailed,
            Arc::new(Recorder {
                name: "failed_only",
                seen: seen.clone(),
            }),
        );

        bus.publish(completed_event()).await;
        assert!(seen.lock().unwrap().is_empty());

        bus.publish(WorkflowEvent::order_failed(
            OrderId::new(),
            "payment",
            "declined",
        ))
        .await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_handler_failure_does_not_stop_delivery() {
        let (bus, mut failures) = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(EventKind::OrderCompleted, Arc::new(Failing));
        bus.subscribe(
            EventKind::OrderCompleted,
            Arc::new(Recorder {
                name: "after_failing",
                seen: seen.clone(),
            }),
        );

        bus.publish(completed_event()).await;

        // The later handler still ran.
        assert_eq!(seen.lock().unwrap().len(), 1);

        // And the failure is observable on the side channel.
        let report = failures.try_recv().unwrap();
        assert_eq!(report.handler, "failing_handler");
        assert_eq!(report.kind, EventKind::OrderCompleted);
        assert!(report.error.contains("boom"));
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_exactly_one_registration() {
        let (bus, _failures) = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let id = bus.subscribe(
            EventKind::OrderCompleted,
            Arc::new(Recorder {
                name: "a",
                seen: seen.clone(),
            }),
        );
        bus.subscribe(
            EventKind::OrderCompleted,
            Arc::new(Recorder {
                name: "b",
                seen: seen.clone(),
            }),
        );

        assert!(bus.unsubscribe(EventKind::OrderCompleted, id));
        assert!(!bus.unsubscribe(EventKind::OrderCompleted, id));
        assert_eq!(bus.handler_count(EventKind::OrderCompleted), 1);

        bus.publish(completed_event()).await;
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "b");
    }

    #[tokio::test]
    async fn test_subscribe_many_registers_for_each_kind() {
        let (bus, _failures) = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let ids = bus.subscribe_many(
            &EventKind::ALL,
            Arc::new(Recorder {
                name: "all",
                seen: seen.clone(),
            }),
        );
        assert_eq!(ids.len(), EventKind::ALL.len());

        bus.publish(completed_event()).await;
        bus.publish(WorkflowEvent::order_failed(
            OrderId::new(),
            "payment",
            "declined",
        ))
        .await;

        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
