//! Derived completion detection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use common::OrderId;

use crate::bus::{EventBus, EventHandler};
use crate::error::HandlerError;
use crate::events::WorkflowEvent;

/// The step results the coordinator must observe before an order counts
/// as complete. Set membership decides, not arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionStep {
    /// A successful `PaymentProcessed`.
    Payment,
    /// An `InventoryReserved`.
    Reservation,
    /// A `ShippingScheduled`.
    Shipping,
}

impl CompletionStep {
    /// All steps required for completion.
    pub const REQUIRED: [CompletionStep; 3] = [
        CompletionStep::Payment,
        CompletionStep::Reservation,
        CompletionStep::Shipping,
    ];

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStep::Payment => "payment",
            CompletionStep::Reservation => "reservation",
            CompletionStep::Shipping => "shipping",
        }
    }
}

#[derive(Debug, Default)]
struct TrackingState {
    partial: HashMap<OrderId, HashSet<CompletionStep>>,
    failed: HashSet<OrderId>,
}

/// Observes step-result events and derives a single terminal signal per
/// order: at most one `OrderCompleted`, published only once payment,
/// reservation, and shipping have all been seen for that order id.
///
/// Per-order state machine: `Empty → Partial(steps seen) → Completed | Failed`.
/// Terminal transitions delete the partial entry; a failure additionally
/// tombstones the order id, because event delivery is depth-first and the
/// `OrderFailed` published inside a cascade can reach the coordinator
/// before the step events that are still unwinding behind it. Without the
/// tombstone those late step events would re-create a partial entry that
/// nothing ever removes. Tombstones live for the process lifetime, like
/// the order store.
///
/// The tracking state is shared mutable state touched by concurrently
/// dispatched handler invocations; every read-modify-write happens under
/// the mutex, and the completion decision is made before the lock is
/// released, so two racing step events can neither lose an update nor
/// both decide to emit.
#[derive(Debug, Default)]
pub struct CompletionCoordinator {
    tracking: Mutex<TrackingState>,
}

impl CompletionCoordinator {
    /// Creates a coordinator with no tracked orders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of orders currently tracked.
    pub fn tracked_count(&self) -> usize {
        self.tracking.lock().unwrap().partial.len()
    }

    /// Returns the steps observed so far for an order, if it is tracked.
    pub fn tracked_steps(&self, order_id: OrderId) -> Option<HashSet<CompletionStep>> {
        self.tracking.lock().unwrap().partial.get(&order_id).cloned()
    }

    /// Records a step result. Returns true exactly when the set just
    /// became complete; the entry is removed in the same critical section.
    ///
    /// Duplicate deliveries of the same step are absorbed by set
    /// semantics. Step events for an order already marked failed are
    /// ignored entirely, so an unwinding cascade cannot resurrect
    /// tracking state after the terminal `OrderFailed`.
    pub fn note_step(&self, order_id: OrderId, step: CompletionStep) -> bool {
        let mut tracking = self.tracking.lock().unwrap();
        if tracking.failed.contains(&order_id) {
            return false;
        }
        let steps = tracking.partial.entry(order_id).or_default();
        steps.insert(step);
        let complete = CompletionStep::REQUIRED.iter().all(|s| steps.contains(s));
        if complete {
            tracking.partial.remove(&order_id);
        }
        complete
    }

    /// Marks an order failed: drops any tracked progress and ignores all
    /// later step events for it.
    pub fn mark_failed(&self, order_id: OrderId) {
        let mut tracking = self.tracking.lock().unwrap();
        tracking.partial.remove(&order_id);
        tracking.failed.insert(order_id);
    }
}

#[async_trait]
impl EventHandler for CompletionCoordinator {
    fn name(&self) -> &'static str {
        "completion_coordinator"
    }

    async fn handle(&self, event: &WorkflowEvent, bus: &EventBus) -> Result<(), HandlerError> {
        let decision = match event {
            WorkflowEvent::PaymentProcessed(data) if data.success => {
                Some(self.note_step(data.order.id(), CompletionStep::Payment))
            }
            WorkflowEvent::InventoryReserved(data) => {
                Some(self.note_step(data.order.id(), CompletionStep::Reservation))
            }
            WorkflowEvent::ShippingScheduled(data) => {
                Some(self.note_step(data.order_id, CompletionStep::Shipping))
            }
            WorkflowEvent::OrderFailed(data) => {
                self.mark_failed(data.order_id);
                None
            }
            _ => None,
        };

        if decision == Some(true) {
            let order_id = event.order_id();
            metrics::counter!("orders_completed_total").increment(1);
            tracing::info!(%order_id, "all required steps observed, order complete");
            bus.publish(WorkflowEvent::order_completed(order_id)).await;
        }
        Ok(())
    }
}
