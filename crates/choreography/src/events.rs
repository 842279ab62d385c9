//! Workflow events.

use chrono::{DateTime, Utc};
use common::OrderId;
use domain::Order;
use serde::{Deserialize, Serialize};

/// The closed set of event type tags, used as the dispatch key.
///
/// Subscriptions are keyed by kind, so the full handler set for any event
/// type is auditable at compile time — there is no runtime type casting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An order snapshot was stored and the workflow started.
    OrderCreated,
    /// Per-item availability was checked.
    InventoryChecked,
    /// A charge was attempted.
    PaymentProcessed,
    /// Stock was held for the order.
    InventoryReserved,
    /// A shipment was scheduled.
    ShippingScheduled,
    /// All required steps were observed (terminal).
    OrderCompleted,
    /// A step failed (terminal).
    OrderFailed,
}

impl EventKind {
    /// All event kinds, in workflow order.
    pub const ALL: [EventKind; 7] = [
        EventKind::OrderCreated,
        EventKind::InventoryChecked,
        EventKind::PaymentProcessed,
        EventKind::InventoryReserved,
        EventKind::ShippingScheduled,
        EventKind::OrderCompleted,
        EventKind::OrderFailed,
    ];

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::OrderCreated => "OrderCreated",
            EventKind::InventoryChecked => "InventoryChecked",
            EventKind::PaymentProcessed => "PaymentProcessed",
            EventKind::InventoryReserved => "InventoryReserved",
            EventKind::ShippingScheduled => "ShippingScheduled",
            EventKind::OrderCompleted => "OrderCompleted",
            EventKind::OrderFailed => "OrderFailed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events flowing over the bus.
///
/// Events are immutable once published and carry order snapshots where a
/// downstream handler needs one; the order id is the correlation key.
/// Ordering across different kinds for the same order id is not guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WorkflowEvent {
    /// Order was created and stored.
    OrderCreated(OrderCreatedData),

    /// Inventory availability was checked for every line item.
    InventoryChecked(InventoryCheckedData),

    /// Payment was attempted.
    PaymentProcessed(PaymentProcessedData),

    /// Stock was held for the order.
    InventoryReserved(InventoryReservedData),

    /// A shipment was scheduled.
    ShippingScheduled(ShippingScheduledData),

    /// The completion coordinator observed all required steps.
    OrderCompleted(OrderCompletedData),

    /// A step failed; the workflow for this order is over.
    OrderFailed(OrderFailedData),
}

/// Data for OrderCreated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedData {
    /// Full order snapshot for downstream handlers.
    pub order: Order,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

/// Data for InventoryChecked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryCheckedData {
    /// Order snapshot (the payment handler charges from it).
    pub order: Order,
    /// Logical AND over per-item availability.
    pub available: bool,
    /// When the check finished.
    pub checked_at: DateTime<Utc>,
}

/// Data for PaymentProcessed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProcessedData {
    /// Order snapshot (the inventory handler reserves from it).
    pub order: Order,
    /// Whether the charge was captured.
    pub success: bool,
    /// Transaction ID, present on success.
    pub transaction_id: Option<String>,
    /// When the charge attempt finished.
    pub processed_at: DateTime<Utc>,
}

/// Data for InventoryReserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReservedData {
    /// Order snapshot (the shipping handler schedules from it).
    pub order: Order,
    /// The reservation ID assigned by the inventory collaborator.
    pub reservation_id: String,
    /// When the hold was placed.
    pub reserved_at: DateTime<Utc>,
}

/// Data for ShippingScheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingScheduledData {
    /// The correlated order.
    pub order_id: OrderId,
    /// The tracking number assigned by the shipping collaborator.
    pub tracking_number: String,
    /// Estimated delivery date.
    pub estimated_delivery: DateTime<Utc>,
    /// When the shipment was scheduled.
    pub scheduled_at: DateTime<Utc>,
}

/// Data for OrderCompleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCompletedData {
    /// The completed order.
    pub order_id: OrderId,
    /// When completion was derived.
    pub completed_at: DateTime<Utc>,
}

/// Data for OrderFailed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFailedData {
    /// The failed order.
    pub order_id: OrderId,
    /// Which step failed.
    pub step: String,
    /// Human-readable failure reason.
    pub reason: String,
    /// When the failure was published.
    pub failed_at: DateTime<Utc>,
}

impl WorkflowEvent {
    /// Creates an OrderCreated event.
    pub fn order_created(order: Order) -> Self {
        WorkflowEvent::OrderCreated(OrderCreatedData {
            order,
            created_at: Utc::now(),
        })
    }

    /// Creates an InventoryChecked event.
    pub fn inventory_checked(order: Order, available: bool) -> Self {
        WorkflowEvent::InventoryChecked(InventoryCheckedData {
            order,
            available,
            checked_at: Utc::now(),
        })
    }

    /// Creates a PaymentProcessed event.
    pub fn payment_processed(order: Order, success: bool, transaction_id: Option<String>) -> Self {
        WorkflowEvent::PaymentProcessed(PaymentProcessedData {
            order,
            success,
            transaction_id,
            processed_at: Utc::now(),
        })
    }

    /// Creates an InventoryReserved event.
    pub fn inventory_reserved(order: Order, reservation_id: impl Into<String>) -> Self {
        WorkflowEvent::InventoryReserved(InventoryReservedData {
            order,
            reservation_id: reservation_id.into(),
            reserved_at: Utc::now(),
        })
    }

    /// Creates a ShippingScheduled event.
    pub fn shipping_scheduled(
        order_id: OrderId,
        tracking_number: impl Into<String>,
        estimated_delivery: DateTime<Utc>,
    ) -> Self {
        WorkflowEvent::ShippingScheduled(ShippingScheduledData {
            order_id,
            tracking_number: tracking_number.into(),
            estimated_delivery,
            scheduled_at: Utc::now(),
        })
    }

    /// Creates an OrderCompleted event.
    pub fn order_completed(order_id: OrderId) -> Self {
        WorkflowEvent::OrderCompleted(OrderCompletedData {
            order_id,
            completed_at: Utc::now(),
        })
    }

    /// Creates an OrderFailed event.
    pub fn order_failed(
        order_id: OrderId,
        step: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        WorkflowEvent::OrderFailed(OrderFailedData {
            order_id,
            step: step.into(),
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }

    /// Returns the event's dispatch tag.
    pub fn kind(&self) -> EventKind {
        match self {
            WorkflowEvent::OrderCreated(_) => EventKind::OrderCreated,
            WorkflowEvent::InventoryChecked(_) => EventKind::InventoryChecked,
            WorkflowEvent::PaymentProcessed(_) => EventKind::PaymentProcessed,
            WorkflowEvent::InventoryReserved(_) => EventKind::InventoryReserved,
            WorkflowEvent::ShippingScheduled(_) => EventKind::ShippingScheduled,
            WorkflowEvent::OrderCompleted(_) => EventKind::OrderCompleted,
            WorkflowEvent::OrderFailed(_) => EventKind::OrderFailed,
        }
    }

    /// Returns the correlation key.
    pub fn order_id(&self) -> OrderId {
        match self {
            WorkflowEvent::OrderCreated(data) => data.order.id(),
            WorkflowEvent::InventoryChecked(data) => data.order.id(),
            WorkflowEvent::PaymentProcessed(data) => data.order.id(),
            WorkflowEvent::InventoryReserved(data) => data.order.id(),
            WorkflowEvent::ShippingScheduled(data) => data.order_id,
            WorkflowEvent::OrderCompleted(data) => data.order_id,
            WorkflowEvent::OrderFailed(data) => data.order_id,
        }
    }

    /// Returns when the event was published.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            WorkflowEvent::OrderCreated(data) => data.created_at,
            WorkflowEvent::InventoryChecked(data) => data.checked_at,
            WorkflowEvent::PaymentProcessed(data) => data.processed_at,
            WorkflowEvent::InventoryReserved(data) => data.reserved_at,
            WorkflowEvent::ShippingScheduled(data) => data.scheduled_at,
            WorkflowEvent::OrderCompleted(data) => data.completed_at,
            WorkflowEvent::OrderFailed(data) => data.failed_at,
        }
    }
}
