//! External collaborator contracts for the order workflow.
//!
//! Each collaborator (inventory, payment, shipping, loyalty, notification)
//! is consumed as a request/response endpoint: it either returns a typed
//! result payload, explicitly declines with a human-readable reason, or
//! fails to respond at all. The coordination crates are agnostic to the
//! transport behind these traits; the in-memory implementations here stand
//! in for real endpoints and support failure and latency injection.

pub mod error;
pub mod inventory;
pub mod loyalty;
pub mod notification;
pub mod payment;
pub mod shipping;

pub use error::CollaboratorError;
pub use inventory::{InMemoryInventoryService, InventoryService, PriceQuote, ReservationResult};
pub use loyalty::{InMemoryLoyaltyService, LoyaltyResult, LoyaltyService};
pub use notification::{InMemoryNotificationService, NotificationService};
pub use payment::{InMemoryPaymentService, PaymentResult, PaymentService};
pub use shipping::{InMemoryShippingService, ShipmentResult, ShippingService};
