//! Decentralized, event-driven coordination of the order workflow.
//!
//! There is no central controller on this path: the order intake stores a
//! snapshot and publishes `OrderCreated`; independent handlers each react
//! to the event that represents "my prerequisite is satisfied", perform one
//! unit of work against a collaborator, and publish one result event. The
//! completion coordinator observes step results and derives a single
//! terminal `OrderCompleted` or reacts to `OrderFailed`.
//!
//! Unlike the orchestrator, this path has **no compensation**: a payment
//! captured before a later step fails stays captured. That asymmetry is
//! the point of the comparison.

pub mod bus;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod handlers;
pub mod intake;
pub mod store;

pub use bus::{DeliveryFailure, EventBus, EventHandler, SubscriptionId};
pub use config::ChoreographyConfig;
pub use coordinator::{CompletionCoordinator, CompletionStep};
pub use error::HandlerError;
pub use events::{EventKind, WorkflowEvent};
pub use handlers::{InventoryHandler, NotificationHandler, PaymentHandler, ShippingHandler};
pub use intake::OrderIntake;
pub use store::OrderStore;
