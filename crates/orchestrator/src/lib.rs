//! Centralized saga orchestration for order fulfillment.
//!
//! This crate owns the step sequence of the workflow:
//!
//! 1. Validate inventory (read)
//! 2. Price the order (read)
//! 3. Process payment
//! 4. Reserve inventory
//! 5. Award loyalty points (best-effort)
//! 6. Schedule shipping
//! 7. Send confirmation (best-effort)
//!
//! Each step is a bounded-timeout call to a collaborator. When a critical
//! step fails, previously completed state-mutating steps are compensated in
//! reverse completion order, and the caller receives a structured failure
//! carrying the full audit log.

pub mod audit;
pub mod config;
pub mod error;
pub mod saga;
pub mod steps;

pub use audit::AuditLog;
pub use config::OrchestratorConfig;
pub use error::{CompensationFailure, FailureKind, FulfillmentFailure};
pub use saga::{FulfillmentReceipt, SagaOrchestrator};
pub use steps::SagaStep;
