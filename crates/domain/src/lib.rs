//! Order data model shared by both coordination strategies.
//!
//! This crate provides:
//! - Value objects (`Money`, `ProductId`, `Priority`, `Address`)
//! - The `Order` snapshot and its `OrderRequest` input
//! - Local request validation (`OrderError`)
//!
//! Orders are created once per request and treated as immutable snapshots
//! afterwards; workflow events carry copies rather than references.

pub mod error;
pub mod order;
pub mod value_objects;

pub use error::OrderError;
pub use order::{LineItem, Order, OrderRequest};
pub use value_objects::{Address, Money, Priority, ProductId};
