//! Shared identifier types used across the order coordination crates.

pub mod types;

pub use types::{CustomerId, OrderId};
