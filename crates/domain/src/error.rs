//! Domain error types.

use thiserror::Error;

use crate::value_objects::ProductId;

/// Errors raised by local order validation.
///
/// These represent a request failing a local precondition, before any
/// collaborator has been contacted. Both coordination strategies map them
/// to their validation-failure class.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Order has no line items.
    #[error("Order must contain at least one item")]
    NoItems,

    /// An item has a zero quantity.
    #[error("Invalid quantity for product {product_id}: quantity must be at least 1")]
    InvalidQuantity { product_id: ProductId },

    /// An item has a negative unit price.
    #[error("Invalid price for product {product_id}: price must not be negative")]
    InvalidPrice { product_id: ProductId },

    /// Contact email is missing or malformed.
    #[error("Invalid contact email: {0:?}")]
    InvalidEmail(String),

    /// Shipping address has an empty field.
    #[error("Incomplete shipping address: {field} is empty")]
    IncompleteAddress { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offending_product() {
        let err = OrderError::InvalidQuantity {
            product_id: ProductId::new("SKU-001"),
        };
        assert!(err.to_string().contains("SKU-001"));
    }
}
