//! The order snapshot and its request form.

use common::{CustomerId, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::value_objects::{Address, Money, Priority, ProductId};

/// A single ordered line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The ordered product.
    pub product_id: ProductId,
    /// Product name for display.
    pub name: String,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price at order time.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the line total (quantity times unit price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Input for placing an order, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// The ordering customer.
    pub customer_id: CustomerId,
    /// Requested line items.
    pub items: Vec<LineItem>,
    /// Where to ship.
    pub shipping_address: Address,
    /// Delivery priority.
    pub priority: Priority,
    /// Email for order notifications.
    pub contact_email: String,
}

/// An immutable order snapshot.
///
/// Created once per request via [`Order::from_request`]; workflow events
/// carry clones of this snapshot so handlers never share mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<LineItem>,
    shipping_address: Address,
    priority: Priority,
    contact_email: String,
    total: Money,
}

impl Order {
    /// Validates a request and builds the order snapshot.
    ///
    /// Checks the local preconditions: at least one item, positive
    /// quantities, non-negative prices, a plausible email, and a complete
    /// shipping address. The total is computed from the line items.
    pub fn from_request(request: OrderRequest) -> Result<Self, OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        for item in &request.items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                });
            }
            if item.unit_price.is_negative() {
                return Err(OrderError::InvalidPrice {
                    product_id: item.product_id.clone(),
                });
            }
        }
        if !request.contact_email.contains('@') {
            return Err(OrderError::InvalidEmail(request.contact_email));
        }
        request.shipping_address.validate()?;

        let total = request
            .items
            .iter()
            .fold(Money::zero(), |acc, item| acc.add(item.line_total()));

        Ok(Self {
            id: OrderId::new(),
            customer_id: request.customer_id,
            items: request.items,
            shipping_address: request.shipping_address,
            priority: request.priority,
            contact_email: request.contact_email,
            total,
        })
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the customer ID.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the ordered line items.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the shipping address.
    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    /// Returns the delivery priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the contact email.
    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }

    /// Returns the computed order total.
    pub fn total(&self) -> Money {
        self.total
    }
}
