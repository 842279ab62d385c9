//! Value objects for the order domain.

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// Product identifier (SKU).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a dollar value.
    pub fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Adds another money amount.
    pub fn add(&self, other: Money) -> Money {
        Money {
            cents: self.cents + other.cents,
        }
    }

    /// Multiplies the amount by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * i64::from(quantity),
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_negative() {
            write!(f, "-${}.{:02}", self.cents.abs() / 100, self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

/// Delivery priority for an order.
///
/// Drives the shipping collaborator's delivery estimate: express orders
/// ship next-day, standard orders within five days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Standard delivery (5 days).
    #[default]
    Standard,
    /// Express delivery (next day).
    Express,
}

impl Priority {
    /// Returns the delivery estimate in days for this priority.
    pub fn delivery_days(&self) -> i64 {
        match self {
            Priority::Standard => 5,
            Priority::Express => 1,
        }
    }

    /// Returns the priority name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Standard => "standard",
            Priority::Express => "express",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shipping address for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and house number.
    pub street: String,
    /// City name.
    pub city: String,
    /// Postal or ZIP code.
    pub postal_code: String,
}

impl Address {
    /// Creates a new address.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Validates that no field is empty.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.street.trim().is_empty() {
            return Err(OrderError::IncompleteAddress { field: "street" });
        }
        if self.city.trim().is_empty() {
            return Err(OrderError::IncompleteAddress { field: "city" });
        }
        if self.postal_code.trim().is_empty() {
            return Err(OrderError::IncompleteAddress {
                field: "postal_code",
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {} {}", self.street, self.postal_code, self.city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_dollars() {
        let m = Money::from_dollars(10);
        assert_eq!(m.cents(), 1000);
        assert_eq!(m.dollars(), 10);
        assert_eq!(m.cents_part(), 0);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(3550).to_string(), "$35.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
    }

    #[test]
    fn test_money_multiply_and_add() {
        let unit = Money::from_cents(1250);
        let total = unit.multiply(3).add(Money::from_cents(100));
        assert_eq!(total.cents(), 3850);
    }

    #[test]
    fn test_priority_delivery_days() {
        assert_eq!(Priority::Standard.delivery_days(), 5);
        assert_eq!(Priority::Express.delivery_days(), 1);
    }

    #[test]
    fn test_address_validation_rejects_empty_fields() {
        let addr = Address::new("", "Springfield", "12345");
        assert_eq!(
            addr.validate(),
            Err(OrderError::IncompleteAddress { field: "street" })
        );

        let addr = Address::new("1 Main St", "Springfield", "12345");
        assert!(addr.validate().is_ok());
    }

    #[test]
    fn test_product_id_display() {
        assert_eq!(ProductId::new("SKU-001").to_string(), "SKU-001");
    }
}
