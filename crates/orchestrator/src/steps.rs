//! Saga step definitions.

/// The seven steps of the order fulfillment saga, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SagaStep {
    /// Step 1: per-item availability check (read).
    ValidateInventory,
    /// Step 2: price the order (read).
    PriceOrder,
    /// Step 3: capture payment (mutating).
    ProcessPayment,
    /// Step 4: place an inventory hold (mutating).
    ReserveInventory,
    /// Step 5: award loyalty points (best-effort).
    AwardLoyalty,
    /// Step 6: schedule the shipment (mutating).
    ScheduleShipping,
    /// Step 7: send the confirmation email (best-effort).
    SendConfirmation,
}

impl SagaStep {
    /// Returns the 1-based step ordinal used in audit log entries.
    pub fn number(&self) -> u8 {
        match self {
            SagaStep::ValidateInventory => 1,
            SagaStep::PriceOrder => 2,
            SagaStep::ProcessPayment => 3,
            SagaStep::ReserveInventory => 4,
            SagaStep::AwardLoyalty => 5,
            SagaStep::ScheduleShipping => 6,
            SagaStep::SendConfirmation => 7,
        }
    }

    /// Returns the step name.
    pub fn name(&self) -> &'static str {
        match self {
            SagaStep::ValidateInventory => "validate_inventory",
            SagaStep::PriceOrder => "price_order",
            SagaStep::ProcessPayment => "process_payment",
            SagaStep::ReserveInventory => "reserve_inventory",
            SagaStep::AwardLoyalty => "award_loyalty",
            SagaStep::ScheduleShipping => "schedule_shipping",
            SagaStep::SendConfirmation => "send_confirmation",
        }
    }

    /// Returns true if a failure of this step aborts the saga.
    ///
    /// Loyalty and confirmation are best-effort: their failure is logged
    /// in the audit trail but the workflow proceeds.
    pub fn is_critical(&self) -> bool {
        !matches!(self, SagaStep::AwardLoyalty | SagaStep::SendConfirmation)
    }
}

impl std::fmt::Display for SagaStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_are_sequential() {
        let steps = [
            SagaStep::ValidateInventory,
            SagaStep::PriceOrder,
            SagaStep::ProcessPayment,
            SagaStep::ReserveInventory,
            SagaStep::AwardLoyalty,
            SagaStep::ScheduleShipping,
            SagaStep::SendConfirmation,
        ];
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.number() as usize, i + 1);
        }
    }

    #[test]
    fn test_only_loyalty_and_confirmation_are_best_effort() {
        assert!(SagaStep::ValidateInventory.is_critical());
        assert!(SagaStep::PriceOrder.is_critical());
        assert!(SagaStep::ProcessPayment.is_critical());
        assert!(SagaStep::ReserveInventory.is_critical());
        assert!(!SagaStep::AwardLoyalty.is_critical());
        assert!(SagaStep::ScheduleShipping.is_critical());
        assert!(!SagaStep::SendConfirmation.is_critical());
    }

    #[test]
    fn test_step_display_uses_snake_case_name() {
        assert_eq!(SagaStep::ProcessPayment.to_string(), "process_payment");
    }
}
