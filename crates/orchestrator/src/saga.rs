//! The saga orchestrator.

use std::future::Future;
use std::time::Instant;

use chrono::{DateTime, Utc};
use collaborators::{
    CollaboratorError, InventoryService, LoyaltyService, NotificationService, PaymentService,
    ShippingService,
};
use common::OrderId;
use domain::{Order, OrderRequest};
use futures_util::future::join_all;

use crate::audit::AuditLog;
use crate::config::OrchestratorConfig;
use crate::error::{CompensationFailure, FailureKind, FulfillmentFailure, StepFailure};
use crate::steps::SagaStep;

/// Terminal success result of an orchestration run.
#[derive(Debug, Clone)]
pub struct FulfillmentReceipt {
    /// The fulfilled order.
    pub order_id: OrderId,
    /// Tracking number from the shipping collaborator.
    pub tracking_number: String,
    /// Transaction ID from the payment collaborator.
    pub transaction_id: String,
    /// Estimated delivery date.
    pub estimated_delivery: DateTime<Utc>,
    /// The complete audit trail (one entry per step).
    pub log: AuditLog,
}

/// Drives the order fulfillment saga: a strictly sequential pipeline of
/// collaborator calls with compensation on critical failure.
///
/// Steps 1-4 and 6 are critical; steps 5 (loyalty) and 7 (confirmation)
/// are best-effort. Only payment capture and inventory reservation mutate
/// external state, so only those two are compensated — in reverse
/// completion order (release the hold first, then reverse the charge).
pub struct SagaOrchestrator<I, P, Sh, L, N>
where
    I: InventoryService,
    P: PaymentService,
    Sh: ShippingService,
    L: LoyaltyService,
    N: NotificationService,
{
    config: OrchestratorConfig,
    inventory: I,
    payment: P,
    shipping: Sh,
    loyalty: L,
    notification: N,
}

impl<I, P, Sh, L, N> SagaOrchestrator<I, P, Sh, L, N>
where
    I: InventoryService,
    P: PaymentService,
    Sh: ShippingService,
    L: LoyaltyService,
    N: NotificationService,
{
    /// Creates a new orchestrator with explicit configuration and collaborators.
    pub fn new(
        config: OrchestratorConfig,
        inventory: I,
        payment: P,
        shipping: Sh,
        loyalty: L,
        notification: N,
    ) -> Self {
        Self {
            config,
            inventory,
            payment,
            shipping,
            loyalty,
            notification,
        }
    }

    /// Executes the full fulfillment saga for one order request.
    ///
    /// Returns a receipt with the audit log on success, or a structured
    /// failure carrying the log and any compensation outcomes.
    #[tracing::instrument(skip(self, request), fields(saga_type = "OrderFulfillment"))]
    pub async fn fulfill(
        &self,
        request: OrderRequest,
    ) -> Result<FulfillmentReceipt, FulfillmentFailure> {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = Instant::now();

        // Local preconditions, before any collaborator is contacted.
        let order = match Order::from_request(request) {
            Ok(order) => order,
            Err(e) => {
                metrics::counter!("saga_failed").increment(1);
                return Err(FulfillmentFailure::validation(e.to_string()));
            }
        };
        let order_id = order.id();
        let mut log = AuditLog::new();

        // Step 1: per-item availability, checked concurrently and AND-ed.
        let step = SagaStep::ValidateInventory;
        tracing::info!(%order_id, step = step.name(), "saga step started");
        let checks = join_all(
            order
                .items()
                .iter()
                .map(|item| self.inventory.check_item(&item.product_id, item.quantity)),
        );
        let availability = self
            .step_call(step, async {
                checks.await.into_iter().collect::<Result<Vec<_>, _>>()
            })
            .await;
        match availability {
            Ok(flags) if flags.iter().all(|&available| available) => {
                log.step_ok(
                    step,
                    format!("inventory available for {} item(s)", order.items().len()),
                );
            }
            Ok(_) => {
                let failure = StepFailure {
                    step,
                    kind: FailureKind::BusinessRejection,
                    message: "insufficient stock for one or more items".to_string(),
                };
                return Err(self.fail(failure, log, None, None, saga_start).await);
            }
            Err(failure) => {
                return Err(self.fail(failure, log, None, None, saga_start).await);
            }
        }

        // Step 2: price the order (pure read, nothing to compensate).
        let step = SagaStep::PriceOrder;
        tracing::info!(%order_id, step = step.name(), "saga step started");
        let quote = match self.step_call(step, self.inventory.quote(order.items())).await {
            Ok(quote) => {
                log.step_ok(step, format!("order priced at {}", quote.total));
                quote
            }
            Err(failure) => {
                return Err(self.fail(failure, log, None, None, saga_start).await);
            }
        };

        // Step 3: capture payment.
        let step = SagaStep::ProcessPayment;
        tracing::info!(%order_id, step = step.name(), "saga step started");
        let payment = match self
            .step_call(
                step,
                self.payment.charge(order_id, order.customer_id(), quote.total),
            )
            .await
        {
            Ok(payment) => {
                log.step_ok(
                    step,
                    format!(
                        "captured {} as transaction {}",
                        quote.total, payment.transaction_id
                    ),
                );
                payment
            }
            Err(failure) => {
                // Nothing mutated yet, so nothing to compensate.
                return Err(self.fail(failure, log, None, None, saga_start).await);
            }
        };

        // Step 4: place the inventory hold.
        let step = SagaStep::ReserveInventory;
        tracing::info!(%order_id, step = step.name(), "saga step started");
        let reservation = match self
            .step_call(step, self.inventory.reserve(order_id, order.items()))
            .await
        {
            Ok(reservation) => {
                log.step_ok(
                    step,
                    format!("inventory held under {}", reservation.reservation_id),
                );
                reservation
            }
            Err(failure) => {
                // Payment succeeded but no hold exists yet: reverse payment only.
                return Err(self
                    .fail(
                        failure,
                        log,
                        None,
                        Some(payment.transaction_id.clone()),
                        saga_start,
                    )
                    .await);
            }
        };

        // Step 5: loyalty award, best-effort.
        let step = SagaStep::AwardLoyalty;
        tracing::info!(%order_id, step = step.name(), "saga step started");
        let points = order.total().dollars().max(0) as u64 * self.config.points_per_dollar;
        match self
            .step_call(step, self.loyalty.award(order.customer_id(), points))
            .await
        {
            Ok(result) => log.step_ok(
                step,
                format!("awarded {} loyalty points (balance {})", points, result.balance),
            ),
            Err(failure) => {
                tracing::warn!(
                    %order_id,
                    step = step.name(),
                    reason = %failure.message,
                    "best-effort step failed, continuing"
                );
                log.step_failed_best_effort(step, &failure.message);
            }
        }

        // Step 6: schedule the shipment.
        let step = SagaStep::ScheduleShipping;
        tracing::info!(%order_id, step = step.name(), "saga step started");
        let shipment = match self
            .step_call(
                step,
                self.shipping
                    .schedule(order_id, order.shipping_address(), order.priority()),
            )
            .await
        {
            Ok(shipment) => {
                log.step_ok(
                    step,
                    format!(
                        "shipment {} scheduled, estimated delivery {}",
                        shipment.tracking_number,
                        shipment.estimated_delivery.format("%Y-%m-%d")
                    ),
                );
                shipment
            }
            Err(failure) => {
                // Both mutations exist: release the hold first, then the charge.
                return Err(self
                    .fail(
                        failure,
                        log,
                        Some(reservation.reservation_id.clone()),
                        Some(payment.transaction_id.clone()),
                        saga_start,
                    )
                    .await);
            }
        };

        // Step 7: confirmation email, best-effort.
        let step = SagaStep::SendConfirmation;
        tracing::info!(%order_id, step = step.name(), "saga step started");
        let body = format!(
            "Your order {} is confirmed. Tracking number: {}",
            order_id, shipment.tracking_number
        );
        match self
            .step_call(
                step,
                self.notification
                    .send(order.contact_email(), "Order confirmed", &body),
            )
            .await
        {
            Ok(()) => log.step_ok(
                step,
                format!("confirmation sent to {}", order.contact_email()),
            ),
            Err(failure) => {
                tracing::warn!(
                    %order_id,
                    step = step.name(),
                    reason = %failure.message,
                    "best-effort step failed, continuing"
                );
                log.step_failed_best_effort(step, &failure.message);
            }
        }

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        metrics::counter!("saga_completed").increment(1);
        tracing::info!(%order_id, duration, "saga completed successfully");

        Ok(FulfillmentReceipt {
            order_id,
            tracking_number: shipment.tracking_number,
            transaction_id: payment.transaction_id,
            estimated_delivery: shipment.estimated_delivery,
            log,
        })
    }

    /// Runs one collaborator call under the configured timeout and maps
    /// its failure modes onto the error taxonomy.
    async fn step_call<T>(
        &self,
        step: SagaStep,
        call: impl Future<Output = Result<T, CollaboratorError>>,
    ) -> Result<T, StepFailure> {
        match tokio::time::timeout(self.config.step_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(CollaboratorError::Rejected(message))) => Err(StepFailure {
                step,
                kind: FailureKind::BusinessRejection,
                message,
            }),
            Ok(Err(CollaboratorError::Unreachable(message))) => Err(StepFailure {
                step,
                kind: FailureKind::Infrastructure,
                message,
            }),
            Err(_) => Err(StepFailure {
                step,
                kind: FailureKind::Infrastructure,
                message: format!(
                    "call timed out after {}ms",
                    self.config.step_timeout.as_millis()
                ),
            }),
        }
    }

    /// Records the step failure, compensates completed mutations in reverse
    /// completion order, and builds the terminal failure result.
    ///
    /// A compensation call can itself fail; that is recorded as a distinct
    /// failure class but never retried and never changes the terminal
    /// outcome already determined by the originating failure.
    async fn fail(
        &self,
        failure: StepFailure,
        mut log: AuditLog,
        reservation_id: Option<String>,
        transaction_id: Option<String>,
        saga_start: Instant,
    ) -> FulfillmentFailure {
        debug_assert!(
            failure.step.is_critical(),
            "only critical steps abort the saga"
        );
        log.step_failed(failure.step, &failure.message);
        tracing::warn!(
            step = failure.step.name(),
            kind = failure.kind.as_str(),
            reason = %failure.message,
            "saga step failed, compensating"
        );

        let mut compensation_failures = Vec::new();

        // The reservation is the more recent mutation: release it before
        // reversing the charge.
        if let Some(reservation_id) = reservation_id {
            let step = SagaStep::ReserveInventory;
            match tokio::time::timeout(
                self.config.step_timeout,
                self.inventory.release(&reservation_id),
            )
            .await
            {
                Ok(Ok(())) => {
                    log.compensated(step, format!("released reservation {reservation_id}"));
                }
                Ok(Err(e)) => {
                    self.record_compensation_failure(
                        &mut log,
                        &mut compensation_failures,
                        step,
                        e.to_string(),
                    );
                }
                Err(_) => {
                    self.record_compensation_failure(
                        &mut log,
                        &mut compensation_failures,
                        step,
                        "release call timed out".to_string(),
                    );
                }
            }
        }

        if let Some(transaction_id) = transaction_id {
            let step = SagaStep::ProcessPayment;
            match tokio::time::timeout(
                self.config.step_timeout,
                self.payment.reverse(&transaction_id),
            )
            .await
            {
                Ok(Ok(())) => {
                    log.compensated(step, format!("reversed transaction {transaction_id}"));
                }
                Ok(Err(e)) => {
                    self.record_compensation_failure(
                        &mut log,
                        &mut compensation_failures,
                        step,
                        e.to_string(),
                    );
                }
                Err(_) => {
                    self.record_compensation_failure(
                        &mut log,
                        &mut compensation_failures,
                        step,
                        "reversal call timed out".to_string(),
                    );
                }
            }
        }

        metrics::counter!("saga_failed").increment(1);
        metrics::histogram!("saga_duration_seconds").record(saga_start.elapsed().as_secs_f64());

        FulfillmentFailure {
            kind: failure.kind,
            step: Some(failure.step),
            message: failure.message,
            log,
            compensation_failures,
        }
    }

    fn record_compensation_failure(
        &self,
        log: &mut AuditLog,
        failures: &mut Vec<CompensationFailure>,
        step: SagaStep,
        reason: String,
    ) {
        tracing::error!(
            step = step.name(),
            reason = %reason,
            "compensation failed, residual inconsistency remains"
        );
        metrics::counter!("saga_compensation_failures").increment(1);
        log.compensation_failed(step, &reason);
        failures.push(CompensationFailure { step, reason });
    }
}
