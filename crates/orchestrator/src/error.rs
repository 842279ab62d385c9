//! Orchestration failure taxonomy.

use thiserror::Error;

use crate::audit::AuditLog;
use crate::steps::SagaStep;

/// Classifies why a saga terminated in failure.
///
/// Callers receive this as a structured field rather than having to parse
/// message text: a `BusinessRejection` (declined payment, insufficient
/// stock) is final, while an `Infrastructure` failure (unreachable or
/// timed-out collaborator) may be worth retrying with a fresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request failed a local precondition; no collaborator was called.
    Validation,
    /// A collaborator explicitly declined.
    BusinessRejection,
    /// A collaborator was unreachable or timed out.
    Infrastructure,
}

impl FailureKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::BusinessRejection => "business_rejection",
            FailureKind::Infrastructure => "infrastructure",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rollback call that itself failed.
///
/// Compensation failures are recorded but never retried; the terminal
/// outcome stays the one determined by the originating failure, and the
/// caller inherits the residual inconsistency to resolve out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationFailure {
    /// The step whose compensation failed.
    pub step: SagaStep,
    /// Why the rollback call failed.
    pub reason: String,
}

/// Terminal failure result of an orchestration run.
#[derive(Debug, Clone, Error)]
#[error("order fulfillment failed ({kind}): {message}")]
pub struct FulfillmentFailure {
    /// Structured failure class.
    pub kind: FailureKind,
    /// The step that failed, if the saga got past local validation.
    pub step: Option<SagaStep>,
    /// Human-readable failure reason.
    pub message: String,
    /// The audit trail up to and including the failure and compensations.
    pub log: AuditLog,
    /// Rollback calls that themselves failed, in attempt order.
    pub compensation_failures: Vec<CompensationFailure>,
}

impl FulfillmentFailure {
    /// Builds a validation failure (pre-step, empty compensation set).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Validation,
            step: None,
            message: message.into(),
            log: AuditLog::new(),
            compensation_failures: Vec::new(),
        }
    }
}

/// A single step's failure, before compensation has run.
///
/// Internal currency between the step-call helper and the abort path.
#[derive(Debug, Clone)]
pub(crate) struct StepFailure {
    pub step: SagaStep,
    pub kind: FailureKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display_includes_kind_and_message() {
        let failure = FulfillmentFailure {
            kind: FailureKind::BusinessRejection,
            step: Some(SagaStep::ProcessPayment),
            message: "payment declined".to_string(),
            log: AuditLog::new(),
            compensation_failures: Vec::new(),
        };
        let text = failure.to_string();
        assert!(text.contains("business_rejection"));
        assert!(text.contains("payment declined"));
    }

    #[test]
    fn test_validation_failure_has_no_step() {
        let failure = FulfillmentFailure::validation("order must contain at least one item");
        assert_eq!(failure.kind, FailureKind::Validation);
        assert!(failure.step.is_none());
        assert!(failure.log.is_empty());
    }
}
