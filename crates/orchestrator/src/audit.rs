//! Per-invocation audit trail.

use crate::steps::SagaStep;

/// An ordered, human-readable record of one orchestration run.
///
/// The log is scoped to a single invocation and returned to the caller
/// with the terminal result; it is not persisted anywhere else. Entry
/// prefixes are stable so callers (and tests) can classify them:
///
/// - `Step {n} OK: …` — step completed
/// - `Step {n} FAILED: …` — critical step failed, saga aborts
/// - `Step {n} FAILED (best-effort): …` — non-critical failure, saga proceeds
/// - `COMPENSATED {step}: …` — a rollback call succeeded
/// - `COMPENSATION FAILED {step}: …` — a rollback call itself failed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLog {
    entries: Vec<String>,
}

impl AuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed step.
    pub fn step_ok(&mut self, step: SagaStep, detail: impl AsRef<str>) {
        self.entries
            .push(format!("Step {} OK: {}", step.number(), detail.as_ref()));
    }

    /// Records a critical step failure.
    pub fn step_failed(&mut self, step: SagaStep, reason: impl AsRef<str>) {
        self.entries
            .push(format!("Step {} FAILED: {}", step.number(), reason.as_ref()));
    }

    /// Records a best-effort step failure.
    pub fn step_failed_best_effort(&mut self, step: SagaStep, reason: impl AsRef<str>) {
        self.entries.push(format!(
            "Step {} FAILED (best-effort): {}",
            step.number(),
            reason.as_ref()
        ));
    }

    /// Records a successful compensation.
    pub fn compensated(&mut self, step: SagaStep, detail: impl AsRef<str>) {
        self.entries
            .push(format!("COMPENSATED {}: {}", step.name(), detail.as_ref()));
    }

    /// Records a failed compensation call.
    pub fn compensation_failed(&mut self, step: SagaStep, reason: impl AsRef<str>) {
        self.entries.push(format!(
            "COMPENSATION FAILED {}: {}",
            step.name(),
            reason.as_ref()
        ));
    }

    /// Returns all entries in order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns only the successful-compensation entries, in order.
    pub fn compensation_entries(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.starts_with("COMPENSATED "))
            .map(String::as_str)
            .collect()
    }
}

impl std::fmt::Display for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
