//! Orchestrator configuration.

use std::time::Duration;

/// Configuration passed to the orchestrator at construction.
///
/// There is deliberately no ambient/global endpoint state: the
/// orchestrator receives its collaborators and this config explicitly.
///
/// `from_env` reads:
/// - `STEP_TIMEOUT_MS` — per-collaborator-call timeout in milliseconds
///   (default: `2000`)
/// - `LOYALTY_POINTS_PER_DOLLAR` — loyalty award rate (default: `1`)
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bound on every collaborator call, including compensations.
    pub step_timeout: Duration,
    /// Loyalty points awarded per whole dollar of order total.
    pub points_per_dollar: u64,
}

impl OrchestratorConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            step_timeout: std::env::var("STEP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default.step_timeout),
            points_per_dollar: std::env::var("LOYALTY_POINTS_PER_DOLLAR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.points_per_dollar),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_millis(2000),
            points_per_dollar: 1,
        }
    }
}
