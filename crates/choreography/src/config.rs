//! Choreography configuration.

use std::time::Duration;

/// Configuration passed to each handler at construction.
///
/// As on the orchestrator side, there is no ambient endpoint state; each
/// handler receives its collaborator and this config explicitly.
///
/// `from_env` reads `STEP_TIMEOUT_MS` (default: `2000`).
#[derive(Debug, Clone, Copy)]
pub struct ChoreographyConfig {
    /// Bound on every collaborator call made by a handler. A timeout is
    /// published as `OrderFailed`, the same as a negative response.
    pub step_timeout: Duration,
}

impl ChoreographyConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            step_timeout: std::env::var("STEP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Self::default().step_timeout),
        }
    }
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_millis(2000),
        }
    }
}
