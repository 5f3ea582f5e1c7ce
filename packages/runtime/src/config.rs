//! Scheduler configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// Configuration for a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of rounds to run before reporting done. `None` runs forever.
    pub max_rounds: Option<u64>,

    /// Report done as soon as no microprocess is left to run.
    pub exit_when_idle: bool,
}

impl SchedulerConfig {
    /// Bounded mode: stop after `rounds` rounds or when idle.
    pub fn bounded(rounds: u64) -> Self {
        Self {
            max_rounds: Some(rounds),
            exit_when_idle: true,
        }
    }

    /// Interactive mode: never stop on its own, even with nothing to run.
    pub fn forever() -> Self {
        Self {
            max_rounds: None,
            exit_when_idle: false,
        }
    }

    /// Reject configurations that could never run a round.
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == Some(0) {
            return Err(RuntimeError::Config(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::bounded(100)
    }
}
