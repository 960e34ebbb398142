//! Progress reporting vocabulary shared between the executor and callers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifecycle of one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationStatus {
    Preparing,
    Running,
    Completed,
    Cancelled,
    Error,
}

/// One progress record, emitted at row granularity.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressInfo {
    pub current_step: u32,
    pub total_steps: u32,
    pub elapsed: Duration,
    pub estimated_remaining: Duration,
    pub status: ComputationStatus,
}

impl ProgressInfo {
    /// Progress as a percentage in `0.0..=100.0`.
    pub fn percentage(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        f64::from(self.current_step) / f64::from(self.total_steps) * 100.0
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ComputationStatus::Completed | ComputationStatus::Cancelled | ComputationStatus::Error
        )
    }
}
