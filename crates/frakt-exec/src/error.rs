use thiserror::Error;

use frakt_core::error::ParameterError;
use frakt_mem::{AllocationError, OptimizationPlan};

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    /// The computation was refused before anything was allocated; the plan
    /// carries the suggested downgrade (smaller image, fewer iterations,
    /// chunked execution) so the caller can retry with reduced scope.
    #[error(
        "computation refused: estimated {est} bytes but only {avail} available",
        est = .plan.estimated_bytes,
        avail = .plan.available_bytes
    )]
    OutOfBudget { plan: OptimizationPlan },

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Cooperative stop: a terminal status, not a failure.
    #[error("computation cancelled")]
    Cancelled,

    /// Unexpected failure inside a row task. The whole batch is aborted;
    /// no partial grid is returned.
    #[error("row task failed: {0}")]
    Worker(String),
}

impl ComputeError {
    /// The downgrade recommendation, when this error carries one.
    pub fn optimization_plan(&self) -> Option<&OptimizationPlan> {
        match self {
            ComputeError::OutOfBudget { plan } => Some(plan),
            _ => None,
        }
    }
}
