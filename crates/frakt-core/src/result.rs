//! Completed-computation output.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::grid::IterationGrid;
use crate::region::ComplexRegion;

/// Result of a successful fractal computation.
///
/// Created exactly once, at the end of a successful run; the caller owns it
/// afterwards. A cancelled or failed run never produces one of these.
#[derive(Debug, Clone, Serialize)]
pub struct FractalResult {
    iteration_data: IterationGrid,
    region: ComplexRegion,
    calculation_time: Duration,
    metadata: BTreeMap<String, serde_json::Value>,
}

impl FractalResult {
    pub fn new(
        iteration_data: IterationGrid,
        region: ComplexRegion,
        calculation_time: Duration,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            iteration_data,
            region,
            calculation_time,
            metadata,
        }
    }

    pub fn iteration_data(&self) -> &IterationGrid {
        &self.iteration_data
    }

    pub fn region(&self) -> &ComplexRegion {
        &self.region
    }

    pub fn calculation_time(&self) -> Duration {
        self.calculation_time
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Consume the result, keeping only the grid (for the color-mapping
    /// collaborator, which does not care about provenance).
    pub fn into_grid(self) -> IterationGrid {
        self.iteration_data
    }
}
