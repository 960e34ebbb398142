//! The resource manager: estimation, checked allocation, pressure handling.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use serde::Serialize;

use frakt_core::budget::{AllocationPriority, MemoryProbe};
use frakt_core::config::EngineConfig;
use frakt_core::grid::IterationGrid;
use frakt_core::params::ImageSize;

use crate::error::AllocationError;
use crate::probe::SystemProbe;
use crate::registry::{AllocationGuard, AllocationRegistry};

const BYTES_PER_CELL: u64 = std::mem::size_of::<u32>() as u64;
const BYTES_PER_COORD: u64 = std::mem::size_of::<f64>() as u64;

type ReclaimCallback = Box<dyn Fn() + Send + Sync>;

/// Shared memory-budgeting service.
///
/// One instance is shared (via `Arc`) by every concurrently active
/// computation; the registry underneath is safe for concurrent use.
pub struct ResourceManager {
    probe: Box<dyn MemoryProbe>,
    registry: AllocationRegistry,
    warning_fraction: f64,
    critical_fraction: f64,
    max_single_allocation: u64,
    safety_factor: f64,
    reclaim_callbacks: Mutex<Vec<ReclaimCallback>>,
}

impl ResourceManager {
    /// Manager backed by the live system probe.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_probe(config, Box::new(SystemProbe::new()))
    }

    /// Manager with an injected probe (tests use `FixedProbe`).
    pub fn with_probe(config: &EngineConfig, probe: Box<dyn MemoryProbe>) -> Self {
        Self {
            probe,
            registry: AllocationRegistry::new(),
            warning_fraction: config.memory_warning_fraction,
            critical_fraction: config.memory_critical_fraction,
            max_single_allocation: config.max_single_allocation_bytes,
            safety_factor: config.availability_safety_factor,
            reclaim_callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &AllocationRegistry {
        &self.registry
    }

    /// Estimated bytes a `width x height` computation needs: the output
    /// grid, coordinate scratch proportional to the longer axis, and a
    /// working-set multiplier (~1.8x the grid) covering intermediate and
    /// parallel overhead. Monotone in every argument.
    pub fn estimate_usage(width: u32, height: u32, _max_iterations: u32) -> u64 {
        let base = u64::from(width) * u64::from(height) * BYTES_PER_CELL;
        let coordinates = 2 * u64::from(width.max(height)) * BYTES_PER_COORD;
        let intermediate = base / 2;
        let parallel_overhead = base * 3 / 10;
        base + coordinates + intermediate + parallel_overhead
    }

    /// Whether `required` bytes can be taken right now, applying the
    /// configured safety margin to the probed available memory.
    pub fn check_availability(&self, required: u64) -> bool {
        let with_margin = (required as f64 * self.safety_factor).ceil() as u64;
        self.probe.available_bytes() >= with_margin
    }

    /// Allocate a zeroed, registry-tracked iteration grid.
    pub fn allocate_grid(
        &self,
        size: ImageSize,
        priority: AllocationPriority,
        description: impl Into<String>,
    ) -> Result<TrackedGrid, AllocationError> {
        let description = description.into();
        let bytes = size.pixel_count() * BYTES_PER_CELL;

        if bytes > self.max_single_allocation {
            return Err(AllocationError::OversizedAllocation {
                requested: bytes,
                ceiling: self.max_single_allocation,
            });
        }
        if !self.check_availability(bytes) {
            return Err(AllocationError::SystemOutOfMemory {
                required: (bytes as f64 * self.safety_factor).ceil() as u64,
                available: self.probe.available_bytes(),
            });
        }

        let capacity = self.probe.total_bytes();
        let guard = self
            .registry
            .try_register(bytes, capacity, priority, description.clone())
            .ok_or_else(|| AllocationError::OutOfBudget {
                description,
                requested: bytes,
                used: self.registry.used_bytes(),
                capacity,
            })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            id = %guard.id(),
            bytes,
            priority = ?priority,
            "grid allocated"
        );

        Ok(TrackedGrid {
            grid: IterationGrid::zeroed(size),
            guard,
        })
    }

    /// Register a callback invoked when the manager hits the critical
    /// threshold. Cache-like owners use this to drop reclaimable buffers.
    pub fn register_reclaim_callback(&self, callback: impl Fn() + Send + Sync + 'static) {
        match self.reclaim_callbacks.lock() {
            Ok(mut callbacks) => callbacks.push(Box::new(callback)),
            Err(poisoned) => poisoned.into_inner().push(Box::new(callback)),
        }
    }

    /// Pressure check. At the warning fraction dead records are swept; at
    /// the critical fraction low-priority allocations are revoked and the
    /// registered reclamation callbacks run as well.
    pub fn maintain(&self) -> MaintenanceReport {
        let total = self.probe.total_bytes().max(1);
        let usage_fraction = self.registry.used_bytes() as f64 / total as f64;

        let mut report = MaintenanceReport {
            usage_fraction,
            ..MaintenanceReport::default()
        };

        if usage_fraction >= self.critical_fraction {
            report.revoked = self.registry.revoke_low_priority();
            report.callbacks_run = self.run_reclaim_callbacks();
            report.swept = self.registry.sweep_dead();
        } else if usage_fraction >= self.warning_fraction {
            report.swept = self.registry.sweep_dead();
        }

        #[cfg(feature = "tracing")]
        if report.swept > 0 || report.revoked > 0 {
            tracing::info!(
                usage_fraction,
                swept = report.swept,
                revoked = report.revoked,
                "memory pressure maintenance"
            );
        }

        report
    }

    fn run_reclaim_callbacks(&self) -> usize {
        let callbacks = match self.reclaim_callbacks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for callback in callbacks.iter() {
            callback();
        }
        callbacks.len()
    }

    /// Structured downgrade recommendation for a computation that may not
    /// fit, returned instead of an outright failure so the caller can retry
    /// with reduced scope.
    pub fn optimize_for_large_computation(
        &self,
        width: u32,
        height: u32,
        max_iterations: u32,
    ) -> OptimizationPlan {
        let estimated_bytes = Self::estimate_usage(width, height, max_iterations);
        let available_bytes = self.probe.available_bytes();
        let sufficient = (estimated_bytes as f64) < available_bytes as f64 * 0.7;

        let suggested_size = if estimated_bytes > available_bytes {
            let scale = (available_bytes as f64 * 0.6 / estimated_bytes as f64).sqrt();
            let w = ((f64::from(width) * scale) as u32).max(1);
            let h = ((f64::from(height) * scale) as u32).max(1);
            Some((w, h))
        } else {
            None
        };

        let suggested_iterations = if !sufficient && max_iterations > 1000 {
            Some((max_iterations / 2).min(1000))
        } else {
            None
        };

        OptimizationPlan {
            estimated_bytes,
            available_bytes,
            sufficient,
            suggested_size,
            suggested_iterations,
            enable_chunking: !sufficient,
        }
    }

    /// Point-in-time statistics snapshot.
    pub fn statistics(&self) -> MemoryStatistics {
        MemoryStatistics {
            active_allocations: self.registry.active_count(),
            accounted_bytes: self.registry.used_bytes(),
            peak_bytes: self.registry.peak_bytes(),
            total_allocations: self.registry.total_allocations(),
            total_deallocations: self.registry.total_deallocations(),
            system_total_bytes: self.probe.total_bytes(),
            system_available_bytes: self.probe.available_bytes(),
        }
    }
}

/// A zeroed iteration grid whose backing bytes are accounted in the
/// registry for as long as the value lives.
#[derive(Debug)]
pub struct TrackedGrid {
    grid: IterationGrid,
    guard: AllocationGuard,
}

impl TrackedGrid {
    pub fn guard(&self) -> &AllocationGuard {
        &self.guard
    }

    /// Detach the grid from the accounting (the guard drops here, releasing
    /// the registry record). Used when handing the finished grid to the
    /// caller inside a `FractalResult`.
    pub fn into_grid(self) -> IterationGrid {
        self.grid
    }
}

impl Deref for TrackedGrid {
    type Target = IterationGrid;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}

impl DerefMut for TrackedGrid {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.grid
    }
}

/// Outcome of one `maintain()` pass.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MaintenanceReport {
    pub usage_fraction: f64,
    pub swept: usize,
    pub revoked: usize,
    pub callbacks_run: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MemoryStatistics {
    pub active_allocations: usize,
    pub accounted_bytes: u64,
    pub peak_bytes: u64,
    pub total_allocations: u64,
    pub total_deallocations: u64,
    pub system_total_bytes: u64,
    pub system_available_bytes: u64,
}

impl MemoryStatistics {
    pub fn accounted_mb(&self) -> f64 {
        self.accounted_bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn peak_mb(&self) -> f64 {
        self.peak_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Downgrade recommendation for a computation that does not fit in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptimizationPlan {
    pub estimated_bytes: u64,
    pub available_bytes: u64,
    pub sufficient: bool,
    /// Suggested `(width, height)` when the image itself must shrink.
    pub suggested_size: Option<(u32, u32)>,
    pub suggested_iterations: Option<u32>,
    pub enable_chunking: bool,
}
