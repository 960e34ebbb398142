//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker pool size. `0` means "use hardware parallelism".
    pub worker_threads: usize,

    /// Emit a progress record every N completed rows. `0` means every row.
    pub progress_rows: u32,

    /// Fraction of probed memory at which dead registry records are swept.
    pub memory_warning_fraction: f64,

    /// Fraction of probed memory at which low-priority allocations are
    /// revoked and reclamation callbacks run.
    pub memory_critical_fraction: f64,

    /// Ceiling for a single tracked buffer (bytes). Oversized requests are
    /// rejected outright instead of being attempted.
    pub max_single_allocation_bytes: u64,

    /// Safety multiplier applied to availability checks: a request of R
    /// bytes needs `R * availability_safety_factor` bytes free.
    pub availability_safety_factor: f64,

    /// Pixel budget for preview renders (width x height after downscale).
    pub preview_max_pixels: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            progress_rows: 0,
            memory_warning_fraction: 0.8,
            memory_critical_fraction: 0.9,
            max_single_allocation_bytes: 512 * 1024 * 1024, // 512 MiB
            availability_safety_factor: 1.5,
            preview_max_pixels: 160_000, // ~400x400
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `FRAKT_WORKER_THREADS`: worker pool size (0 = auto)
    /// - `FRAKT_PROGRESS_ROWS`: progress emission cadence in rows
    /// - `FRAKT_MEM_WARNING_FRACTION`: warning threshold (0..1)
    /// - `FRAKT_MEM_CRITICAL_FRACTION`: critical threshold (0..1)
    /// - `FRAKT_MAX_ALLOCATION_BYTES`: single-buffer ceiling
    /// - `FRAKT_SAFETY_FACTOR`: availability safety multiplier
    /// - `FRAKT_PREVIEW_MAX_PIXELS`: preview pixel budget
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("FRAKT_WORKER_THREADS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.worker_threads = v;
            }
        }

        if let Ok(s) = std::env::var("FRAKT_PROGRESS_ROWS") {
            if let Ok(v) = s.parse::<u32>() {
                cfg.progress_rows = v;
            }
        }

        if let Ok(s) = std::env::var("FRAKT_MEM_WARNING_FRACTION") {
            if let Ok(v) = s.parse::<f64>() {
                cfg.memory_warning_fraction = v;
            }
        }

        if let Ok(s) = std::env::var("FRAKT_MEM_CRITICAL_FRACTION") {
            if let Ok(v) = s.parse::<f64>() {
                cfg.memory_critical_fraction = v;
            }
        }

        if let Ok(s) = std::env::var("FRAKT_MAX_ALLOCATION_BYTES") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.max_single_allocation_bytes = v;
            }
        }

        if let Ok(s) = std::env::var("FRAKT_SAFETY_FACTOR") {
            if let Ok(v) = s.parse::<f64>() {
                cfg.availability_safety_factor = v;
            }
        }

        if let Ok(s) = std::env::var("FRAKT_PREVIEW_MAX_PIXELS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.preview_max_pixels = v;
            }
        }

        cfg
    }
}
