//! Row-parallel calculation driver.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use frakt_core::budget::AllocationPriority;
use frakt_core::config::EngineConfig;
use frakt_core::params::{FractalParameters, ImageSize};
use frakt_core::progress::ComputationStatus;
use frakt_core::result::FractalResult;
use frakt_engine::{compute_row, Generator, PlaneMapper};
use frakt_mem::ResourceManager;

use crate::cancel::CancelToken;
use crate::error::ComputeError;
use crate::progress::{ProgressCallback, ProgressReporter};

/// One row of work: the row index and the exclusive output slice it owns.
/// Created per row, consumed on completion.
struct RowTask<'a> {
    index: u32,
    out: &'a mut [u32],
}

/// Parallel executor over a fixed-size worker pool.
///
/// The pool is sized once at construction (`worker_threads`, or hardware
/// parallelism when 0) and shared by every calculation made through this
/// executor. The [`ResourceManager`] is injected: callers construct one and
/// may share it across executors and concurrent computations.
pub struct Executor {
    config: EngineConfig,
    resources: Arc<ResourceManager>,
    pool: rayon::ThreadPool,
}

impl Executor {
    pub fn new(config: EngineConfig, resources: Arc<ResourceManager>) -> Result<Self, ComputeError> {
        let threads = if config.worker_threads == 0 {
            num_cpus::get()
        } else {
            config.worker_threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("frakt-worker-{i}"))
            .build()
            .map_err(|e| ComputeError::Worker(format!("worker pool: {e}")))?;
        Ok(Self {
            config,
            resources,
            pool,
        })
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    /// Run one full-resolution calculation.
    ///
    /// All-or-nothing: the returned grid is complete, or the error tells
    /// why none was produced (`Cancelled` for a cooperative stop,
    /// `OutOfBudget` with a downgrade plan for a memory refusal, `Worker`
    /// for an unexpected row failure).
    pub fn calculate(
        &self,
        generator: &dyn Generator,
        params: &FractalParameters,
        progress: Option<&ProgressCallback>,
        cancel: &CancelToken,
    ) -> Result<FractalResult, ComputeError> {
        let size = params.image_size();
        let reporter = ProgressReporter::new(progress, size.height(), self.config.progress_rows);

        let estimated =
            ResourceManager::estimate_usage(size.width(), size.height(), params.max_iterations());
        if !self.resources.check_availability(estimated) {
            let plan = self.resources.optimize_for_large_computation(
                size.width(),
                size.height(),
                params.max_iterations(),
            );
            reporter.emit_status(ComputationStatus::Error);
            return Err(ComputeError::OutOfBudget { plan });
        }

        reporter.emit_status(ComputationStatus::Preparing);

        let mut tracked = match self.resources.allocate_grid(
            size,
            AllocationPriority::High,
            format!("{} result {}x{}", generator.name(), size.width(), size.height()),
        ) {
            Ok(grid) => grid,
            Err(e) => {
                reporter.emit_status(ComputationStatus::Error);
                return Err(e.into());
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            generator = generator.name(),
            width = size.width(),
            height = size.height(),
            max_iterations = params.max_iterations(),
            threads = self.worker_threads(),
            "render start"
        );

        let mapper = PlaneMapper::new(params.region(), size);
        let escape_radius = generator.escape_radius();
        let escape_radius_sq = escape_radius * escape_radius;
        let max_iterations = params.max_iterations();

        // Internal flag workers use to drain quickly once any of them has
        // observed the caller's token.
        let drained = AtomicBool::new(false);
        let start = Instant::now();

        let width = size.width() as usize;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let tasks: Vec<RowTask<'_>> = tracked
                .as_mut_slice()
                .chunks_exact_mut(width)
                .enumerate()
                .map(|(index, out)| RowTask {
                    index: index as u32,
                    out,
                })
                .collect();

            self.pool.install(|| {
                tasks.into_par_iter().for_each(|task| {
                    // Cancellation checks only at row boundaries; the pixel
                    // loop itself is branch-free with respect to control.
                    if cancel.is_cancelled() {
                        drained.store(true, Ordering::Relaxed);
                        return;
                    }
                    if drained.load(Ordering::Relaxed) {
                        return;
                    }
                    compute_row(
                        generator,
                        &mapper,
                        task.index,
                        max_iterations,
                        escape_radius_sq,
                        task.out,
                    );
                    reporter.row_done();
                });
            });
        }));

        let calculation_time = start.elapsed();
        self.resources.maintain();

        if outcome.is_err() {
            reporter.emit_status(ComputationStatus::Error);
            return Err(ComputeError::Worker(
                "a row task panicked; aborted remaining rows".to_string(),
            ));
        }

        if drained.load(Ordering::Relaxed) || cancel.is_cancelled() {
            // The pool has drained; whatever rows finished are discarded
            // with the tracked grid.
            reporter.emit_status(ComputationStatus::Cancelled);
            return Err(ComputeError::Cancelled);
        }

        debug_assert_eq!(reporter.completed_rows(), size.height());

        let stats = self.resources.statistics();
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "generator_name".to_string(),
            serde_json::Value::from(generator.name()),
        );
        metadata.insert(
            "escape_radius".to_string(),
            serde_json::Value::from(escape_radius),
        );
        metadata.insert(
            "worker_threads".to_string(),
            serde_json::Value::from(self.worker_threads()),
        );
        metadata.insert(
            "memory_usage_mb".to_string(),
            serde_json::Value::from(stats.accounted_mb()),
        );
        metadata.insert(
            "peak_memory_mb".to_string(),
            serde_json::Value::from(stats.peak_mb()),
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(
            generator = generator.name(),
            elapsed_ms = calculation_time.as_millis() as u64,
            "render done"
        );

        reporter.emit_status(ComputationStatus::Completed);

        Ok(FractalResult::new(
            tracked.into_grid(),
            *params.region(),
            calculation_time,
            metadata,
        ))
    }

    /// Low-resolution preview of the same request: the image size is scaled
    /// down to the configured pixel budget (aspect preserved) and run
    /// through the identical pipeline. Intended to run alongside a
    /// full-resolution render against the same shared `ResourceManager`.
    pub fn render_preview(
        &self,
        generator: &dyn Generator,
        params: &FractalParameters,
        cancel: &CancelToken,
    ) -> Result<FractalResult, ComputeError> {
        let size = params.image_size();
        let budget = self.config.preview_max_pixels.max(1);
        let pixels = size.pixel_count();

        let preview_params = if pixels > budget {
            let scale = (budget as f64 / pixels as f64).sqrt();
            let w = ((f64::from(size.width()) * scale) as u32).max(1);
            let h = ((f64::from(size.height()) * scale) as u32).max(1);
            let preview_size = ImageSize::new(w, h)?;
            params.with_image_size(preview_size)
        } else {
            params.clone()
        };

        self.calculate(generator, &preview_params, None, cancel)
    }
}
