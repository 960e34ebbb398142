//! Progress accounting for row-parallel renders.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use frakt_core::progress::{ComputationStatus, ProgressInfo};

/// Callback invoked with every emitted progress record. Called from worker
/// threads, so it must be `Send + Sync`; keep it cheap.
pub type ProgressCallback = dyn Fn(&ProgressInfo) + Send + Sync;

/// Emits progress records on a bounded cadence as rows complete.
///
/// The counter increment is the only work on the row path; the record is
/// built (and the callback run) only on emission rows.
pub(crate) struct ProgressReporter<'a> {
    callback: Option<&'a ProgressCallback>,
    start: Instant,
    total_rows: u32,
    /// Emit every `stride` completed rows; `0` means every row.
    stride: u32,
    completed: AtomicU32,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(callback: Option<&'a ProgressCallback>, total_rows: u32, stride: u32) -> Self {
        Self {
            callback,
            start: Instant::now(),
            total_rows,
            stride,
            completed: AtomicU32::new(0),
        }
    }

    /// Record one finished row; emits a `Running` record on the cadence.
    pub(crate) fn row_done(&self) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let Some(callback) = self.callback else {
            return;
        };
        let emit = self.stride <= 1 || done % self.stride == 0 || done == self.total_rows;
        if emit {
            callback(&self.record(done, ComputationStatus::Running));
        }
    }

    /// Emit a lifecycle record (`Preparing`, `Completed`, `Cancelled`,
    /// `Error`) outside the row cadence.
    pub(crate) fn emit_status(&self, status: ComputationStatus) {
        if let Some(callback) = self.callback {
            let done = self.completed.load(Ordering::Relaxed);
            callback(&self.record(done, status));
        }
    }

    pub(crate) fn completed_rows(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    fn record(&self, done: u32, status: ComputationStatus) -> ProgressInfo {
        let elapsed = self.start.elapsed();
        let estimated_remaining = if done > 0 && done < self.total_rows {
            let per_row = elapsed.as_secs_f64() / f64::from(done);
            Duration::from_secs_f64(per_row * f64::from(self.total_rows - done))
        } else {
            Duration::ZERO
        };
        ProgressInfo {
            current_step: done,
            total_steps: self.total_rows,
            elapsed,
            estimated_remaining,
            status,
        }
    }
}
