//! Executor-level integration: parallel/sequential equivalence, progress,
//! cancellation, and concurrent computations over one shared manager.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use frakt_core::config::EngineConfig;
use frakt_core::params::{FractalParameters, ImageSize};
use frakt_core::progress::{ComputationStatus, ProgressInfo};
use frakt_core::region::ComplexRegion;
use frakt_engine::{render_sequential, Julia, Mandelbrot};
use frakt_exec::{CancelToken, ComputeError, Executor};
use frakt_mem::{FixedProbe, ResourceManager};

const GIB: u64 = 1024 * 1024 * 1024;

fn executor(threads: usize) -> Executor {
    let mut config = EngineConfig::default();
    config.worker_threads = threads;
    let resources = Arc::new(ResourceManager::with_probe(
        &config,
        Box::new(FixedProbe::new(8 * GIB, 8 * GIB)),
    ));
    Executor::new(config, resources).expect("executor builds")
}

fn params(w: u32, h: u32, max_iterations: u32) -> FractalParameters {
    let region = ComplexRegion::from_bounds(-2.0, 1.0, -1.5, 1.5).expect("valid region");
    FractalParameters::new(
        region,
        max_iterations,
        ImageSize::new(w, h).expect("valid size"),
        BTreeMap::new(),
    )
    .expect("valid params")
}

#[test]
fn parallel_and_sequential_grids_are_identical() {
    let p = params(121, 79, 64);
    let gen = Mandelbrot::new();
    let sequential = render_sequential(&gen, &p);

    for threads in [1, 2, 8] {
        let exec = executor(threads);
        let parallel = exec
            .calculate(&gen, &p, None, &CancelToken::new())
            .expect("calculates");
        assert_eq!(
            parallel.iteration_data(),
            &sequential,
            "grid must match the sequential reference with {threads} workers"
        );
    }
}

#[test]
fn progress_counts_every_row_exactly_once() {
    let exec = executor(4);
    let rows_seen = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&rows_seen);
    let callback = move |info: &ProgressInfo| {
        if info.status == ComputationStatus::Running {
            seen.lock().expect("lock").push(info.current_step);
        }
    };

    exec.calculate(
        &Mandelbrot::new(),
        &params(16, 40, 30),
        Some(&callback),
        &CancelToken::new(),
    )
    .expect("calculates");

    let mut rows = rows_seen.lock().expect("lock").clone();
    rows.sort_unstable();
    // default cadence emits on every row; counter values are 1..=height
    assert_eq!(rows, (1..=40).collect::<Vec<u32>>());
}

#[test]
fn cancellation_mid_run_discards_the_grid() {
    let exec = executor(1);
    let token = CancelToken::new();
    let observer = token.clone();
    let callback = move |info: &ProgressInfo| {
        if info.status == ComputationStatus::Running && info.current_step == 2 {
            observer.cancel();
        }
    };

    let outcome = exec.calculate(
        &Mandelbrot::new(),
        &params(8, 128, 300),
        Some(&callback),
        &token,
    );
    assert!(matches!(outcome, Err(ComputeError::Cancelled)));

    // the tracked grid was discarded, not leaked into the registry
    assert_eq!(exec.resources().statistics().active_allocations, 0);
}

#[test]
fn cancelled_runs_emit_a_terminal_cancelled_record() {
    let exec = executor(1);
    let token = CancelToken::new();
    let observer = token.clone();
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&statuses);
    let callback = move |info: &ProgressInfo| {
        seen.lock().expect("lock").push(info.status);
        if info.status == ComputationStatus::Running {
            observer.cancel();
        }
    };

    let _ = exec.calculate(
        &Mandelbrot::new(),
        &params(8, 64, 100),
        Some(&callback),
        &token,
    );
    let statuses = statuses.lock().expect("lock");
    assert_eq!(*statuses.last().expect("records"), ComputationStatus::Cancelled);
    assert!(!statuses.contains(&ComputationStatus::Completed));
}

#[test]
fn preview_and_full_render_share_one_manager() {
    let mut config = EngineConfig::default();
    config.worker_threads = 2;
    config.preview_max_pixels = 400;
    let resources = Arc::new(ResourceManager::with_probe(
        &config,
        Box::new(FixedProbe::new(8 * GIB, 8 * GIB)),
    ));
    let full = Arc::new(Executor::new(config.clone(), Arc::clone(&resources)).expect("builds"));
    let preview = Arc::new(Executor::new(config, Arc::clone(&resources)).expect("builds"));

    let p = params(200, 150, 40);
    let gen = Julia::default();

    let full_handle = {
        let exec = Arc::clone(&full);
        let p = p.clone();
        std::thread::spawn(move || {
            exec.calculate(&Julia::default(), &p, None, &CancelToken::new())
        })
    };
    let preview_handle = {
        let exec = Arc::clone(&preview);
        let p = p.clone();
        std::thread::spawn(move || exec.render_preview(&Julia::default(), &p, &CancelToken::new()))
    };

    let full_result = full_handle.join().expect("thread").expect("full render");
    let preview_result = preview_handle.join().expect("thread").expect("preview");

    assert_eq!(full_result.iteration_data(), &render_sequential(&gen, &p));
    assert!(preview_result.iteration_data().as_slice().len() <= 400);

    // both grids were detached; the shared registry drained to zero
    let stats = resources.statistics();
    assert_eq!(stats.active_allocations, 0);
    assert_eq!(stats.accounted_bytes, 0);
    assert!(stats.total_allocations >= 2);
}

#[test]
fn worker_pool_size_is_respected() {
    let exec = executor(3);
    assert_eq!(exec.worker_threads(), 3);
}
