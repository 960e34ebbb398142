use std::collections::BTreeMap;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use num_complex::Complex64;

use frakt_core::config::EngineConfig;
use frakt_core::params::{FractalParameters, ImageSize};
use frakt_core::region::ComplexRegion;
use frakt_engine::{render_sequential, CustomFormula, Mandelbrot};
use frakt_exec::{CancelToken, Executor};
use frakt_formula::compile;
use frakt_mem::{FixedProbe, ResourceManager};

fn bench_params(w: u32, h: u32) -> FractalParameters {
    let region = ComplexRegion::from_bounds(-2.0, 1.0, -1.5, 1.5).expect("valid region");
    FractalParameters::new(
        region,
        100,
        ImageSize::new(w, h).expect("valid size"),
        BTreeMap::new(),
    )
    .expect("valid params")
}

fn bench_formula_eval(c: &mut Criterion) {
    let compiled = compile("z**2 + c").expect("compiles");
    let z = Complex64::new(0.3, -0.4);
    let cc = Complex64::new(-0.7, 0.15);
    c.bench_function("formula_eval_mandelbrot_step", |b| {
        b.iter(|| compiled.evaluate(z, cc, 10).expect("evaluates"))
    });

    let transcendental = compile("sin(z**2) + c / (z + 1)").expect("compiles");
    c.bench_function("formula_eval_transcendental", |b| {
        b.iter(|| transcendental.evaluate(z, cc, 10).expect("evaluates"))
    });
}

fn bench_sequential_render(c: &mut Criterion) {
    let params = bench_params(64, 64);
    let builtin = Mandelbrot::new();
    c.bench_function("render_64x64_builtin", |b| {
        b.iter(|| render_sequential(&builtin, &params))
    });

    let custom = CustomFormula::new(compile("z**2 + c").expect("compiles"));
    c.bench_function("render_64x64_custom_formula", |b| {
        b.iter(|| render_sequential(&custom, &params))
    });
}

fn bench_parallel_render(c: &mut Criterion) {
    let config = EngineConfig::default();
    let resources = Arc::new(ResourceManager::with_probe(
        &config,
        Box::new(FixedProbe::new(8 << 30, 8 << 30)),
    ));
    let executor = Executor::new(config, resources).expect("executor builds");
    let params = bench_params(256, 256);
    let generator = Mandelbrot::new();

    c.bench_function("render_256x256_parallel", |b| {
        b.iter(|| {
            executor
                .calculate(&generator, &params, None, &CancelToken::new())
                .expect("calculates")
        })
    });
}

criterion_group!(
    benches,
    bench_formula_eval,
    bench_sequential_render,
    bench_parallel_render
);
criterion_main!(benches);
