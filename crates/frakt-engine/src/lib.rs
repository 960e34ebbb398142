#![forbid(unsafe_code)]
//! frakt-engine: the per-pixel escape-time computation.
//!
//! A [`Generator`] supplies a pure step function `(z, c, n) -> z'` and an
//! `(z0, c)` initializer; the kernel in [`iterate`] drives it over one
//! pixel, and [`mapper::PlaneMapper`] is the single pixel-to-plane mapping
//! shared by the sequential and parallel render paths. The executor in
//! `frakt-exec` is generic over the same trait and never inspects concrete
//! generator types.

pub mod custom;
pub mod generator;
pub mod iterate;
pub mod julia;
pub mod mandelbrot;
pub mod mapper;

pub use custom::CustomFormula;
pub use generator::Generator;
pub use iterate::{compute_row, iterate_pixel, render_sequential};
pub use julia::Julia;
pub use mandelbrot::Mandelbrot;
pub use mapper::PlaneMapper;
