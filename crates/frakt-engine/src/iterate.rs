//! The escape-time kernel and the row/grid drivers built on it.

use num_complex::Complex64;

use frakt_core::grid::IterationGrid;
use frakt_core::params::FractalParameters;

use crate::generator::Generator;
use crate::mapper::PlaneMapper;

/// Count how many iterations the orbit of `pixel` survives.
///
/// The squared-modulus escape test runs before each step, so a pixel whose
/// seed already lies outside the radius records 0. A step error is
/// divergence at the current iteration; a pixel that survives all
/// `max_iterations` steps records `max_iterations` (bounded).
#[inline]
pub fn iterate_pixel<G: Generator + ?Sized>(
    generator: &G,
    pixel: Complex64,
    max_iterations: u32,
    escape_radius_sq: f64,
) -> u32 {
    let (mut z, c) = generator.init(pixel);
    for n in 0..max_iterations {
        if z.norm_sqr() > escape_radius_sq {
            return n;
        }
        match generator.step(z, c, n) {
            Ok(next) => z = next,
            Err(_) => return n,
        }
    }
    max_iterations
}

/// Fill one output row. Both the sequential and the parallel path go
/// through here, which is what makes their grids pixel-identical.
pub fn compute_row<G: Generator + ?Sized>(
    generator: &G,
    mapper: &PlaneMapper,
    row: u32,
    max_iterations: u32,
    escape_radius_sq: f64,
    out: &mut [u32],
) {
    let im = mapper.im(row);
    for (x, cell) in out.iter_mut().enumerate() {
        let pixel = Complex64::new(mapper.re(x as u32), im);
        *cell = iterate_pixel(generator, pixel, max_iterations, escape_radius_sq);
    }
}

/// Single-threaded reference renderer.
///
/// Used by tests as the ground truth the parallel executor must match, and
/// usable directly when a worker pool is not warranted.
pub fn render_sequential<G: Generator + ?Sized>(
    generator: &G,
    params: &FractalParameters,
) -> IterationGrid {
    let mut grid = IterationGrid::zeroed(params.image_size());
    let mapper = PlaneMapper::new(params.region(), params.image_size());
    let escape_radius_sq = generator.escape_radius() * generator.escape_radius();
    let max_iterations = params.max_iterations();

    for (row, out) in grid.rows_mut().enumerate() {
        compute_row(
            generator,
            &mapper,
            row as u32,
            max_iterations,
            escape_radius_sq,
            out,
        );
    }
    grid
}
