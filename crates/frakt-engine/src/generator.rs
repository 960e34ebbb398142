//! Generator capability trait.

use num_complex::Complex64;

use frakt_formula::EvalError;

/// One escape-time fractal variant.
///
/// A generator is a pure capability: the `(z0, c)` initializer decides what
/// the pixel coordinate means (Mandelbrot seeds `c`, Julia seeds `z`), and
/// the step function advances the orbit. Implementations must be stateless
/// with respect to evaluation — the same instance is shared read-only by
/// every worker thread, and `step` must be deterministic.
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    /// Escape radius used for the divergence test (the kernel squares it
    /// once; the per-pixel test uses the squared modulus).
    fn escape_radius(&self) -> f64;

    /// Initial `(z0, c)` for a pixel at the given plane coordinate.
    fn init(&self, pixel: Complex64) -> (Complex64, Complex64);

    /// One orbit step. An error means the orbit left the representable
    /// range; the kernel treats it as divergence at the current iteration.
    fn step(&self, z: Complex64, c: Complex64, n: u32) -> Result<Complex64, EvalError>;
}
