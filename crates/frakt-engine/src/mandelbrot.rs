//! The classic Mandelbrot set: `z_{n+1} = z_n^2 + c`, `z_0 = 0`, `c` = pixel.

use num_complex::Complex64;

use frakt_core::params::FractalParameters;
use frakt_formula::EvalError;

use crate::generator::Generator;

pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct Mandelbrot {
    escape_radius: f64,
}

impl Mandelbrot {
    pub fn new() -> Self {
        Self {
            escape_radius: DEFAULT_ESCAPE_RADIUS,
        }
    }

    pub fn with_escape_radius(escape_radius: f64) -> Self {
        Self { escape_radius }
    }

    /// Read the `escape_radius` custom parameter, defaulting to 2.0.
    pub fn from_params(params: &FractalParameters) -> Self {
        Self {
            escape_radius: params.custom_f64("escape_radius", DEFAULT_ESCAPE_RADIUS),
        }
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for Mandelbrot {
    fn name(&self) -> &str {
        "Mandelbrot Set"
    }

    fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    fn init(&self, pixel: Complex64) -> (Complex64, Complex64) {
        (Complex64::new(0.0, 0.0), pixel)
    }

    fn step(&self, z: Complex64, c: Complex64, _n: u32) -> Result<Complex64, EvalError> {
        Ok(z * z + c)
    }
}
