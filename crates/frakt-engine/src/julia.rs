//! Julia sets: `z_{n+1} = z_n^2 + c` with a fixed `c`, `z_0` = pixel.

use num_complex::Complex64;

use frakt_core::params::FractalParameters;
use frakt_formula::EvalError;

use crate::generator::Generator;
use crate::mandelbrot::DEFAULT_ESCAPE_RADIUS;

/// Default parameter, a well-known connected Julia set.
pub const DEFAULT_C: Complex64 = Complex64::new(-0.7, 0.27015);

#[derive(Debug, Clone, Copy)]
pub struct Julia {
    c: Complex64,
    escape_radius: f64,
}

impl Julia {
    pub fn new(c: Complex64) -> Self {
        Self {
            c,
            escape_radius: DEFAULT_ESCAPE_RADIUS,
        }
    }

    /// Read `c` (a complex custom parameter, or the `c_real`/`c_imag`
    /// pair) and `escape_radius` from the request.
    pub fn from_params(params: &FractalParameters) -> Self {
        let c = params.custom_complex("c").unwrap_or_else(|| {
            Complex64::new(
                params.custom_f64("c_real", DEFAULT_C.re),
                params.custom_f64("c_imag", DEFAULT_C.im),
            )
        });
        Self {
            c,
            escape_radius: params.custom_f64("escape_radius", DEFAULT_ESCAPE_RADIUS),
        }
    }

    pub fn c(&self) -> Complex64 {
        self.c
    }
}

impl Default for Julia {
    fn default() -> Self {
        Self::new(DEFAULT_C)
    }
}

impl Generator for Julia {
    fn name(&self) -> &str {
        "Julia Set"
    }

    fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    fn init(&self, pixel: Complex64) -> (Complex64, Complex64) {
        (pixel, self.c)
    }

    fn step(&self, z: Complex64, c: Complex64, _n: u32) -> Result<Complex64, EvalError> {
        Ok(z * z + c)
    }
}
