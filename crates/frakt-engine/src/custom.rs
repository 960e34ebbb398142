//! User-formula generator.

use std::sync::Arc;

use num_complex::Complex64;

use frakt_core::params::FractalParameters;
use frakt_formula::{CompiledFormula, EvalError, RecommendedSettings};

use crate::generator::Generator;

/// Escape-time generator driven by a compiled user formula.
///
/// Initialization style follows the request: when a fixed `c` custom
/// parameter is supplied the set is explored Julia-style (`z0` = pixel),
/// otherwise Mandelbrot-style (`c` = pixel, `z0` = 0). The escape radius
/// defaults to the formula's recommended radius so exponential-class
/// formulas get a usable divergence test out of the box.
#[derive(Clone)]
pub struct CustomFormula {
    formula: Arc<CompiledFormula>,
    name: String,
    fixed_c: Option<Complex64>,
    escape_radius: f64,
}

impl CustomFormula {
    pub fn new(formula: CompiledFormula) -> Self {
        let recommended = RecommendedSettings::for_formula(&formula);
        let name = format!("Custom: {}", formula.source());
        Self {
            formula: Arc::new(formula),
            name,
            fixed_c: None,
            escape_radius: recommended.escape_radius,
        }
    }

    /// Apply the request's `c` and `escape_radius` custom parameters.
    pub fn from_params(formula: CompiledFormula, params: &FractalParameters) -> Self {
        let mut generator = Self::new(formula);
        generator.fixed_c = params.custom_complex("c");
        generator.escape_radius = params.custom_f64("escape_radius", generator.escape_radius);
        generator
    }

    pub fn with_fixed_c(mut self, c: Complex64) -> Self {
        self.fixed_c = Some(c);
        self
    }

    pub fn formula(&self) -> &CompiledFormula {
        &self.formula
    }

    pub fn fixed_c(&self) -> Option<Complex64> {
        self.fixed_c
    }
}

impl Generator for CustomFormula {
    fn name(&self) -> &str {
        &self.name
    }

    fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    fn init(&self, pixel: Complex64) -> (Complex64, Complex64) {
        match self.fixed_c {
            Some(c) => (pixel, c),
            None => (Complex64::new(0.0, 0.0), pixel),
        }
    }

    fn step(&self, z: Complex64, c: Complex64, n: u32) -> Result<Complex64, EvalError> {
        self.formula.evaluate(z, c, n)
    }
}
