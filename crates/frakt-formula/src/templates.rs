//! Preset formula templates and per-formula default recommendations.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::ast::Func;
use crate::compile::CompiledFormula;

/// A named preset formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaTemplate {
    pub name: &'static str,
    pub formula: &'static str,
    pub description: &'static str,
    pub default_max_iterations: u32,
}

/// Builtin presets. Every formula here compiles under the sandbox grammar
/// (there is a test pinning that).
pub fn builtin_templates() -> &'static [FormulaTemplate] {
    &[
        FormulaTemplate {
            name: "mandelbrot",
            formula: "z**2 + c",
            description: "Classic Mandelbrot set",
            default_max_iterations: 100,
        },
        FormulaTemplate {
            name: "cubic-mandelbrot",
            formula: "z**3 + c",
            description: "Degree-3 Mandelbrot set",
            default_max_iterations: 100,
        },
        FormulaTemplate {
            name: "quartic-mandelbrot",
            formula: "z**4 + c",
            description: "Degree-4 Mandelbrot set",
            default_max_iterations: 100,
        },
        FormulaTemplate {
            name: "burning-ship",
            formula: "(abs(real(z)) + abs(imag(z))*i)**2 + c",
            description: "Burning Ship fractal",
            default_max_iterations: 100,
        },
        FormulaTemplate {
            name: "exponential",
            formula: "exp(z) + c",
            description: "Exponential-map fractal",
            default_max_iterations: 50,
        },
        FormulaTemplate {
            name: "sine",
            formula: "sin(z) + c",
            description: "Sine-map fractal",
            default_max_iterations: 50,
        },
        FormulaTemplate {
            name: "cosine",
            formula: "cos(z) + c",
            description: "Cosine-map fractal",
            default_max_iterations: 50,
        },
        FormulaTemplate {
            name: "hyperbolic-sine",
            formula: "sinh(z) + c",
            description: "Hyperbolic-sine fractal",
            default_max_iterations: 50,
        },
        FormulaTemplate {
            name: "logarithm",
            formula: "log(z) + c",
            description: "Logarithm-map fractal",
            default_max_iterations: 50,
        },
        FormulaTemplate {
            name: "square-root",
            formula: "sqrt(z) + c",
            description: "Square-root-map fractal",
            default_max_iterations: 100,
        },
        FormulaTemplate {
            name: "phoenix",
            formula: "z**2 + c + 0.5*conj(z)",
            description: "Phoenix fractal",
            default_max_iterations: 100,
        },
        FormulaTemplate {
            name: "magnet",
            formula: "((z**2 + c - 1) / (2*z + c - 2))**2",
            description: "Magnet fractal, type 1",
            default_max_iterations: 100,
        },
    ]
}

static TEMPLATE_INDEX: Lazy<BTreeMap<&'static str, &'static FormulaTemplate>> =
    Lazy::new(|| builtin_templates().iter().map(|t| (t.name, t)).collect());

/// Look up a builtin template by its name.
pub fn find_template(name: &str) -> Option<&'static FormulaTemplate> {
    TEMPLATE_INDEX.get(name).copied()
}

/// Default iteration count and escape radius for a compiled formula.
///
/// Exponential-class formulas diverge fast and get fewer iterations with a
/// larger escape radius; logarithms need a much larger radius before the
/// escape test means anything; trig maps are periodic and get a moderate
/// radius. Everything else keeps the classic defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendedSettings {
    pub max_iterations: u32,
    pub escape_radius: f64,
}

impl RecommendedSettings {
    pub fn for_formula(compiled: &CompiledFormula) -> Self {
        let complexity = compiled.complexity_score();
        let mut max_iterations = if complexity > 5.0 {
            50
        } else if complexity > 3.0 {
            100
        } else {
            200
        };
        let mut escape_radius = 2.0;

        let funcs = compiled.used_functions();
        if funcs.contains(&Func::Exp) || funcs.contains(&Func::Sinh) || funcs.contains(&Func::Cosh)
        {
            max_iterations = max_iterations.min(50);
            escape_radius = 10.0;
        }
        if funcs.contains(&Func::Sin) || funcs.contains(&Func::Cos) {
            escape_radius = 10.0;
        }
        if funcs.contains(&Func::Log) || funcs.contains(&Func::Log10) {
            escape_radius = 100.0;
        }

        Self {
            max_iterations,
            escape_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;

    #[test]
    fn every_builtin_template_compiles() {
        for template in builtin_templates() {
            let compiled = compile(template.formula);
            assert!(
                compiled.is_ok(),
                "template '{}' failed to compile: {:?}",
                template.name,
                compiled.err()
            );
        }
    }

    #[test]
    fn lookup_by_name() {
        let t = find_template("mandelbrot").expect("builtin present");
        assert_eq!(t.formula, "z**2 + c");
        assert!(find_template("nope").is_none());
    }

    #[test]
    fn exponential_formulas_get_fewer_iterations() {
        let exp = compile("exp(z) + c").expect("compiles");
        let rec = RecommendedSettings::for_formula(&exp);
        assert_eq!(rec.max_iterations, 50);
        assert_eq!(rec.escape_radius, 10.0);
    }

    #[test]
    fn logarithm_formulas_get_large_radius() {
        let log = compile("log(z) + c").expect("compiles");
        let rec = RecommendedSettings::for_formula(&log);
        assert_eq!(rec.escape_radius, 100.0);
    }

    #[test]
    fn simple_polynomial_keeps_defaults() {
        let mandel = compile("z**2 + c").expect("compiles");
        let rec = RecommendedSettings::for_formula(&mandel);
        assert_eq!(rec.max_iterations, 100); // complexity 3.1 > 3.0
        assert_eq!(rec.escape_radius, 2.0);
    }
}
