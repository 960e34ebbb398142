//! Sandbox soundness tests for the formula compiler.

use num_complex::Complex64;

use frakt_formula::{compile, DisallowedKind, FormulaError};

/// Canonical hostile inputs: every one must be rejected at compile time,
/// so the evaluator is never reached.
#[test]
fn hostile_inputs_never_compile() {
    let hostile = [
        "__import__('os')",
        "__import__('os').system('ls')",
        "z[0]",
        "z if n > 0 else c",
        "z == c",
        "[1, 2, 3]",
        "(1, 2, 3)",
        "{1: 2}",
        "z.real",
        "z.conjugate()",
        "lambda x: x",
        "import os",
        "z = c",
        "z and c",
        "z or not c",
        "z < c",
        "z | c",
        "z ^ 2",
        "exec('print(1)')",
        "eval('1')",
        "open('/etc/passwd')",
        "getattr(z, 'real')",
    ];
    for src in hostile {
        assert!(
            compile(src).is_err(),
            "hostile input {src:?} must not compile"
        );
    }
}

#[test]
fn rejections_carry_the_construct_kind() {
    let cases: [(&str, fn(&DisallowedKind) -> bool); 6] = [
        ("z == c", |k| matches!(k, DisallowedKind::Comparison)),
        ("z[0]", |k| matches!(k, DisallowedKind::Indexing)),
        ("[1,2]", |k| matches!(k, DisallowedKind::Collection)),
        ("z.real", |k| matches!(k, DisallowedKind::AttributeAccess)),
        ("z if n else c", |k| matches!(k, DisallowedKind::Conditional)),
        ("spam(z)", |k| matches!(k, DisallowedKind::UnknownFunction(_))),
    ];
    for (src, expected) in cases {
        match compile(src) {
            Err(FormulaError::Disallowed { kind, .. }) => {
                assert!(expected(&kind), "{src:?} rejected with wrong kind: {kind:?}");
            }
            other => panic!("{src:?} should be a Disallowed rejection, got {other:?}"),
        }
    }
}

#[test]
fn unknown_names_are_rejected_not_resolved() {
    for src in ["q", "zz + c", "Z + C", "sinz(z)", "cos2(z)"] {
        assert!(matches!(
            compile(src),
            Err(FormulaError::Disallowed { .. })
        ));
    }
}

#[test]
fn whitelisted_surface_compiles() {
    let accepted = [
        "z**2 + c",
        "z**3 + c",
        "(abs(real(z)) + abs(imag(z))*i)**2 + c",
        "exp(z) + c",
        "sin(z**2) + c / (z + 1)",
        "z**2 + c + 0.5*conj(z)",
        "((z**2 + c - 1) / (2*z + c - 2))**2",
        "min(z, c) + max(z, c, n)",
        "rect(abs(z), phase(z))",
        "floor(z) + ceil(c) + round(n)",
        "log10(z + 1) + atanh(c)",
        "2e-3 * z + pi * e * i * j",
        "-z**2 + +c",
        "z % 2 + n % 3",
    ];
    for src in accepted {
        assert!(compile(src).is_ok(), "{src:?} should compile: {:?}", compile(src).err());
    }
}

#[test]
fn evaluator_is_bit_deterministic() {
    let compiled = compile("sin(z**2) + c / (z + 1) - exp(z / 3)").expect("compiles");
    let z = Complex64::new(0.123_456, -0.654_321);
    let c = Complex64::new(-0.75, 0.11);

    let reference = compiled.evaluate(z, c, 3).expect("evaluates");
    for _ in 0..1000 {
        let again = compiled.evaluate(z, c, 3).expect("evaluates");
        assert_eq!(reference.re.to_bits(), again.re.to_bits());
        assert_eq!(reference.im.to_bits(), again.im.to_bits());
    }
}

#[test]
fn shared_formula_is_deterministic_across_threads() {
    let compiled = std::sync::Arc::new(compile("z**2 + c").expect("compiles"));
    let z = Complex64::new(0.4, 0.3);
    let c = Complex64::new(-0.6, 0.2);
    let reference = compiled.evaluate(z, c, 9).expect("evaluates");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let compiled = std::sync::Arc::clone(&compiled);
            std::thread::spawn(move || compiled.evaluate(z, c, 9).expect("evaluates"))
        })
        .collect();
    for handle in handles {
        let value = handle.join().expect("thread finished");
        assert_eq!(value.re.to_bits(), reference.re.to_bits());
        assert_eq!(value.im.to_bits(), reference.im.to_bits());
    }
}

#[test]
fn introspection_guides_defaults() {
    use frakt_formula::{RecommendedSettings, Variable};

    let mandel = compile("z**2 + c").expect("compiles");
    assert!(mandel.uses_variable(Variable::Z));
    assert!(mandel.uses_variable(Variable::C));
    assert!(!mandel.uses_variable(Variable::N));

    let exp = compile("exp(z) + c").expect("compiles");
    let rec = RecommendedSettings::for_formula(&exp);
    let plain = RecommendedSettings::for_formula(&mandel);
    // exponential-class formulas: fewer iterations, larger escape radius
    assert!(rec.max_iterations <= plain.max_iterations);
    assert!(rec.escape_radius > plain.escape_radius);
}
