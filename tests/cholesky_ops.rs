//! Integration tests for the fixed-point Cholesky factorization

mod common;

use common::{
    assert_allclose_c128, max_abs_diff, q, random_hpd, random_input, rank_one,
    reference_cholesky_f64, reference_cholesky_fixed,
};
use fxchol::prelude::*;

fn engine(dim: usize, input: FixedFormat, output: FixedFormat) -> CholeskyEngine {
    CholeskyConfig::new(dim, input, output).build().unwrap()
}

// ============================================================================
// Accuracy
// ============================================================================

#[test]
fn test_reconstruction_matches_input() {
    let input = q(16, 4);
    let e = engine(16, input, q(24, 8));
    let a = random_input(16, input, 7);
    let r = e.factorize(&a).unwrap();

    assert_eq!(r.code(), 0);
    let lsb = e.working_format().lsb();
    assert_allclose_c128(
        &r.working.reconstruct_f64(),
        &a.to_f64(),
        0.0,
        16.0 * 64.0 * lsb,
        "L·L^H vs A",
    );
}

#[test]
fn test_matches_float_reference() {
    let input = q(16, 4);
    let e = engine(12, input, q(32, 16));
    let a = random_input(12, input, 11);
    let r = e.factorize(&a).unwrap();

    let reference = reference_cholesky_f64(&a.to_f64(), 12);
    assert_allclose_c128(
        &r.factor.to_f64(),
        &reference,
        0.0,
        1e-3,
        "fixed vs f64 Cholesky",
    );
}

#[test]
fn test_error_scales_with_fraction_bits() {
    let dim = 16;
    let values = random_hpd(dim, 0.5, 0.5, 3);
    for input in [q(16, 4), q(32, 8), q(40, 8)] {
        let e = engine(dim, input, input);
        let a = InputMatrix::from_f64(dim, input, &values).unwrap();
        let r = e.factorize(&a).unwrap();
        let err = max_abs_diff(&r.working.reconstruct_f64(), &a.to_f64());
        let bound = (dim as f64) * 64.0 * e.working_format().lsb();
        assert!(
            err <= bound,
            "{}: reconstruction error {:e} above {:e}",
            input,
            err,
            bound
        );
    }
}

#[test]
fn test_refined_beats_fast_at_wide_working_format() {
    let dim = 32;
    let input = q(40, 8);
    let a = random_input(dim, input, 5);

    let err = |strategy| {
        let e = CholeskyConfig::new(dim, input, input)
            .with_rsqrt(strategy)
            .build()
            .unwrap();
        let r = e.factorize(&a).unwrap();
        assert_eq!(r.diagnostics.rsqrt_misses, 0);
        max_abs_diff(&r.working.reconstruct_f64(), &a.to_f64())
    };
    let fast = err(RsqrtStrategy::Fast);
    let refined = err(RsqrtStrategy::Refined);
    assert!(refined < fast, "refined {:e} vs fast {:e}", refined, fast);
}

// ============================================================================
// Tiled form
// ============================================================================

#[test]
fn test_tiled_matches_untiled_reduction() {
    let input = q(16, 4);
    for (dim, seed) in [(5, 1), (13, 2), (40, 3)] {
        let a = random_input(dim, input, seed);
        for strategy in [RsqrtStrategy::Fast, RsqrtStrategy::Refined] {
            let e = CholeskyConfig::new(dim, input, input)
                .with_rsqrt(strategy)
                .build()
                .unwrap();
            let r = e.factorize(&a).unwrap();
            assert_eq!(r.diagnostics.working_saturations, 0);
            let untiled = reference_cholesky_fixed(&a, e.working_format(), strategy);
            assert_eq!(r.working, untiled, "dim {} {}", dim, strategy);
        }
    }
}

#[test]
fn test_tile_and_unroll_do_not_change_output() {
    let dim = 23;
    let input = q(16, 4);
    let a = random_input(dim, input, 9);
    let base = engine(dim, input, input).factorize(&a).unwrap();

    for tile in [1, 2, 5, 6, 7, 64] {
        for unroll in [1, 3, 16, 64] {
            let r = CholeskyConfig::new(dim, input, input)
                .with_tile_width(tile)
                .with_row_unroll(unroll)
                .build()
                .unwrap()
                .factorize(&a)
                .unwrap();
            assert_eq!(r.factor, base.factor, "tile {} unroll {}", tile, unroll);
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

#[test]
fn test_upper_is_conjugate_transpose_of_lower() {
    let dim = 9;
    let input = q(16, 4);
    // Output equal to the working format: no rounding at emission
    let output = input.derive_working().unwrap();
    let a = random_input(dim, input, 21);

    let lower = engine(dim, input, output).factorize(&a).unwrap().factor;
    let upper = CholeskyConfig::new(dim, input, output)
        .with_triangle(Triangle::Upper)
        .build()
        .unwrap()
        .factorize(&a)
        .unwrap()
        .factor;

    for i in 0..dim {
        for j in 0..dim {
            let l = lower.get(j, i);
            let expected = ComplexFixed::new(l.re, Fixed::from_bits(-l.im.to_bits()));
            assert_eq!(upper.get(i, j), expected, "({}, {})", i, j);
        }
    }
}

#[test]
fn test_upper_within_one_lsb_of_lower_when_narrowing() {
    let dim = 9;
    let input = q(16, 4);
    let output = q(12, 4);
    let a = random_input(dim, input, 22);

    let lower = engine(dim, input, output).factorize(&a).unwrap().factor.to_f64();
    let upper = CholeskyConfig::new(dim, input, output)
        .with_triangle(Triangle::Upper)
        .build()
        .unwrap()
        .factorize(&a)
        .unwrap()
        .factor;

    let transposed: Vec<Complex128> = (0..dim * dim)
        .map(|k| lower[(k % dim) * dim + k / dim].conj())
        .collect();
    assert_allclose_c128(&upper.to_f64(), &transposed, 0.0, output.lsb(), "U vs L^H");
}

#[test]
fn test_unused_triangle_and_diagonal_imag_are_zero() {
    let dim = 11;
    let input = q(16, 4);
    let mut values = random_hpd(dim, 0.5, 0.5, 4);
    // Garbage imaginary parts on the diagonal must not reach the output
    for k in 0..dim {
        values[k * dim + k].im = 0.375;
    }
    let a = InputMatrix::from_f64(dim, input, &values).unwrap();

    for triangle in [Triangle::Lower, Triangle::Upper] {
        let r = CholeskyConfig::new(dim, input, q(16, 2))
            .with_triangle(triangle)
            .build()
            .unwrap()
            .factorize(&a)
            .unwrap();
        for i in 0..dim {
            assert!(r.factor.get(i, i).im.is_zero());
            assert!(r.factor.get(i, i).re.is_positive());
            for j in 0..dim {
                let unused = match triangle {
                    Triangle::Lower => j > i,
                    Triangle::Upper => j < i,
                };
                if unused {
                    assert_eq!(r.factor.get(i, j), ComplexFixed::ZERO, "({}, {})", i, j);
                }
            }
        }
    }
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn test_single_element() {
    let input = q(16, 4);
    let a = InputMatrix::from_f64(1, input, &[Complex128::new(4.0, 0.75)]).unwrap();
    for strategy in [RsqrtStrategy::Fast, RsqrtStrategy::Refined] {
        let r = CholeskyConfig::new(1, input, input)
            .with_rsqrt(strategy)
            .build()
            .unwrap()
            .factorize(&a)
            .unwrap();
        assert_eq!(r.code(), 0);
        assert_eq!(r.factor.get(0, 0).to_f64(input), Complex128::new(2.0, 0.0));
    }
}

#[test]
fn test_identity_factors_to_identity() {
    let input = q(16, 4);
    for dim in [1, 2, 7, 20] {
        let values: Vec<Complex128> = (0..dim * dim)
            .map(|k| {
                if k % (dim + 1) == 0 {
                    Complex128::ONE
                } else {
                    Complex128::ZERO
                }
            })
            .collect();
        let a = InputMatrix::from_f64(dim, input, &values).unwrap();
        for strategy in [RsqrtStrategy::Fast, RsqrtStrategy::Refined] {
            let r = CholeskyConfig::new(dim, input, input)
                .with_rsqrt(strategy)
                .build()
                .unwrap()
                .factorize(&a)
                .unwrap();
            assert_eq!(r.code(), 0);
            assert_eq!(r.factor, a, "dim {} {}", dim, strategy);
        }
    }
}

#[test]
fn test_rank_one_input_is_flagged() {
    let dim = 6;
    let input = q(16, 4);
    let values = rank_one(dim);
    let a = InputMatrix::from_f64(dim, input, &values).unwrap();
    let r = engine(dim, input, input).factorize(&a).unwrap();

    assert_ne!(r.code(), 0);
    assert_eq!(r.status.clamped_columns(), &[1, 2, 3, 4, 5]);
    for k in 1..dim {
        assert_eq!(r.factor.get(k, k), ComplexFixed::ZERO);
    }
    // Column 0 carries the whole matrix
    assert_eq!(r.working.reconstruct_f64(), values);
}

#[test]
fn test_indefinite_input_completes_every_column() {
    let input = q(16, 4);
    let c = Complex128::new;
    // Second pivot 1 - 4 = -3 is clamped; the third column still factors
    let a = InputMatrix::from_f64(
        3,
        input,
        &[
            c(1.0, 0.0),
            c(2.0, 0.0),
            c(0.0, 0.0),
            c(2.0, 0.0),
            c(1.0, 0.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            c(4.0, 0.0),
        ],
    )
    .unwrap();
    let r = engine(3, input, input).factorize(&a).unwrap();
    assert_eq!(r.code(), 1);
    assert_eq!(r.status.clamped_columns(), &[1]);
    assert_eq!(r.factor.get(2, 1), ComplexFixed::ZERO);
    assert_eq!(r.factor.get(2, 2).to_f64(input), c(2.0, 0.0));
}

#[test]
fn test_repeated_runs_are_identical() {
    let dim = 17;
    let input = q(16, 4);
    let a = random_input(dim, input, 13);
    let e = engine(dim, input, q(16, 2));
    let first = e.factorize(&a).unwrap();
    for _ in 0..3 {
        let again = e.factorize(&a).unwrap();
        assert_eq!(again.factor, first.factor);
        assert_eq!(again.status, first.status);
        assert_eq!(again.diagnostics, first.diagnostics);
    }
}
