//! Common test utilities
#![allow(dead_code)]

use fxchol::algorithm::{ReciprocalSqrt, RsqrtStrategy};
use fxchol::dtype::{Complex128, ComplexFixed, Fixed, FixedFormat};
use fxchol::matrix::{InputMatrix, WorkingFactor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Shorthand for a validated format
pub fn q(width: u32, int_bits: u32) -> FixedFormat {
    FixedFormat::new(width, int_bits).unwrap()
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two complex slices are close, component-wise
pub fn assert_allclose_c128(a: &[Complex128], b: &[Complex128], rtol: f64, atol: f64, msg: &str) {
    let flat = |v: &[Complex128]| v.iter().flat_map(|z| [z.re, z.im]).collect::<Vec<_>>();
    assert_allclose_f64(&flat(a), &flat(b), rtol, atol, msg);
}

/// Largest component-wise absolute difference
pub fn max_abs_diff(a: &[Complex128], b: &[Complex128]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x.re - y.re).abs().max((x.im - y.im).abs()))
        .fold(0.0, f64::max)
}

// ============================================================================
// Random Hermitian positive definite inputs
// ============================================================================

/// `B · B^H / dim + shift · I` with `B` complex Gaussian scaled by `sigma`.
///
/// The smallest eigenvalue is at least `shift`.
pub fn random_hpd(dim: usize, sigma: f64, shift: f64, seed: u64) -> Vec<Complex128> {
    let mut rng = StdRng::seed_from_u64(seed);
    let b: Vec<Complex128> = (0..dim * dim)
        .map(|_| {
            let re: f64 = rng.sample(StandardNormal);
            let im: f64 = rng.sample(StandardNormal);
            Complex128::new(re * sigma, im * sigma)
        })
        .collect();

    let mut a = vec![Complex128::ZERO; dim * dim];
    for i in 0..dim {
        for j in 0..=i {
            let mut sum = Complex128::ZERO;
            for k in 0..dim {
                sum = sum + b[i * dim + k] * b[j * dim + k].conj();
            }
            let mut v = Complex128::new(sum.re / dim as f64, sum.im / dim as f64);
            if i == j {
                v = Complex128::new(v.re + shift, 0.0);
            }
            a[i * dim + j] = v;
            a[j * dim + i] = v.conj();
        }
    }
    a
}

/// Random HPD matrix quantized into `format`
pub fn random_input(dim: usize, format: FixedFormat, seed: u64) -> InputMatrix {
    InputMatrix::from_f64(dim, format, &random_hpd(dim, 0.5, 0.5, seed)).unwrap()
}

/// `max · ((1 − eps) · u · u^H + eps · I)` with unit-modulus `u`.
///
/// Every diagonal entry equals `max`, every off-diagonal magnitude is
/// `(1 − eps) · max`, a fraction `1 − eps` of the Cauchy–Schwarz limit
/// `sqrt(A[i][i] · A[j][j])`. The smallest eigenvalue is `eps · max`.
pub fn top_of_range_hpd(dim: usize, max: f64, eps: f64) -> Vec<Complex128> {
    let u: Vec<Complex128> = (0..dim)
        .map(|k| {
            let phi = 0.7 * k as f64;
            Complex128::new(phi.cos(), phi.sin())
        })
        .collect();
    let mut a = vec![Complex128::ZERO; dim * dim];
    for i in 0..dim {
        for j in 0..dim {
            a[i * dim + j] = if i == j {
                Complex128::new(max, 0.0)
            } else {
                let z = u[i] * u[j].conj();
                let s = (1.0 - eps) * max;
                Complex128::new(z.re * s, z.im * s)
            };
        }
    }
    a
}

/// Rank-one `v · v^H` with dyadic entries, exact in any format with 8+ fraction bits
pub fn rank_one(dim: usize) -> Vec<Complex128> {
    let pool = [
        Complex128::new(1.0, 0.0),
        Complex128::new(0.5, 0.5),
        Complex128::new(-0.25, 0.0),
        Complex128::new(0.0, 0.5),
        Complex128::new(0.75, -0.25),
    ];
    let v: Vec<Complex128> = (0..dim).map(|k| pool[k % pool.len()]).collect();
    let mut a = vec![Complex128::ZERO; dim * dim];
    for i in 0..dim {
        for j in 0..dim {
            a[i * dim + j] = v[i] * v[j].conj();
        }
    }
    a
}

// ============================================================================
// References
// ============================================================================

/// Straightforward `f64` Cholesky; returns `L` row-major with a zero upper triangle.
pub fn reference_cholesky_f64(a: &[Complex128], dim: usize) -> Vec<Complex128> {
    let mut l = vec![Complex128::ZERO; dim * dim];
    for j in 0..dim {
        let mut d = a[j * dim + j].re;
        for p in 0..j {
            d -= l[j * dim + p].magnitude_squared();
        }
        let d = d.max(0.0).sqrt();
        l[j * dim + j] = Complex128::new(d, 0.0);
        for i in (j + 1)..dim {
            let mut acc = a[i * dim + j];
            for p in 0..j {
                acc = acc - l[i * dim + p] * l[j * dim + p].conj();
            }
            l[i * dim + j] = if d > 0.0 {
                Complex128::new(acc.re / d, acc.im / d)
            } else {
                Complex128::ZERO
            };
        }
    }
    l
}

/// Untiled fixed-point column loop: every product is rounded and subtracted
/// on its own, one completed column at a time.
pub fn reference_cholesky_fixed(
    a: &InputMatrix,
    working: FixedFormat,
    strategy: RsqrtStrategy,
) -> WorkingFactor {
    let n = a.dim();
    let input = a.format();
    let rsqrt = ReciprocalSqrt::new(strategy, working).unwrap();
    let mut l = vec![ComplexFixed::ZERO; n * n];

    for j in 0..n {
        let mut diag = working.convert(a.get(j, j).re, input).value;
        for p in 0..j {
            let sq = working.round_product(l[j * n + p].wide().norm_sqr()).value;
            diag = working.sub(diag, sq).value;
        }
        if !diag.is_positive() {
            diag = Fixed::ZERO;
        }
        let inv = rsqrt.compute(diag).value;
        l[j * n + j] = ComplexFixed::real(working.mul(diag, inv).value);

        for i in (j + 1)..n {
            let mut acc = working.convert_complex(a.get(i, j), input).value;
            for p in 0..j {
                let prod = l[i * n + p].wide().mul_3m(l[j * n + p].wide().conj());
                let prod = working.round_complex_product(prod).value;
                acc = ComplexFixed::new(
                    working.sub(acc.re, prod.re).value,
                    working.sub(acc.im, prod.im).value,
                );
            }
            l[i * n + j] = working.scale(acc, inv).value;
        }
    }
    WorkingFactor::from_elements(n, working, l).unwrap()
}
