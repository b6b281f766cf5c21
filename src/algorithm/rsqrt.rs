//! Reciprocal square root in working precision
//!
//! Two interchangeable strategies compute `1/sqrt(v)` for a non-negative
//! working-precision value `v`:
//!
//! | Strategy | Method | Accuracy limit |
//! |----------|--------|----------------|
//! | [`Fast`](RsqrtStrategy::Fast) | `f32` reciprocal square root, rounded into the working format | `f32` (~2⁻²³ relative) |
//! | [`Refined`](RsqrtStrategy::Refined) | `f32` seed plus one Newton–Raphson step at extended width | working LSB |
//!
//! The Newton step is
//!
//! ```text
//! y1 = y0 · (1.5 − 0.5 · m · y0²)
//! ```
//!
//! evaluated in the working format's [`extended`](FixedFormat::extended)
//! sibling (4 more integer bits, 4 more fraction bits). Before the step the
//! operand is normalized, `v = m · 4^e` with `m ∈ [0.25, 1)`, so every
//! intermediate stays near unity; the result is scaled back by `2^-e` when it
//! is rounded into the working format.
//!
//! Both strategies return exactly zero for `v <= 0`.
//!
//! # Tolerance Contract
//!
//! For a result `y` that did not saturate:
//!
//! ```text
//! |y² · v − 1| <= tolerance + lsb · sqrt(v)
//! ```
//!
//! The second term is the unavoidable effect of rounding `y` to the working
//! LSB. `tolerance` is configurable; see [`default_tolerance`].

use crate::dtype::format::round_shift;
use crate::dtype::{Fixed, FixedFormat, Narrowed};
use crate::error::Result;
use std::fmt;

/// Approximation error floor of the `f32` reciprocal square root
pub const FAST_TOLERANCE: f64 = 1.0 / (1u64 << 20) as f64;

/// Selects how the reciprocal square root is evaluated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RsqrtStrategy {
    /// Single `f32` evaluation, narrowed to the working format
    Fast,
    /// `f32` seed refined by one Newton–Raphson step at extended width
    #[default]
    Refined,
}

impl fmt::Display for RsqrtStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsqrtStrategy::Fast => write!(f, "fast"),
            RsqrtStrategy::Refined => write!(f, "refined"),
        }
    }
}

/// Default contract tolerance for a strategy in a working format.
pub fn default_tolerance(strategy: RsqrtStrategy, working: FixedFormat) -> f64 {
    let rounding = 16.0 * working.lsb();
    match strategy {
        RsqrtStrategy::Fast => FAST_TOLERANCE + rounding,
        RsqrtStrategy::Refined => rounding,
    }
}

/// Reciprocal square root engine bound to one working format.
#[derive(Clone, Debug)]
pub struct ReciprocalSqrt {
    strategy: RsqrtStrategy,
    working: FixedFormat,
    extended: FixedFormat,
    tolerance: f64,
    three_halves: Fixed,
}

impl ReciprocalSqrt {
    /// Create an engine for `working` using the strategy's default tolerance.
    pub fn new(strategy: RsqrtStrategy, working: FixedFormat) -> Result<Self> {
        let working = working.validate_working()?;
        let extended = working.extended()?;
        Ok(Self {
            strategy,
            working,
            extended,
            tolerance: default_tolerance(strategy, working),
            three_halves: extended.from_f64(1.5),
        })
    }

    /// Override the contract tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Strategy in use
    pub fn strategy(&self) -> RsqrtStrategy {
        self.strategy
    }

    /// Working format results are produced in
    pub fn working_format(&self) -> FixedFormat {
        self.working
    }

    /// Contract tolerance in use
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Compute `1/sqrt(value)`; zero for non-positive input.
    ///
    /// The result is saturated when the true inverse exceeds the working
    /// range (pivots below roughly `2^-2(I-1)`).
    pub fn compute(&self, value: Fixed) -> Narrowed<Fixed> {
        if !value.is_positive() {
            return Narrowed::exact(Fixed::ZERO);
        }
        match self.strategy {
            RsqrtStrategy::Fast => self.fast(value),
            RsqrtStrategy::Refined => self.refined(value),
        }
    }

    /// `|y² · v − 1|` evaluated in `f64`
    pub fn residual(&self, value: Fixed, inv: Fixed) -> f64 {
        let v = self.working.to_f64(value);
        let y = self.working.to_f64(inv);
        (y * y * v - 1.0).abs()
    }

    /// Whether `inv` satisfies the tolerance contract for `value`.
    pub fn meets_tolerance(&self, value: Fixed, inv: Fixed) -> bool {
        let v = self.working.to_f64(value);
        self.residual(value, inv) <= self.tolerance + self.working.lsb() * v.sqrt()
    }

    fn fast(&self, value: Fixed) -> Narrowed<Fixed> {
        let v = self.working.to_f64(value) as f32;
        self.working.quantize(v.sqrt().recip() as f64)
    }

    fn refined(&self, value: Fixed) -> Narrowed<Fixed> {
        let ext = self.extended;
        let (m, e) = self.normalize(value);
        let mut sat = 0;

        let seed = (ext.to_f64(m) as f32).sqrt().recip();
        let y0 = ext.quantize(seed as f64).tally(&mut sat);

        let y0_sq = ext.mul(y0, y0).tally(&mut sat);
        let t = ext.mul(m, y0_sq).tally(&mut sat);
        let half_t = ext.halve(t).tally(&mut sat);
        let s = ext.sub(self.three_halves, half_t).tally(&mut sat);
        let y1 = ext.mul(y0, s).tally(&mut sat);

        // y = y1 · 2^-e: reinterpret y1's raw bits with e extra fraction bits
        let from_frac = (ext.frac_bits() as i64 + e as i64) as u32;
        let out = self.working.requantize(y1.wide(), from_frac);
        Narrowed {
            value: out.value,
            saturations: u64::from(out.is_saturated() || sat > 0),
        }
    }

    /// Split a positive working value into `m · 4^e` with `m ∈ [0.25, 1)`,
    /// `m` expressed in the extended format.
    fn normalize(&self, value: Fixed) -> (Fixed, i32) {
        let raw = value.wide();
        let bit_len = (128 - raw.leading_zeros()) as i32;
        let p = bit_len - self.working.frac_bits() as i32;
        let e = (p + 1).div_euclid(2);

        // m_raw = raw · 2^(F_ext − F − 2e)
        let shift = (self.extended.frac_bits() as i32) - (self.working.frac_bits() as i32) - 2 * e;
        let m_raw = if shift >= 0 {
            raw << shift
        } else {
            round_shift(raw, (-shift) as u32)
        };
        (self.extended.narrow(m_raw).value, e)
    }
}
