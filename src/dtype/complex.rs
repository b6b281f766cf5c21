//! Complex number types for the fixed-point kernel
//!
//! - [`ComplexFixed`]: interleaved (re, im) pair of raw [`Fixed`] scalars,
//!   the element type of every matrix in this crate
//! - [`WideComplex`]: exact `i128` pair holding a product before it is
//!   rounded back to a storage format
//! - [`Complex128`]: `f64` pair used for float interop and error analysis
//!
//! # Storage Format
//!
//! Complex numbers are stored in interleaved format (re, im, re, im...),
//! the same element order a hardware stream carries.
//!
//! # The 3-Multiplication Product
//!
//! The kernel computes `a · conj(b)` with three real multiplications:
//!
//! ```text
//! b'  = conj(b)             = (br, bi)
//! t1  = ar·br
//! t2  = ai·bi
//! t3  = (ar + ai)(br + bi)
//! re  = t1 − t2
//! im  = t3 − t1 − t2
//! ```
//!
//! All three products are exact in `i128`, so the identity introduces no
//! rounding of its own.

use super::fixed::{Fixed, Narrowed};
use super::format::FixedFormat;
use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Mul, Sub};

// ============================================================================
// ComplexFixed
// ============================================================================

/// Complex fixed-point value with raw real and imaginary parts.
///
/// Memory layout: [`Fixed`] × 2, interleaved format.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ComplexFixed {
    /// Real part
    pub re: Fixed,
    /// Imaginary part
    pub im: Fixed,
}

impl ComplexFixed {
    /// Zero complex number
    pub const ZERO: Self = Self {
        re: Fixed::ZERO,
        im: Fixed::ZERO,
    };

    /// Create a new complex number from raw parts
    #[inline]
    pub const fn new(re: Fixed, im: Fixed) -> Self {
        Self { re, im }
    }

    /// Purely real value
    #[inline]
    pub const fn real(re: Fixed) -> Self {
        Self { re, im: Fixed::ZERO }
    }

    /// Quantize a float pair into `format`
    pub fn from_f64(re: f64, im: f64, format: FixedFormat) -> Self {
        Self {
            re: format.from_f64(re),
            im: format.from_f64(im),
        }
    }

    /// Value of this element as floats, interpreting it in `format`
    pub fn to_f64(self, format: FixedFormat) -> Complex128 {
        Complex128::new(format.to_f64(self.re), format.to_f64(self.im))
    }

    /// Exact widened copy
    #[inline]
    pub const fn wide(self) -> WideComplex {
        WideComplex {
            re: self.re.wide(),
            im: self.im.wide(),
        }
    }
}

impl FixedFormat {
    /// Convert a complex value stored in `from` into this format.
    #[inline]
    pub fn convert_complex(self, z: ComplexFixed, from: FixedFormat) -> Narrowed<ComplexFixed> {
        let re = self.convert(z.re, from);
        let im = self.convert(z.im, from);
        Narrowed {
            value: ComplexFixed::new(re.value, im.value),
            saturations: re.saturations + im.saturations,
        }
    }

    /// Convert the conjugate of a value stored in `from` into this format.
    ///
    /// The imaginary part is negated exactly before it is narrowed, so each
    /// component is rounded and clamped once.
    #[inline]
    pub fn convert_conj(self, z: ComplexFixed, from: FixedFormat) -> Narrowed<ComplexFixed> {
        let re = self.convert(z.re, from);
        let im = self.requantize(-z.im.wide(), from.frac_bits());
        Narrowed {
            value: ComplexFixed::new(re.value, im.value),
            saturations: re.saturations + im.saturations,
        }
    }

    /// Scale both components by a real factor, rounding once per component
    #[inline]
    pub fn scale(self, z: ComplexFixed, factor: Fixed) -> Narrowed<ComplexFixed> {
        let re = self.mul(z.re, factor);
        let im = self.mul(z.im, factor);
        Narrowed {
            value: ComplexFixed::new(re.value, im.value),
            saturations: re.saturations + im.saturations,
        }
    }

    /// Round an exact complex product (twice the fraction width) into this format
    #[inline]
    pub fn round_complex_product(self, product: WideComplex) -> Narrowed<ComplexFixed> {
        let re = self.round_product(product.re);
        let im = self.round_product(product.im);
        Narrowed {
            value: ComplexFixed::new(re.value, im.value),
            saturations: re.saturations + im.saturations,
        }
    }
}

// ============================================================================
// WideComplex
// ============================================================================

/// Exact complex intermediate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct WideComplex {
    /// Real part
    pub re: i128,
    /// Imaginary part
    pub im: i128,
}

impl WideComplex {
    /// Zero complex number
    pub const ZERO: Self = Self { re: 0, im: 0 };

    /// Create a new wide complex number
    #[inline]
    pub const fn new(re: i128, im: i128) -> Self {
        Self { re, im }
    }

    /// Complex conjugate (exact; no range to saturate against)
    #[inline]
    pub const fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    /// Squared magnitude: re² + im²
    #[inline]
    pub const fn norm_sqr(self) -> i128 {
        self.re * self.re + self.im * self.im
    }

    /// `self · b` using three real multiplications
    ///
    /// Operands must hold at most 62 significant bits each so the sums
    /// `ar + ai` and `br + bi` and their product stay inside `i128`.
    #[inline]
    pub const fn mul_3m(self, b: Self) -> Self {
        let t1 = self.re * b.re;
        let t2 = self.im * b.im;
        let t3 = (self.re + self.im) * (b.re + b.im);
        Self {
            re: t1 - t2,
            im: t3 - t1 - t2,
        }
    }
}

impl Add for WideComplex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

// ============================================================================
// Complex128
// ============================================================================

/// 128-bit complex number with 64-bit float real and imaginary parts
///
/// Memory layout: f64 × 2, interleaved format.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Complex128 {
    /// Real part
    pub re: f64,
    /// Imaginary part
    pub im: f64,
}

impl Complex128 {
    /// Zero complex number
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    /// One (real unit)
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };

    /// Create a new complex number
    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Squared magnitude: |z|² = re² + im²
    #[inline]
    pub fn magnitude_squared(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Complex conjugate: conj(a + bi) = a - bi
    #[inline]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    /// Quantize into a fixed-point format
    #[inline]
    pub fn to_fixed(self, format: FixedFormat) -> ComplexFixed {
        ComplexFixed::from_f64(self.re, self.im, format)
    }
}

impl Add for Complex128 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Sub for Complex128 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl Mul for Complex128 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}
