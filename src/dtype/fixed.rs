//! Raw fixed-point scalar and format-bound arithmetic
//!
//! [`Fixed`] is a bare two's-complement integer: it does not know its own
//! format. Arithmetic is performed through a [`FixedFormat`], which supplies
//! the fraction width for rounding and the range for saturation:
//!
//! ```
//! use fxchol::dtype::FixedFormat;
//!
//! let q = FixedFormat::new(32, 16).unwrap();
//! let a = q.from_f64(1.5);
//! let b = q.from_f64(-2.25);
//! assert_eq!(q.to_f64(q.mul(a, b).value), -3.375);
//! ```
//!
//! Every operation returns a [`Narrowed`] value so callers can account for
//! saturation without changing the numeric result.

use super::format::FixedFormat;
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Raw two's-complement fixed-point scalar.
///
/// Memory layout: transparent `i64`.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Fixed(i64);

impl Fixed {
    /// Zero value
    pub const ZERO: Self = Self(0);

    /// Create from raw bits
    #[inline]
    pub const fn from_bits(bits: i64) -> Self {
        Self(bits)
    }

    /// Get raw bits
    #[inline]
    pub const fn to_bits(self) -> i64 {
        self.0
    }

    /// Raw bits widened for exact intermediate arithmetic
    #[inline]
    pub const fn wide(self) -> i128 {
        self.0 as i128
    }

    /// Check if this value is zero
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check if this value is strictly negative
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Check if this value is strictly positive
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({:#x})", self.0)
    }
}

/// Outcome of a narrowing operation.
///
/// `saturations` counts clamped scalar components: 0 or 1 for a [`Fixed`],
/// 0 to 2 for a complex value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Narrowed<T> {
    /// The rounded, clamped value
    pub value: T,
    /// Number of components whose exact result lay outside the target range
    pub saturations: u64,
}

impl<T> Narrowed<T> {
    /// A value that fit without clamping
    #[inline]
    pub const fn exact(value: T) -> Self {
        Self {
            value,
            saturations: 0,
        }
    }

    /// A scalar that had to be clamped
    #[inline]
    pub const fn clamped(value: T) -> Self {
        Self {
            value,
            saturations: 1,
        }
    }

    /// Whether any component was clamped
    #[inline]
    pub const fn is_saturated(&self) -> bool {
        self.saturations > 0
    }

    /// Add this narrowing's saturations to `count` and return the value.
    #[inline]
    pub fn tally(self, count: &mut u64) -> T {
        *count += self.saturations;
        self.value
    }
}

impl FixedFormat {
    /// `a - b`
    #[inline]
    pub fn sub(self, a: Fixed, b: Fixed) -> Narrowed<Fixed> {
        self.narrow(a.wide() - b.wide())
    }

    /// `a * b`, rounded once to this format
    #[inline]
    pub fn mul(self, a: Fixed, b: Fixed) -> Narrowed<Fixed> {
        self.round_product(a.wide() * b.wide())
    }

    /// Round an exact product of two values in this format (twice the
    /// fraction width) back to this format.
    #[inline]
    pub fn round_product(self, product: i128) -> Narrowed<Fixed> {
        self.requantize(product, 2 * self.frac_bits())
    }

    /// `a / 2`, rounded
    #[inline]
    pub fn halve(self, a: Fixed) -> Narrowed<Fixed> {
        self.requantize(a.wide(), self.frac_bits() + 1)
    }
}
