//! Fixed-point format declarations, precision derivation and narrowing
//!
//! A [`FixedFormat`] is the runtime description of a two's-complement
//! fixed-point scalar: `width` total bits of which `int_bits` (sign included)
//! sit left of the binary point. The remaining `width - int_bits` bits are
//! fraction bits.
//!
//! # Rounding and Saturation
//!
//! Every narrowing in this crate, inside the kernel and at emission, follows
//! the same two rules:
//!
//! - **Rounding**: round half toward +∞ (add half an LSB, then shift right
//!   arithmetically)
//! - **Saturation**: values outside `[min_value, max_value]` clamp to the
//!   nearest extreme; they never wrap
//!
//! # Working Precision
//!
//! The accumulator format is derived from the declared input format:
//!
//! ```text
//! width    = max(32, W_in + 8)
//! int_bits = max(16, I_in + 4)
//! ```
//!
//! # Example
//!
//! ```
//! use fxchol::dtype::FixedFormat;
//!
//! let input = FixedFormat::new(16, 2).unwrap();
//! let working = input.derive_working().unwrap();
//! assert_eq!((working.width(), working.int_bits()), (32, 16));
//!
//! let x = input.from_f64(0.75);
//! assert_eq!(input.to_f64(x), 0.75);
//! ```

use super::fixed::{Fixed, Narrowed};
use crate::error::{Error, Result};
use std::fmt;

/// Arithmetic shift right by `shift` bits, rounding half toward +∞.
#[inline]
pub(crate) fn round_shift(value: i128, shift: u32) -> i128 {
    match shift {
        0 => value,
        s if s >= 126 => 0,
        s => (value + (1i128 << (s - 1))) >> s,
    }
}

/// Declared fixed-point scalar format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixedFormat {
    width: u32,
    int_bits: u32,
}

impl FixedFormat {
    /// Widest storable format (values live in an `i64`)
    pub const MAX_WIDTH: u32 = 64;

    /// Widest working format; the refined reciprocal square root runs
    /// [`WIDTH_HEADROOM`](Self::WIDTH_HEADROOM) bits wider and must still fit
    /// in [`MAX_WIDTH`](Self::MAX_WIDTH).
    pub const MAX_WORKING_WIDTH: u32 = Self::MAX_WIDTH - Self::WIDTH_HEADROOM;

    /// Lower bound on the derived working width
    pub const MIN_WORKING_WIDTH: u32 = 32;

    /// Lower bound on the derived working integer width
    pub const MIN_WORKING_INT_BITS: u32 = 16;

    /// Extra total bits granted to the working format over the input format
    pub const WIDTH_HEADROOM: u32 = 8;

    /// Extra integer bits granted to the working format over the input format
    pub const INT_HEADROOM: u32 = 4;

    /// Create a validated format.
    ///
    /// Requires `1 <= int_bits <= width <= 64`.
    pub fn new(width: u32, int_bits: u32) -> Result<Self> {
        if width == 0 || width > Self::MAX_WIDTH {
            return Err(Error::invalid_format(
                width,
                int_bits,
                format!("width must be in 1..={}", Self::MAX_WIDTH),
            ));
        }
        if int_bits == 0 || int_bits > width {
            return Err(Error::invalid_format(
                width,
                int_bits,
                "integer width must be in 1..=width (the sign bit counts)",
            ));
        }
        Ok(Self { width, int_bits })
    }

    /// Total width in bits
    #[inline]
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Integer width in bits, sign included
    #[inline]
    pub const fn int_bits(self) -> u32 {
        self.int_bits
    }

    /// Fraction width in bits
    #[inline]
    pub const fn frac_bits(self) -> u32 {
        self.width - self.int_bits
    }

    /// Derive the working (accumulator) format for this input format.
    ///
    /// Fails when the derived width exceeds
    /// [`MAX_WORKING_WIDTH`](Self::MAX_WORKING_WIDTH).
    pub fn derive_working(self) -> Result<Self> {
        let width = Self::MIN_WORKING_WIDTH.max(self.width + Self::WIDTH_HEADROOM);
        let int_bits = Self::MIN_WORKING_INT_BITS.max(self.int_bits + Self::INT_HEADROOM);
        Self::new(width, int_bits)?.validate_working()
    }

    /// Check that this format can serve as a working format.
    pub fn validate_working(self) -> Result<Self> {
        if self.width > Self::MAX_WORKING_WIDTH {
            return Err(Error::invalid_format(
                self.width,
                self.int_bits,
                format!(
                    "working width must not exceed {} bits",
                    Self::MAX_WORKING_WIDTH
                ),
            ));
        }
        Ok(self)
    }

    /// Format with [`INT_HEADROOM`](Self::INT_HEADROOM) more integer bits and
    /// as many more fraction bits.
    pub fn extended(self) -> Result<Self> {
        Self::new(
            self.width + 2 * Self::INT_HEADROOM,
            self.int_bits + Self::INT_HEADROOM,
        )
    }

    /// Largest raw value
    #[inline]
    pub const fn max_raw(self) -> i64 {
        if self.width == 64 {
            i64::MAX
        } else {
            (1i64 << (self.width - 1)) - 1
        }
    }

    /// Smallest (most negative) raw value
    #[inline]
    pub const fn min_raw(self) -> i64 {
        if self.width == 64 {
            i64::MIN
        } else {
            -(1i64 << (self.width - 1))
        }
    }

    /// Weight of the least significant bit
    #[inline]
    pub fn lsb(self) -> f64 {
        (-(self.frac_bits() as f64)).exp2()
    }

    /// Largest representable value
    pub fn max_value(self) -> f64 {
        self.max_raw() as f64 * self.lsb()
    }

    /// Smallest (most negative) representable value
    pub fn min_value(self) -> f64 {
        self.min_raw() as f64 * self.lsb()
    }

    /// Whether a raw value lies inside this format's range
    #[inline]
    pub fn contains(self, value: Fixed) -> bool {
        (self.min_raw()..=self.max_raw()).contains(&value.to_bits())
    }

    /// Clamp a raw value (already at this format's fraction width) into range.
    #[inline]
    pub fn narrow(self, raw: i128) -> Narrowed<Fixed> {
        let (lo, hi) = (self.min_raw() as i128, self.max_raw() as i128);
        if raw > hi {
            Narrowed::clamped(Fixed::from_bits(self.max_raw()))
        } else if raw < lo {
            Narrowed::clamped(Fixed::from_bits(self.min_raw()))
        } else {
            Narrowed::exact(Fixed::from_bits(raw as i64))
        }
    }

    /// Bring a raw value carrying `from_frac` fraction bits into this format,
    /// rounding dropped bits and saturating out-of-range results.
    pub fn requantize(self, raw: i128, from_frac: u32) -> Narrowed<Fixed> {
        let to_frac = self.frac_bits();
        if to_frac >= from_frac {
            let shift = to_frac - from_frac;
            let limit = i128::MAX >> shift;
            if raw > limit {
                return self.narrow(i128::MAX);
            }
            if raw < -limit {
                return self.narrow(i128::MIN);
            }
            self.narrow(raw << shift)
        } else {
            self.narrow(round_shift(raw, from_frac - to_frac))
        }
    }

    /// Convert a value stored in `from` into this format.
    #[inline]
    pub fn convert(self, value: Fixed, from: FixedFormat) -> Narrowed<Fixed> {
        self.requantize(value.wide(), from.frac_bits())
    }

    /// Quantize a float into this format, reporting saturation.
    ///
    /// NaN maps to zero; infinities saturate.
    pub fn quantize(self, value: f64) -> Narrowed<Fixed> {
        if value.is_nan() {
            return Narrowed::exact(Fixed::ZERO);
        }
        let scaled = value * (self.frac_bits() as f64).exp2();
        // Float-to-int `as` saturates at the i128 bounds
        self.narrow((scaled + 0.5).floor() as i128)
    }

    /// Quantize a float into this format (rounded, saturated).
    #[inline]
    pub fn from_f64(self, value: f64) -> Fixed {
        self.quantize(value).value
    }

    /// Real value of a raw scalar stored in this format
    #[inline]
    pub fn to_f64(self, value: Fixed) -> f64 {
        value.to_bits() as f64 * self.lsb()
    }
}

impl fmt::Display for FixedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.width, self.int_bits)
    }
}
