//! Error types for fxchol

use crate::dtype::FixedFormat;
use thiserror::Error;

/// Result type alias using fxchol's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when configuring or feeding the factorization engine
///
/// Numeric anomalies inside the kernel (non-positive pivots, saturation) are
/// never reported here; they resolve to clamped values and to the aggregate
/// [`FactorStatus`](crate::algorithm::cholesky::FactorStatus).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A fixed-point format cannot be represented
    #[error("Invalid fixed-point format <{width}, {int_bits}>: {reason}")]
    InvalidFormat {
        /// Total width in bits
        width: u32,
        /// Integer width in bits (sign included)
        int_bits: u32,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid argument provided to the engine configuration
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// The element sequence ended before a full matrix was read
    #[error("Input sequence too short: expected {expected} elements, got {got}")]
    ShortInput {
        /// Number of elements required (order squared)
        expected: usize,
        /// Number of elements actually received
        got: usize,
    },

    /// A matrix of the wrong order was handed to the engine
    #[error("Shape mismatch: expected order {expected}, got {got}")]
    ShapeMismatch {
        /// Matrix order the engine was configured for
        expected: usize,
        /// Order of the matrix received
        got: usize,
    },

    /// A matrix stored in a different fixed-point format was handed to the engine
    #[error("Format mismatch: expected {expected}, got {got}")]
    FormatMismatch {
        /// Format the engine was configured for
        expected: FixedFormat,
        /// Format of the matrix received
        got: FixedFormat,
    },
}

impl Error {
    /// Create an invalid format error
    pub fn invalid_format(width: u32, int_bits: u32, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            width,
            int_bits,
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
