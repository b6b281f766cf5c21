//! # fxchol
//!
//! **Fixed-point complex Cholesky factorization for streaming numeric pipelines.**
//!
//! fxchol factors a Hermitian positive semi-definite matrix `A` of complex
//! fixed-point values into a triangular `L` with `A ≈ L · L^H`, entirely in
//! saturating integer arithmetic. Input, working and output precisions are
//! runtime formats; the working format is derived from the input format with
//! enough headroom to absorb a full column of multiply-accumulates.
//!
//! ## Why fxchol?
//!
//! - **Bit-exact**: the same input and configuration always produce the same output
//! - **Never aborts**: non-positive pivots are clamped and reported as a status
//! - **Portable parallelism**: row lanes run sequentially or on rayon with identical results
//!
//! ## Features
//!
//! - **Formats**: any `<width, int_bits>` up to 64 bits, rounding and saturating conversions
//! - **Reciprocal square root**: fast `f32` or Newton–Raphson refined at extended width
//! - **Emission**: lower triangle `L` or conjugate transpose `L^H`
//! - **Diagnostics**: clamped columns, saturation counters, tolerance misses
//!
//! ## Quick Start
//!
//! ```
//! use fxchol::prelude::*;
//!
//! let input = FixedFormat::new(16, 4)?;
//! let engine = CholeskyConfig::new(2, input, input).build()?;
//!
//! // A = [[4, 2+2i], [2-2i, 3]]
//! let c = |re, im| Complex128::new(re, im).to_fixed(input);
//! let a = engine.ingest([c(4.0, 0.0), c(2.0, 2.0), c(2.0, -2.0), c(3.0, 0.0)])?;
//!
//! let result = engine.factorize(&a)?;
//! assert_eq!(result.code(), 0);
//! assert_eq!(result.factor.get(1, 0).to_f64(input), Complex128::new(1.0, -1.0));
//! # Ok::<(), fxchol::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded row lanes inside each column

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod config;
pub mod dtype;
pub mod engine;
pub mod error;
pub mod matrix;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::{Execution, FactorDiagnostics, FactorStatus, RsqrtStrategy};
    pub use crate::config::{CholeskyConfig, Triangle};
    pub use crate::dtype::{Complex128, ComplexFixed, Fixed, FixedFormat};
    pub use crate::engine::{CholeskyEngine, Factorization};
    pub use crate::error::{Error, Result};
    pub use crate::matrix::{InputMatrix, OutputFactor, SquareMatrix, WorkingFactor};
}
