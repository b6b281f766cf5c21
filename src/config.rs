//! Engine configuration
//!
//! Everything about a factorization is fixed when the engine is built:
//! matrix order, triangle shape, numeric formats, tile and lane widths, the
//! reciprocal square root strategy and the execution strategy.
//!
//! ```
//! use fxchol::prelude::*;
//!
//! let input = FixedFormat::new(16, 2).unwrap();
//! let output = FixedFormat::new(16, 4).unwrap();
//! let engine = CholeskyConfig::new(8, input, output)
//!     .with_triangle(Triangle::Upper)
//!     .with_rsqrt(RsqrtStrategy::Fast)
//!     .build()
//!     .unwrap();
//! assert_eq!(engine.working_format(), FixedFormat::new(32, 16).unwrap());
//! ```

use crate::algorithm::{Execution, KernelParams, RsqrtStrategy};
use crate::dtype::FixedFormat;
use crate::engine::CholeskyEngine;
use crate::error::{Error, Result};
use std::fmt;

/// Which triangle the engine emits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Triangle {
    /// `L`: lower triangle and diagonal
    #[default]
    Lower,
    /// `U = L^H`: conjugate transpose, upper triangle and diagonal
    Upper,
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Triangle::Lower => write!(f, "lower"),
            Triangle::Upper => write!(f, "upper"),
        }
    }
}

/// Configuration of a [`CholeskyEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyConfig {
    /// Matrix order
    pub dim: usize,

    /// Emitted triangle (default: lower)
    pub triangle: Triangle,

    /// Format of ingested elements
    pub input: FixedFormat,

    /// Format of emitted elements
    pub output: FixedFormat,

    /// Working format override; derived from `input` when `None`
    pub working: Option<FixedFormat>,

    /// Completed columns reduced per tile (default: 6)
    pub tile_width: usize,

    /// Rows per lane group (default: 16)
    pub row_unroll: usize,

    /// Reciprocal square root strategy (default: refined)
    pub rsqrt: RsqrtStrategy,

    /// Reciprocal square root tolerance override; strategy default when `None`
    pub rsqrt_tolerance: Option<f64>,

    /// Row-lane execution strategy (default: sequential)
    pub execution: Execution,
}

impl CholeskyConfig {
    /// Default tile width
    pub const DEFAULT_TILE_WIDTH: usize = 6;

    /// Default row lane group size
    pub const DEFAULT_ROW_UNROLL: usize = 16;

    /// Upper bound on tile width and row lane group size
    pub const MAX_LANES: usize = 64;

    /// Configuration with defaults for everything but order and formats
    pub fn new(dim: usize, input: FixedFormat, output: FixedFormat) -> Self {
        Self {
            dim,
            triangle: Triangle::default(),
            input,
            output,
            working: None,
            tile_width: Self::DEFAULT_TILE_WIDTH,
            row_unroll: Self::DEFAULT_ROW_UNROLL,
            rsqrt: RsqrtStrategy::default(),
            rsqrt_tolerance: None,
            execution: Execution::default(),
        }
    }

    /// Set the emitted triangle
    pub fn with_triangle(mut self, triangle: Triangle) -> Self {
        self.triangle = triangle;
        self
    }

    /// Override the derived working format
    pub fn with_working_format(mut self, working: FixedFormat) -> Self {
        self.working = Some(working);
        self
    }

    /// Set the tile width
    pub fn with_tile_width(mut self, tile_width: usize) -> Self {
        self.tile_width = tile_width;
        self
    }

    /// Set the row lane group size
    pub fn with_row_unroll(mut self, row_unroll: usize) -> Self {
        self.row_unroll = row_unroll;
        self
    }

    /// Set the reciprocal square root strategy
    pub fn with_rsqrt(mut self, strategy: RsqrtStrategy) -> Self {
        self.rsqrt = strategy;
        self
    }

    /// Override the reciprocal square root tolerance
    pub fn with_rsqrt_tolerance(mut self, tolerance: f64) -> Self {
        self.rsqrt_tolerance = Some(tolerance);
        self
    }

    /// Set the execution strategy
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Working format: the override if set, otherwise derived from `input`.
    pub fn working_format(&self) -> Result<FixedFormat> {
        match self.working {
            Some(working) => working.validate_working(),
            None => self.input.derive_working(),
        }
    }

    /// Check every parameter and resolve the kernel parameters.
    pub fn validate(&self) -> Result<KernelParams> {
        if self.dim == 0 {
            return Err(Error::invalid_argument("dim", "matrix order must be positive"));
        }
        check_lanes("tile_width", self.tile_width)?;
        check_lanes("row_unroll", self.row_unroll)?;
        if let Some(tol) = self.rsqrt_tolerance {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(Error::invalid_argument(
                    "rsqrt_tolerance",
                    format!("must be finite and non-negative, got {}", tol),
                ));
            }
        }
        Ok(KernelParams {
            working: self.working_format()?,
            tile_width: self.tile_width,
            row_unroll: self.row_unroll,
            execution: self.execution,
        })
    }

    /// Validate and build the engine
    pub fn build(self) -> Result<CholeskyEngine> {
        CholeskyEngine::new(self)
    }
}

fn check_lanes(arg: &'static str, value: usize) -> Result<()> {
    if value == 0 || value > CholeskyConfig::MAX_LANES {
        return Err(Error::invalid_argument(
            arg,
            format!(
                "must be in 1..={}, got {}",
                CholeskyConfig::MAX_LANES,
                value
            ),
        ));
    }
    Ok(())
}
