//! Column-wise fixed-point Cholesky factorization
//!
//! For a Hermitian positive semi-definite `A`, computes lower-triangular `L`
//! with `A ≈ L · L^H` in working precision.
//!
//! # Algorithm
//!
//! ```text
//! for j in 0..n:                                   (strictly sequential)
//!     diag   = Re(A[j][j])
//!     acc[i] = A[i][j]                  for i > j
//!     for tile in tiles([0, j), tile_width):       (one combined pass)
//!         b[p]    = conj(L[j][p])
//!         diag   -= Σ |L[j][p]|²
//!         acc[i] -= Σ L[i][p] · b[p]    for i > j  (row lanes, 3-mult product)
//!     if diag <= 0: diag = 0, flag column j
//!     inv     = rsqrt(diag)                        (0 when diag == 0)
//!     L[j][j] = (diag · inv, 0)
//!     L[i][j] = acc[i] · inv            for i > j
//! ```
//!
//! Column `j` only reads columns `< j`, each finalized at the end of its own
//! iteration and never written again. The strict upper triangle of `L` is
//! neither written nor read.
//!
//! # Rank Deficiency
//!
//! A non-positive pivot never aborts the factorization. It is clamped to
//! zero, its reciprocal is zero, so the column's sub-diagonal entries become
//! zero, and the column index is recorded in [`FactorStatus`]. All columns
//! are always processed.
//!
//! # Module Structure
//!
//! - `tiling`: tile ranges over the completed columns
//! - `pass`: the per-column tiled reduction and its execution strategies

mod pass;
mod tiling;

pub use pass::Execution;

use pass::ColumnPass;

use super::rsqrt::ReciprocalSqrt;
use crate::dtype::{ComplexFixed, Fixed, FixedFormat};
use crate::matrix::{InputMatrix, WorkingFactor};
use log::{debug, warn};
use std::fmt;

/// Aggregate outcome of one factorization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FactorStatus {
    /// Every pivot stayed strictly positive
    #[default]
    PositiveDefinite,
    /// At least one pivot was non-positive and clamped to zero
    RankDeficient {
        /// Indices of the clamped columns, ascending
        columns: Vec<usize>,
    },
}

impl FactorStatus {
    /// Integer status code: 0 for positive definite, 1 otherwise
    pub fn code(&self) -> i32 {
        match self {
            FactorStatus::PositiveDefinite => 0,
            FactorStatus::RankDeficient { .. } => 1,
        }
    }

    /// Whether every pivot stayed positive
    pub fn is_positive_definite(&self) -> bool {
        matches!(self, FactorStatus::PositiveDefinite)
    }

    /// Columns whose pivot was clamped
    pub fn clamped_columns(&self) -> &[usize] {
        match self {
            FactorStatus::PositiveDefinite => &[],
            FactorStatus::RankDeficient { columns } => columns,
        }
    }

    fn from_columns(columns: Vec<usize>) -> Self {
        if columns.is_empty() {
            FactorStatus::PositiveDefinite
        } else {
            FactorStatus::RankDeficient { columns }
        }
    }
}

impl fmt::Display for FactorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorStatus::PositiveDefinite => write!(f, "positive definite"),
            FactorStatus::RankDeficient { columns } => {
                write!(f, "rank deficient (columns {:?})", columns)
            }
        }
    }
}

/// Counters for lossy events that do not change the status.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FactorDiagnostics {
    /// Values clamped at working width (including input conversion)
    pub working_saturations: u64,
    /// Values clamped when narrowing to the output format
    pub output_saturations: u64,
    /// Pivots whose reciprocal square root missed the tolerance contract
    pub rsqrt_misses: u64,
}

/// Kernel parameters resolved from the engine configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KernelParams {
    /// Accumulator format
    pub working: FixedFormat,
    /// Completed columns reduced per tile
    pub tile_width: usize,
    /// Rows per lane group
    pub row_unroll: usize,
    /// Row-lane execution strategy
    pub execution: Execution,
}

/// Result of the column loop, before emission.
#[derive(Clone, Debug)]
pub struct WorkingFactorization {
    /// `L` at working precision
    pub factor: WorkingFactor,
    /// Aggregate pivot status
    pub status: FactorStatus,
    /// Working-precision counters (`output_saturations` is zero here)
    pub diagnostics: FactorDiagnostics,
}

/// Factor `a` column by column.
///
/// `rsqrt` must be bound to `params.working`.
pub fn factorize_columns(
    a: &InputMatrix,
    params: &KernelParams,
    rsqrt: &ReciprocalSqrt,
) -> WorkingFactorization {
    let n = a.dim();
    let input = a.format();
    let working = params.working;
    debug_assert_eq!(rsqrt.working_format(), working);

    let mut l = WorkingFactor::zeros(n, working);
    let mut clamped = Vec::new();
    let mut diagnostics = FactorDiagnostics::default();
    let sat = &mut diagnostics.working_saturations;

    for j in 0..n {
        let mut diag = working.convert(a.get(j, j).re, input).tally(sat);
        let mut acc: Vec<ComplexFixed> = ((j + 1)..n)
            .map(|i| working.convert_complex(a.get(i, j), input).tally(sat))
            .collect();

        {
            let pass = ColumnPass::new(&l, j, params.tile_width);
            diag = pass.reduce_diag(diag).tally(sat);
            *sat += pass.reduce_rows(&mut acc, j + 1, params.row_unroll, params.execution);
        }

        if !diag.is_positive() {
            debug!(
                "column {}: pivot {} clamped to zero",
                j,
                working.to_f64(diag)
            );
            clamped.push(j);
            diag = Fixed::ZERO;
        }

        let inv = rsqrt.compute(diag);
        if !inv.is_saturated() && diag.is_positive() && !rsqrt.meets_tolerance(diag, inv.value) {
            warn!(
                "column {}: rsqrt({}) residual {:.3e} exceeds tolerance {:.3e}",
                j,
                working.to_f64(diag),
                rsqrt.residual(diag, inv.value),
                rsqrt.tolerance()
            );
            diagnostics.rsqrt_misses += 1;
        }
        let inv = inv.tally(sat);

        let d = working.mul(diag, inv).tally(sat);
        l.set(j, j, ComplexFixed::real(d));
        for (k, acc_i) in acc.into_iter().enumerate() {
            l.set(j + 1 + k, j, working.scale(acc_i, inv).tally(sat));
        }
    }

    WorkingFactorization {
        factor: l,
        status: FactorStatus::from_columns(clamped),
        diagnostics,
    }
}
