//! Tiled reduction of one column against the completed columns
//!
//! A [`ColumnPass`] captures everything column `j` reads from earlier
//! iterations: the conjugated pivot row `conj(L[j][0..j])` and a shared view
//! of the finalized factor. It then reduces
//!
//! - the diagonal accumulator: `diag −= Σ_p |L[j][p]|²`
//! - every row accumulator `i > j`: `acc[i] −= Σ_p L[i][p] · conj(L[j][p])`
//!
//! tile by tile. Within one tile each lane's product is rounded to working
//! precision, the lanes are summed exactly, and the tile sum is subtracted
//! from the accumulator with a single saturating operation.
//!
//! # Independence
//!
//! Row accumulators share no state: row `i` reads `L[i][0..j]` and the pivot
//! row, both finalized before column `j` started, and writes only `acc[i]`.
//! Rows are therefore processed in groups of `row_unroll` lanes, either in
//! sequence or on the rayon pool, with bit-identical results. Each row still
//! visits its tiles in ascending order, which is the only ordering the
//! saturating arithmetic depends on.

use super::tiling::TileIterator;
use crate::dtype::{ComplexFixed, Fixed, FixedFormat, Narrowed, WideComplex};
use crate::matrix::WorkingFactor;
use std::fmt;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Rows below which the parallel strategy stays on the calling thread
#[cfg(feature = "rayon")]
const PARALLEL_MIN_ROWS: usize = 64;

/// How row lanes inside a column are executed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Execution {
    /// All row groups on the calling thread
    #[default]
    Sequential,
    /// Row groups spread over the rayon pool (sequential without the
    /// `rayon` feature)
    Parallel,
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Execution::Sequential => write!(f, "sequential"),
            Execution::Parallel => write!(f, "parallel"),
        }
    }
}

/// Read-only inputs of the reduction for one column.
pub(crate) struct ColumnPass<'a> {
    factor: &'a WorkingFactor,
    pivots: Vec<WideComplex>,
    working: FixedFormat,
    tile_width: usize,
}

impl<'a> ColumnPass<'a> {
    /// Prepare the pass for column `column` of `factor`.
    ///
    /// # Panics
    /// Reductions panic if `tile_width` is zero.
    pub fn new(factor: &'a WorkingFactor, column: usize, tile_width: usize) -> Self {
        let pivots = factor.row(column)[..column]
            .iter()
            .map(|z| z.wide().conj())
            .collect();
        Self {
            factor,
            pivots,
            working: factor.format(),
            tile_width,
        }
    }

    /// Number of completed columns this pass reduces over
    #[inline]
    pub fn columns(&self) -> usize {
        self.pivots.len()
    }

    fn tiles(&self) -> TileIterator {
        TileIterator::new(self.columns(), self.tile_width)
    }

    /// Subtract the squared magnitudes of the pivot row from `diag`.
    pub fn reduce_diag(&self, mut diag: Fixed) -> Narrowed<Fixed> {
        let mut saturations = 0;
        for tile in self.tiles() {
            let mut sum = 0i128;
            for b in &self.pivots[tile] {
                let sq = self.working.round_product(b.norm_sqr());
                sum += sq.tally(&mut saturations).wide();
            }
            diag = self
                .working
                .narrow(diag.wide() - sum)
                .tally(&mut saturations);
        }
        Narrowed {
            value: diag,
            saturations,
        }
    }

    /// Reduce one row accumulator; returns the number of saturations.
    pub fn reduce_row(&self, row: usize, acc: &mut ComplexFixed) -> u64 {
        let l_row = self.factor.row(row);
        let mut saturations = 0;
        for tile in self.tiles() {
            let mut sum = WideComplex::ZERO;
            for (a, b) in l_row[tile.clone()].iter().zip(&self.pivots[tile]) {
                let p = self
                    .working
                    .round_complex_product(a.wide().mul_3m(*b))
                    .tally(&mut saturations);
                sum = sum + p.wide();
            }
            let re = self.working.narrow(acc.re.wide() - sum.re);
            let im = self.working.narrow(acc.im.wide() - sum.im);
            *acc = ComplexFixed::new(re.tally(&mut saturations), im.tally(&mut saturations));
        }
        saturations
    }

    /// Reduce the accumulators of rows `first_row..`, `acc[k]` belonging to
    /// row `first_row + k`. Returns the number of saturations.
    #[cfg_attr(not(feature = "rayon"), allow(unused_variables))]
    pub fn reduce_rows(
        &self,
        acc: &mut [ComplexFixed],
        first_row: usize,
        row_unroll: usize,
        execution: Execution,
    ) -> u64 {
        if self.columns() == 0 {
            return 0;
        }

        #[cfg(feature = "rayon")]
        if execution == Execution::Parallel && acc.len() >= PARALLEL_MIN_ROWS {
            return acc
                .par_chunks_mut(row_unroll)
                .enumerate()
                .map(|(g, lanes)| self.reduce_group(lanes, first_row + g * row_unroll))
                .sum();
        }

        acc.chunks_mut(row_unroll)
            .enumerate()
            .map(|(g, lanes)| self.reduce_group(lanes, first_row + g * row_unroll))
            .sum()
    }

    /// One group of up to `row_unroll` independent row lanes
    fn reduce_group(&self, lanes: &mut [ComplexFixed], first_row: usize) -> u64 {
        lanes
            .iter_mut()
            .enumerate()
            .map(|(k, acc)| self.reduce_row(first_row + k, acc))
            .sum()
    }
}
