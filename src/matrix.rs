//! Dense square matrices of fixed-point complex elements
//!
//! One container type, [`SquareMatrix`], backs every matrix role in the
//! kernel. The aliases name the role:
//!
//! - [`InputMatrix`]: the ingested matrix `A` at input precision
//! - [`WorkingFactor`]: the factor `L` at working precision
//! - [`OutputFactor`]: the emitted triangular factor at output precision
//!
//! Storage is row-major: element `(i, j)` lives at `i * dim + j`.

use crate::dtype::{Complex128, ComplexFixed, FixedFormat};
use crate::error::{Error, Result};

/// Square matrix of [`ComplexFixed`] elements, all stored in one format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareMatrix {
    dim: usize,
    format: FixedFormat,
    data: Vec<ComplexFixed>,
}

/// Ingested input matrix (assumed Hermitian positive semi-definite)
pub type InputMatrix = SquareMatrix;

/// Lower-triangular factor at working precision
pub type WorkingFactor = SquareMatrix;

/// Emitted triangular factor at output precision
pub type OutputFactor = SquareMatrix;

impl SquareMatrix {
    /// All-zero matrix of order `dim`
    pub fn zeros(dim: usize, format: FixedFormat) -> Self {
        Self {
            dim,
            format,
            data: vec![ComplexFixed::ZERO; dim * dim],
        }
    }

    /// Materialize a matrix from a row-major element sequence.
    ///
    /// Consumes exactly `dim * dim` elements; anything after them is left in
    /// the iterator. A sequence that ends early is an error.
    pub fn from_elements<I>(dim: usize, format: FixedFormat, elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = ComplexFixed>,
    {
        let expected = dim * dim;
        let mut data = Vec::with_capacity(expected);
        data.extend(elements.into_iter().take(expected));
        if data.len() < expected {
            return Err(Error::ShortInput {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { dim, format, data })
    }

    /// Quantize a row-major float matrix into `format`.
    pub fn from_f64(dim: usize, format: FixedFormat, values: &[Complex128]) -> Result<Self> {
        Self::from_elements(dim, format, values.iter().map(|z| z.to_fixed(format)))
    }

    /// Matrix order
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Format every element is stored in
    #[inline]
    pub fn format(&self) -> FixedFormat {
        self.format
    }

    /// Element `(i, j)`
    ///
    /// # Panics
    /// Panics if `i` or `j` is not below `dim`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> ComplexFixed {
        assert!(i < self.dim && j < self.dim, "index ({i}, {j}) out of bounds");
        self.data[i * self.dim + j]
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize, j: usize, value: ComplexFixed) {
        debug_assert!(i < self.dim && j < self.dim);
        self.data[i * self.dim + j] = value;
    }

    /// Row `i` as a slice
    #[inline]
    pub fn row(&self, i: usize) -> &[ComplexFixed] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// All elements in row-major order
    #[inline]
    pub fn as_slice(&self) -> &[ComplexFixed] {
        &self.data
    }

    /// Consume the matrix, yielding its row-major elements
    pub fn into_elements(self) -> Vec<ComplexFixed> {
        self.data
    }

    /// Elements converted to floats, row-major
    pub fn to_f64(&self) -> Vec<Complex128> {
        self.data.iter().map(|z| z.to_f64(self.format)).collect()
    }

    /// `L · L^H` in `f64`, reading only the lower triangle and diagonal.
    pub fn reconstruct_f64(&self) -> Vec<Complex128> {
        let n = self.dim;
        let l = self.to_f64();
        let mut out = vec![Complex128::ZERO; n * n];
        for i in 0..n {
            for j in 0..n {
                let mut sum = Complex128::ZERO;
                for p in 0..=i.min(j) {
                    sum = sum + l[i * n + p] * l[j * n + p].conj();
                }
                out[i * n + j] = sum;
            }
        }
        out
    }
}
