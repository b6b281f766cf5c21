//! Factorization engine
//!
//! A [`CholeskyEngine`] owns a validated [`CholeskyConfig`] and a reciprocal
//! square root engine bound to the working format. It holds no per-matrix
//! state: every call allocates its own working factor, so one engine can be
//! shared by reference across threads and each invocation stays independent.
//!
//! The three stages can be driven one at a time or through [`run`]:
//!
//! ```text
//! elements ──ingest──► InputMatrix ──factorize──► WorkingFactor ──emit──► elements
//!                                        │
//!                                        └──► FactorStatus (0 / nonzero)
//! ```
//!
//! [`run`]: CholeskyEngine::run

use crate::algorithm::{
    FactorDiagnostics, FactorStatus, KernelParams, ReciprocalSqrt, WorkingFactorization,
    factorize_columns,
};
use crate::config::{CholeskyConfig, Triangle};
use crate::dtype::{ComplexFixed, FixedFormat};
use crate::error::{Error, Result};
use crate::matrix::{InputMatrix, OutputFactor, WorkingFactor};
use log::trace;

/// Outcome of one factorization.
#[derive(Clone, Debug)]
pub struct Factorization {
    /// Emitted triangle at output precision
    pub factor: OutputFactor,
    /// `L` at working precision
    pub working: WorkingFactor,
    /// Aggregate pivot status
    pub status: FactorStatus,
    /// Saturation and tolerance counters
    pub diagnostics: FactorDiagnostics,
}

impl Factorization {
    /// Integer status code: 0 when every pivot stayed positive
    #[inline]
    pub fn code(&self) -> i32 {
        self.status.code()
    }
}

/// Fixed-point complex Cholesky engine for one matrix order and format set.
#[derive(Clone, Debug)]
pub struct CholeskyEngine {
    config: CholeskyConfig,
    params: KernelParams,
    rsqrt: ReciprocalSqrt,
}

impl CholeskyEngine {
    /// Validate `config` and build the engine.
    pub fn new(config: CholeskyConfig) -> Result<Self> {
        let params = config.validate()?;
        let mut rsqrt = ReciprocalSqrt::new(config.rsqrt, params.working)?;
        if let Some(tol) = config.rsqrt_tolerance {
            rsqrt = rsqrt.with_tolerance(tol);
        }
        Ok(Self {
            config,
            params,
            rsqrt,
        })
    }

    /// The configuration this engine was built from
    #[inline]
    pub fn config(&self) -> &CholeskyConfig {
        &self.config
    }

    /// Matrix order
    #[inline]
    pub fn dim(&self) -> usize {
        self.config.dim
    }

    /// Resolved working format
    #[inline]
    pub fn working_format(&self) -> FixedFormat {
        self.params.working
    }

    /// Reciprocal square root engine in use
    #[inline]
    pub fn rsqrt(&self) -> &ReciprocalSqrt {
        &self.rsqrt
    }

    /// Read exactly `dim * dim` input-format elements, row-major.
    ///
    /// No Hermitian or definiteness check is performed.
    pub fn ingest<I>(&self, elements: I) -> Result<InputMatrix>
    where
        I: IntoIterator<Item = ComplexFixed>,
    {
        InputMatrix::from_elements(self.config.dim, self.config.input, elements)
    }

    /// Run the column loop only, keeping `L` at working precision.
    pub fn factorize_matrix(&self, a: &InputMatrix) -> Result<WorkingFactorization> {
        self.check_input(a)?;
        trace!(
            "factorize: dim={} input={} working={} tile={} unroll={} rsqrt={} execution={}",
            a.dim(),
            a.format(),
            self.params.working,
            self.params.tile_width,
            self.params.row_unroll,
            self.rsqrt.strategy(),
            self.params.execution
        );
        Ok(factorize_columns(a, &self.params, &self.rsqrt))
    }

    /// Factor `a` and emit the configured triangle.
    pub fn factorize(&self, a: &InputMatrix) -> Result<Factorization> {
        let WorkingFactorization {
            factor: working,
            status,
            mut diagnostics,
        } = self.factorize_matrix(a)?;
        let (factor, output_saturations) = self.emit(&working);
        diagnostics.output_saturations = output_saturations;
        trace!(
            "factorize done: status={} working_saturations={} output_saturations={}",
            status,
            diagnostics.working_saturations,
            diagnostics.output_saturations
        );
        Ok(Factorization {
            factor,
            working,
            status,
            diagnostics,
        })
    }

    /// Narrow `l` to the output format in the configured triangle mode.
    ///
    /// Diagonal imaginary parts are emitted as exactly zero, and so is every
    /// element of the unused triangle. Returns the factor and the number of
    /// components clamped while narrowing.
    pub fn emit(&self, l: &WorkingFactor) -> (OutputFactor, u64) {
        let n = l.dim();
        let working = l.format();
        let output = self.config.output;
        let mut saturations = 0;
        let mut out = OutputFactor::zeros(n, output);

        for i in 0..n {
            let d = output.convert(l.get(i, i).re, working).tally(&mut saturations);
            out.set(i, i, ComplexFixed::real(d));
        }

        for i in 1..n {
            for j in 0..i {
                let z = l.get(i, j);
                match self.config.triangle {
                    Triangle::Lower => {
                        let v = output.convert_complex(z, working).tally(&mut saturations);
                        out.set(i, j, v);
                    }
                    Triangle::Upper => {
                        let v = output.convert_conj(z, working).tally(&mut saturations);
                        out.set(j, i, v);
                    }
                }
            }
        }
        (out, saturations)
    }

    /// Ingest one matrix from `input`, factor it, and append the emitted
    /// elements to `output`. Returns the status code.
    pub fn run<I, O>(&self, input: I, output: &mut O) -> Result<i32>
    where
        I: IntoIterator<Item = ComplexFixed>,
        O: Extend<ComplexFixed>,
    {
        let a = self.ingest(input)?;
        let result = self.factorize(&a)?;
        let code = result.code();
        output.extend(result.factor.into_elements());
        Ok(code)
    }

    fn check_input(&self, a: &InputMatrix) -> Result<()> {
        if a.dim() != self.config.dim {
            return Err(Error::ShapeMismatch {
                expected: self.config.dim,
                got: a.dim(),
            });
        }
        if a.format() != self.config.input {
            return Err(Error::FormatMismatch {
                expected: self.config.input,
                got: a.format(),
            });
        }
        Ok(())
    }
}
