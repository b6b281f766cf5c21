//! Numeric algorithms of the factorization kernel
//!
//! # Available Algorithms
//!
//! - [`cholesky`] - Column-wise tiled Cholesky reduction with rank-deficiency tracking
//! - [`rsqrt`] - Reciprocal square root in working precision (fast and refined)
//!
//! # Determinism
//!
//! Every algorithm here is bit-exact for a given configuration: fixed-point
//! arithmetic with a fixed rounding rule and a fixed per-row operation order
//! leaves no room for execution-dependent results.
//!
//! ```text
//! InputMatrix ──▶ ColumnPass(j) ──diag──▶ rsqrt ──inv──▶ column j of L
//!                      ▲                                      │
//!                      └────────────── columns < j ◀──────────┘
//! ```

pub mod cholesky;
pub mod rsqrt;

pub use cholesky::{
    Execution, FactorDiagnostics, FactorStatus, KernelParams, WorkingFactorization,
    factorize_columns,
};
pub use rsqrt::{ReciprocalSqrt, RsqrtStrategy};
