//! Numeric types for fxchol
//!
//! This module provides the fixed-point scalar and complex element types,
//! the runtime [`FixedFormat`] description shared by input, working and
//! output precisions, and the rounding/saturating conversions between them.

pub mod complex;
pub mod fixed;
pub mod format;

pub use complex::{Complex128, ComplexFixed, WideComplex};
pub use fixed::{Fixed, Narrowed};
pub use format::FixedFormat;
