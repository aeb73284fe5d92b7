//! Numerical utilities: linear least squares.

pub mod ols;

pub use ols::*;
