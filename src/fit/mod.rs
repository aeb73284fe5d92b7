//! Sigmoid fitting.
//!
//! Responsibilities:
//!
//! - restrict each series to the instrument's native range
//! - fit `(shift, width)` by damped nonlinear least squares
//! - classify fits that do not attach usable parameters

pub mod fitter;

pub use fitter::*;
