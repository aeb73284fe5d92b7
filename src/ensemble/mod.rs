//! Per-group aggregation of successful fits.

pub mod aggregate;

pub use aggregate::*;
