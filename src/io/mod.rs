//! Input/output helpers.
//!
//! - dataset JSON read/write (`dataset`)

pub mod dataset;

pub use dataset::*;
