//! Response-curve model.
//!
//! The model is implemented as small, pure functions so the fitter and the
//! renderers can share it.

pub mod sigmoid;

pub use sigmoid::*;
