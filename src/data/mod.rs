//! Dataset generation helpers.

pub mod synth;

pub use synth::*;
