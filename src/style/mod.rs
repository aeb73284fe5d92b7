//! Visual identity (colour + marker) for ensemble members.
//!
//! - `palette`: colour index tables and the `identity` assignment
//! - `marker`: the fixed set of marker shapes
//! - `color`: mapping colour indices to RGB for the Plotters surface

pub mod color;
pub mod marker;
pub mod palette;

pub use color::*;
pub use marker::*;
pub use self::palette::*;
