//! Rendering: the surface capability, concrete surfaces, output naming, and
//! the per-group orchestration that drives extraction, fitting and drawing.

pub mod orchestrator;
pub mod output;
pub mod plotters_surface;
pub mod recording;
pub mod surface;

pub use orchestrator::*;
pub use output::*;
pub use plotters_surface::*;
pub use recording::*;
pub use surface::*;
