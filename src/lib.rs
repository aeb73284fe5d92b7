//! `scan-curves` library crate.
//!
//! The binary (`scurves`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - any `ScanStore` / `RenderSurface` pair can drive the same pipeline
//!
//! Pipeline per group: `keys` selects series from a `store`, `fit` attaches a
//! sigmoid to each, `ensemble` collects the successes, and `render` draws the
//! individual and aggregate views styled by `style`.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod ensemble;
pub mod error;
pub mod fit;
pub mod io;
pub mod keys;
pub mod math;
pub mod models;
pub mod render;
pub mod report;
pub mod store;
pub mod style;
