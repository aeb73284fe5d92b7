//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement series (`Series`) and per-series fit outputs (`FitResult`)
//! - group selection (`GroupSpec`) and its command-line syntax
//! - run configuration (`PipelineConfig`, `FitterConfig`, `Framing`, `OutputFormat`)

pub mod types;

pub use types::*;
