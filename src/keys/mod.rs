//! Key-space traversal.
//!
//! - `walker`: lazy depth-first enumeration of leaf keys
//! - `select`: per-group prefix filter with early-terminating cap

pub mod select;
pub mod walker;

pub use select::*;
pub use walker::*;
