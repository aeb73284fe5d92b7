//! Hierarchical data store abstraction.
//!
//! The pipeline only needs two capabilities from a dataset:
//!
//! - list the children of a folder (in the store's native order) with a folder test
//! - fetch a leaf as a `Series` by its qualified key
//!
//! `TreeStore` is the in-memory implementation; `io::dataset` loads one from disk.

pub mod tree;

pub use tree::*;

use crate::domain::Series;
use crate::error::AppError;

/// One child of a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_folder: bool,
}

/// Capability set required from a hierarchical dataset.
pub trait ScanStore {
    /// Children of `dir` (or of the store root when `None`), in native order.
    ///
    /// Returns a NotFound error if `dir` is absent or names a leaf.
    fn entries(&self, dir: Option<&str>) -> Result<Vec<Entry>, AppError>;

    /// The series stored at `key`.
    fn series(&self, key: &str) -> Result<Series, AppError>;
}

impl<S: ScanStore + ?Sized> ScanStore for &S {
    fn entries(&self, dir: Option<&str>) -> Result<Vec<Entry>, AppError> {
        (**self).entries(dir)
    }

    fn series(&self, key: &str) -> Result<Series, AppError> {
        (**self).series(key)
    }
}
