//! Output file naming.
//!
//! Every view is saved as `{root}/{name}.{ext}`. View names may carry slashes
//! (leaf keys do); the directories they imply are created on demand, starting
//! with the one named by the prefix before the first slash.

use std::fs::create_dir_all;
use std::path::{Component, Path, PathBuf};

use crate::domain::OutputFormat;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    format: OutputFormat,
    touch_fs: bool,
}

impl OutputLayout {
    /// Layout rooted at `root`, creating the root directory immediately.
    pub fn create(root: &Path, format: OutputFormat) -> Result<Self, AppError> {
        create_dir(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            format,
            touch_fs: true,
        })
    }

    /// Layout that computes paths without touching the filesystem (dry runs).
    pub fn detached(root: &Path, format: OutputFormat) -> Self {
        Self {
            root: root.to_path_buf(),
            format,
            touch_fs: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// File path for the view `name`, creating any directories it needs.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, AppError> {
        let name = name.trim_matches('/');
        if name.is_empty() {
            return Err(AppError::new(AppError::USAGE, "View name is empty."));
        }
        // Every view must land under the root.
        if !Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::new(
                AppError::USAGE,
                format!("View name '{name}' leaves the output directory."),
            ));
        }
        let path = self
            .root
            .join(format!("{name}.{}", self.format.extension()));

        if self.touch_fs {
            if !self.root.exists() {
                create_dir(&self.root)?;
            }
            if let Some(parent) = path.parent() {
                create_dir(parent)?;
            }
        }
        Ok(path)
    }
}

fn create_dir(dir: &Path) -> Result<(), AppError> {
    create_dir_all(dir).map_err(|e| {
        AppError::new(
            AppError::RESOURCE,
            format!("Failed to create output directory '{}': {e}", dir.display()),
        )
    })
}
