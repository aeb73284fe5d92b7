//! In-memory surface that records saved views instead of writing files.
//!
//! Used for `--dry-run` and by tests that need to inspect what was drawn.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::render::surface::{AxisAdjustError, DrawStyle, Drawable, Layer, RenderSurface, Scene};

/// Snapshot of the scene at the time `save_as` was called.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedView {
    pub path: PathBuf,
    pub scene: Scene,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    scene: Scene,
    views: Vec<RecordedView>,
    log_adjust: bool,
}

impl RecordingSurface {
    /// Recording surface supporting the log-range adjustment.
    pub fn new() -> Self {
        Self {
            log_adjust: true,
            ..Self::default()
        }
    }

    /// Recording surface whose log-range adjustment is unsupported.
    pub fn without_log_adjust() -> Self {
        Self::default()
    }

    pub fn views(&self) -> &[RecordedView] {
        &self.views
    }

    /// The view saved under `path`, if any.
    pub fn view(&self, path: &Path) -> Option<&RecordedView> {
        self.views.iter().find(|v| v.path == path)
    }
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self) {
        self.scene = Scene::default();
    }

    fn draw(&mut self, item: Drawable, style: DrawStyle) {
        self.scene.layers.push(Layer { item, style });
    }

    fn set_x_range(&mut self, min: f64, max: f64) {
        self.scene.x_range = Some((min, max));
    }

    fn set_y_range(&mut self, min: f64, max: f64) {
        self.scene.y_range = Some((min, max));
    }

    fn set_log_y(&mut self, log: bool) {
        self.scene.log_y = log;
    }

    fn set_title(&mut self, title: &str) {
        self.scene.title = title.to_string();
    }

    fn set_axis_labels(&mut self, x: &str, y: &str) {
        self.scene.x_label = x.to_string();
        self.scene.y_label = y.to_string();
    }

    fn save_as(&mut self, path: &Path) -> Result<(), AppError> {
        self.views.push(RecordedView {
            path: path.to_path_buf(),
            scene: self.scene.clone(),
        });
        Ok(())
    }

    fn adjust_log_range(&mut self) -> Result<(), AxisAdjustError> {
        if !self.log_adjust {
            return Err(AxisAdjustError::Unsupported);
        }
        self.scene.fit_y_to_second_layer()
    }
}
