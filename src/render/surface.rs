//! The rendering surface capability.
//!
//! The orchestrator only ever talks to a `RenderSurface`: it clears it, draws a
//! handful of primitives, sets axis ranges and saves the result. Surfaces keep
//! what was drawn in a `Scene` until the next `clear`.

use std::path::Path;

use crate::domain::Series;
use crate::error::AppError;
use crate::models::sample_curve;
use crate::style::{ColorIndex, Marker};

/// Samples used when an analytic function is turned into a polyline.
pub const FUNCTION_SAMPLES: usize = 400;

/// Something that can be drawn on a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// Measured series joined by lines.
    Curve(Series),
    /// Measured series as individual points.
    Points(Series),
    /// Fitted sigmoid over `range`.
    Function {
        shift: f64,
        width: f64,
        range: (f64, f64),
    },
}

impl Drawable {
    /// Points to plot; functions are sampled over their range.
    pub fn sample(&self) -> Vec<(f64, f64)> {
        match self {
            Drawable::Curve(s) | Drawable::Points(s) => s.points.clone(),
            Drawable::Function {
                shift,
                width,
                range,
            } => sample_curve(*shift, *width, *range, FUNCTION_SAMPLES),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawStyle {
    pub color: ColorIndex,
    pub marker: Option<Marker>,
    pub line: bool,
}

impl DrawStyle {
    pub fn line(color: ColorIndex) -> Self {
        Self {
            color,
            marker: None,
            line: true,
        }
    }

    pub fn markers(color: ColorIndex, marker: Marker) -> Self {
        Self {
            color,
            marker: Some(marker),
            line: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub item: Drawable,
    pub style: DrawStyle,
}

/// Why the optional log-range adjustment could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisAdjustError {
    /// The surface has no such adjustment.
    Unsupported,
    /// The drawn primitives are not laid out the way the adjustment expects.
    Layout(String),
}

impl std::fmt::Display for AxisAdjustError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisAdjustError::Unsupported => write!(f, "log-range adjustment not supported by surface"),
            AxisAdjustError::Layout(msg) => write!(f, "unexpected primitive layout: {msg}"),
        }
    }
}

/// Drawing state between two `clear` calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub layers: Vec<Layer>,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub log_y: bool,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Scene {
    /// Rescale Y to the positive values of the second drawn primitive.
    pub fn fit_y_to_second_layer(&mut self) -> Result<(), AxisAdjustError> {
        let layer = self.layers.get(1).ok_or_else(|| {
            AxisAdjustError::Layout(format!(
                "expected at least 2 primitives, found {}",
                self.layers.len()
            ))
        })?;

        let (lo, hi) = layer
            .item
            .sample()
            .iter()
            .map(|p| p.1)
            .filter(|y| y.is_finite() && *y > 0.0)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if !(lo.is_finite() && hi.is_finite()) {
            return Err(AxisAdjustError::Layout(
                "second primitive has no positive values".to_string(),
            ));
        }
        self.y_range = Some((lo * 0.5, hi * 1.5));
        Ok(())
    }

    /// X/Y extents of all layers, used when no range was set.
    pub fn data_extent(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut xr = (f64::INFINITY, f64::NEG_INFINITY);
        let mut yr = (f64::INFINITY, f64::NEG_INFINITY);
        for layer in &self.layers {
            for (x, y) in layer.item.sample() {
                if x.is_finite() && y.is_finite() {
                    xr = (xr.0.min(x), xr.1.max(x));
                    yr = (yr.0.min(y), yr.1.max(y));
                }
            }
        }
        (xr.0.is_finite() && yr.0.is_finite()).then_some((xr, yr))
    }
}

/// Capability set the pipeline needs from a plotting backend.
pub trait RenderSurface {
    fn clear(&mut self);
    fn draw(&mut self, item: Drawable, style: DrawStyle);
    fn set_x_range(&mut self, min: f64, max: f64);
    fn set_y_range(&mut self, min: f64, max: f64);
    fn set_log_y(&mut self, log: bool);
    fn set_title(&mut self, title: &str);
    fn set_axis_labels(&mut self, x: &str, y: &str);
    fn save_as(&mut self, path: &Path) -> Result<(), AppError>;

    /// Optional cosmetic fix-up of the Y range for log views.
    fn adjust_log_range(&mut self) -> Result<(), AxisAdjustError> {
        Err(AxisAdjustError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(item: Drawable) -> Layer {
        Layer {
            item,
            style: DrawStyle::line(1),
        }
    }

    #[test]
    fn second_layer_adjustment_needs_two_primitives() {
        let mut scene = Scene::default();
        scene.layers.push(layer(Drawable::Curve(Series::new(vec![(0.0, 1.0)]))));
        assert!(matches!(scene.fit_y_to_second_layer(), Err(AxisAdjustError::Layout(_))));

        scene
            .layers
            .push(layer(Drawable::Curve(Series::new(vec![(0.0, 0.0), (1.0, 0.2), (2.0, 0.8)]))));
        scene.fit_y_to_second_layer().unwrap();
        let (lo, hi) = scene.y_range.unwrap();
        assert!((lo - 0.1).abs() < 1e-12);
        assert!((hi - 1.2).abs() < 1e-12);
    }

    #[test]
    fn function_layers_are_sampled() {
        let f = Drawable::Function {
            shift: 10.0,
            width: 2.0,
            range: (0.0, 20.0),
        };
        let pts = f.sample();
        assert_eq!(pts.len(), FUNCTION_SAMPLES);
        assert_eq!(pts[0].0, 0.0);
        assert_eq!(pts[FUNCTION_SAMPLES - 1].0, 20.0);
    }

    #[test]
    fn extent_covers_all_layers() {
        let mut scene = Scene::default();
        assert!(scene.data_extent().is_none());
        scene.layers.push(layer(Drawable::Points(Series::new(vec![(1.0, 2.0), (3.0, -1.0)]))));
        scene.layers.push(layer(Drawable::Curve(Series::new(vec![(-2.0, 0.5)]))));
        assert_eq!(scene.data_extent(), Some(((-2.0, 3.0), (-1.0, 2.0))));
    }
}
