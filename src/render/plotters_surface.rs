//! Plotters-backed rendering surface.
//!
//! Views are drawn when saved: the file extension picks the backend (SVG or
//! PNG bitmap), the scene's ranges and log flag pick the coordinate system, and
//! every layer is replayed onto the chart.

use std::cell::Cell;
use std::panic;
use std::path::Path;
use std::rc::Rc;

use plotters::coord::Shift;
use plotters::coord::CoordTranslate;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::IntoLogRange;
use plotters::prelude::*;
use plotters_backend::{BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingErrorKind};

use crate::error::AppError;
use crate::render::surface::{AxisAdjustError, DrawStyle, Drawable, Layer, RenderSurface, Scene};
use crate::style::{Glyph, Marker, surface_rgb};

const MARKER_SIZE: i32 = 3;
const LOG_FLOOR: f64 = 1e-6;

/// Renders scenes to SVG or PNG files with Plotters.
///
/// Without a font engine the bitmap backend panics on text. The panic is
/// caught, so the default hook prints it to stderr once per surface; later
/// views skip their labels.
#[derive(Debug, Clone)]
pub struct PlottersSurface {
    size: (u32, u32),
    scene: Scene,
    text_broken: Rc<Cell<bool>>,
}

impl PlottersSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width.max(64), height.max(64)),
            scene: Scene::default(),
            text_broken: Rc::new(Cell::new(false)),
        }
    }
}

impl RenderSurface for PlottersSurface {
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
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let fail = |e: String| {
            AppError::new(
                AppError::RENDER,
                format!("Failed to render '{}': {e}", path.display()),
            )
        };

        match ext.as_str() {
            "svg" => {
                let root = TextSafeBackend::new(SVGBackend::new(path, self.size), self.text_broken.clone()).into_drawing_area();
                draw_scene(root, &self.scene).map_err(|e| fail(e.to_string()))
            }
            "png" => {
                let root = TextSafeBackend::new(BitMapBackend::new(path, self.size), self.text_broken.clone()).into_drawing_area();
                draw_scene(root, &self.scene).map_err(|e| fail(e.to_string()))
            }
            other => Err(AppError::new(
                AppError::USAGE,
                format!("Unsupported image extension '.{other}'."),
            )),
        }
    }

    fn adjust_log_range(&mut self) -> Result<(), AxisAdjustError> {
        self.scene.fit_y_to_second_layer()
    }
}

fn draw_scene<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    scene: &Scene,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let extent = scene.data_extent();
    let (x0, x1) = widen(scene.x_range.or(extent.map(|e| e.0)).unwrap_or((0.0, 1.0)));
    let (mut y0, mut y1) = widen(scene.y_range.or(extent.map(|e| e.1)).unwrap_or((0.0, 1.0)));

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(20)
        .caption(&scene.title, ("sans-serif", 20))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40);

    if scene.log_y {
        y0 = y0.max(LOG_FLOOR);
        y1 = y1.max(y0 * 10.0);
        let mut chart = builder.build_cartesian_2d(x0..x1, (y0..y1).log_scale())?;
        chart
            .configure_mesh()
            .x_desc(scene.x_label.as_str())
            .y_desc(scene.y_label.as_str())
            .draw()?;
        draw_layers(&mut chart, &scene.layers, true)?;
    } else {
        let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;
        chart
            .configure_mesh()
            .x_desc(scene.x_label.as_str())
            .y_desc(scene.y_label.as_str())
            .draw()?;
        draw_layers(&mut chart, &scene.layers, false)?;
    }

    root.present()?;
    Ok(())
}

fn draw_layers<DB, CT>(
    chart: &mut ChartContext<'_, DB, CT>,
    layers: &[Layer],
    log_y: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
    CT: CoordTranslate<From = (f64, f64)>,
{
    for layer in layers {
        let color = surface_rgb(layer.style.color);
        // Log axes cannot place non-positive values.
        let points: Vec<(f64, f64)> = layer
            .item
            .sample()
            .into_iter()
            .filter(|&(x, y)| x.is_finite() && y.is_finite() && (!log_y || y > 0.0))
            .collect();

        if layer.style.line {
            chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
        }
        if let Some(marker) = layer.style.marker {
            draw_markers(chart, &points, marker, color)?;
        }
    }
    Ok(())
}

fn draw_markers<DB, CT>(
    chart: &mut ChartContext<'_, DB, CT>,
    points: &[(f64, f64)],
    marker: Marker,
    color: RGBColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let (glyph, filled) = marker.glyph();
    let style = if filled {
        color.filled()
    } else {
        plotters::style::Color::stroke_width(&color, 1)
    };
    let s = MARKER_SIZE;

    match glyph {
        Glyph::Circle => {
            chart.draw_series(points.iter().map(|&p| Circle::new(p, s, style)))?;
        }
        Glyph::Triangle => {
            chart.draw_series(points.iter().map(|&p| TriangleMarker::new(p, s, style)))?;
        }
        Glyph::Cross => {
            chart.draw_series(points.iter().map(|&p| Cross::new(p, s, style)))?;
        }
        Glyph::Square => {
            chart.draw_series(
                points
                    .iter()
                    .map(|&p| EmptyElement::at(p) + Rectangle::new([(-s, -s), (s, s)], style)),
            )?;
        }
    }
    Ok(())
}

/// Backend wrapper that drops text once the font layer has failed.
///
/// Plotters is built without a font engine, so bitmap backends panic when
/// asked to rasterise text. The first such panic sets the shared flag and text
/// is dropped from then on, for this view and every later one drawn with the
/// same flag. Lines, markers and SVG text are unaffected.
struct TextSafeBackend<DB> {
    inner: DB,
    text_broken: Rc<Cell<bool>>,
}

impl<DB> TextSafeBackend<DB> {
    fn new(inner: DB, text_broken: Rc<Cell<bool>>) -> Self {
        Self { inner, text_broken }
    }
}

impl<DB: DrawingBackend> DrawingBackend for TextSafeBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        if self.text_broken.get() {
            return Ok(());
        }
        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.draw_text(text, style, pos)
        })) {
            Ok(result) => result,
            Err(_) => {
                log::debug!("text rendering unavailable, dropping labels");
                self.text_broken.set(true);
                Ok(())
            }
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        self.inner.estimate_text_size(text, style)
    }
}

/// Ensure a non-degenerate, finite range.
fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    if hi - lo > 1e-12 {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}
