//! Deterministic rasterization of the action log.
//!
//! The persistent surface is always repainted from scratch: clear, then paint
//! every action in log order with its own stored style. Rendering the same
//! log twice produces the same pixels, which is what makes full repaints on
//! resize safe. The overlay surface only ever holds the preview of a
//! rectangle or circle drag.

use std::borrow::Borrow;

use thiserror::Error;
use tiny_skia::{Paint, PathBuilder, Pixmap, Transform};

use crate::action::{Action, Point};
use crate::style::{Color, FontStyle};
use crate::tools::{PreviewShape, ToolKind};

pub mod fonts;
pub mod text;

pub use fonts::{FontBook, FontError, FontFaceConfig};

/// Control-point distance for a quarter ellipse drawn as one cubic.
const KAPPA: f32 = 0.552_284_8;

/// An action that cannot be painted. The repaint skips it and carries on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("pencil stroke has no points")]
    EmptyStroke,

    #[error("{0:?} action has non-finite geometry")]
    NonFiniteGeometry(ToolKind),

    #[error("text action has no text")]
    EmptyText,

    #[error("text action font size {0}px is out of range")]
    FontSizeOutOfRange(u32),

    #[error("no font face for {0}")]
    MissingFace(String),
}

/// Errors creating a raster surface
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("cannot create a {width}x{height} surface")]
    InvalidSize { width: u32, height: u32 },
}

/// Outcome of one committed repaint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub painted: usize,
    pub skipped: usize,
}

/// A premultiplied RGBA raster the renderer paints into.
#[derive(Clone)]
pub struct Surface {
    pixmap: Pixmap,
    /// Bumped on every repaint so texture uploads can tell when to refresh
    version: u64,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("version", &self.version)
            .finish()
    }
}

/// Surfaces compare by their pixels only.
impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width() && self.height() == other.height() && self.data() == other.data()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(width, height).ok_or(SurfaceError::InvalidSize { width, height })?;
        Ok(Self { pixmap, version: 0 })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Raw premultiplied RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Premultiplied `[r, g, b, a]` at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap
            .pixel(x, y)
            .map(|p| [p.red(), p.green(), p.blue(), p.alpha()])
    }

    pub fn pixel_alpha(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.alpha())
    }

    /// True when no pixel has any coverage.
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.version += 1;
    }

    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_premultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixmap.data(),
        )
    }

    /// Straight-alpha copy for encoding to image files.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        let data = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        image::RgbaImage::from_raw(self.width(), self.height(), data)
    }

    fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }
}

/// Paints action logs and drag previews onto [`Surface`]s.
#[derive(Debug, Clone)]
pub struct Renderer {
    fonts: FontBook,
    line_width: f32,
    underline_offset: f32,
}

impl Renderer {
    pub const DEFAULT_LINE_WIDTH: f32 = 2.0;
    pub const DEFAULT_UNDERLINE_OFFSET: f32 = 3.0;

    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            line_width: Self::DEFAULT_LINE_WIDTH,
            underline_offset: Self::DEFAULT_UNDERLINE_OFFSET,
        }
    }

    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn with_underline_offset(mut self, offset: f32) -> Self {
        self.underline_offset = offset;
        self
    }

    /// Clear `surface` and paint `actions` in order.
    ///
    /// Actions that fail their geometry checks are logged and skipped; the
    /// rest of the log is still painted.
    pub fn render_committed<I>(&self, surface: &mut Surface, actions: I) -> RenderReport
    where
        I: IntoIterator,
        I::Item: Borrow<Action>,
    {
        surface.clear();
        let mut report = RenderReport::default();
        for (index, action) in actions.into_iter().enumerate() {
            match self.paint_action(surface.pixmap_mut(), action.borrow()) {
                Ok(()) => report.painted += 1,
                Err(err) => {
                    log::warn!("skipping action #{index}: {err}");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Clear the overlay and, for rectangle and circle drags, stroke the
    /// shape spanned by the drag.
    pub fn render_preview(&self, overlay: &mut Surface, preview: &PreviewShape) {
        overlay.clear();
        let Some(shape) = Action::shape(preview.tool, preview.color, preview.anchor, preview.current) else {
            return;
        };
        if let Err(err) = self.paint_action(overlay.pixmap_mut(), &shape) {
            log::debug!("preview not drawn: {err}");
        }
    }

    pub fn clear_preview(&self, overlay: &mut Surface) {
        overlay.clear();
    }

    /// Advance width of `text` in `style`, the width an underline spans.
    pub fn measure_text(&self, text: &str, style: &FontStyle) -> Option<f32> {
        let face = self.fonts.face(style)?;
        Some(text::layout(face.font, style.size as f32, text, 0.0, 0.0).width)
    }

    fn paint_action(&self, pixmap: &mut Pixmap, action: &Action) -> Result<(), RenderError> {
        check_geometry(action)?;
        match action {
            Action::Pencil { color, points } => {
                let mut pb = PathBuilder::new();
                let (first, rest) = points.split_first().ok_or(RenderError::EmptyStroke)?;
                pb.move_to(first.x, first.y);
                for point in rest {
                    pb.line_to(point.x, point.y);
                }
                self.stroke(pixmap, pb, *color);
            }
            Action::Rectangle {
                color,
                start_x,
                start_y,
                width,
                height,
            } => {
                // Walk the corners in drag order so negative extents flip.
                let mut pb = PathBuilder::new();
                pb.move_to(*start_x, *start_y);
                pb.line_to(start_x + width, *start_y);
                pb.line_to(start_x + width, start_y + height);
                pb.line_to(*start_x, start_y + height);
                pb.close();
                self.stroke(pixmap, pb, *color);
            }
            Action::Circle {
                color,
                start_x,
                start_y,
                width,
                height,
            } => {
                let center = Point::new(start_x + width / 2.0, start_y + height / 2.0);
                let pb = ellipse(center, (width / 2.0).abs(), (height / 2.0).abs());
                self.stroke(pixmap, pb, *color);
            }
            Action::Text {
                color,
                start_x,
                start_y,
                text,
                font_style,
            } => {
                let face = self
                    .fonts
                    .face(font_style)
                    .ok_or_else(|| RenderError::MissingFace(font_style.descriptor()))?;
                let layout = text::layout(face.font, font_style.size as f32, text, *start_x, *start_y);
                text::paint(pixmap, &face, &layout, *color);

                if font_style.underline {
                    let y = start_y + self.underline_offset;
                    let mut pb = PathBuilder::new();
                    pb.move_to(*start_x, y);
                    pb.line_to(start_x + layout.width, y);
                    self.stroke(pixmap, pb, *color);
                }
            }
        }
        Ok(())
    }

    fn stroke(&self, pixmap: &mut Pixmap, pb: PathBuilder, color: Color) {
        // A path that collapses to a single point has nothing to stroke.
        let Some(path) = pb.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width: self.line_width,
            ..tiny_skia::Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// The precondition every action must meet before it is painted.
pub fn check_geometry(action: &Action) -> Result<(), RenderError> {
    let finite = |values: &[f32]| values.iter().all(|v| v.is_finite());
    match action {
        Action::Pencil { points, .. } => {
            if points.is_empty() {
                return Err(RenderError::EmptyStroke);
            }
            if !points.iter().all(Point::is_finite) {
                return Err(RenderError::NonFiniteGeometry(ToolKind::Pencil));
            }
        }
        Action::Rectangle {
            start_x,
            start_y,
            width,
            height,
            ..
        }
        | Action::Circle {
            start_x,
            start_y,
            width,
            height,
            ..
        } => {
            if !finite(&[*start_x, *start_y, *width, *height]) {
                return Err(RenderError::NonFiniteGeometry(action.kind()));
            }
        }
        Action::Text {
            start_x,
            start_y,
            text,
            font_style,
            ..
        } => {
            if !finite(&[*start_x, *start_y]) {
                return Err(RenderError::NonFiniteGeometry(ToolKind::Text));
            }
            if text.is_empty() {
                return Err(RenderError::EmptyText);
            }
            if !FontStyle::SIZE_RANGE.contains(&font_style.size) {
                return Err(RenderError::FontSizeOutOfRange(font_style.size));
            }
        }
    }
    Ok(())
}

/// Closed ellipse path from four cubic quarter arcs. A zero radius collapses
/// the ellipse to a line segment instead of failing.
fn ellipse(center: Point, rx: f32, ry: f32) -> PathBuilder {
    let (cx, cy) = (center.x, center.y);
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let mut pb = PathBuilder::new();
    pb.move_to(cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.close();
    pb
}
