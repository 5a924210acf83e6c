use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};
use tiny_skia::{Mask, Paint, Pixmap, Rect, Transform};

use super::fonts::Face;
use crate::style::Color;

/// Horizontal shear applied to synthesized italics.
const SYNTHETIC_SLANT: f32 = 0.2;

/// Glyphs positioned along one baseline.
#[derive(Debug, Clone)]
pub struct TextLayout {
    glyphs: Vec<Glyph>,
    /// Advance width of the whole run, in pixels
    pub width: f32,
    pub baseline: f32,
    size_px: f32,
}

/// Scale that makes the font's em square `size_px` pixels tall, the way CSS
/// font sizes are measured.
pub fn em_scale(font: &FontArc, size_px: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size_px * font.height_unscaled() / units_per_em)
}

/// Position `text` on a single baseline starting at `(x, baseline)`.
/// Control characters (newlines included) are laid out as spaces.
pub fn layout(font: &FontArc, size_px: f32, text: &str, x: f32, baseline: f32) -> TextLayout {
    let scale = em_scale(font, size_px);
    let scaled = font.as_scaled(scale);

    let mut glyphs = Vec::with_capacity(text.len());
    let mut caret = x;
    let mut previous = None;
    for c in text.chars() {
        let c = if c.is_control() { ' ' } else { c };
        let id = scaled.glyph_id(c);
        if let Some(previous) = previous {
            caret += scaled.kern(previous, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, baseline)));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    TextLayout {
        glyphs,
        width: caret - x,
        baseline,
        size_px,
    }
}

/// Fill the laid-out glyphs into `pixmap` with `color`.
pub fn paint(pixmap: &mut Pixmap, face: &Face<'_>, layout: &TextLayout, color: Color) {
    let (width, height) = (pixmap.width(), pixmap.height());
    let Some(mut mask) = Mask::new(width, height) else {
        return;
    };

    let bold_offsets: &[f32] = if face.synthetic_bold {
        &[0.0, (layout.size_px / 24.0).max(1.0)]
    } else {
        &[0.0]
    };

    let mut bounds: Option<(i64, i64, i64, i64)> = None;
    let data = mask.data_mut();
    for glyph in &layout.glyphs {
        let Some(outlined) = face.font.outline_glyph(glyph.clone()) else {
            continue;
        };
        let origin = outlined.px_bounds().min;
        outlined.draw(|gx, gy, coverage| {
            let y = origin.y + gy as f32;
            let slant = if face.synthetic_italic {
                (layout.baseline - y) * SYNTHETIC_SLANT
            } else {
                0.0
            };
            let py = y.floor() as i64;
            if py < 0 || py >= i64::from(height) {
                return;
            }
            let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            for offset in bold_offsets {
                let px = (origin.x + gx as f32 + slant + offset).floor() as i64;
                if px < 0 || px >= i64::from(width) {
                    continue;
                }
                let index = py as usize * width as usize + px as usize;
                data[index] = data[index].max(value);
                bounds = Some(match bounds {
                    None => (px, py, px, py),
                    Some((l, t, r, b)) => (l.min(px), t.min(py), r.max(px), b.max(py)),
                });
            }
        });
    }

    let Some((left, top, right, bottom)) = bounds else {
        return;
    };
    let Some(rect) = Rect::from_ltrb(left as f32, top as f32, (right + 1) as f32, (bottom + 1) as f32) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    pixmap.fill_rect(rect, &paint, Transform::identity(), Some(&mask));
}
