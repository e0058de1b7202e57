//! Rasterization: flattens markup onto the source image.
//!
//! Everything here works in world space, which is the image's own pixel
//! grid; the viewer transform never reaches this module. Objects are painted
//! in list order onto a premultiplied `tiny_skia::Pixmap` and the result is
//! handed back as a straight-alpha `RgbaImage`.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::FRAC_PI_2;

use ab_glyph::FontArc;
use image::RgbaImage;
use tiny_skia::{ColorU8, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};
use tracing::warn;

use crate::consts::{
    BEZIER_K, FRAC_PI_5, LABEL_FONT_PX, LABEL_OFFSET, ROUNDED_CORNER_RATIO, STAMP_OPACITY, STAR_INNER_RATIO,
};
use crate::doc::{BoxMarkup, DrawingMarkup, MarkupObject, StampMarkup, TextMarkup};
use crate::error::MarkupError;
use crate::glyphs::{bundled_font, draw_text};
use crate::style::{BoxShape, Color, StampShape};

/// Paint `objects` over a copy of `source`.
///
/// Text and box labels use `font`, or the bundled font when `font` is
/// `None`. Pixels no object touched come back exactly as they went in.
///
/// # Errors
///
/// Returns `EmptyImage` for a zero-sized source and `Surface` if the
/// offscreen surface cannot be allocated.
pub fn rasterize(source: &RgbaImage, objects: &[MarkupObject], font: Option<&FontArc>) -> Result<RgbaImage, MarkupError> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(MarkupError::EmptyImage);
    }
    let mut pixmap = Pixmap::new(width, height).ok_or(MarkupError::Surface { width, height })?;

    // Layer 1: the source image.
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(source.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    // Layer 2: objects in list order (bottom first).
    let font = match font {
        Some(font) => Some(font),
        None => bundled_font(),
    };
    let mut skipped_text = 0usize;
    for obj in objects {
        match obj {
            MarkupObject::Box(b) => {
                draw_box(&mut pixmap, b);
                if let Some(label) = b.label.as_deref() {
                    match font {
                        Some(font) => draw_box_label(&mut pixmap, font, b, label),
                        None => skipped_text += 1,
                    }
                }
            }
            MarkupObject::Drawing(d) => draw_drawing(&mut pixmap, d),
            MarkupObject::Text(t) => match font {
                Some(font) => draw_text_object(&mut pixmap, font, t),
                None => skipped_text += 1,
            },
            MarkupObject::Stamp(s) => draw_stamp(&mut pixmap, s),
        }
    }
    if skipped_text > 0 {
        warn!(skipped_text, "no font available; text and labels skipped");
    }

    // Untouched pixels take the straight-alpha source value; premultiplying
    // and back is lossy for translucent pixels.
    let mut out = Vec::with_capacity(source.as_raw().len());
    for (painted, src) in pixmap.pixels().iter().zip(source.pixels()) {
        let [r, g, b, a] = src.0;
        if *painted == ColorU8::from_rgba(r, g, b, a).premultiply() {
            out.extend_from_slice(&src.0);
        } else {
            let c = painted.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
    }
    RgbaImage::from_raw(width, height, out).ok_or(MarkupError::Surface { width, height })
}

// =============================================================================
// Objects
// =============================================================================

fn draw_box(pixmap: &mut Pixmap, b: &BoxMarkup) {
    let (x, y, w, h) = (f32c(b.x), f32c(b.y), f32c(b.width), f32c(b.height));
    let path = match b.shape {
        BoxShape::Rectangle => tiny_skia::Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect),
        BoxShape::Rounded => rounded_rect_path(x, y, w, h, w.min(h) * ROUNDED_CORNER_RATIO),
        BoxShape::Ellipse => ellipse_path(x + w * 0.5, y + h * 0.5, w * 0.5, h * 0.5),
    };
    let Some(path) = path else {
        return;
    };
    let stroke = Stroke { width: b.size.box_stroke_width(), ..Default::default() };
    pixmap.stroke_path(&path, &paint_for(b.color.color()), &stroke, Transform::identity(), None);
}

fn draw_box_label(pixmap: &mut Pixmap, font: &FontArc, b: &BoxMarkup, label: &str) {
    let baseline = f32c(b.y) - LABEL_OFFSET;
    draw_text(pixmap, font, label, f32c(b.x), baseline, LABEL_FONT_PX, b.color.color());
}

fn draw_text_object(pixmap: &mut Pixmap, font: &FontArc, t: &TextMarkup) {
    draw_text(pixmap, font, &t.text, f32c(t.x), f32c(t.y), f32c(t.font_size), t.font_color);
}

fn draw_drawing(pixmap: &mut Pixmap, d: &DrawingMarkup) {
    let Some((first, rest)) = d.path.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(f32c(first.x), f32c(first.y));
    for p in rest {
        pb.line_to(f32c(p.x), f32c(p.y));
    }
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width: f32c(d.stroke_width),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint_for(d.stroke_color), &stroke, Transform::identity(), None);
}

fn draw_stamp(pixmap: &mut Pixmap, s: &StampMarkup) {
    let r = s.size.stamp_px() * 0.5;
    let (cx, cy) = (s.x, s.y);
    let path = match s.shape {
        StampShape::Circle => PathBuilder::from_circle(f32c(cx), f32c(cy), f32c(r)),
        StampShape::Square => {
            tiny_skia::Rect::from_xywh(f32c(cx - r), f32c(cy - r), f32c(r * 2.0), f32c(r * 2.0)).map(PathBuilder::from_rect)
        }
        StampShape::Triangle => polygon_path(&[(cx, cy - r), (cx + r, cy + r), (cx - r, cy + r)]),
        StampShape::Star => polygon_path(&star_points(cx, cy, r)),
    };
    let Some(path) = path else {
        return;
    };
    let paint = paint_for(s.color.with_opacity(STAMP_OPACITY));
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

// =============================================================================
// Geometry
// =============================================================================

/// Ten star vertices alternating outer and inner radius, first one straight up.
pub(crate) fn star_points(cx: f64, cy: f64, r: f64) -> Vec<(f64, f64)> {
    (0..10)
        .map(|i| {
            let angle = FRAC_PI_5.mul_add(f64::from(i), -FRAC_PI_2);
            let radius = if i % 2 == 0 { r } else { r * STAR_INNER_RATIO };
            (radius.mul_add(angle.cos(), cx), radius.mul_add(angle.sin(), cy))
        })
        .collect()
}

fn polygon_path(points: &[(f64, f64)]) -> Option<Path> {
    let ((x0, y0), rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(f32c(*x0), f32c(*y0));
    for (x, y) in rest {
        pb.line_to(f32c(*x), f32c(*y));
    }
    pb.close();
    pb.finish()
}

fn ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    let kx = rx * BEZIER_K;
    let ky = ry * BEZIER_K;
    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    pb.close();
    pb.finish()
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    let r = radius.min(w * 0.5).min(h * 0.5).max(0.0);
    let k = r * (1.0 - BEZIER_K);
    let (right, bottom) = (x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - k, y, right, y + k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - k, right - k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + k, bottom, x, bottom - k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + k, x + k, y, x + r, y);
    pb.close();
    pb.finish()
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

#[allow(clippy::cast_possible_truncation)]
fn f32c(v: f64) -> f32 {
    v as f32
}
