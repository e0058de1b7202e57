//! Glyph rasterization into a premultiplied `tiny_skia::Pixmap`.
//!
//! tiny-skia has no text support, so glyph coverage comes from `ab_glyph`
//! and is blended source-over, pixel by pixel. DejaVu Sans ships with the
//! crate and is used whenever the caller supplies no font.

#[cfg(test)]
#[path = "glyphs_test.rs"]
mod glyphs_test;

use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use tiny_skia::{Pixmap, PremultipliedColorU8};
use tracing::warn;

use crate::error::MarkupError;
use crate::style::Color;

static BUNDLED_FONT_BYTES: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

static BUNDLED_FONT: OnceLock<Option<FontArc>> = OnceLock::new();

/// The font bundled with the crate, parsed once.
///
/// `None` only if the embedded file fails to parse, which is logged.
pub fn bundled_font() -> Option<&'static FontArc> {
    BUNDLED_FONT
        .get_or_init(|| match FontArc::try_from_slice(BUNDLED_FONT_BYTES) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(error = %e, "bundled font failed to parse");
                None
            }
        })
        .as_ref()
}

/// Parse a TrueType/OpenType font from raw bytes.
///
/// # Errors
///
/// Returns `Font` if the bytes are not a usable font.
pub fn font_from_bytes(bytes: Vec<u8>) -> Result<FontArc, MarkupError> {
    FontArc::try_from_vec(bytes).map_err(|e| MarkupError::Font(e.to_string()))
}

/// Draw a single line of `text` with its alphabetic baseline at `baseline`,
/// starting at `x`.
pub fn draw_text(pixmap: &mut Pixmap, font: &FontArc, text: &str, x: f32, baseline: f32, px: f32, color: Color) {
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let width = pixmap.width();
    let height = pixmap.height();
    let pixels = pixmap.pixels_mut();

    let mut cursor = x;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            cursor += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(cursor, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
                let (px_x, px_y) = ((bounds.min.x + gx as f32) as i64, (bounds.min.y + gy as f32) as i64);
                if px_x < 0 || px_y < 0 || px_x >= i64::from(width) || px_y >= i64::from(height) {
                    return;
                }
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let idx = (px_y as usize) * (width as usize) + px_x as usize;
                if let Some(dst) = pixels.get_mut(idx) {
                    *dst = blend_over(*dst, color, coverage);
                }
            });
        }
        cursor += scaled.h_advance(id);
        prev = Some(id);
    }
}

/// Source-over blend of `color` at `coverage` onto a premultiplied pixel.
fn blend_over(dst: PremultipliedColorU8, color: Color, coverage: f32) -> PremultipliedColorU8 {
    let sa = f32::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let inv = 1.0 - sa;
    let channel = |src: u8, dst: u8| f32::from(src) * sa + f32::from(dst) * inv;
    let a = sa * 255.0 + f32::from(dst.alpha()) * inv;
    let to_u8 = |v: f32| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let out = v.round().clamp(0.0, 255.0) as u8;
        out
    };
    let a = to_u8(a);
    let r = to_u8(channel(color.r, dst.red())).min(a);
    let g = to_u8(channel(color.g, dst.green())).min(a);
    let b = to_u8(channel(color.b, dst.blue())).min(a);
    PremultipliedColorU8::from_rgba(r, g, b, a).unwrap_or(dst)
}
