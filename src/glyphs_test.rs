use super::*;

#[test]
fn full_coverage_opaque_replaces_pixel() {
    let dst = PremultipliedColorU8::from_rgba(10, 20, 30, 255).unwrap();
    let out = blend_over(dst, Color::rgb(200, 100, 50), 1.0);
    assert_eq!((out.red(), out.green(), out.blue(), out.alpha()), (200, 100, 50, 255));
}

#[test]
fn zero_coverage_keeps_pixel() {
    let dst = PremultipliedColorU8::from_rgba(10, 20, 30, 255).unwrap();
    let out = blend_over(dst, Color::rgb(200, 100, 50), 0.0);
    assert!(out == dst);
}

#[test]
fn half_coverage_mixes_channels() {
    let dst = PremultipliedColorU8::from_rgba(0, 0, 0, 255).unwrap();
    let out = blend_over(dst, Color::WHITE, 0.5);
    assert_eq!(out.alpha(), 255);
    assert!((127..=128).contains(&out.red()));
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let err = font_from_bytes(vec![0, 1, 2, 3]).unwrap_err();
    assert_eq!(err.error_code(), "E_FONT");
}

#[test]
fn bundled_font_parses() {
    let font = bundled_font().unwrap();
    assert_ne!(font.glyph_id('A'), GlyphId(0));
}

fn white_pixmap(w: u32, h: u32) -> Pixmap {
    let mut pixmap = Pixmap::new(w, h).unwrap();
    pixmap.fill(tiny_skia::Color::WHITE);
    pixmap
}

fn dark_pixels(pixmap: &Pixmap) -> usize {
    pixmap.pixels().iter().filter(|p| p.red() < 128).count()
}

#[test]
fn draw_text_paints_glyphs_above_baseline() {
    let mut pixmap = white_pixmap(80, 40);
    draw_text(&mut pixmap, bundled_font().unwrap(), "Wall", 4.0, 30.0, 20.0, Color::BLACK);
    assert!(dark_pixels(&pixmap) > 20);
    let below = pixmap.pixels()[(33 * 80)..].iter().filter(|p| p.red() < 250).count();
    assert_eq!(below, 0);
}

#[test]
fn draw_text_clips_at_pixmap_edges() {
    let mut pixmap = white_pixmap(16, 16);
    draw_text(&mut pixmap, bundled_font().unwrap(), "OVERFLOWING", -6.0, 10.0, 24.0, Color::BLACK);
    assert!(dark_pixels(&pixmap) > 0);
}
