//! Shared numeric constants for the markup engine.

// ── Viewer ──────────────────────────────────────────────────────

/// Smallest zoom factor the viewer allows.
pub const MIN_ZOOM: f64 = 0.2;

/// Largest zoom factor the viewer allows.
pub const MAX_ZOOM: f64 = 5.0;

/// Wheel delta (pixels) to zoom exponent scale.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.0015;

// ── Geometry ────────────────────────────────────────────────────

/// Minimum committed box edge length in world units.
pub const MIN_BOX_SIZE: f64 = 1.0;

/// Minimum number of points for a committed freehand stroke.
pub const MIN_DRAWING_POINTS: usize = 2;

/// π / 5 (36°): angular step for a 10-vertex star polygon.
pub const FRAC_PI_5: f64 = std::f64::consts::PI / 5.0;

/// Inner-to-outer radius ratio for the 5-point stamp star.
pub const STAR_INNER_RATIO: f64 = 0.5;

// ── Hit-testing ─────────────────────────────────────────────────

/// World-space slop around thin freehand strokes.
pub const STROKE_HIT_SLOP: f64 = 4.0;

/// Average glyph advance as a fraction of font size, for text bounds.
pub const TEXT_ADVANCE_RATIO: f64 = 0.6;

/// Descender depth below the baseline as a fraction of font size.
pub const TEXT_DESCENT_RATIO: f64 = 0.25;

// ── Rasterizer ──────────────────────────────────────────────────

/// Stamp fill opacity.
pub const STAMP_OPACITY: f32 = 0.85;

/// Font size for box labels, in pixels.
pub const LABEL_FONT_PX: f32 = 14.0;

/// Gap between a box's top edge and its label baseline.
pub const LABEL_OFFSET: f32 = 4.0;

/// Corner radius for rounded boxes, as a fraction of the shorter side.
pub const ROUNDED_CORNER_RATIO: f32 = 0.15;

/// Cubic Bézier control-point factor for circle/ellipse quadrants.
pub const BEZIER_K: f32 = 0.552_284_8;

/// Default JPEG quality for flattened snapshots.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

// ── Preview ─────────────────────────────────────────────────────

/// Reserved id of the in-progress pen preview.
pub const PREVIEW_PEN_ID: &str = "preview-pen";

/// Reserved id of the in-progress box preview.
pub const PREVIEW_BOX_ID: &str = "preview-box";
