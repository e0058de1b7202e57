//! Viewer transform: maps client (pointer) coordinates to world (image) space.
//!
//! `client = pan + zoom · display_scale · world`
//!
//! `display_scale` is how many client pixels one image pixel occupies before
//! zoom (the host fits the blueprint into its container). All stored geometry
//! is in world space, so pan and zoom never distort objects.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_BOX_SIZE, MIN_ZOOM};

/// A point in either client or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Normalize the rectangle spanned by two corners dragged in any
    /// direction. Edges are at least `MIN_BOX_SIZE` long.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs().max(MIN_BOX_SIZE),
            height: (a.y - b.y).abs().max(MIN_BOX_SIZE),
        }
    }

    /// Closed containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Display transform for the open blueprint. Not part of the persisted markup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    /// User zoom, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
    /// Horizontal pan in client pixels.
    pub pan_x: f64,
    /// Vertical pan in client pixels.
    pub pan_y: f64,
    /// Client pixels per image pixel at zoom 1.
    pub display_scale: f64,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0, display_scale: 1.0 }
    }
}

impl ViewerState {
    fn scale(&self) -> f64 {
        self.zoom * self.display_scale
    }

    /// Convert a client-space point to world coordinates.
    #[must_use]
    pub fn world_from_client(&self, client: Point) -> Point {
        let s = self.scale();
        Point {
            x: (client.x - self.pan_x) / s,
            y: (client.y - self.pan_y) / s,
        }
    }

    /// Convert a world-space point to client coordinates. Exact inverse of
    /// [`Self::world_from_client`].
    #[must_use]
    pub fn client_from_world(&self, world: Point) -> Point {
        let s = self.scale();
        Point {
            x: world.x * s + self.pan_x,
            y: world.y * s + self.pan_y,
        }
    }

    /// Set the zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    /// Multiply the zoom by `factor` without moving the pan.
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    /// Multiply the zoom by `factor`, keeping the world point under `anchor`
    /// fixed on screen.
    pub fn zoom_by_at(&mut self, factor: f64, anchor: Point) {
        let world = self.world_from_client(anchor);
        self.zoom_by(factor);
        let s = self.scale();
        self.pan_x = anchor.x - world.x * s;
        self.pan_y = anchor.y - world.y * s;
    }

    /// Translate the view by a raw client-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Fit an image of natural size into a viewport: sets the display scale,
    /// resets zoom to 1, and centers the image.
    pub fn fit(&mut self, natural_w: f64, natural_h: f64, viewport_w: f64, viewport_h: f64) {
        if natural_w <= 0.0 || natural_h <= 0.0 || viewport_w <= 0.0 || viewport_h <= 0.0 {
            return;
        }
        self.display_scale = (viewport_w / natural_w).min(viewport_h / natural_h);
        self.zoom = 1.0;
        self.pan_x = (viewport_w - natural_w * self.display_scale) * 0.5;
        self.pan_y = (viewport_h - natural_h * self.display_scale) * 0.5;
    }
}

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input maps to 1.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 }
}
