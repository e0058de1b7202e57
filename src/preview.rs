//! Ephemeral in-progress preview shown while a draw gesture is active.
//!
//! The preview object is never part of the `ObjectList`; it carries one of
//! the reserved ids so a host drawing it alongside committed objects can tell
//! it apart.

#[cfg(test)]
#[path = "preview_test.rs"]
mod preview_test;

use time::OffsetDateTime;

use crate::camera::{Point, Rect};
use crate::consts::{PREVIEW_BOX_ID, PREVIEW_PEN_ID};
use crate::doc::{BoxMarkup, DrawingMarkup, MarkupObject, ObjectMeta};
use crate::style::{BoxColor, BoxShape, Color, SizeTier};

/// Holder for the optional preview object.
#[derive(Debug, Clone, Default)]
pub struct PreviewLayer {
    object: Option<MarkupObject>,
}

impl PreviewLayer {
    #[must_use]
    pub fn get(&self) -> Option<&MarkupObject> {
        self.object.as_ref()
    }

    pub fn show(&mut self, object: MarkupObject) {
        self.object = Some(object);
    }

    /// Drop the preview. Returns true if one was showing.
    pub fn clear(&mut self) -> bool {
        self.object.take().is_some()
    }
}

/// Drawing-shaped preview of a stroke in progress. Unlike a committed
/// drawing, a single-point path is allowed.
#[must_use]
pub fn pen_preview(path: &[Point], stroke_color: Color, stroke_width: f64, now: OffsetDateTime) -> Option<MarkupObject> {
    let anchor = *path.first()?;
    Some(MarkupObject::Drawing(DrawingMarkup {
        meta: ObjectMeta::with_id(PREVIEW_PEN_ID.to_owned(), now),
        x: anchor.x,
        y: anchor.y,
        path: path.to_vec(),
        stroke_color,
        stroke_width,
    }))
}

/// Box-shaped preview spanning `rect`.
#[must_use]
pub fn box_preview(rect: Rect, color: BoxColor, size: SizeTier, shape: BoxShape, now: OffsetDateTime) -> MarkupObject {
    MarkupObject::Box(BoxMarkup {
        meta: ObjectMeta::with_id(PREVIEW_BOX_ID.to_owned(), now),
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        color,
        label: None,
        size,
        shape,
    })
}
