//! Point-containment hit testing against the ordered object list.
//!
//! Objects are scanned topmost first (reverse list order, matching paint
//! order) and the first object whose shape contains the point wins.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Rect};
use crate::consts::{STROKE_HIT_SLOP, TEXT_ADVANCE_RATIO, TEXT_DESCENT_RATIO};
use crate::doc::{MarkupObject, ObjectId};
use crate::style::StampShape;

/// Id of the topmost object containing `world_pt`, if any.
#[must_use]
pub fn hit_test(objects: &[MarkupObject], world_pt: Point) -> Option<ObjectId> {
    objects
        .iter()
        .rev()
        .find(|obj| contains(obj, world_pt))
        .map(|obj| obj.id().to_owned())
}

/// Shape-specific containment test in world space.
#[must_use]
pub fn contains(obj: &MarkupObject, p: Point) -> bool {
    match obj {
        MarkupObject::Box(b) => b.rect().contains(p),
        MarkupObject::Stamp(s) => {
            let r = s.size.stamp_px() / 2.0;
            let center = Point::new(s.x, s.y);
            match s.shape {
                StampShape::Circle => center.distance(p) <= r,
                StampShape::Square | StampShape::Triangle | StampShape::Star => {
                    Rect { x: s.x - r, y: s.y - r, width: r * 2.0, height: r * 2.0 }.contains(p)
                }
            }
        }
        MarkupObject::Text(t) => text_bounds(t.x, t.y, &t.text, t.font_size).contains(p),
        MarkupObject::Drawing(d) => {
            let reach = (d.stroke_width / 2.0).max(STROKE_HIT_SLOP);
            d.path.windows(2).any(|seg| distance_to_segment(p, seg[0], seg[1]) <= reach)
        }
    }
}

/// Approximate bounds of a single-line text label whose baseline starts at
/// `(x, y)`.
#[must_use]
pub fn text_bounds(x: f64, y: f64, text: &str, font_size: f64) -> Rect {
    #[allow(clippy::cast_precision_loss)]
    let chars = text.chars().count() as f64;
    Rect {
        x,
        y: y - font_size,
        width: chars * font_size * TEXT_ADVANCE_RATIO,
        height: font_size * (1.0 + TEXT_DESCENT_RATIO),
    }
}

/// Euclidean distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
