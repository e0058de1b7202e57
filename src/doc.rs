//! Document model: markup objects and the immutable ordered object list.
//!
//! `MarkupObject` is a closed tagged union; every site that interprets an
//! object (hit-testing, previewing, rasterizing) matches it exhaustively.
//!
//! `ObjectList` is never edited in place. Each change builds a new list and
//! swaps it in, so a history snapshot is a pointer clone and a renderer always
//! sees a consistent whole. List order is paint order: later objects are on
//! top.
//!
//! The JSON form (`ObjectList::to_json`) is the persisted markup payload: an
//! array of objects tagged by `"type"` with camelCase fields and RFC 3339
//! timestamps.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{MIN_BOX_SIZE, MIN_DRAWING_POINTS, PREVIEW_BOX_ID, PREVIEW_PEN_ID};
use crate::error::MarkupError;
use crate::style::{BoxColor, BoxShape, Color, SizeTier, StampShape};

/// Unique identifier for a markup object.
pub type ObjectId = String;

/// Generate a fresh object id: a time-ordered UUID v7 rendered as a string.
#[must_use]
pub fn new_object_id() -> ObjectId {
    Uuid::now_v7().to_string()
}

/// Identity and timestamps shared by every object kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub id: ObjectId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
}

impl ObjectMeta {
    /// Fresh identity created at `now`.
    #[must_use]
    pub fn new(now: OffsetDateTime) -> Self {
        Self::with_id(new_object_id(), now)
    }

    #[must_use]
    pub fn with_id(id: ObjectId, now: OffsetDateTime) -> Self {
        Self { id, created_at: now, modified_at: now }
    }
}

/// Outlined box, optionally labeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxMarkup {
    #[serde(flatten)]
    pub meta: ObjectMeta,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: BoxColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub size: SizeTier,
    #[serde(default)]
    pub shape: BoxShape,
}

impl BoxMarkup {
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

/// Freehand pen stroke. `(x, y)` is always the first path point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingMarkup {
    #[serde(flatten)]
    pub meta: ObjectMeta,
    pub x: f64,
    pub y: f64,
    pub path: Vec<Point>,
    pub stroke_color: Color,
    pub stroke_width: f64,
}

/// Text label anchored at its alphabetic baseline start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMarkup {
    #[serde(flatten)]
    pub meta: ObjectMeta,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_size: f64,
    pub font_color: Color,
}

/// Filled stamp centered at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampMarkup {
    #[serde(flatten)]
    pub meta: ObjectMeta,
    pub x: f64,
    pub y: f64,
    pub shape: StampShape,
    pub size: SizeTier,
    pub color: Color,
}

/// A markup object as stored in the document and in the persisted payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MarkupObject {
    Box(BoxMarkup),
    Drawing(DrawingMarkup),
    Text(TextMarkup),
    Stamp(StampMarkup),
}

impl MarkupObject {
    /// Box spanning `rect`.
    #[must_use]
    pub fn new_box(
        meta: ObjectMeta,
        rect: Rect,
        color: BoxColor,
        size: SizeTier,
        shape: BoxShape,
        label: Option<String>,
    ) -> Self {
        Self::Box(BoxMarkup {
            meta,
            x: rect.x,
            y: rect.y,
            width: rect.width.max(MIN_BOX_SIZE),
            height: rect.height.max(MIN_BOX_SIZE),
            color,
            label,
            size,
            shape,
        })
    }

    /// Freehand stroke through `path`. `None` when the path is too short to
    /// commit.
    #[must_use]
    pub fn new_drawing(meta: ObjectMeta, path: Vec<Point>, stroke_color: Color, stroke_width: f64) -> Option<Self> {
        if path.len() < MIN_DRAWING_POINTS {
            return None;
        }
        let anchor = path[0];
        Some(Self::Drawing(DrawingMarkup { meta, x: anchor.x, y: anchor.y, path, stroke_color, stroke_width }))
    }

    /// Text at `at`. `None` when the text is blank; content is trimmed.
    #[must_use]
    pub fn new_text(meta: ObjectMeta, at: Point, text: &str, size: SizeTier, font_color: Color) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self::Text(TextMarkup {
            meta,
            x: at.x,
            y: at.y,
            text: text.to_owned(),
            font_size: size.font_px(),
            font_color,
        }))
    }

    #[must_use]
    pub fn new_stamp(meta: ObjectMeta, at: Point, shape: StampShape, size: SizeTier, color: Color) -> Self {
        Self::Stamp(StampMarkup { meta, x: at.x, y: at.y, shape, size, color })
    }

    #[must_use]
    pub fn meta(&self) -> &ObjectMeta {
        match self {
            Self::Box(b) => &b.meta,
            Self::Drawing(d) => &d.meta,
            Self::Text(t) => &t.meta,
            Self::Stamp(s) => &s.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::Box(b) => &mut b.meta,
            Self::Drawing(d) => &mut d.meta,
            Self::Text(t) => &mut t.meta,
            Self::Stamp(s) => &mut s.meta,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.meta().id
    }

    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.meta().created_at
    }

    #[must_use]
    pub fn modified_at(&self) -> OffsetDateTime {
        self.meta().modified_at
    }

    /// The `"type"` tag of this object.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Box(_) => "box",
            Self::Drawing(_) => "drawing",
            Self::Text(_) => "text",
            Self::Stamp(_) => "stamp",
        }
    }

    /// The object's `(x, y)` position.
    #[must_use]
    pub fn position(&self) -> Point {
        match self {
            Self::Box(b) => Point::new(b.x, b.y),
            Self::Drawing(d) => Point::new(d.x, d.y),
            Self::Text(t) => Point::new(t.x, t.y),
            Self::Stamp(s) => Point::new(s.x, s.y),
        }
    }

    /// A copy moved so that its position is `to`, stamped modified at `now`.
    /// Drawing paths move rigidly with their anchor.
    #[must_use]
    pub fn moved_to(&self, to: Point, now: OffsetDateTime) -> Self {
        let from = self.position();
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let mut moved = self.clone();
        match &mut moved {
            Self::Box(b) => {
                b.x = to.x;
                b.y = to.y;
            }
            Self::Drawing(d) => {
                d.x = to.x;
                d.y = to.y;
                for p in &mut d.path {
                    p.x += dx;
                    p.y += dy;
                }
            }
            Self::Text(t) => {
                t.x = to.x;
                t.y = to.y;
            }
            Self::Stamp(s) => {
                s.x = to.x;
                s.y = to.y;
            }
        }
        moved.meta_mut().modified_at = now;
        moved
    }

    /// Check the per-kind invariants of a committed object.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMarkup` naming the offending object.
    pub fn validate(&self) -> Result<(), MarkupError> {
        let id = self.id();
        if id.is_empty() || id == PREVIEW_PEN_ID || id == PREVIEW_BOX_ID {
            return Err(MarkupError::InvalidMarkup(format!("reserved or empty id {id:?}")));
        }
        let p = self.position();
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(MarkupError::InvalidMarkup(format!("{id}: non-finite position")));
        }
        match self {
            Self::Box(b) => {
                if !(b.width >= MIN_BOX_SIZE && b.height >= MIN_BOX_SIZE) {
                    return Err(MarkupError::InvalidMarkup(format!("{id}: box smaller than 1x1")));
                }
            }
            Self::Drawing(d) => {
                if d.path.len() < MIN_DRAWING_POINTS {
                    return Err(MarkupError::InvalidMarkup(format!("{id}: drawing needs at least 2 points")));
                }
            }
            Self::Text(t) => {
                if t.text.trim().is_empty() {
                    return Err(MarkupError::InvalidMarkup(format!("{id}: empty text")));
                }
            }
            Self::Stamp(_) => {}
        }
        Ok(())
    }
}

/// Immutable, cheaply clonable ordered list of committed objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectList(Arc<[MarkupObject]>);

impl Default for ObjectList {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for ObjectList {
    type Target = [MarkupObject];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ObjectList {
    #[must_use]
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Build a list after checking ids are unique and every object is valid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMarkup` on duplicate ids or an invalid object.
    pub fn try_from_vec(objects: Vec<MarkupObject>) -> Result<Self, MarkupError> {
        let mut seen = HashSet::with_capacity(objects.len());
        for obj in &objects {
            obj.validate()?;
            if !seen.insert(obj.id()) {
                return Err(MarkupError::InvalidMarkup(format!("duplicate id {}", obj.id())));
            }
        }
        Ok(Self(Arc::from(objects)))
    }

    /// Whether both lists are the very same snapshot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MarkupObject> {
        self.iter().find(|o| o.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// New list with `obj` appended on top.
    #[must_use]
    pub fn with_pushed(&self, obj: MarkupObject) -> Self {
        let mut next = self.to_vec();
        next.push(obj);
        Self(Arc::from(next))
    }

    /// New list where each object is passed through `f`; `f` returns `None`
    /// to keep the object unchanged.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(&MarkupObject) -> Option<MarkupObject>) -> Self {
        let next: Vec<MarkupObject> = self.iter().map(|o| f(o).unwrap_or_else(|| o.clone())).collect();
        Self(Arc::from(next))
    }

    /// New list without the objects whose ids are in `ids`.
    #[must_use]
    pub fn without(&self, ids: &[ObjectId]) -> Self {
        let next: Vec<MarkupObject> = self.iter().filter(|o| !ids.iter().any(|id| id == o.id())).cloned().collect();
        Self(Arc::from(next))
    }

    /// Serialize as the persisted markup payload.
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, MarkupError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a persisted markup payload.
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed JSON and `InvalidMarkup` for objects that
    /// break the model invariants.
    pub fn from_json(json: &str) -> Result<Self, MarkupError> {
        let objects: Vec<MarkupObject> = serde_json::from_str(json)?;
        Self::try_from_vec(objects)
    }
}

impl Serialize for ObjectList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let objects = Vec::<MarkupObject>::deserialize(deserializer)?;
        Self::try_from_vec(objects).map_err(serde::de::Error::custom)
    }
}
