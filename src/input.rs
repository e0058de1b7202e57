//! Input model: tools, toolbar settings, keys, and the gesture session.
//!
//! `Tool` and `ToolSettings` capture the user's intent at the time of a
//! pointer event; both are plain values pushed in by the host toolbar.
//! `GestureSession` is the only mutable scratch the dispatcher keeps between
//! pointer-down and pointer-up: the active pointer map, pinch memory, and the
//! current `InputState` with its per-gesture geometry.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::{ObjectId, ObjectList};
use crate::error::MarkupError;
use crate::style::{BoxColor, BoxShape, Color, SizeTier, StampShape};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    /// Drag to move the view.
    Pan,
    /// Click to select, drag to move the selection (default).
    #[default]
    Select,
    /// Drag out an outlined box of the given color.
    Box(BoxColor),
    /// Freehand stroke.
    Pen,
    /// Click to drop a stamp.
    Stamp,
    /// Click to place a text label.
    Text,
}

impl Tool {
    /// Every tool, in toolbar order.
    pub const ALL: [Tool; 8] = [
        Tool::Pan,
        Tool::Select,
        Tool::Box(BoxColor::Red),
        Tool::Box(BoxColor::Blue),
        Tool::Box(BoxColor::Gray),
        Tool::Pen,
        Tool::Stamp,
        Tool::Text,
    ];

    /// Whether selecting this tool clears the current selection.
    #[must_use]
    pub fn is_drawing_tool(self) -> bool {
        matches!(self, Self::Box(_) | Self::Pen | Self::Stamp)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Select => "select",
            Self::Box(BoxColor::Red) => "box-red",
            Self::Box(BoxColor::Blue) => "box-blue",
            Self::Box(BoxColor::Gray) => "box-gray",
            Self::Pen => "pen",
            Self::Stamp => "stamp",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MarkupError::UnknownTool(s.to_owned()))
    }
}

/// Defaults for the stamp tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StampSettings {
    pub shape: StampShape,
    pub size: SizeTier,
    pub color: Color,
}

impl Default for StampSettings {
    fn default() -> Self {
        Self { shape: StampShape::Circle, size: SizeTier::Medium, color: BoxColor::Red.color() }
    }
}

/// Box tool size and outline style. Color comes from the tool itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxSettings {
    pub size: SizeTier,
    pub shape: BoxShape,
}

/// Pen stroke appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PenSettings {
    pub color: Color,
    pub width: f64,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self { color: BoxColor::Red.color(), width: 3.0 }
    }
}

/// Text tool appearance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextSettings {
    pub size: SizeTier,
    pub color: Color,
}

/// All toolbar-supplied settings, consumed per gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolSettings {
    pub stamp: StampSettings,
    pub boxes: BoxSettings,
    pub pen: PenSettings,
    pub text: TextSettings,
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// Pointer identifier as delivered by the input device.
pub type PointerId = i32;

/// The gesture being tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No single-pointer gesture in progress.
    #[default]
    Idle,
    /// Panning the view.
    Panning {
        /// Client position of the previous event.
        last_client: Point,
    },
    /// Moving the selected objects.
    Dragging {
        /// World-space pointer position at pointer-down.
        start_world: Point,
        /// Position of each dragged object at pointer-down.
        baselines: Vec<(ObjectId, Point)>,
        /// Object list before the drag began; pushed to history on release.
        before: ObjectList,
    },
    /// Dragging out a new box.
    DrawingBox {
        start_world: Point,
        color: BoxColor,
        size: SizeTier,
        shape: BoxShape,
    },
    /// Recording a freehand stroke.
    DrawingPen {
        /// World-space points recorded so far.
        path: Vec<Point>,
    },
}

impl InputState {
    /// True between a draw tool's pointer-down and its commit.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::DrawingBox { .. } | Self::DrawingPen { .. })
    }
}

/// Pointer tracking and gesture scratch owned by the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct GestureSession {
    pointers: BTreeMap<PointerId, Point>,
    pinch_distance: Option<f64>,
    pub state: InputState,
}

impl GestureSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pointer-down. Returns the number of active pointers.
    pub fn press(&mut self, pointer: PointerId, client: Point) -> usize {
        self.pointers.insert(pointer, client);
        self.pointers.len()
    }

    /// Update a tracked pointer. Returns false for pointers that never went
    /// down (hover).
    pub fn move_pointer(&mut self, pointer: PointerId, client: Point) -> bool {
        match self.pointers.get_mut(&pointer) {
            Some(pos) => {
                *pos = client;
                true
            }
            None => false,
        }
    }

    /// Forget a pointer. Returns the number still active, or `None` if the
    /// pointer was not tracked.
    pub fn release(&mut self, pointer: PointerId) -> Option<usize> {
        self.pointers.remove(&pointer)?;
        Some(self.pointers.len())
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.pointers.len()
    }

    /// Client positions of the two active pointers, when exactly two are down.
    #[must_use]
    pub fn pinch_pair(&self) -> Option<(Point, Point)> {
        if self.pointers.len() != 2 {
            return None;
        }
        let mut it = self.pointers.values().copied();
        Some((it.next()?, it.next()?))
    }

    #[must_use]
    pub fn pinch_distance(&self) -> Option<f64> {
        self.pinch_distance
    }

    pub fn set_pinch_distance(&mut self, distance: f64) {
        self.pinch_distance = Some(distance);
    }

    pub fn reset_pinch(&mut self) {
        self.pinch_distance = None;
    }
}
