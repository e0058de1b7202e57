#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn tool_names_roundtrip() {
    for tool in Tool::ALL {
        assert_eq!(tool.as_str().parse::<Tool>().unwrap(), tool);
        assert_eq!(tool.to_string(), tool.as_str());
    }
}

#[test]
fn tool_parse_box_colors() {
    assert_eq!("box-gray".parse::<Tool>().unwrap(), Tool::Box(BoxColor::Gray));
    assert_eq!("box-red".parse::<Tool>().unwrap(), Tool::Box(BoxColor::Red));
}

#[test]
fn tool_parse_unknown_is_error() {
    let err = "eraser".parse::<Tool>().unwrap_err();
    assert!(matches!(err, MarkupError::UnknownTool(ref name) if name == "eraser"));
}

#[test]
fn drawing_tools_clear_selection() {
    assert!(Tool::Box(BoxColor::Blue).is_drawing_tool());
    assert!(Tool::Pen.is_drawing_tool());
    assert!(Tool::Stamp.is_drawing_tool());
    assert!(!Tool::Text.is_drawing_tool());
    assert!(!Tool::Select.is_drawing_tool());
    assert!(!Tool::Pan.is_drawing_tool());
}

// =============================================================
// Settings
// =============================================================

#[test]
fn settings_defaults() {
    let s = ToolSettings::default();
    assert_eq!(s.stamp.shape, StampShape::Circle);
    assert_eq!(s.stamp.size, SizeTier::Medium);
    assert_eq!(s.boxes.shape, BoxShape::Rectangle);
    assert_eq!(s.pen.width, 3.0);
    assert_eq!(s.text.color, Color::BLACK);
}

#[test]
fn settings_deserialize_partial_json() {
    let s: ToolSettings = serde_json::from_str(r##"{"stamp":{"shape":"star"},"pen":{"color":"#0000ff"}}"##).unwrap();
    assert_eq!(s.stamp.shape, StampShape::Star);
    assert_eq!(s.stamp.size, SizeTier::Medium);
    assert_eq!(s.pen.color, Color::rgb(0, 0, 255));
    assert_eq!(s.pen.width, 3.0);
}

// =============================================================
// Modifiers / Key
// =============================================================

#[test]
fn command_is_ctrl_or_meta() {
    assert!(!Modifiers::default().command());
    assert!(Modifiers { ctrl: true, ..Default::default() }.command());
    assert!(Modifiers { meta: true, ..Default::default() }.command());
}

#[test]
fn key_new_wraps_name() {
    assert_eq!(Key::new("Escape"), Key("Escape".into()));
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
}

#[test]
fn only_draw_states_are_drawing() {
    assert!(InputState::DrawingPen { path: vec![] }.is_drawing());
    assert!(
        InputState::DrawingBox {
            start_world: Point::default(),
            color: BoxColor::Red,
            size: SizeTier::Small,
            shape: BoxShape::Rectangle,
        }
        .is_drawing()
    );
    assert!(!InputState::Idle.is_drawing());
    assert!(!InputState::Panning { last_client: Point::default() }.is_drawing());
}

// =============================================================
// GestureSession
// =============================================================

#[test]
fn press_counts_pointers() {
    let mut s = GestureSession::new();
    assert_eq!(s.press(1, Point::new(0.0, 0.0)), 1);
    assert_eq!(s.press(2, Point::new(5.0, 0.0)), 2);
    assert_eq!(s.press(2, Point::new(6.0, 0.0)), 2);
}

#[test]
fn move_unknown_pointer_is_ignored() {
    let mut s = GestureSession::new();
    assert!(!s.move_pointer(7, Point::new(1.0, 1.0)));
    assert_eq!(s.active_count(), 0);
}

#[test]
fn release_reports_remaining() {
    let mut s = GestureSession::new();
    s.press(1, Point::default());
    s.press(2, Point::default());
    assert_eq!(s.release(1), Some(1));
    assert_eq!(s.release(1), None);
    assert_eq!(s.release(2), Some(0));
}

#[test]
fn pinch_pair_requires_exactly_two() {
    let mut s = GestureSession::new();
    s.press(1, Point::new(0.0, 0.0));
    assert!(s.pinch_pair().is_none());
    s.press(2, Point::new(10.0, 0.0));
    let (a, b) = s.pinch_pair().unwrap();
    assert_eq!(a.distance(b), 10.0);
    s.press(3, Point::new(20.0, 0.0));
    assert!(s.pinch_pair().is_none());
}

#[test]
fn pinch_pair_tracks_moves() {
    let mut s = GestureSession::new();
    s.press(1, Point::new(0.0, 0.0));
    s.press(2, Point::new(10.0, 0.0));
    assert!(s.move_pointer(2, Point::new(0.0, 30.0)));
    let (a, b) = s.pinch_pair().unwrap();
    assert_eq!(a.distance(b), 30.0);
}

#[test]
fn pinch_memory_set_and_reset() {
    let mut s = GestureSession::new();
    assert!(s.pinch_distance().is_none());
    s.set_pinch_distance(100.0);
    assert_eq!(s.pinch_distance(), Some(100.0));
    s.reset_pinch();
    assert!(s.pinch_distance().is_none());
}
