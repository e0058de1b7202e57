#![allow(clippy::float_cmp)]

use time::macros::datetime;

use super::*;

fn t0() -> OffsetDateTime {
    datetime!(2024-03-01 12:00 UTC)
}

fn t1() -> OffsetDateTime {
    datetime!(2024-03-01 12:05 UTC)
}

fn make_box(id: &str, x: f64, y: f64) -> MarkupObject {
    MarkupObject::new_box(
        ObjectMeta::with_id(id.into(), t0()),
        Rect { x, y, width: 20.0, height: 10.0 },
        BoxColor::Red,
        SizeTier::Medium,
        BoxShape::Rectangle,
        None,
    )
}

fn make_stamp(id: &str, x: f64, y: f64) -> MarkupObject {
    MarkupObject::new_stamp(
        ObjectMeta::with_id(id.into(), t0()),
        Point::new(x, y),
        StampShape::Star,
        SizeTier::Large,
        Color::rgb(0, 128, 0),
    )
}

// =============================================================
// Ids
// =============================================================

#[test]
fn new_object_ids_are_unique() {
    let ids: HashSet<ObjectId> = (0..256).map(|_| new_object_id()).collect();
    assert_eq!(ids.len(), 256);
}

#[test]
fn new_object_ids_are_time_ordered() {
    let a = new_object_id();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = new_object_id();
    assert!(a < b);
}

// =============================================================
// Constructors
// =============================================================

#[test]
fn new_box_enforces_minimum_size() {
    let obj = MarkupObject::new_box(
        ObjectMeta::new(t0()),
        Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.2 },
        BoxColor::Blue,
        SizeTier::Small,
        BoxShape::Rectangle,
        None,
    );
    let MarkupObject::Box(b) = obj else { panic!("expected box") };
    assert_eq!(b.width, 1.0);
    assert_eq!(b.height, 1.0);
}

#[test]
fn new_drawing_rejects_single_point() {
    let obj = MarkupObject::new_drawing(ObjectMeta::new(t0()), vec![Point::new(1.0, 1.0)], Color::BLACK, 2.0);
    assert!(obj.is_none());
}

#[test]
fn new_drawing_anchors_on_first_point() {
    let path = vec![Point::new(3.0, 4.0), Point::new(5.0, 6.0)];
    let obj = MarkupObject::new_drawing(ObjectMeta::new(t0()), path, Color::BLACK, 2.0).unwrap();
    assert_eq!(obj.position(), Point::new(3.0, 4.0));
}

#[test]
fn new_text_trims_and_rejects_blank() {
    assert!(MarkupObject::new_text(ObjectMeta::new(t0()), Point::default(), "   ", SizeTier::Small, Color::BLACK).is_none());
    let obj =
        MarkupObject::new_text(ObjectMeta::new(t0()), Point::default(), "  Exit  ", SizeTier::Large, Color::BLACK).unwrap();
    let MarkupObject::Text(t) = obj else { panic!("expected text") };
    assert_eq!(t.text, "Exit");
    assert_eq!(t.font_size, SizeTier::Large.font_px());
}

#[test]
fn new_meta_sets_both_timestamps() {
    let meta = ObjectMeta::new(t0());
    assert_eq!(meta.created_at, t0());
    assert_eq!(meta.modified_at, t0());
}

// =============================================================
// Moving
// =============================================================

#[test]
fn moved_to_updates_position_and_modified_at() {
    let moved = make_box("a", 10.0, 10.0).moved_to(Point::new(15.0, 7.0), t1());
    assert_eq!(moved.position(), Point::new(15.0, 7.0));
    assert_eq!(moved.created_at(), t0());
    assert_eq!(moved.modified_at(), t1());
}

#[test]
fn moved_drawing_translates_whole_path() {
    let path = vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)];
    let obj = MarkupObject::new_drawing(ObjectMeta::new(t0()), path, Color::BLACK, 2.0).unwrap();
    let moved = obj.moved_to(Point::new(3.0, -2.0), t1());
    let MarkupObject::Drawing(d) = moved else { panic!("expected drawing") };
    assert_eq!(d.path, vec![Point::new(3.0, -2.0), Point::new(13.0, 3.0)]);
    assert_eq!((d.x, d.y), (3.0, -2.0));
}

// =============================================================
// Validation
// =============================================================

#[test]
fn validate_rejects_reserved_ids() {
    assert!(make_box(PREVIEW_BOX_ID, 0.0, 0.0).validate().is_err());
    assert!(make_box("", 0.0, 0.0).validate().is_err());
}

#[test]
fn validate_rejects_small_box() {
    let mut obj = make_box("a", 0.0, 0.0);
    if let MarkupObject::Box(b) = &mut obj {
        b.width = 0.5;
    }
    assert!(matches!(obj.validate(), Err(MarkupError::InvalidMarkup(_))));
}

#[test]
fn validate_rejects_nan_position() {
    assert!(make_stamp("s", f64::NAN, 0.0).validate().is_err());
}

// =============================================================
// ObjectList
// =============================================================

#[test]
fn list_try_from_vec_rejects_duplicates() {
    let err = ObjectList::try_from_vec(vec![make_box("a", 0.0, 0.0), make_stamp("a", 1.0, 1.0)]).unwrap_err();
    assert!(matches!(err, MarkupError::InvalidMarkup(_)));
}

#[test]
fn list_with_pushed_appends_on_top_and_leaves_original() {
    let list = ObjectList::try_from_vec(vec![make_box("a", 0.0, 0.0)]).unwrap();
    let next = list.with_pushed(make_stamp("b", 1.0, 1.0));
    assert_eq!(list.len(), 1);
    assert_eq!(next.len(), 2);
    assert_eq!(next[1].id(), "b");
}

#[test]
fn list_map_replaces_only_returned_objects() {
    let list = ObjectList::try_from_vec(vec![make_box("a", 0.0, 0.0), make_stamp("b", 5.0, 5.0)]).unwrap();
    let next = list.map(|o| (o.id() == "b").then(|| o.moved_to(Point::new(9.0, 9.0), t1())));
    assert_eq!(next[0], list[0]);
    assert_eq!(next[1].position(), Point::new(9.0, 9.0));
}

#[test]
fn list_without_removes_ids() {
    let list = ObjectList::try_from_vec(vec![make_box("a", 0.0, 0.0), make_stamp("b", 5.0, 5.0)]).unwrap();
    let next = list.without(&["a".to_owned()]);
    assert_eq!(next.len(), 1);
    assert!(next.contains("b"));
    assert!(!next.contains("a"));
}

#[test]
fn list_clone_is_same_snapshot() {
    let list = ObjectList::try_from_vec(vec![make_box("a", 0.0, 0.0)]).unwrap();
    let copy = list.clone();
    assert!(list.ptr_eq(&copy));
    assert!(!list.ptr_eq(&list.with_pushed(make_stamp("b", 0.0, 0.0))));
}

// =============================================================
// Payload JSON
// =============================================================

#[test]
fn payload_uses_type_tag_and_camel_case() {
    let list = ObjectList::try_from_vec(vec![make_stamp("s1", 4.0, 5.0)]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&list.to_json().unwrap()).unwrap();
    let obj = &value[0];
    assert_eq!(obj["type"], "stamp");
    assert_eq!(obj["id"], "s1");
    assert_eq!(obj["shape"], "star");
    assert_eq!(obj["size"], "large");
    assert_eq!(obj["color"], "#008000");
    assert_eq!(obj["createdAt"], "2024-03-01T12:00:00Z");
    assert!(obj.get("modifiedAt").is_some());
}

#[test]
fn payload_roundtrips_every_kind() {
    let drawing = MarkupObject::new_drawing(
        ObjectMeta::with_id("d".into(), t0()),
        vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        Color::rgb(1, 2, 3),
        3.0,
    )
    .unwrap();
    let text =
        MarkupObject::new_text(ObjectMeta::with_id("t".into(), t0()), Point::new(1.0, 2.0), "Hi", SizeTier::Small, Color::BLACK)
            .unwrap();
    let list = ObjectList::try_from_vec(vec![make_box("b", 1.0, 2.0), drawing, text, make_stamp("s", 0.0, 0.0)]).unwrap();
    let back = ObjectList::from_json(&list.to_json().unwrap()).unwrap();
    assert_eq!(back, list);
}

#[test]
fn payload_box_defaults_optional_fields() {
    let json = r#"[{"type":"box","id":"b","createdAt":"2024-03-01T12:00:00Z","modifiedAt":"2024-03-01T12:00:00Z",
        "x":1,"y":2,"width":3,"height":4,"color":"gray"}]"#;
    let list = ObjectList::from_json(json).unwrap();
    let MarkupObject::Box(b) = &list[0] else { panic!("expected box") };
    assert_eq!(b.size, SizeTier::Medium);
    assert_eq!(b.shape, BoxShape::Rectangle);
    assert!(b.label.is_none());
}

#[test]
fn payload_rejects_short_drawing() {
    let json = r##"[{"type":"drawing","id":"d","createdAt":"2024-03-01T12:00:00Z","modifiedAt":"2024-03-01T12:00:00Z",
        "x":0,"y":0,"path":[{"x":0,"y":0}],"strokeColor":"#000000","strokeWidth":2}]"##;
    assert!(matches!(ObjectList::from_json(json), Err(MarkupError::InvalidMarkup(_))));
}

#[test]
fn payload_rejects_unknown_type() {
    let json = r#"[{"type":"arrow","id":"x"}]"#;
    assert!(matches!(ObjectList::from_json(json), Err(MarkupError::Json(_))));
}

#[test]
fn list_deserialize_validates() {
    let json = r#"[{"type":"box","id":"b","createdAt":"2024-03-01T12:00:00Z","modifiedAt":"2024-03-01T12:00:00Z",
        "x":1,"y":2,"width":0,"height":4,"color":"red"}]"#;
    assert!(serde_json::from_str::<ObjectList>(json).is_err());
}
