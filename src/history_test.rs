use time::macros::datetime;

use super::*;
use crate::camera::Point;
use crate::doc::{MarkupObject, ObjectMeta};
use crate::style::{Color, SizeTier, StampShape};

fn stamp(id: &str) -> MarkupObject {
    MarkupObject::new_stamp(
        ObjectMeta::with_id(id.into(), datetime!(2024-03-01 12:00 UTC)),
        Point::new(0.0, 0.0),
        StampShape::Circle,
        SizeTier::Small,
        Color::BLACK,
    )
}

fn lists() -> (ObjectList, ObjectList, ObjectList) {
    let a = ObjectList::empty();
    let b = a.with_pushed(stamp("1"));
    let c = b.with_pushed(stamp("2"));
    (a, b, c)
}

#[test]
fn new_history_is_empty() {
    let h = History::new(10);
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert_eq!(h.undo_len(), 0);
}

#[test]
fn undo_on_empty_is_none() {
    let mut h = History::new(10);
    assert!(h.undo(ObjectList::empty()).is_none());
    assert_eq!(h.redo_len(), 0);
}

#[test]
fn redo_on_empty_is_none() {
    let mut h = History::new(10);
    assert!(h.redo(ObjectList::empty()).is_none());
    assert_eq!(h.undo_len(), 0);
}

#[test]
fn push_counts_each_commit() {
    let (a, b, _) = lists();
    let mut h = History::new(10);
    h.push(a);
    h.push(b);
    assert_eq!(h.undo_len(), 2);
    assert_eq!(h.redo_len(), 0);
}

#[test]
fn undo_restores_prior_and_moves_current_to_redo() {
    let (a, b, c) = lists();
    let mut h = History::new(10);
    h.push(a);
    h.push(b.clone());
    let restored = h.undo(c.clone()).unwrap();
    assert!(restored.ptr_eq(&b));
    assert_eq!(h.undo_len(), 1);
    assert_eq!(h.redo_len(), 1);

    let redone = h.redo(restored).unwrap();
    assert!(redone.ptr_eq(&c));
    assert_eq!(h.undo_len(), 2);
    assert_eq!(h.redo_len(), 0);
}

#[test]
fn push_after_undo_clears_redo() {
    let (a, b, _) = lists();
    let mut h = History::new(10);
    h.push(a);
    let restored = h.undo(b).unwrap();
    assert!(h.can_redo());
    h.push(restored);
    assert!(!h.can_redo());
}

#[test]
fn limit_drops_oldest_entries() {
    let (a, b, c) = lists();
    let mut h = History::new(2);
    h.push(a);
    h.push(b.clone());
    h.push(c.clone());
    assert_eq!(h.undo_len(), 2);
    assert!(h.undo(ObjectList::empty()).unwrap().ptr_eq(&c));
    assert!(h.undo(ObjectList::empty()).unwrap().ptr_eq(&b));
    assert!(h.undo(ObjectList::empty()).is_none());
}

#[test]
fn zero_limit_keeps_one_entry() {
    let (a, b, _) = lists();
    let mut h = History::new(0);
    h.push(a);
    h.push(b);
    assert_eq!(h.undo_len(), 1);
}
