//! The headless markup editor.
//!
//! `MarkupEditor` owns the object list, selection, viewer, history, and
//! gesture session for one open blueprint. Hosts forward raw pointer,
//! wheel, and key events; every handler returns the `Action`s the host must
//! react to (repaint, prompt for text, persist). No handler performs I/O or
//! blocks: text entry is an `Action::InputRequested` answered later through
//! [`MarkupEditor::resolve_input`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::BTreeMap;

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::camera::{Point, Rect, ViewerState};
use crate::config::MarkupConfig;
use crate::consts::WHEEL_ZOOM_SENSITIVITY;
use crate::doc::{MarkupObject, ObjectId, ObjectList, ObjectMeta};
use crate::error::MarkupError;
use crate::history::History;
use crate::hit::hit_test;
use crate::input::{
    BoxSettings, GestureSession, InputState, Key, Modifiers, PenSettings, PointerId, StampSettings, TextSettings, Tool,
    ToolSettings,
};
use crate::preview::{PreviewLayer, box_preview, pen_preview};
use crate::style::{BoxColor, BoxShape, Color, SizeTier};

/// Identifier for an outstanding text/label prompt.
pub type InputRequestId = u64;

/// What an input prompt is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Content of a new text label.
    Text,
    /// Optional label for a gray box that is waiting to be committed.
    BoxLabel,
}

/// A request for the host to collect a line of text from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRequest {
    pub id: InputRequestId,
    pub kind: InputKind,
    /// World-space anchor of the object being created.
    pub at: Point,
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    ViewChanged(ViewerState),
    PreviewChanged(Option<MarkupObject>),
    ObjectCreated(MarkupObject),
    ObjectsMoved { ids: Vec<ObjectId> },
    ObjectsDeleted { ids: Vec<ObjectId> },
    /// The whole list was swapped (undo, redo, replace, drag revert).
    ObjectsReplaced,
    SelectionChanged(Vec<ObjectId>),
    InputRequested(InputRequest),
    HistoryChanged { can_undo: bool, can_redo: bool },
}

/// Commit deferred until the host answers an input request.
#[derive(Debug, Clone)]
enum PendingCommit {
    Text { at: Point, size: SizeTier, color: Color },
    BoxLabel { rect: Rect, color: BoxColor, size: SizeTier, shape: BoxShape },
}

/// How a drag in progress is settled when its gesture is interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragOutcome {
    Commit,
    Revert,
}

/// Editor state for one open blueprint.
#[derive(Debug, Clone)]
pub struct MarkupEditor {
    objects: ObjectList,
    selected: Vec<ObjectId>,
    tool: Tool,
    settings: ToolSettings,
    viewer: ViewerState,
    history: History,
    session: GestureSession,
    preview: PreviewLayer,
    pending: BTreeMap<InputRequestId, PendingCommit>,
    next_request_id: InputRequestId,
    image_size: (u32, u32),
    record_creations: bool,
    anchor_pinch: bool,
}

impl Default for MarkupEditor {
    fn default() -> Self {
        Self::new(&MarkupConfig::default())
    }
}

impl MarkupEditor {
    /// Empty editor with no source image size.
    #[must_use]
    pub fn new(config: &MarkupConfig) -> Self {
        Self {
            objects: ObjectList::empty(),
            selected: Vec::new(),
            tool: Tool::default(),
            settings: ToolSettings::default(),
            viewer: ViewerState::default(),
            history: History::new(config.history_limit),
            session: GestureSession::new(),
            preview: PreviewLayer::default(),
            pending: BTreeMap::new(),
            next_request_id: 1,
            image_size: (0, 0),
            record_creations: config.record_creations,
            anchor_pinch: config.anchor_pinch,
        }
    }

    /// Open a markup session over an image of the given natural size,
    /// optionally seeded with previously saved markup.
    #[must_use]
    pub fn open(config: &MarkupConfig, image_width: u32, image_height: u32, objects: Option<ObjectList>) -> Self {
        let mut editor = Self::new(config);
        editor.image_size = (image_width, image_height);
        if let Some(objects) = objects {
            editor.objects = objects;
        }
        info!(image_width, image_height, objects = editor.objects.len(), "markup session opened");
        editor
    }

    // --- Queries ---

    #[must_use]
    pub fn objects(&self) -> &ObjectList {
        &self.objects
    }

    #[must_use]
    pub fn selection(&self) -> &[ObjectId] {
        &self.selected
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn tool_settings(&self) -> &ToolSettings {
        &self.settings
    }

    #[must_use]
    pub fn viewer(&self) -> ViewerState {
        self.viewer
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The in-progress preview object, if a draw gesture is active.
    #[must_use]
    pub fn preview(&self) -> Option<&MarkupObject> {
        self.preview.get()
    }

    /// True only between a draw tool's pointer-down and its commit.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.session.state.is_drawing()
    }

    #[must_use]
    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    #[must_use]
    pub fn active_pointers(&self) -> usize {
        self.session.active_count()
    }

    /// Outstanding input requests, oldest first.
    pub fn pending_inputs(&self) -> impl Iterator<Item = InputRequest> + '_ {
        self.pending.iter().map(|(id, commit)| request_for(*id, commit))
    }

    /// Serialize the committed objects as the persisted markup payload.
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn export_markup(&self) -> Result<String, MarkupError> {
        self.objects.to_json()
    }

    // --- Tool / settings / view ---

    /// Switch tools. Entering a drawing tool clears the selection; any
    /// gesture in progress is cancelled (a drag keeps its moved positions).
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if tool == self.tool {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture(DragOutcome::Commit);
        debug!(from = %self.tool, to = %tool, "tool changed");
        self.tool = tool;
        if tool.is_drawing_tool() && !self.selected.is_empty() {
            self.selected.clear();
            actions.push(Action::SelectionChanged(Vec::new()));
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn set_tool_settings(&mut self, settings: ToolSettings) {
        self.settings = settings;
    }

    pub fn set_stamp_settings(&mut self, stamp: StampSettings) {
        self.settings.stamp = stamp;
    }

    pub fn set_box_settings(&mut self, boxes: BoxSettings) {
        self.settings.boxes = boxes;
    }

    pub fn set_pen_settings(&mut self, pen: PenSettings) {
        self.settings.pen = pen;
    }

    pub fn set_text_settings(&mut self, text: TextSettings) {
        self.settings.text = text;
    }

    /// Replace the viewer transform. Zoom is clamped.
    pub fn set_viewer(&mut self, viewer: ViewerState) -> Vec<Action> {
        self.viewer = viewer;
        self.viewer.set_zoom(viewer.zoom);
        self.view_changed()
    }

    /// Fit the source image into a viewport of the given client size.
    pub fn fit_to_viewport(&mut self, viewport_width: f64, viewport_height: f64) -> Vec<Action> {
        let (w, h) = self.image_size;
        self.viewer.fit(f64::from(w), f64::from(h), viewport_width, viewport_height);
        self.view_changed()
    }

    /// Select the given ids, ignoring any that are not in the list.
    pub fn set_selection(&mut self, ids: Vec<ObjectId>) -> Vec<Action> {
        let next: Vec<ObjectId> = ids.into_iter().filter(|id| self.objects.contains(id)).collect();
        if next == self.selected {
            return Vec::new();
        }
        self.selected = next;
        vec![Action::SelectionChanged(self.selected.clone()), Action::RenderNeeded]
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, pointer: PointerId, client: Point) -> Vec<Action> {
        let active = self.session.press(pointer, client);
        if active >= 2 {
            debug!(active, "pinch start");
            let actions = self.cancel_gesture(DragOutcome::Commit);
            self.session.reset_pinch();
            if let Some((a, b)) = self.session.pinch_pair() {
                self.session.set_pinch_distance(a.distance(b));
            }
            return actions;
        }

        let mut actions = self.cancel_gesture(DragOutcome::Commit);
        let world = self.viewer.world_from_client(client);
        match self.tool {
            Tool::Pan => {
                self.session.state = InputState::Panning { last_client: client };
            }
            Tool::Select => actions.extend(self.begin_select(world)),
            Tool::Box(color) => {
                self.session.state = InputState::DrawingBox {
                    start_world: world,
                    color,
                    size: self.settings.boxes.size,
                    shape: self.settings.boxes.shape,
                };
                debug!(color = color.as_str(), x = world.x, y = world.y, "box draw start");
            }
            Tool::Pen => {
                self.session.state = InputState::DrawingPen { path: vec![world] };
                debug!(x = world.x, y = world.y, "pen draw start");
            }
            Tool::Stamp => {
                let s = self.settings.stamp;
                let stamp = MarkupObject::new_stamp(ObjectMeta::new(now()), world, s.shape, s.size, s.color);
                actions.extend(self.commit_created(stamp, false));
            }
            Tool::Text => {
                let t = self.settings.text;
                actions.push(self.request_input(PendingCommit::Text { at: world, size: t.size, color: t.color }));
            }
        }
        actions
    }

    pub fn on_pointer_move(&mut self, pointer: PointerId, client: Point) -> Vec<Action> {
        if !self.session.move_pointer(pointer, client) {
            return Vec::new();
        }
        match self.session.active_count() {
            1 => {}
            2 => return self.pinch_move(),
            _ => return Vec::new(),
        }

        let world = self.viewer.world_from_client(client);
        match &mut self.session.state {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_client } => {
                let (dx, dy) = (client.x - last_client.x, client.y - last_client.y);
                *last_client = client;
                self.viewer.pan_by(dx, dy);
                self.view_changed()
            }
            InputState::Dragging { start_world, baselines, .. } => {
                let (dx, dy) = (world.x - start_world.x, world.y - start_world.y);
                let stamp = now();
                self.objects = self.objects.map(|obj| {
                    baselines
                        .iter()
                        .find(|(id, _)| id == obj.id())
                        .map(|(_, base)| obj.moved_to(Point::new(base.x + dx, base.y + dy), stamp))
                });
                let ids = baselines.iter().map(|(id, _)| id.clone()).collect();
                vec![Action::ObjectsMoved { ids }, Action::RenderNeeded]
            }
            InputState::DrawingPen { path } => {
                path.push(world);
                let pen = self.settings.pen;
                match pen_preview(path, pen.color, pen.width, now()) {
                    Some(obj) => self.show_preview(obj),
                    None => Vec::new(),
                }
            }
            InputState::DrawingBox { start_world, color, size, shape } => {
                let rect = Rect::from_corners(*start_world, world);
                let obj = box_preview(rect, *color, *size, *shape, now());
                self.show_preview(obj)
            }
        }
    }

    pub fn on_pointer_up(&mut self, pointer: PointerId, client: Point) -> Vec<Action> {
        let Some(remaining) = self.session.release(pointer) else {
            return Vec::new();
        };
        if remaining < 2 {
            self.session.reset_pinch();
        }
        if remaining > 0 {
            return Vec::new();
        }

        let mut actions = self.clear_preview();
        let world = self.viewer.world_from_client(client);
        match std::mem::take(&mut self.session.state) {
            InputState::Idle | InputState::Panning { .. } => {}
            InputState::Dragging { before, .. } => actions.extend(self.finish_drag(before)),
            InputState::DrawingBox { start_world, color, size, shape } => {
                let rect = Rect::from_corners(start_world, world);
                if color.wants_label() {
                    actions.push(self.request_input(PendingCommit::BoxLabel { rect, color, size, shape }));
                } else {
                    let obj = MarkupObject::new_box(ObjectMeta::new(now()), rect, color, size, shape, None);
                    actions.extend(self.commit_created(obj, false));
                }
            }
            InputState::DrawingPen { path } => {
                let pen = self.settings.pen;
                let points = path.len();
                match MarkupObject::new_drawing(ObjectMeta::new(now()), path, pen.color, pen.width) {
                    Some(obj) => actions.extend(self.commit_created(obj, false)),
                    None => debug!(points, "pen stroke too short, discarded"),
                }
            }
        }
        if !actions.is_empty() && !actions.contains(&Action::RenderNeeded) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Pointer lost (e.g. touch cancelled). Nothing is committed and a drag
    /// in progress is reverted.
    pub fn on_pointer_cancel(&mut self, pointer: PointerId) -> Vec<Action> {
        let Some(remaining) = self.session.release(pointer) else {
            return Vec::new();
        };
        if remaining < 2 {
            self.session.reset_pinch();
        }
        if remaining > 0 {
            return Vec::new();
        }
        debug!(pointer, "pointer cancelled");
        self.cancel_gesture(DragOutcome::Revert)
    }

    /// Zoom by a wheel delta, keeping the point under the cursor fixed.
    pub fn on_wheel(&mut self, client: Point, delta_y: f64) -> Vec<Action> {
        let factor = (-delta_y * WHEEL_ZOOM_SENSITIVITY).exp();
        if !factor.is_finite() {
            return Vec::new();
        }
        self.viewer.zoom_by_at(factor, client);
        self.view_changed()
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" => {
                let mut actions = self.cancel_gesture(DragOutcome::Revert);
                actions.extend(self.set_selection(Vec::new()));
                actions
            }
            "z" | "Z" if modifiers.command() && modifiers.shift => self.redo(),
            "z" | "Z" if modifiers.command() => self.undo(),
            "y" | "Y" if modifiers.command() => self.redo(),
            _ => Vec::new(),
        }
    }

    // --- Input continuations ---

    /// Answer an outstanding input request. `None` means the user dismissed
    /// the prompt. Unknown ids are ignored.
    pub fn resolve_input(&mut self, request_id: InputRequestId, response: Option<String>) -> Vec<Action> {
        let Some(pending) = self.pending.remove(&request_id) else {
            debug!(request_id, "unknown input request");
            return Vec::new();
        };
        match pending {
            PendingCommit::Text { at, size, color } => {
                let text = response.unwrap_or_default();
                match MarkupObject::new_text(ObjectMeta::new(now()), at, &text, size, color) {
                    Some(obj) => self.commit_created(obj, true),
                    None => {
                        debug!(request_id, "text input empty, nothing created");
                        Vec::new()
                    }
                }
            }
            PendingCommit::BoxLabel { rect, color, size, shape } => {
                let label = response.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
                let obj = MarkupObject::new_box(ObjectMeta::new(now()), rect, color, size, shape, label);
                self.commit_created(obj, false)
            }
        }
    }

    // --- Editing commands ---

    /// Remove the selected objects. No-op when nothing is selected.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.selected.is_empty() {
            return Vec::new();
        }
        let ids = std::mem::take(&mut self.selected);
        let next = self.objects.without(&ids);
        let mut actions = Vec::new();
        if next.len() != self.objects.len() {
            info!(count = ids.len(), "objects deleted");
            actions.extend(self.commit_list(next, true));
            actions.push(Action::ObjectsDeleted { ids });
        }
        actions.push(Action::SelectionChanged(Vec::new()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Replace the whole object list as one undoable step.
    pub fn replace_objects(&mut self, objects: ObjectList) -> Vec<Action> {
        let mut actions = self.cancel_gesture(DragOutcome::Commit);
        actions.extend(self.commit_list(objects, true));
        actions.push(Action::ObjectsReplaced);
        actions.extend(self.prune_selection());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Restore the list as it was before the last committed change.
    pub fn undo(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gesture(DragOutcome::Revert);
        let Some(previous) = self.history.undo(self.objects.clone()) else {
            return actions;
        };
        info!(undo = self.history.undo_len(), redo = self.history.redo_len(), "undo");
        self.objects = previous;
        actions.extend(self.after_history_step());
        actions
    }

    /// Reapply the last undone change.
    pub fn redo(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gesture(DragOutcome::Revert);
        let Some(next) = self.history.redo(self.objects.clone()) else {
            return actions;
        };
        info!(undo = self.history.undo_len(), redo = self.history.redo_len(), "redo");
        self.objects = next;
        actions.extend(self.after_history_step());
        actions
    }

    // --- Internals ---

    fn begin_select(&mut self, world: Point) -> Vec<Action> {
        let Some(id) = hit_test(&self.objects, world) else {
            return self.set_selection(Vec::new());
        };
        let changed = self.selected.len() != 1 || self.selected[0] != id;
        self.selected = vec![id];
        let baselines = self
            .selected
            .iter()
            .filter_map(|id| self.objects.get(id).map(|obj| (id.clone(), obj.position())))
            .collect();
        self.session.state = InputState::Dragging { start_world: world, baselines, before: self.objects.clone() };
        debug!(id = %self.selected[0], "drag start");
        if changed {
            vec![Action::SelectionChanged(self.selected.clone()), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    fn pinch_move(&mut self) -> Vec<Action> {
        let Some((a, b)) = self.session.pinch_pair() else {
            return Vec::new();
        };
        let current = a.distance(b);
        let previous = self.session.pinch_distance();
        self.session.set_pinch_distance(current);
        match previous {
            Some(prev) if prev > 0.0 && current > 0.0 => {
                let factor = current / prev;
                if self.anchor_pinch {
                    self.viewer.zoom_by_at(factor, a.midpoint(b));
                } else {
                    self.viewer.zoom_by(factor);
                }
                self.view_changed()
            }
            _ => Vec::new(),
        }
    }

    /// Push a drag's pre-drag snapshot. A click that selects without moving
    /// is still a drag and gets its own entry.
    fn finish_drag(&mut self, before: ObjectList) -> Vec<Action> {
        let moved = !self.objects.ptr_eq(&before);
        info!(count = self.selected.len(), moved, "drag committed");
        self.history.push(before);
        vec![self.history_changed()]
    }

    /// Abandon the current single-pointer gesture: discard drawing and
    /// preview, and settle any drag per `outcome`.
    fn cancel_gesture(&mut self, outcome: DragOutcome) -> Vec<Action> {
        let mut actions = self.clear_preview();
        match std::mem::take(&mut self.session.state) {
            InputState::Dragging { before, .. } => match outcome {
                DragOutcome::Commit => actions.extend(self.finish_drag(before)),
                DragOutcome::Revert => {
                    if !self.objects.ptr_eq(&before) {
                        self.objects = before;
                        actions.push(Action::ObjectsReplaced);
                        actions.push(Action::RenderNeeded);
                    }
                }
            },
            InputState::DrawingBox { .. } | InputState::DrawingPen { .. } => {
                debug!("draw gesture cancelled");
            }
            InputState::Idle | InputState::Panning { .. } => {}
        }
        actions
    }

    fn commit_created(&mut self, obj: MarkupObject, select: bool) -> Vec<Action> {
        info!(id = %obj.id(), kind = obj.kind_name(), "object created");
        let next = self.objects.with_pushed(obj.clone());
        let mut actions = self.commit_list(next, self.record_creations);
        if select {
            self.selected = vec![obj.id().to_owned()];
            actions.push(Action::SelectionChanged(self.selected.clone()));
        }
        actions.push(Action::ObjectCreated(obj));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Swap in `next`, optionally recording the replaced list for undo.
    fn commit_list(&mut self, next: ObjectList, record: bool) -> Vec<Action> {
        let before = std::mem::replace(&mut self.objects, next);
        if record {
            self.history.push(before);
            vec![self.history_changed()]
        } else {
            Vec::new()
        }
    }

    fn after_history_step(&mut self) -> Vec<Action> {
        let mut actions = vec![Action::ObjectsReplaced];
        actions.extend(self.prune_selection());
        actions.push(self.history_changed());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Drop selected ids that are no longer in the list.
    fn prune_selection(&mut self) -> Vec<Action> {
        let before = self.selected.len();
        let objects = &self.objects;
        self.selected.retain(|id| objects.contains(id));
        if self.selected.len() == before {
            Vec::new()
        } else {
            vec![Action::SelectionChanged(self.selected.clone())]
        }
    }

    fn request_input(&mut self, commit: PendingCommit) -> Action {
        let id = self.next_request_id;
        self.next_request_id += 1;
        let request = request_for(id, &commit);
        debug!(request_id = id, kind = ?request.kind, "input requested");
        self.pending.insert(id, commit);
        Action::InputRequested(request)
    }

    fn show_preview(&mut self, obj: MarkupObject) -> Vec<Action> {
        self.preview.show(obj.clone());
        vec![Action::PreviewChanged(Some(obj)), Action::RenderNeeded]
    }

    fn clear_preview(&mut self) -> Vec<Action> {
        if self.preview.clear() {
            vec![Action::PreviewChanged(None), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    fn view_changed(&self) -> Vec<Action> {
        vec![Action::ViewChanged(self.viewer), Action::RenderNeeded]
    }

    fn history_changed(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }
}

fn request_for(id: InputRequestId, commit: &PendingCommit) -> InputRequest {
    match commit {
        PendingCommit::Text { at, .. } => InputRequest { id, kind: InputKind::Text, at: *at },
        PendingCommit::BoxLabel { rect, .. } => {
            InputRequest { id, kind: InputKind::BoxLabel, at: Point::new(rect.x, rect.y) }
        }
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}
