//! Editor session: the state behind one open floor plan.
//!
//! `EditorSession` owns the scene, viewport, selection, guest roster, and
//! gesture state. Hosts forward pointer, wheel, and key events to it and get
//! back a list of [`Action`]s describing what changed, which they use to
//! persist edits, update the cursor, and schedule a repaint. Nothing here
//! touches a browser or a network; see [`crate::persist`] for I/O.
//!
//! Live drags write straight into the scene so the renderer can follow the
//! pointer. The boundary check runs once, on release: a rejected move or
//! resize snaps the element back to where the gesture started.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::{debug, info, warn};

use crate::boundary::{
    BoundaryDraft, Constrained, DraftStep, constrain_to_boundary, is_element_within_boundary,
};
use crate::catalog::{self, ShapeKind};
use crate::config::EditorConfig;
use crate::consts::{BOUNDARY_CLOSE_RADIUS_PX, HANDLE_RADIUS_PX};
use crate::error::LayoutError;
use crate::geometry::{Point, Rect, Size, normalize_degrees};
use crate::persist::{ElementRecord, FloorPlanRecord, LoadWarning, sanitize};
use crate::placement::{
    Button, GeometrySnapshot, GridSettings, HandleHit, InputState, Key, Modifiers, SelectionState, Tool,
    WheelDelta, hit_handle, pointer_angle, resize_bounds,
};
use crate::render::{DrawList, TextMeasure, build_draw_list};
use crate::scene::{CanvasSettings, ElementId, IdGenerator, LayoutElement, PartialElement, RoomBoundary, Scene};
use crate::seating::{self, Assignment, Guest, GuestId, GuestRoster};
use crate::viewport::{Viewport, ZoomDirection};

/// Rotation snap increment while shift is held.
const ROTATION_SNAP_DEG: f64 = 15.0;
/// Arrow-key nudge multiplier while shift is held.
const NUDGE_SHIFT_FACTOR: f64 = 10.0;

/// Actions returned from session operations for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreated(LayoutElement),
    ElementUpdated { id: ElementId, fields: PartialElement },
    /// The element is gone; `released` guests are now unseated.
    ElementDeleted { id: ElementId, released: Vec<GuestId> },
    /// A move would have left the room; the element is back at `original`.
    MoveRejected { id: ElementId, original: Point },
    /// A resize would have left the room; the element's geometry was restored.
    ResizeRejected { id: ElementId },
    /// A new element could not be placed at scene point `at`.
    PlacementRejected { kind: String, at: Point },
    GuestAssigned(Assignment),
    GuestUnassigned { guest_id: GuestId, element_id: ElementId },
    BoundaryChanged(Option<RoomBoundary>),
    SelectionChanged(Option<ElementId>),
    SetCursor(String),
    ViewportChanged,
    RenderNeeded,
}

/// Revision counters for the save-in-flight protocol.
#[derive(Debug, Clone, Default)]
struct SaveState {
    revision: u64,
    saved_revision: u64,
    in_flight: Option<u64>,
    last_error: Option<String>,
}

pub struct EditorSession {
    event_id: String,
    scene: Scene,
    viewport: Viewport,
    selection: SelectionState,
    roster: GuestRoster,
    grid: GridSettings,
    canvas: CanvasSettings,
    tool: Tool,
    input: InputState,
    draft: BoundaryDraft,
    save: SaveState,
}

impl EditorSession {
    /// Empty session for `event_id` shown in a `container`-sized view.
    #[must_use]
    pub fn new(event_id: impl Into<String>, container: Size) -> Self {
        Self::with_ids(event_id, container, IdGenerator::default())
    }

    /// Empty session drawing element ids from `ids`.
    #[must_use]
    pub fn with_ids(event_id: impl Into<String>, container: Size, ids: IdGenerator) -> Self {
        let canvas = CanvasSettings::default();
        let mut viewport = Viewport::new(container, canvas.size());
        viewport.fit();
        Self {
            event_id: event_id.into(),
            scene: Scene::with_ids(ids),
            viewport,
            selection: SelectionState::default(),
            roster: GuestRoster::default(),
            grid: GridSettings::default(),
            canvas,
            tool: Tool::default(),
            input: InputState::default(),
            draft: BoundaryDraft::new(),
            save: SaveState::default(),
        }
    }

    /// Empty session using the grid and canvas settings from `config`.
    #[must_use]
    pub fn from_config(event_id: impl Into<String>, container: Size, config: &EditorConfig) -> Self {
        let mut session = Self::new(event_id, container);
        session.grid = config.grid;
        if config.canvas.validate().is_ok() {
            session.canvas = config.canvas;
            session.viewport.set_scene_size(config.canvas.size());
            session.viewport.fit();
        }
        session
    }

    // --- Queries ---

    #[must_use]
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn roster(&self) -> &GuestRoster {
        &self.roster
    }

    #[must_use]
    pub fn grid(&self) -> GridSettings {
        self.grid
    }

    #[must_use]
    pub fn canvas(&self) -> CanvasSettings {
        self.canvas
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn draft(&self) -> &BoundaryDraft {
        &self.draft
    }

    /// The currently selected element id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.selection.selected_id.as_deref()
    }

    /// The currently selected element, if any.
    #[must_use]
    pub fn selected_element(&self) -> Option<&LayoutElement> {
        self.selection().and_then(|id| self.scene.element(id))
    }

    /// What to paint for the current state.
    #[must_use]
    pub fn draw_list(&self, measure: &dyn TextMeasure) -> DrawList {
        build_draw_list(&self.scene, self.selection(), &self.draft, measure)
    }

    // --- Element edits ---

    /// Place `kind` at a scene position without a boundary check.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownKind`] or [`LayoutError::InvalidGeometry`].
    pub fn add_element(&mut self, kind: &str, position: Option<Point>) -> Result<Action, LayoutError> {
        let element = self.scene.add_element(kind, position)?.clone();
        self.touch();
        Ok(Action::ElementCreated(element))
    }

    /// Merge `fields` into an element. Property edits are not boundary-checked.
    ///
    /// # Errors
    ///
    /// Whatever [`Scene::update_element`] rejects.
    pub fn update_element(&mut self, id: &str, fields: PartialElement) -> Result<Action, LayoutError> {
        self.scene.update_element(id, &fields)?;
        self.touch();
        Ok(Action::ElementUpdated { id: id.to_owned(), fields })
    }

    /// Delete an element, unseating its guests first.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ElementNotFound`] for a missing id.
    pub fn delete_element(&mut self, id: &str) -> Result<Vec<Action>, LayoutError> {
        if !self.scene.contains(id) {
            return Err(LayoutError::ElementNotFound(id.to_owned()));
        }
        let released = seating::release_element(&mut self.scene, &mut self.roster, id);
        self.scene.remove_element(id);
        self.touch();
        info!(event_id = %self.event_id, element_id = id, released = released.len(), "element deleted");

        let mut actions = vec![Action::ElementDeleted { id: id.to_owned(), released }];
        if self.selection.is_selected(id) {
            self.selection.clear();
            actions.push(Action::SelectionChanged(None));
        }
        if matches!(self.input, InputState::DraggingElement { .. } | InputState::ResizingElement { .. } | InputState::RotatingElement { .. })
        {
            self.input = InputState::Idle;
        }
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    // --- Seating ---

    /// Seat a guest at an element.
    ///
    /// # Errors
    ///
    /// See [`seating::assign`].
    pub fn assign_guest(&mut self, guest_id: &str, element_id: &str) -> Result<Action, LayoutError> {
        let assignment = seating::assign(&mut self.scene, &mut self.roster, guest_id, element_id)?;
        self.touch();
        Ok(Action::GuestAssigned(assignment))
    }

    /// Unseat a guest. `None` when they were not seated anywhere.
    pub fn unassign_guest(&mut self, guest_id: &str) -> Option<Action> {
        let element_id = seating::unassign(&mut self.scene, &mut self.roster, guest_id)?;
        self.touch();
        Some(Action::GuestUnassigned { guest_id: guest_id.to_owned(), element_id })
    }

    /// Replace the guest list, keeping only seat assignments both sides agree on.
    pub fn set_guests(&mut self, guests: Vec<Guest>) {
        self.roster = GuestRoster::new(guests);
        if self.roster.reconcile(&mut self.scene) > 0 {
            self.touch();
        }
    }

    // --- Boundary, canvas, grid, tool ---

    /// Replace the room boundary. Elements already placed are not moved.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidBoundary`] for a closed polygon with fewer than
    /// three vertices or any non-finite vertex.
    pub fn set_room_boundary(&mut self, boundary: Option<RoomBoundary>) -> Result<Action, LayoutError> {
        let boundary = match boundary {
            Some(b) if b.closed => Some(RoomBoundary::closed_polygon(b.vertices)?),
            Some(b) if b.vertices.iter().any(|v| !v.is_finite()) => {
                return Err(LayoutError::InvalidBoundary("non-finite vertex".into()));
            }
            other => other,
        };
        self.scene.set_room_boundary(boundary.clone());
        self.touch();
        Ok(Action::BoundaryChanged(boundary))
    }

    /// Change canvas dimensions. Elements keep their scene positions and sizes.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidGeometry`] for non-positive values.
    pub fn set_canvas_settings(&mut self, canvas: CanvasSettings) -> Result<Action, LayoutError> {
        canvas.validate()?;
        self.canvas = canvas;
        self.viewport.set_scene_size(canvas.size());
        self.touch();
        Ok(Action::ViewportChanged)
    }

    pub fn set_grid(&mut self, grid: GridSettings) {
        self.grid = grid;
    }

    /// Switch tools, abandoning any gesture or boundary draft in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            self.draft.cancel();
            self.cancel_gesture();
        }
        self.tool = tool;
    }

    /// Resize the host container.
    pub fn set_container(&mut self, container: Size) -> Action {
        self.viewport.set_container(container);
        Action::ViewportChanged
    }

    // --- Palette ---

    /// Start dragging a palette item toward the canvas.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownKind`] when `kind` is not in the catalog.
    pub fn begin_palette_drag(&mut self, kind: &str) -> Result<(), LayoutError> {
        let config = catalog::lookup(kind).ok_or_else(|| LayoutError::UnknownKind(kind.to_owned()))?;
        self.input = InputState::PaletteDrag { kind: config.id };
        Ok(())
    }

    /// Drop the dragged palette item at a container point.
    ///
    /// Returns no actions when no palette drag is in progress.
    ///
    /// # Errors
    ///
    /// [`LayoutError::BoundaryViolation`] when the new element would sit
    /// outside the room boundary.
    pub fn drop_palette_item(&mut self, screen: Point) -> Result<Vec<Action>, LayoutError> {
        let InputState::PaletteDrag { kind } = self.input else {
            return Ok(Vec::new());
        };
        self.input = InputState::Idle;
        self.place_at(kind, self.viewport.screen_to_scene(screen))
    }

    /// Snap, boundary-check, add, and select a new element of `kind`.
    fn place_at(&mut self, kind: &str, scene_pt: Point) -> Result<Vec<Action>, LayoutError> {
        let config = catalog::lookup(kind).ok_or_else(|| LayoutError::UnknownKind(kind.to_owned()))?;
        let at = self.grid.apply(scene_pt);
        let candidate = LayoutElement::from_config(String::new(), config, at);
        if !is_element_within_boundary(&candidate, self.scene.boundary()) {
            info!(event_id = %self.event_id, kind, x = at.x, y = at.y, "placement rejected by room boundary");
            return Err(LayoutError::BoundaryViolation { x: at.x, y: at.y });
        }
        let element = self.scene.add_element(kind, Some(at))?.clone();
        self.touch();
        self.selection.select(element.id.clone());
        Ok(vec![
            Action::SelectionChanged(Some(element.id.clone())),
            Action::ElementCreated(element),
            Action::RenderNeeded,
        ])
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Middle || (button == Button::Primary && self.tool == Tool::Pan) {
            self.input = InputState::Panning { last_screen: screen };
            return vec![Action::SetCursor("grabbing".into())];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let scene_pt = self.viewport.screen_to_scene(screen);
        match self.tool {
            Tool::DrawBoundary => self.add_boundary_vertex(scene_pt),
            Tool::Place(kind) => match self.place_at(kind, scene_pt) {
                Ok(actions) => actions,
                Err(e) => {
                    debug!(kind, error = %e, "click-to-place rejected");
                    vec![Action::PlacementRejected { kind: kind.to_owned(), at: scene_pt }]
                }
            },
            Tool::Select | Tool::Pan => self.select_down(screen, scene_pt),
        }
    }

    pub fn on_pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let scene_pt = self.viewport.screen_to_scene(screen);
        match self.input.clone() {
            InputState::Idle | InputState::PaletteDrag { .. } => Vec::new(),
            InputState::Panning { last_screen } => {
                self.viewport.pan(screen.x - last_screen.x, screen.y - last_screen.y);
                self.input = InputState::Panning { last_screen: screen };
                vec![Action::ViewportChanged, Action::RenderNeeded]
            }
            InputState::DraggingElement { id, last_scene, orig } => {
                let (dx, dy) = (scene_pt.x - last_scene.x, scene_pt.y - last_scene.y);
                if let Some(element) = self.scene.element_mut(&id) {
                    element.x += dx;
                    element.y += dy;
                }
                self.input = InputState::DraggingElement { id, last_scene: scene_pt, orig };
                vec![Action::RenderNeeded]
            }
            InputState::ResizingElement { id, handle, start_scene, orig_bounds, .. } => {
                let bounds = resize_bounds(&orig_bounds, handle, scene_pt.x - start_scene.x, scene_pt.y - start_scene.y);
                if let Some(element) = self.scene.element_mut(&id) {
                    apply_bounds(element, &bounds);
                }
                vec![Action::RenderNeeded]
            }
            InputState::RotatingElement { id, center, start_angle, orig_rotation } => {
                let mut rotation = orig_rotation + pointer_angle(center, scene_pt) - start_angle;
                if modifiers.shift {
                    rotation = (rotation / ROTATION_SNAP_DEG).round() * ROTATION_SNAP_DEG;
                }
                if let Some(element) = self.scene.element_mut(&id) {
                    element.rotation = normalize_degrees(rotation);
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => vec![Action::SetCursor("default".into())],
            InputState::PaletteDrag { kind } => {
                let at = self.viewport.screen_to_scene(screen);
                match self.place_at(kind, at) {
                    Ok(actions) => actions,
                    Err(_) => vec![Action::PlacementRejected { kind: kind.to_owned(), at }],
                }
            }
            InputState::DraggingElement { id, orig, .. } => {
                let mut actions = self.commit_move(&id, orig);
                actions.push(Action::SetCursor("default".into()));
                actions
            }
            InputState::ResizingElement { id, orig, .. } => self.commit_resize(&id, orig),
            InputState::RotatingElement { id, orig_rotation, .. } => {
                let Some(rotation) = self.scene.element(&id).map(|e| e.rotation) else {
                    return Vec::new();
                };
                if (rotation - orig_rotation).abs() < f64::EPSILON {
                    return Vec::new();
                }
                self.touch();
                let fields = PartialElement { rotation: Some(rotation), ..Default::default() };
                vec![Action::ElementUpdated { id, fields }, Action::RenderNeeded]
            }
        }
    }

    /// Wheel zooms around the cursor.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        let before = (self.viewport.scale(), self.viewport.position());
        self.viewport.zoom_wheel(delta.dy, screen);
        if before == (self.viewport.scale(), self.viewport.position()) {
            return Vec::new();
        }
        vec![Action::ViewportChanged, Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => self.escape(),
            "Enter" if self.tool == Tool::DrawBoundary => self.close_draft(),
            "Backspace" if self.tool == Tool::DrawBoundary => {
                if self.draft.undo_vertex().is_some() { vec![Action::RenderNeeded] } else { Vec::new() }
            }
            "Delete" | "Backspace" => {
                let Some(id) = self.selection.selected_id.clone() else {
                    return Vec::new();
                };
                self.delete_element(&id).unwrap_or_default()
            }
            "ArrowUp" => self.nudge(0.0, -1.0, modifiers),
            "ArrowDown" => self.nudge(0.0, 1.0, modifiers),
            "ArrowLeft" => self.nudge(-1.0, 0.0, modifiers),
            "ArrowRight" => self.nudge(1.0, 0.0, modifiers),
            "+" | "=" => self.zoom_in(),
            "-" | "_" => self.zoom_out(),
            "0" => self.fit(),
            _ => Vec::new(),
        }
    }

    // --- Viewport ---

    /// One zoom step in, around the container centre.
    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_button(ZoomDirection::In)
    }

    /// One zoom step out, around the container centre.
    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_button(ZoomDirection::Out)
    }

    /// Zoom out until the whole canvas is visible.
    pub fn fit(&mut self) -> Vec<Action> {
        self.viewport.fit();
        vec![Action::ViewportChanged, Action::RenderNeeded]
    }

    fn zoom_button(&mut self, direction: ZoomDirection) -> Vec<Action> {
        let c = self.viewport.container();
        self.viewport.zoom_button(direction, Some(Point::new(c.width / 2.0, c.height / 2.0)));
        vec![Action::ViewportChanged, Action::RenderNeeded]
    }

    // --- Persistence ---

    /// Whether the scene has changes no successful save has captured.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.save.revision != self.save.saved_revision
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.save.in_flight.is_some()
    }

    /// Message from the most recent failed save, cleared by a successful one.
    #[must_use]
    pub fn last_save_error(&self) -> Option<&str> {
        self.save.last_error.as_deref()
    }

    /// Snapshot the scene for saving and mark a save as in flight.
    ///
    /// # Errors
    ///
    /// [`LayoutError::SaveInFlight`] while a previous save has not finished.
    pub fn begin_save(&mut self) -> Result<FloorPlanRecord, LayoutError> {
        if self.save.in_flight.is_some() {
            return Err(LayoutError::SaveInFlight);
        }
        self.save.in_flight = Some(self.save.revision);
        info!(event_id = %self.event_id, revision = self.save.revision, elements = self.scene.len(), "save started");
        Ok(self.to_record())
    }

    /// Record the outcome of the save started by [`Self::begin_save`].
    ///
    /// Edits made while the save was in flight keep the session dirty. A
    /// failed save changes nothing but the error message.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoPendingSave`] when no save was started.
    pub fn finish_save(&mut self, outcome: Result<(), String>) -> Result<(), LayoutError> {
        let revision = self.save.in_flight.take().ok_or(LayoutError::NoPendingSave)?;
        match outcome {
            Ok(()) => {
                self.save.saved_revision = revision;
                self.save.last_error = None;
                info!(event_id = %self.event_id, revision, dirty = self.is_dirty(), "save finished");
            }
            Err(message) => {
                warn!(event_id = %self.event_id, revision, error = %message, "save failed");
                self.save.last_error = Some(message);
            }
        }
        Ok(())
    }

    /// The scene in wire form, as of the last committed edit.
    ///
    /// An element mid-gesture is written with its pre-gesture geometry; the
    /// live drag, resize, or rotation is not snapped or boundary-checked yet.
    #[must_use]
    pub fn to_record(&self) -> FloorPlanRecord {
        FloorPlanRecord {
            event_id: self.event_id.clone(),
            canvas_size: self.canvas.size(),
            pixels_per_meter: self.canvas.pixels_per_meter,
            elements: self.scene.elements().iter().map(|e| self.committed_record(e)).collect(),
            room_boundary: self.scene.boundary().cloned(),
            read_warnings: Vec::new(),
        }
    }

    /// Replace session contents with a stored plan and its guest list.
    ///
    /// The record is sanitised first; whatever had to be repaired comes back
    /// as warnings. The session is clean afterwards.
    pub fn load_record(&mut self, record: FloorPlanRecord, guests: Vec<Guest>) -> Vec<LoadWarning> {
        let (plan, warnings) = sanitize(record);
        self.event_id = plan.event_id;
        self.canvas = plan.canvas;
        self.viewport.set_scene_size(plan.canvas.size());
        self.viewport.fit();
        self.scene.load(plan.elements, plan.boundary);
        self.roster = GuestRoster::new(guests);
        let repaired = self.roster.reconcile(&mut self.scene);
        self.selection.clear();
        self.input = InputState::Idle;
        self.draft.cancel();
        self.save = SaveState::default();
        info!(
            event_id = %self.event_id,
            elements = self.scene.len(),
            guests = self.roster.len(),
            warnings = warnings.len(),
            repaired,
            "floor plan loaded"
        );
        warnings
    }

    // --- Internals ---

    fn touch(&mut self) {
        self.save.revision += 1;
    }

    fn committed_record(&self, e: &LayoutElement) -> ElementRecord {
        let mut record = ElementRecord::from(e);
        match &self.input {
            InputState::DraggingElement { id, orig, .. } if *id == e.id => {
                record.x = Some(orig.x);
                record.y = Some(orig.y);
            }
            InputState::ResizingElement { id, orig, .. } if *id == e.id => {
                record.x = Some(orig.x);
                record.y = Some(orig.y);
                record.width = Some(orig.width);
                record.height = Some(orig.height);
                record.radius = orig.radius;
            }
            InputState::RotatingElement { id, orig_rotation, .. } if *id == e.id => {
                record.rotation = Some(*orig_rotation);
            }
            _ => {}
        }
        record
    }

    fn select_down(&mut self, screen: Point, scene_pt: Point) -> Vec<Action> {
        let scale = self.viewport.scale();
        if let Some(selected) = self.selected_element() {
            let bounds = selected.bounds();
            let slop = self.viewport.screen_dist_to_scene(HANDLE_RADIUS_PX);
            match hit_handle(&bounds, scene_pt, slop, scale) {
                Some(HandleHit::Resize(handle)) => {
                    self.input = InputState::ResizingElement {
                        id: selected.id.clone(),
                        handle,
                        start_scene: scene_pt,
                        orig_bounds: bounds,
                        orig: snapshot(selected),
                    };
                    return vec![Action::SetCursor("nwse-resize".into())];
                }
                Some(HandleHit::Rotate) => {
                    let center = bounds.center();
                    self.input = InputState::RotatingElement {
                        id: selected.id.clone(),
                        center,
                        start_angle: pointer_angle(center, scene_pt),
                        orig_rotation: selected.rotation,
                    };
                    return vec![Action::SetCursor("grabbing".into())];
                }
                None => {}
            }
        }

        let mut actions = Vec::new();
        if let Some(hit) = self.scene.element_at(scene_pt) {
            let (id, orig) = (hit.id.clone(), hit.position());
            if !self.selection.is_selected(&id) {
                self.selection.select(id.clone());
                actions.push(Action::SelectionChanged(Some(id.clone())));
            }
            self.input = InputState::DraggingElement { id, last_scene: scene_pt, orig };
            actions.push(Action::SetCursor("move".into()));
        } else {
            if self.selection.selected_id.is_some() {
                self.selection.clear();
                actions.push(Action::SelectionChanged(None));
            }
            self.input = InputState::Panning { last_screen: screen };
            actions.push(Action::SetCursor("grabbing".into()));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Snap the dragged element, then accept the move or put it back at `orig`.
    fn commit_move(&mut self, id: &str, orig: Point) -> Vec<Action> {
        let Some(element) = self.scene.element(id) else {
            return Vec::new();
        };
        // A press without movement only selects.
        if element.position() == orig {
            return vec![Action::RenderNeeded];
        }
        let proposed = self.grid.apply(element.position());
        let outcome = constrain_to_boundary(&element.moved_to(orig), proposed, self.scene.boundary());
        if let Some(element) = self.scene.element_mut(id) {
            let p = outcome.position();
            element.x = p.x;
            element.y = p.y;
        }
        match outcome {
            Constrained::Accepted(p) if p == orig => vec![Action::RenderNeeded],
            Constrained::Accepted(p) => {
                self.touch();
                vec![Action::ElementUpdated { id: id.to_owned(), fields: PartialElement::position(p) }, Action::RenderNeeded]
            }
            Constrained::Rejected { original } => {
                info!(event_id = %self.event_id, element_id = id, x = proposed.x, y = proposed.y, "move rejected by room boundary");
                vec![Action::MoveRejected { id: id.to_owned(), original }, Action::RenderNeeded]
            }
        }
    }

    /// Keep the resized geometry if it stays in the room, else restore `orig`.
    fn commit_resize(&mut self, id: &str, orig: GeometrySnapshot) -> Vec<Action> {
        let boundary = self.scene.boundary().cloned();
        let Some(element) = self.scene.element_mut(id) else {
            return Vec::new();
        };
        if !is_element_within_boundary(element, boundary.as_ref()) {
            restore(element, orig);
            info!(event_id = %self.event_id, element_id = id, "resize rejected by room boundary");
            return vec![Action::ResizeRejected { id: id.to_owned() }, Action::RenderNeeded];
        }
        if snapshot(element) == orig {
            return Vec::new();
        }
        let fields = PartialElement {
            x: Some(element.x),
            y: Some(element.y),
            width: Some(element.width),
            height: Some(element.height),
            radius: element.radius,
            ..Default::default()
        };
        self.touch();
        vec![Action::ElementUpdated { id: id.to_owned(), fields }, Action::RenderNeeded]
    }

    /// Move the selected element one step, or one grid cell when snapping.
    fn nudge(&mut self, ux: f64, uy: f64, modifiers: Modifiers) -> Vec<Action> {
        let Some(element) = self.selected_element() else {
            return Vec::new();
        };
        let mut step = if self.grid.enabled { self.grid.size } else { 1.0 };
        if modifiers.shift {
            step *= NUDGE_SHIFT_FACTOR;
        }
        let id = element.id.clone();
        let proposed = element.position().offset(ux * step, uy * step);
        match constrain_to_boundary(element, proposed, self.scene.boundary()) {
            Constrained::Accepted(p) => {
                if let Some(element) = self.scene.element_mut(&id) {
                    element.x = p.x;
                    element.y = p.y;
                }
                self.touch();
                vec![Action::ElementUpdated { id, fields: PartialElement::position(p) }, Action::RenderNeeded]
            }
            Constrained::Rejected { original } => vec![Action::MoveRejected { id, original }],
        }
    }

    fn add_boundary_vertex(&mut self, scene_pt: Point) -> Vec<Action> {
        let close_radius = self.viewport.screen_dist_to_scene(BOUNDARY_CLOSE_RADIUS_PX);
        match self.draft.add_vertex(self.grid.apply(scene_pt), close_radius) {
            DraftStep::Added(_) => vec![Action::RenderNeeded],
            DraftStep::Closed(boundary) => self.commit_boundary(boundary),
        }
    }

    /// Seal the draft from the keyboard; needs at least three vertices.
    fn close_draft(&mut self) -> Vec<Action> {
        match RoomBoundary::closed_polygon(self.draft.vertices().to_vec()) {
            Ok(boundary) => {
                self.draft.cancel();
                self.commit_boundary(boundary)
            }
            Err(e) => {
                debug!(error = %e, "boundary draft not closable yet");
                Vec::new()
            }
        }
    }

    fn commit_boundary(&mut self, boundary: RoomBoundary) -> Vec<Action> {
        info!(event_id = %self.event_id, vertices = boundary.vertices.len(), "room boundary closed");
        self.scene.set_room_boundary(Some(boundary.clone()));
        self.touch();
        self.tool = Tool::Select;
        vec![Action::BoundaryChanged(Some(boundary)), Action::RenderNeeded]
    }

    fn escape(&mut self) -> Vec<Action> {
        if !self.draft.is_empty() {
            self.draft.cancel();
            return vec![Action::RenderNeeded];
        }
        if self.input != InputState::Idle {
            self.cancel_gesture();
            return vec![Action::SetCursor("default".into()), Action::RenderNeeded];
        }
        if self.selection.selected_id.is_some() {
            self.selection.clear();
            return vec![Action::SelectionChanged(None), Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Abandon the current gesture, restoring any geometry it changed.
    fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.input) {
            InputState::DraggingElement { id, orig, .. } => {
                if let Some(element) = self.scene.element_mut(&id) {
                    element.x = orig.x;
                    element.y = orig.y;
                }
            }
            InputState::ResizingElement { id, orig, .. } => {
                if let Some(element) = self.scene.element_mut(&id) {
                    restore(element, orig);
                }
            }
            InputState::RotatingElement { id, orig_rotation, .. } => {
                if let Some(element) = self.scene.element_mut(&id) {
                    element.rotation = orig_rotation;
                }
            }
            InputState::Idle | InputState::Panning { .. } | InputState::PaletteDrag { .. } => {}
        }
    }
}

fn snapshot(e: &LayoutElement) -> GeometrySnapshot {
    GeometrySnapshot { x: e.x, y: e.y, width: e.width, height: e.height, radius: e.radius }
}

fn restore(e: &mut LayoutElement, s: GeometrySnapshot) {
    e.x = s.x;
    e.y = s.y;
    e.width = s.width;
    e.height = s.height;
    e.radius = s.radius;
}

/// Write an axis-aligned bounding box back into the element's own anchor.
fn apply_bounds(e: &mut LayoutElement, bounds: &Rect) {
    match e.shape() {
        ShapeKind::Circle => {
            let r = bounds.width.min(bounds.height) / 2.0;
            let c = bounds.center();
            e.x = c.x;
            e.y = c.y;
            e.width = r * 2.0;
            e.height = r * 2.0;
            e.radius = Some(r);
        }
        ShapeKind::Ellipse => {
            let c = bounds.center();
            e.x = c.x;
            e.y = c.y;
            e.width = bounds.width;
            e.height = bounds.height;
        }
        _ => {
            e.x = bounds.x;
            e.y = bounds.y;
            e.width = bounds.width;
            e.height = bounds.height;
        }
    }
}
