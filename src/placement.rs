//! Placement model: tools, modifiers, grid settings, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture tracked between pointer-down and
//! pointer-up, carrying what the session needs to compute live deltas and
//! to revert on release when the room boundary vetoes the result.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use crate::consts::{DEFAULT_GRID_SIZE, MIN_ELEMENT_SIZE, ROTATE_HANDLE_OFFSET_PX};
use crate::geometry::{Point, Rect, distance, snap_point};
use crate::scene::ElementId;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select, move, resize, and rotate elements (default).
    #[default]
    Select,
    /// Click-to-place the given catalog kind.
    Place(&'static str),
    /// Drag the viewport.
    Pan,
    /// Click out the room boundary vertex by vertex.
    DrawBoundary,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta in pixels.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive is scrolling down.
    pub dy: f64,
}

/// Grid snapping preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub enabled: bool,
    pub size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self { enabled: false, size: DEFAULT_GRID_SIZE }
    }
}

impl GridSettings {
    /// Snap `p` when snapping is on; identity otherwise.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        if self.enabled { snap_point(p, self.size) } else { p }
    }
}

/// Currently selected element, visible to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_id: Option<ElementId>,
}

impl SelectionState {
    pub fn select(&mut self, id: ElementId) {
        self.selected_id = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected_id = None;
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id.as_deref() == Some(id)
    }
}

/// Corner handle on the selected element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Nw,
    Ne,
    Se,
    Sw,
}

impl ResizeHandle {
    const ALL: [Self; 4] = [Self::Nw, Self::Ne, Self::Se, Self::Sw];

    fn position(self, r: &Rect) -> Point {
        match self {
            Self::Nw => Point::new(r.x, r.y),
            Self::Ne => Point::new(r.right(), r.y),
            Self::Se => Point::new(r.right(), r.bottom()),
            Self::Sw => Point::new(r.x, r.bottom()),
        }
    }
}

/// Which transform handle a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    Resize(ResizeHandle),
    Rotate,
}

/// Scene position of the rotate handle above `bounds` at `scale`.
#[must_use]
pub fn rotate_handle_position(bounds: &Rect, scale: f64) -> Point {
    Point::new(bounds.center().x, bounds.y - ROTATE_HANDLE_OFFSET_PX / scale)
}

/// Test `p` against the transform handles of `bounds`. `slop` is in scene units.
#[must_use]
pub fn hit_handle(bounds: &Rect, p: Point, slop: f64, scale: f64) -> Option<HandleHit> {
    if distance(rotate_handle_position(bounds, scale), p) <= slop {
        return Some(HandleHit::Rotate);
    }
    ResizeHandle::ALL
        .into_iter()
        .find(|h| distance(h.position(bounds), p) <= slop)
        .map(HandleHit::Resize)
}

/// Drag `handle` of `orig` by `(dx, dy)`, keeping the opposite corner fixed.
///
/// Width and height never fall below [`MIN_ELEMENT_SIZE`].
#[must_use]
pub fn resize_bounds(orig: &Rect, handle: ResizeHandle, dx: f64, dy: f64) -> Rect {
    let (mut left, mut top, mut right, mut bottom) = (orig.x, orig.y, orig.right(), orig.bottom());
    match handle {
        ResizeHandle::Nw => {
            left = (left + dx).min(right - MIN_ELEMENT_SIZE);
            top = (top + dy).min(bottom - MIN_ELEMENT_SIZE);
        }
        ResizeHandle::Ne => {
            right = (right + dx).max(left + MIN_ELEMENT_SIZE);
            top = (top + dy).min(bottom - MIN_ELEMENT_SIZE);
        }
        ResizeHandle::Se => {
            right = (right + dx).max(left + MIN_ELEMENT_SIZE);
            bottom = (bottom + dy).max(top + MIN_ELEMENT_SIZE);
        }
        ResizeHandle::Sw => {
            left = (left + dx).min(right - MIN_ELEMENT_SIZE);
            bottom = (bottom + dy).max(top + MIN_ELEMENT_SIZE);
        }
    }
    Rect::new(left, top, right - left, bottom - top)
}

/// Geometry captured at the start of a resize, restored if it is vetoed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySnapshot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub radius: Option<f64>,
}

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging the viewport.
    Panning { last_screen: Point },
    /// A palette item is being dragged toward the canvas.
    PaletteDrag { kind: &'static str },
    /// Moving an existing element.
    DraggingElement {
        id: ElementId,
        /// Scene-space pointer position at the previous event.
        last_scene: Point,
        /// Element position before the drag, restored on rejection.
        orig: Point,
    },
    /// Resizing the selected element by one corner.
    ResizingElement {
        id: ElementId,
        handle: ResizeHandle,
        start_scene: Point,
        orig_bounds: Rect,
        orig: GeometrySnapshot,
    },
    /// Rotating the selected element around its centre.
    RotatingElement {
        id: ElementId,
        center: Point,
        /// Pointer angle in degrees at gesture start.
        start_angle: f64,
        orig_rotation: f64,
    },
}

/// Angle in degrees from `center` to `p`, clockwise in screen orientation.
#[must_use]
pub fn pointer_angle(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees()
}
