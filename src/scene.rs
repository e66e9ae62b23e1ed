//! Scene model: placed elements, the room boundary, and id generation.
//!
//! The scene is the canonical in-memory floor plan for one event. Elements
//! keep insertion order, which is also draw order. All mutation goes through
//! [`Scene`] methods; deletion that must cascade into seat assignments is
//! driven by [`crate::session::EditorSession::delete_element`].

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{self, ElementConfig, ShapeKind};
use crate::consts::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_PIXELS_PER_METER, DEFAULT_PLACEMENT_X, DEFAULT_PLACEMENT_Y,
};
use crate::error::LayoutError;
use crate::geometry::{Point, Rect, Size, normalize_degrees, rotate_point};
use crate::seating::GuestId;

/// Unique identifier for a placed element within a scene.
pub type ElementId = String;

/// A placed venue element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutElement {
    pub id: ElementId,
    /// Catalog kind id.
    #[serde(rename = "type")]
    pub kind: String,
    /// Top-left corner, or the centre for circle/ellipse kinds.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees, in `[0, 360)`.
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    pub capacity: u32,
    pub name: String,
    /// Seated guests in assignment order. Never longer than `capacity`.
    #[serde(default)]
    pub assigned_guests: Vec<GuestId>,
}

impl LayoutElement {
    /// A fresh instance of `config` at `position` with no guests.
    #[must_use]
    pub fn from_config(id: ElementId, config: &ElementConfig, position: Point) -> Self {
        let (width, height) = match config.default_radius {
            Some(r) if config.shape == ShapeKind::Circle => (r * 2.0, r * 2.0),
            _ => (config.default_width, config.default_height),
        };
        Self {
            id,
            kind: config.id.to_owned(),
            x: position.x,
            y: position.y,
            width,
            height,
            rotation: 0.0,
            radius: config.default_radius,
            capacity: config.default_capacity,
            name: config.description.to_owned(),
            assigned_guests: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> Option<&'static ElementConfig> {
        catalog::lookup(&self.kind)
    }

    /// Shape of this element's kind; unknown kinds draw as rectangles.
    #[must_use]
    pub fn shape(&self) -> ShapeKind {
        self.config().map_or(ShapeKind::Rectangle, |c| c.shape)
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Axis-aligned bounding box in scene coordinates, ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let shape = self.shape();
        if !shape.is_center_anchored() {
            return Rect::new(self.x, self.y, self.width, self.height);
        }
        match (shape, self.radius) {
            (ShapeKind::Circle, Some(r)) => Rect::centered(self.position(), r * 2.0, r * 2.0),
            _ => Rect::centered(self.position(), self.width, self.height),
        }
    }

    /// Same element with its anchor moved to `p`.
    #[must_use]
    pub fn moved_to(&self, p: Point) -> Self {
        Self { x: p.x, y: p.y, ..self.clone() }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.assigned_guests.len() >= self.capacity as usize
    }

    #[must_use]
    pub fn seats_free(&self) -> u32 {
        let taken = u32::try_from(self.assigned_guests.len()).unwrap_or(u32::MAX);
        self.capacity.saturating_sub(taken)
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PartialElement {
    #[must_use]
    pub fn position(p: Point) -> Self {
        Self { x: Some(p.x), y: Some(p.y), ..Default::default() }
    }
}

/// Polygon that constrains where elements may sit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomBoundary {
    /// Vertices in drawing order. The polygon closes from last back to first.
    pub vertices: Vec<Point>,
    /// False while the user is still placing vertices.
    #[serde(default)]
    pub closed: bool,
}

impl RoomBoundary {
    /// A sealed polygon.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidBoundary`] for fewer than three vertices
    /// or any non-finite coordinate.
    pub fn closed_polygon(vertices: Vec<Point>) -> Result<Self, LayoutError> {
        if vertices.len() < 3 {
            return Err(LayoutError::InvalidBoundary(format!(
                "a closed boundary needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(LayoutError::InvalidBoundary("non-finite vertex".into()));
        }
        Ok(Self { vertices, closed: true })
    }

    /// Whether this boundary restricts placement at all.
    #[must_use]
    pub fn is_constraining(&self) -> bool {
        self.closed && self.vertices.len() >= 3
    }
}

/// User-editable canvas dimensions.
///
/// Changing these never rescales placed elements; they keep their absolute
/// scene positions and sizes even if that leaves them outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSettings {
    pub width: f64,
    pub height: f64,
    pub pixels_per_meter: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self { width: DEFAULT_CANVAS_WIDTH, height: DEFAULT_CANVAS_HEIGHT, pixels_per_meter: DEFAULT_PIXELS_PER_METER }
    }
}

impl CanvasSettings {
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Physical size of the canvas in metres.
    #[must_use]
    pub fn size_in_meters(&self) -> Size {
        Size::new(self.width / self.pixels_per_meter, self.height / self.pixels_per_meter)
    }

    /// Validate for use.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidGeometry`] unless every field is finite and positive.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.size().is_positive() {
            return Err(LayoutError::InvalidGeometry(format!(
                "canvas size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.pixels_per_meter.is_finite() && self.pixels_per_meter > 0.0) {
            return Err(LayoutError::InvalidGeometry(format!(
                "pixels per meter must be positive, got {}",
                self.pixels_per_meter
            )));
        }
        Ok(())
    }
}

/// Source of element ids, injected at scene construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdGenerator {
    /// `<kind>-<uuid v4>`.
    #[default]
    Random,
    /// `<kind>-<n>` from a per-scene counter starting at `next`.
    Sequential { next: u64 },
}

impl IdGenerator {
    #[must_use]
    pub fn sequential() -> Self {
        Self::Sequential { next: 1 }
    }

    fn next_id(&mut self, kind: &str) -> ElementId {
        match self {
            Self::Random => format!("{kind}-{}", Uuid::new_v4()),
            Self::Sequential { next } => {
                let id = format!("{kind}-{next}");
                *next += 1;
                id
            }
        }
    }
}

/// The placed elements and room boundary for one event's layout.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: Vec<LayoutElement>,
    boundary: Option<RoomBoundary>,
    ids: IdGenerator,
}

impl Scene {
    /// Empty scene with random UUID-based ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty scene drawing ids from `ids`.
    #[must_use]
    pub fn with_ids(ids: IdGenerator) -> Self {
        Self { elements: Vec::new(), boundary: None, ids }
    }

    /// Place a new element of `kind`, defaults copied from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownKind`] when `kind` is not in the catalog.
    pub fn add_element(&mut self, kind: &str, position: Option<Point>) -> Result<&LayoutElement, LayoutError> {
        let config = catalog::lookup(kind).ok_or_else(|| LayoutError::UnknownKind(kind.to_owned()))?;
        let position = position.unwrap_or(Point::new(DEFAULT_PLACEMENT_X, DEFAULT_PLACEMENT_Y));
        if !position.is_finite() {
            return Err(LayoutError::InvalidGeometry(format!("non-finite position for new {kind}")));
        }
        let mut id = self.ids.next_id(kind);
        while self.contains(&id) {
            id = self.ids.next_id(kind);
        }
        debug!(%id, kind, x = position.x, y = position.y, "element added");
        let index = self.elements.len();
        self.elements.push(LayoutElement::from_config(id, config, position));
        Ok(&self.elements[index])
    }

    /// Merge `partial` into the element with `id`.
    ///
    /// Validation runs before anything is written, so a rejected update
    /// leaves the element untouched.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ElementNotFound`] for a missing id,
    /// [`LayoutError::InvalidGeometry`] for non-finite or non-positive
    /// dimensions, [`LayoutError::InvalidCapacity`] for a capacity below the
    /// number of seated guests or zero on a seating kind.
    pub fn update_element(&mut self, id: &str, partial: &PartialElement) -> Result<(), LayoutError> {
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| LayoutError::ElementNotFound(id.to_owned()))?;
        validate_partial(element, partial)?;

        if let Some(x) = partial.x {
            element.x = x;
        }
        if let Some(y) = partial.y {
            element.y = y;
        }
        if let Some(w) = partial.width {
            element.width = w;
        }
        if let Some(h) = partial.height {
            element.height = h;
        }
        if let Some(r) = partial.rotation {
            element.rotation = normalize_degrees(r);
        }
        if let Some(r) = partial.radius {
            element.radius = Some(r);
            if element.shape() == ShapeKind::Circle {
                element.width = r * 2.0;
                element.height = r * 2.0;
            }
        }
        if let Some(c) = partial.capacity {
            element.capacity = c;
        }
        if let Some(ref name) = partial.name {
            element.name.clone_from(name);
        }
        Ok(())
    }

    /// Replace the room boundary wholesale.
    pub fn set_room_boundary(&mut self, boundary: Option<RoomBoundary>) {
        self.boundary = boundary;
    }

    #[must_use]
    pub fn boundary(&self) -> Option<&RoomBoundary> {
        self.boundary.as_ref()
    }

    #[must_use]
    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&LayoutElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Topmost element under `p`, honouring each element's rotation.
    #[must_use]
    pub fn element_at(&self, p: Point) -> Option<&LayoutElement> {
        self.elements.iter().rev().find(|e| {
            let bounds = e.bounds();
            bounds.contains(rotate_point(p, bounds.center(), -e.rotation))
        })
    }

    /// Element currently holding `guest_id`, if any.
    #[must_use]
    pub fn element_holding(&self, guest_id: &str) -> Option<&LayoutElement> {
        self.elements.iter().find(|e| e.assigned_guests.iter().any(|g| g == guest_id))
    }

    /// Total seats across all elements.
    #[must_use]
    pub fn total_capacity(&self) -> u64 {
        self.elements.iter().map(|e| u64::from(e.capacity)).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn element_mut(&mut self, id: &str) -> Option<&mut LayoutElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn elements_mut(&mut self) -> impl Iterator<Item = &mut LayoutElement> {
        self.elements.iter_mut()
    }

    /// Remove without touching seat assignments. Callers cascade first.
    pub(crate) fn remove_element(&mut self, id: &str) -> Option<LayoutElement> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        debug!(%id, "element removed");
        Some(self.elements.remove(index))
    }

    /// Replace all elements with an already-sanitised snapshot.
    pub(crate) fn load(&mut self, elements: Vec<LayoutElement>, boundary: Option<RoomBoundary>) {
        self.elements = elements;
        self.boundary = boundary;
    }
}

fn validate_partial(element: &LayoutElement, partial: &PartialElement) -> Result<(), LayoutError> {
    for (field, value) in [("x", partial.x), ("y", partial.y), ("rotation", partial.rotation)] {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(LayoutError::InvalidGeometry(format!("{field} must be finite")));
        }
    }
    for (field, value) in [("width", partial.width), ("height", partial.height), ("radius", partial.radius)] {
        if value.is_some_and(|v| !(v.is_finite() && v > 0.0)) {
            return Err(LayoutError::InvalidGeometry(format!("{field} must be positive")));
        }
    }
    if let Some(capacity) = partial.capacity {
        let assigned = element.assigned_guests.len();
        if (capacity as usize) < assigned {
            return Err(LayoutError::InvalidCapacity {
                element_id: element.id.clone(),
                requested: i64::from(capacity),
                reason: "below the number of seated guests",
            });
        }
        if capacity == 0 && element.config().is_some_and(ElementConfig::is_seating) {
            return Err(LayoutError::InvalidCapacity {
                element_id: element.id.clone(),
                requested: 0,
                reason: "seating elements need at least one seat",
            });
        }
    }
    Ok(())
}
