//! Room-boundary containment and the boundary drawing tool.
//!
//! Containment is checked against an element's axis-aligned bounding box:
//! every corner must fall inside the polygon. A move that would leave the
//! room is rejected outright rather than clamped to the nearest valid point.

#[cfg(test)]
#[path = "boundary_test.rs"]
mod boundary_test;

use crate::geometry::{Point, distance};
use crate::scene::{LayoutElement, RoomBoundary, Scene};

pub use crate::geometry::is_point_in_polygon;

/// Outcome of proposing a new position for an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constrained {
    /// The proposed position keeps the element inside the room.
    Accepted(Point),
    /// The proposed position leaves the room; `original` is where the element stays.
    Rejected { original: Point },
}

impl Constrained {
    /// The position the element ends up at.
    #[must_use]
    pub fn position(self) -> Point {
        match self {
            Self::Accepted(p) => p,
            Self::Rejected { original } => original,
        }
    }

    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Whether every bounding-box corner of `element` lies inside `boundary`.
///
/// Absent, open, or degenerate boundaries impose no constraint.
#[must_use]
pub fn is_element_within_boundary(element: &LayoutElement, boundary: Option<&RoomBoundary>) -> bool {
    let Some(boundary) = boundary else {
        return true;
    };
    if !boundary.is_constraining() {
        return true;
    }
    element
        .bounds()
        .corners()
        .iter()
        .all(|corner| is_point_in_polygon(*corner, &boundary.vertices))
}

/// Test `element` at `proposed` and either accept the move or keep it where it was.
#[must_use]
pub fn constrain_to_boundary(element: &LayoutElement, proposed: Point, boundary: Option<&RoomBoundary>) -> Constrained {
    if is_element_within_boundary(&element.moved_to(proposed), boundary) {
        Constrained::Accepted(proposed)
    } else {
        Constrained::Rejected { original: element.position() }
    }
}

/// Result of clicking while drawing a boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftStep {
    /// A vertex was appended; carries the vertex count.
    Added(usize),
    /// The click landed near the first vertex and sealed the polygon.
    Closed(RoomBoundary),
}

/// An in-progress room boundary.
///
/// Vertices are kept in click order. No winding normalisation happens: the
/// polygon is whatever traversal the user clicked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryDraft {
    vertices: Vec<Point>,
}

impl BoundaryDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex, or seal the polygon when `p` lies within
    /// `close_radius` of the first vertex and at least three exist.
    ///
    /// Closing takes the draft's vertices and leaves the draft empty.
    pub fn add_vertex(&mut self, p: Point, close_radius: f64) -> DraftStep {
        if self.vertices.len() >= 3 {
            if let Some(first) = self.vertices.first() {
                if distance(*first, p) <= close_radius {
                    let vertices = std::mem::take(&mut self.vertices);
                    return DraftStep::Closed(RoomBoundary { vertices, closed: true });
                }
            }
        }
        self.vertices.push(p);
        DraftStep::Added(self.vertices.len())
    }

    /// Drop the most recent vertex.
    pub fn undo_vertex(&mut self) -> Option<Point> {
        self.vertices.pop()
    }

    /// Abandon the draft.
    pub fn cancel(&mut self) {
        self.vertices.clear();
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Elements of `scene` that sit partly or wholly outside its room boundary.
pub fn elements_outside_boundary(scene: &Scene) -> impl Iterator<Item = &LayoutElement> {
    scene
        .elements()
        .iter()
        .filter(|e| !is_element_within_boundary(e, scene.boundary()))
}
