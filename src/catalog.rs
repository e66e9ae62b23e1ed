//! Element catalog: the fixed registry of placeable venue element kinds.
//!
//! Entries are plain data. Placed elements store only the kind id; display
//! styling is resolved through [`lookup`] at draw time and never persisted on
//! the instance.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use serde::{Deserialize, Serialize};

/// Outline family used to draw and bound an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Rectangle with rounded corners.
    RoundedRect,
    /// Circle of `radius`, positioned by its centre.
    Circle,
    /// Ellipse inscribed in `width` x `height`, positioned by its centre.
    Ellipse,
    /// Regular hexagon inscribed in the bounding box.
    Hexagon,
    /// Isosceles triangle pointing up.
    Triangle,
    /// Five-point star.
    Star,
    /// Rectangle with a raised front apron.
    Stage,
    /// Door leaf with its swing arc.
    Door,
}

impl ShapeKind {
    /// Kinds whose `x`/`y` denote the centre rather than the top-left corner.
    #[must_use]
    pub fn is_center_anchored(self) -> bool {
        matches!(self, Self::Circle | Self::Ellipse)
    }
}

/// Immutable template for one kind of placeable element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementConfig {
    pub id: &'static str,
    pub shape: ShapeKind,
    pub default_width: f64,
    pub default_height: f64,
    pub default_radius: Option<f64>,
    /// Seats offered by a fresh instance. Zero for non-seating kinds.
    pub default_capacity: u32,
    pub color: &'static str,
    pub text_color: &'static str,
    pub description: &'static str,
}

impl ElementConfig {
    /// Whether guests can be seated at this kind.
    #[must_use]
    pub fn is_seating(&self) -> bool {
        self.default_capacity > 0
    }
}

pub static CATALOG: &[ElementConfig] = &[
    ElementConfig {
        id: "table",
        shape: ShapeKind::Rectangle,
        default_width: 120.0,
        default_height: 60.0,
        default_radius: None,
        default_capacity: 6,
        color: "#8B5A2B",
        text_color: "#FFFFFF",
        description: "Rectangular table",
    },
    ElementConfig {
        id: "round-table",
        shape: ShapeKind::Circle,
        default_width: 80.0,
        default_height: 80.0,
        default_radius: Some(40.0),
        default_capacity: 8,
        color: "#A0522D",
        text_color: "#FFFFFF",
        description: "Round table",
    },
    ElementConfig {
        id: "rounded-table",
        shape: ShapeKind::RoundedRect,
        default_width: 140.0,
        default_height: 70.0,
        default_radius: None,
        default_capacity: 8,
        color: "#966F33",
        text_color: "#FFFFFF",
        description: "Banquet table with rounded corners",
    },
    ElementConfig {
        id: "oval-table",
        shape: ShapeKind::Ellipse,
        default_width: 140.0,
        default_height: 80.0,
        default_radius: None,
        default_capacity: 10,
        color: "#B5651D",
        text_color: "#FFFFFF",
        description: "Oval table",
    },
    ElementConfig {
        id: "cocktail-table",
        shape: ShapeKind::Hexagon,
        default_width: 60.0,
        default_height: 60.0,
        default_radius: None,
        default_capacity: 4,
        color: "#6B4226",
        text_color: "#FFFFFF",
        description: "High-top cocktail table",
    },
    ElementConfig {
        id: "stage",
        shape: ShapeKind::Stage,
        default_width: 300.0,
        default_height: 120.0,
        default_radius: None,
        default_capacity: 0,
        color: "#4B0082",
        text_color: "#FFFFFF",
        description: "Stage",
    },
    ElementConfig {
        id: "door",
        shape: ShapeKind::Door,
        default_width: 60.0,
        default_height: 20.0,
        default_radius: None,
        default_capacity: 0,
        color: "#708090",
        text_color: "#FFFFFF",
        description: "Door",
    },
    ElementConfig {
        id: "dance-floor",
        shape: ShapeKind::Rectangle,
        default_width: 240.0,
        default_height: 240.0,
        default_radius: None,
        default_capacity: 0,
        color: "#DAA520",
        text_color: "#1F1A17",
        description: "Dance floor",
    },
    ElementConfig {
        id: "bar",
        shape: ShapeKind::RoundedRect,
        default_width: 200.0,
        default_height: 50.0,
        default_radius: None,
        default_capacity: 0,
        color: "#2F4F4F",
        text_color: "#FFFFFF",
        description: "Bar counter",
    },
    ElementConfig {
        id: "buffet",
        shape: ShapeKind::Rectangle,
        default_width: 180.0,
        default_height: 50.0,
        default_radius: None,
        default_capacity: 0,
        color: "#556B2F",
        text_color: "#FFFFFF",
        description: "Buffet station",
    },
    ElementConfig {
        id: "dj-booth",
        shape: ShapeKind::Triangle,
        default_width: 80.0,
        default_height: 70.0,
        default_radius: None,
        default_capacity: 0,
        color: "#1E3A8A",
        text_color: "#FFFFFF",
        description: "DJ booth",
    },
    ElementConfig {
        id: "photo-booth",
        shape: ShapeKind::Star,
        default_width: 80.0,
        default_height: 80.0,
        default_radius: None,
        default_capacity: 0,
        color: "#C2185B",
        text_color: "#FFFFFF",
        description: "Photo booth",
    },
];

/// Find the catalog entry for `kind`.
#[must_use]
pub fn lookup(kind: &str) -> Option<&'static ElementConfig> {
    CATALOG.iter().find(|c| c.id == kind)
}
