//! Rendering policy: per-shape outlines, label fitting, and the draw list.
//!
//! This module decides *what* to draw and where; it never touches a canvas.
//! The browser painter in `web` (feature `web`) walks the resulting
//! [`DrawList`] and issues the actual 2D context calls.
//!
//! LABEL FIT
//! =========
//! An element's name is drawn centred inside its shape when the measured
//! text is strictly narrower than the shape's interior width. Otherwise it
//! moves to a pill-shaped chip just below the shape. A seated element also
//! gets an `assigned/capacity` badge under whichever label position won.
//!
//! Colours come from a catalog lookup at draw time, so nothing visual is
//! stored on the element itself.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_3};

use crate::boundary::BoundaryDraft;
use crate::catalog::{self, ShapeKind};
use crate::consts::{
    APPROX_GLYPH_WIDTH_RATIO, BADGE_FONT_PX, CHIP_GAP, CHIP_PADDING_X, FRAC_PI_5, LABEL_FONT_MAX_PX,
    LABEL_FONT_MIN_PX, ROUNDED_CORNER_RATIO, STAR_INNER_RATIO,
};
use crate::geometry::{Point, Rect};
use crate::scene::{ElementId, LayoutElement, RoomBoundary, Scene};

/// Fallback colours for an element whose kind left the catalog.
const FALLBACK_FILL: &str = "#CCCCCC";
const FALLBACK_TEXT: &str = "#000000";
/// Share of the stage depth used for the front apron strip.
const STAGE_APRON_RATIO: f64 = 0.2;

/// Text-width measurement primitive.
pub trait TextMeasure {
    /// Width in pixels of `text` set at `font_px`.
    fn measure(&self, text: &str, font_px: f64) -> f64;
}

/// Fixed-advance estimate for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str, font_px: f64) -> f64 {
        text.chars().count() as f64 * font_px * APPROX_GLYPH_WIDTH_RATIO
    }
}

// =============================================================
// Outlines
// =============================================================

/// Geometry to stroke and fill for one element, in scene coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Rect(Rect),
    RoundedRect { rect: Rect, corner_radius: f64 },
    Circle { center: Point, radius: f64 },
    Ellipse { center: Point, rx: f64, ry: f64 },
    Polygon(Vec<Point>),
    /// Platform with a darker apron strip along its front edge.
    Stage { platform: Rect, apron: Rect },
    /// Door leaf plus a quarter-circle swing from the hinge.
    Door { frame: Rect, hinge: Point, swing_radius: f64 },
}

/// Outline of `shape` filling the bounding box `r`.
#[must_use]
pub fn shape_outline(shape: ShapeKind, r: &Rect) -> Outline {
    let c = r.center();
    let (rx, ry) = (r.width / 2.0, r.height / 2.0);
    match shape {
        ShapeKind::Rectangle => Outline::Rect(*r),
        ShapeKind::RoundedRect => Outline::RoundedRect { rect: *r, corner_radius: corner_radius(r) },
        ShapeKind::Circle => Outline::Circle { center: c, radius: rx.min(ry) },
        ShapeKind::Ellipse => Outline::Ellipse { center: c, rx, ry },
        ShapeKind::Hexagon => Outline::Polygon(
            (0..6)
                .map(|i| {
                    let angle = FRAC_PI_3 * f64::from(i);
                    Point::new(rx.mul_add(angle.cos(), c.x), ry.mul_add(angle.sin(), c.y))
                })
                .collect(),
        ),
        ShapeKind::Triangle => Outline::Polygon(vec![
            Point::new(c.x, r.y),
            Point::new(r.right(), r.bottom()),
            Point::new(r.x, r.bottom()),
        ]),
        ShapeKind::Star => Outline::Polygon(
            (0..10)
                .map(|i| {
                    let angle = FRAC_PI_5.mul_add(f64::from(i), -FRAC_PI_2);
                    let k = if i % 2 == 0 { 1.0 } else { STAR_INNER_RATIO };
                    Point::new((rx * k).mul_add(angle.cos(), c.x), (ry * k).mul_add(angle.sin(), c.y))
                })
                .collect(),
        ),
        ShapeKind::Stage => {
            let depth = r.height * STAGE_APRON_RATIO;
            Outline::Stage { platform: *r, apron: Rect::new(r.x, r.bottom() - depth, r.width, depth) }
        }
        ShapeKind::Door => Outline::Door { frame: *r, hinge: Point::new(r.x, r.bottom()), swing_radius: r.width },
    }
}

fn corner_radius(r: &Rect) -> f64 {
    r.width.min(r.height) * ROUNDED_CORNER_RATIO
}

// =============================================================
// Labels
// =============================================================

/// Horizontal room available for a centred label inside `shape`.
#[must_use]
pub fn interior_width(shape: ShapeKind, r: &Rect) -> f64 {
    match shape {
        ShapeKind::Rectangle | ShapeKind::Stage | ShapeKind::Door => r.width,
        ShapeKind::RoundedRect => r.width - 2.0 * corner_radius(r),
        // Side of the square inscribed in the circle / ellipse.
        ShapeKind::Circle => r.width.min(r.height) * FRAC_1_SQRT_2,
        ShapeKind::Ellipse => r.width * FRAC_1_SQRT_2,
        ShapeKind::Hexagon => r.width * 0.75,
        ShapeKind::Triangle => r.width / 2.0,
        ShapeKind::Star => r.width * STAR_INNER_RATIO,
    }
}

/// Label font size for `shape`, scaled to its smaller side and clamped.
#[must_use]
pub fn label_font_px(shape: ShapeKind, r: &Rect) -> f64 {
    let factor = match shape {
        ShapeKind::Triangle | ShapeKind::Star => 0.15,
        _ => 0.25,
    };
    (r.width.min(r.height) * factor).clamp(LABEL_FONT_MIN_PX, LABEL_FONT_MAX_PX)
}

/// Visual centre for a label inside `shape`.
fn label_anchor(shape: ShapeKind, r: &Rect) -> Point {
    match shape {
        // Centroid sits two thirds of the way down from the apex.
        ShapeKind::Triangle => Point::new(r.center().x, r.y + r.height * 2.0 / 3.0),
        _ => r.center(),
    }
}

/// Where an element's name goes.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelPlacement {
    Inside { center: Point, font_px: f64 },
    /// Pill below the shape, sized to the text.
    Chip { rect: Rect, font_px: f64, text_center: Point },
}

impl LabelPlacement {
    /// Lowest y the label occupies.
    #[must_use]
    pub fn bottom(&self, shape_bounds: &Rect) -> f64 {
        match self {
            Self::Inside { .. } => shape_bounds.bottom(),
            Self::Chip { rect, .. } => rect.bottom(),
        }
    }
}

/// Decide where `name` goes for `shape` drawn in `r`.
#[must_use]
pub fn place_label(name: &str, shape: ShapeKind, r: &Rect, measure: &dyn TextMeasure) -> LabelPlacement {
    let font_px = label_font_px(shape, r);
    let measured = measure.measure(name, font_px);
    if measured < interior_width(shape, r) {
        return LabelPlacement::Inside { center: label_anchor(shape, r), font_px };
    }
    let width = measured + 2.0 * CHIP_PADDING_X;
    let height = font_px + CHIP_PADDING_X;
    let rect = Rect::new(r.center().x - width / 2.0, r.bottom() + CHIP_GAP, width, height);
    LabelPlacement::Chip { rect, font_px, text_center: rect.center() }
}

/// `assigned/capacity` text for an element with anyone seated.
#[must_use]
pub fn badge(element: &LayoutElement) -> Option<String> {
    if element.assigned_guests.is_empty() {
        return None;
    }
    Some(format!("{}/{}", element.assigned_guests.len(), element.capacity))
}

// =============================================================
// Draw list
// =============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub text: String,
    pub center: Point,
    pub font_px: f64,
}

/// Everything needed to paint one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub id: ElementId,
    pub outline: Outline,
    /// Degrees clockwise about `pivot`. Labels and badges stay upright.
    pub rotation: f64,
    pub pivot: Point,
    pub fill: &'static str,
    pub text_color: &'static str,
    pub name: String,
    pub label: LabelPlacement,
    pub badge: Option<Badge>,
    pub selected: bool,
}

/// A frame's worth of drawing, bottom layer first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub boundary: Option<RoomBoundary>,
    /// In-progress boundary vertices, drawn as an open polyline.
    pub draft: Vec<Point>,
    pub sprites: Vec<Sprite>,
    /// Bounding box of the selected element, for handles.
    pub selection: Option<Rect>,
}

/// Build the draw list for `scene` in element order.
#[must_use]
pub fn build_draw_list(
    scene: &Scene,
    selected: Option<&str>,
    draft: &BoundaryDraft,
    measure: &dyn TextMeasure,
) -> DrawList {
    let sprites: Vec<Sprite> = scene.elements().iter().map(|e| sprite(e, selected, measure)).collect();
    let selection = sprites.iter().find(|s| s.selected).and_then(|s| scene.element(&s.id)).map(LayoutElement::bounds);
    DrawList {
        boundary: scene.boundary().cloned(),
        draft: draft.vertices().to_vec(),
        sprites,
        selection,
    }
}

fn sprite(element: &LayoutElement, selected: Option<&str>, measure: &dyn TextMeasure) -> Sprite {
    let shape = element.shape();
    let bounds = element.bounds();
    let (fill, text_color) = catalog::lookup(&element.kind).map_or((FALLBACK_FILL, FALLBACK_TEXT), |c| (c.color, c.text_color));
    let label = place_label(&element.name, shape, &bounds, measure);
    let badge = badge(element).map(|text| Badge {
        text,
        center: Point::new(bounds.center().x, label.bottom(&bounds) + CHIP_GAP + BADGE_FONT_PX / 2.0),
        font_px: BADGE_FONT_PX,
    });
    Sprite {
        id: element.id.clone(),
        outline: shape_outline(shape, &bounds),
        rotation: element.rotation,
        pivot: bounds.center(),
        fill,
        text_color,
        name: element.name.clone(),
        label,
        badge,
        selected: selected == Some(element.id.as_str()),
    }
}
