//! Shared numeric constants for the layout core.

// ── Viewport ────────────────────────────────────────────────────

/// Upper zoom bound. The lower bound is computed per container.
pub const MAX_ZOOM: f64 = 5.0;

/// Multiplicative step for toolbar zoom buttons.
pub const BUTTON_ZOOM_STEP: f64 = 1.2;

/// Multiplicative step per wheel tick.
pub const WHEEL_ZOOM_STEP: f64 = 1.05;

/// Zoom used when the scene has no usable size to fit against.
pub const FALLBACK_MIN_ZOOM: f64 = 0.1;

// ── Canvas ──────────────────────────────────────────────────────

/// Default scene width in scene units (pixels at scale 1.0).
pub const DEFAULT_CANVAS_WIDTH: f64 = 1200.0;

/// Default scene height in scene units.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 800.0;

/// Default scale between scene units and physical metres.
pub const DEFAULT_PIXELS_PER_METER: f64 = 50.0;

/// Default grid spacing in scene units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Where an element lands when placed without explicit coordinates.
pub const DEFAULT_PLACEMENT_X: f64 = 100.0;
pub const DEFAULT_PLACEMENT_Y: f64 = 100.0;

// ── Editing ─────────────────────────────────────────────────────

/// Smallest width/height a resize may produce, in scene units.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// Screen-space slop in pixels for transform handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the bounding box top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

/// Clicking within this many screen pixels of the first vertex seals the boundary.
pub const BOUNDARY_CLOSE_RADIUS_PX: f64 = 10.0;

// ── Rendering ───────────────────────────────────────────────────

/// π / 5 (36°): angular step for a 10-vertex star polygon.
pub const FRAC_PI_5: f64 = std::f64::consts::PI / 5.0;

/// Inner-to-outer radius ratio for the 5-point star.
pub const STAR_INNER_RATIO: f64 = 0.5;

/// Corner radius for rounded-rect kinds, as a fraction of the shorter side.
pub const ROUNDED_CORNER_RATIO: f64 = 0.2;

/// Label font bounds in scene units.
pub const LABEL_FONT_MIN_PX: f64 = 10.0;
pub const LABEL_FONT_MAX_PX: f64 = 16.0;

/// Horizontal padding inside a label chip, per side.
pub const CHIP_PADDING_X: f64 = 6.0;

/// Gap between a shape's bottom edge and its label chip.
pub const CHIP_GAP: f64 = 4.0;

/// Font size used for the seat-count badge.
pub const BADGE_FONT_PX: f64 = 10.0;

/// Average glyph advance as a fraction of font size for headless measuring.
pub const APPROX_GLYPH_WIDTH_RATIO: f64 = 0.6;
