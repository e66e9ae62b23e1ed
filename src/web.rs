//! Browser painter: draws a [`DrawList`] onto a 2D canvas context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads a draw list and the viewport and produces pixels; it never mutates
//! editor state. Fallible `Canvas2D` calls propagate via `Result<(), JsValue>`.

use std::f64::consts::{FRAC_PI_2, PI};

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::{BADGE_FONT_PX, HANDLE_RADIUS_PX};
use crate::geometry::{Point, Rect};
use crate::placement::rotate_handle_position;
use crate::render::{DrawList, LabelPlacement, Outline, Sprite, TextMeasure};
use crate::scene::RoomBoundary;
use crate::viewport::Viewport;

const FONT_FAMILY: &str = "sans-serif";
const STROKE_COLOR: &str = "#333333";
const SELECTION_COLOR: &str = "#1E90FF";
const BOUNDARY_COLOR: &str = "#E53935";
const CHIP_FILL: &str = "rgba(255, 255, 255, 0.9)";
const APRON_FILL: &str = "rgba(0, 0, 0, 0.25)";

/// [`TextMeasure`] backed by the context's own font metrics.
pub struct CanvasTextMeasure<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasTextMeasure<'a> {
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for CanvasTextMeasure<'_> {
    fn measure(&self, text: &str, font_px: f64) -> f64 {
        self.ctx.set_font(&font(font_px));
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(_) => f64::INFINITY,
        }
    }
}

/// Paint `list` under the viewport transform.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn paint(ctx: &CanvasRenderingContext2d, list: &DrawList, viewport: &Viewport, dpr: f64) -> Result<(), JsValue> {
    let container = viewport.container();
    let scale = viewport.scale();
    let position = viewport.position();

    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, container.width, container.height);
    ctx.translate(position.x, position.y)?;
    ctx.scale(scale, scale)?;

    if let Some(boundary) = &list.boundary {
        draw_boundary(ctx, boundary, scale);
    }
    if !list.draft.is_empty() {
        draw_polyline(ctx, &list.draft, false, scale);
    }
    for sprite in &list.sprites {
        draw_sprite(ctx, sprite, scale)?;
    }
    if let Some(bounds) = list.selection {
        draw_selection(ctx, &bounds, scale)?;
    }
    Ok(())
}

fn font(px: f64) -> String {
    format!("{px}px {FONT_FAMILY}")
}

fn draw_boundary(ctx: &CanvasRenderingContext2d, boundary: &RoomBoundary, scale: f64) {
    draw_polyline(ctx, &boundary.vertices, boundary.closed, scale);
}

fn draw_polyline(ctx: &CanvasRenderingContext2d, points: &[Point], closed: bool, scale: f64) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    ctx.save();
    ctx.set_stroke_style_str(BOUNDARY_COLOR);
    ctx.set_line_width(2.0 / scale);
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    if closed {
        ctx.close_path();
    }
    ctx.stroke();
    ctx.restore();
}

fn draw_sprite(ctx: &CanvasRenderingContext2d, sprite: &Sprite, scale: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.translate(sprite.pivot.x, sprite.pivot.y)?;
    ctx.rotate(sprite.rotation.to_radians())?;
    ctx.translate(-sprite.pivot.x, -sprite.pivot.y)?;
    ctx.set_fill_style_str(sprite.fill);
    ctx.set_stroke_style_str(STROKE_COLOR);
    ctx.set_line_width(1.0 / scale);
    draw_outline(ctx, &sprite.outline)?;
    ctx.restore();

    draw_label(ctx, sprite)?;
    if let Some(badge) = &sprite.badge {
        ctx.set_font(&font(BADGE_FONT_PX));
        ctx.set_fill_style_str(STROKE_COLOR);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(&badge.text, badge.center.x, badge.center.y)?;
    }
    Ok(())
}

fn draw_outline(ctx: &CanvasRenderingContext2d, outline: &Outline) -> Result<(), JsValue> {
    match outline {
        Outline::Rect(r) => {
            ctx.fill_rect(r.x, r.y, r.width, r.height);
            ctx.stroke_rect(r.x, r.y, r.width, r.height);
        }
        Outline::RoundedRect { rect, corner_radius } => {
            rounded_rect_path(ctx, rect, *corner_radius)?;
            ctx.fill();
            ctx.stroke();
        }
        Outline::Circle { center, radius } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
            ctx.fill();
            ctx.stroke();
        }
        Outline::Ellipse { center, rx, ry } => {
            ctx.begin_path();
            ctx.ellipse(center.x, center.y, *rx, *ry, 0.0, 0.0, 2.0 * PI)?;
            ctx.fill();
            ctx.stroke();
        }
        Outline::Polygon(points) => {
            let Some((first, rest)) = points.split_first() else {
                return Ok(());
            };
            ctx.begin_path();
            ctx.move_to(first.x, first.y);
            for p in rest {
                ctx.line_to(p.x, p.y);
            }
            ctx.close_path();
            ctx.fill();
            ctx.stroke();
        }
        Outline::Stage { platform, apron } => {
            ctx.fill_rect(platform.x, platform.y, platform.width, platform.height);
            ctx.set_fill_style_str(APRON_FILL);
            ctx.fill_rect(apron.x, apron.y, apron.width, apron.height);
            ctx.stroke_rect(platform.x, platform.y, platform.width, platform.height);
        }
        Outline::Door { frame, hinge, swing_radius } => {
            ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);
            ctx.stroke_rect(frame.x, frame.y, frame.width, frame.height);
            ctx.begin_path();
            ctx.arc(hinge.x, hinge.y, *swing_radius, -FRAC_PI_2, 0.0)?;
            ctx.stroke();
        }
    }
    Ok(())
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, r: &Rect, radius: f64) -> Result<(), JsValue> {
    ctx.begin_path();
    ctx.move_to(r.x + radius, r.y);
    ctx.arc_to(r.right(), r.y, r.right(), r.bottom(), radius)?;
    ctx.arc_to(r.right(), r.bottom(), r.x, r.bottom(), radius)?;
    ctx.arc_to(r.x, r.bottom(), r.x, r.y, radius)?;
    ctx.arc_to(r.x, r.y, r.right(), r.y, radius)?;
    ctx.close_path();
    Ok(())
}

fn draw_label(ctx: &CanvasRenderingContext2d, sprite: &Sprite) -> Result<(), JsValue> {
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    match &sprite.label {
        LabelPlacement::Inside { center, font_px } => {
            ctx.set_font(&font(*font_px));
            ctx.set_fill_style_str(sprite.text_color);
            ctx.fill_text(&sprite.name, center.x, center.y)?;
        }
        LabelPlacement::Chip { rect, font_px, text_center } => {
            ctx.set_fill_style_str(CHIP_FILL);
            rounded_rect_path(ctx, rect, rect.height / 2.0)?;
            ctx.fill();
            ctx.set_font(&font(*font_px));
            ctx.set_fill_style_str(STROKE_COLOR);
            ctx.fill_text(&sprite.name, text_center.x, text_center.y)?;
        }
    }
    Ok(())
}

fn draw_selection(ctx: &CanvasRenderingContext2d, bounds: &Rect, scale: f64) -> Result<(), JsValue> {
    let handle = HANDLE_RADIUS_PX / scale;
    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / scale);
    ctx.stroke_rect(bounds.x, bounds.y, bounds.width, bounds.height);

    ctx.set_fill_style_str("#fff");
    for corner in bounds.corners() {
        ctx.fill_rect(corner.x - handle / 2.0, corner.y - handle / 2.0, handle, handle);
        ctx.stroke_rect(corner.x - handle / 2.0, corner.y - handle / 2.0, handle, handle);
    }

    let rotate = rotate_handle_position(bounds, scale);
    ctx.begin_path();
    ctx.move_to(bounds.center().x, bounds.y);
    ctx.line_to(rotate.x, rotate.y);
    ctx.stroke();
    ctx.begin_path();
    ctx.arc(rotate.x, rotate.y, handle / 2.0, 0.0, 2.0 * PI)?;
    ctx.fill();
    ctx.stroke();
    ctx.restore();
    Ok(())
}
