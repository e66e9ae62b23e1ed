#![allow(clippy::float_cmp)]

use super::*;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
}

#[test]
fn grid_disabled_is_identity() {
    let grid = GridSettings { enabled: false, size: 20.0 };
    assert_eq!(grid.apply(pt(17.0, 23.0)), pt(17.0, 23.0));
}

#[test]
fn grid_enabled_snaps() {
    let grid = GridSettings { enabled: true, size: 20.0 };
    assert_eq!(grid.apply(pt(17.0, 23.0)), pt(20.0, 20.0));
    assert_eq!(grid.apply(pt(20.0, 20.0)), pt(20.0, 20.0));
}

#[test]
fn selection_select_and_clear() {
    let mut sel = SelectionState::default();
    sel.select("table-1".into());
    assert!(sel.is_selected("table-1"));
    assert!(!sel.is_selected("table-2"));
    sel.clear();
    assert!(sel.selected_id.is_none());
}

// =============================================================
// Handles
// =============================================================

#[test]
fn hit_handle_finds_corners() {
    let r = Rect::new(0.0, 0.0, 100.0, 50.0);
    assert_eq!(hit_handle(&r, pt(99.0, 49.0), 4.0, 1.0), Some(HandleHit::Resize(ResizeHandle::Se)));
    assert_eq!(hit_handle(&r, pt(1.0, 1.0), 4.0, 1.0), Some(HandleHit::Resize(ResizeHandle::Nw)));
    assert_eq!(hit_handle(&r, pt(50.0, 25.0), 4.0, 1.0), None);
}

#[test]
fn hit_handle_finds_rotate_handle_above_top_edge() {
    let r = Rect::new(0.0, 100.0, 100.0, 50.0);
    // 24 screen px above the top edge at scale 2 is 12 scene units.
    assert_eq!(rotate_handle_position(&r, 2.0), pt(50.0, 88.0));
    assert_eq!(hit_handle(&r, pt(50.0, 88.0), 4.0, 2.0), Some(HandleHit::Rotate));
}

#[test]
fn resize_se_grows_from_top_left() {
    let r = resize_bounds(&Rect::new(10.0, 10.0, 100.0, 50.0), ResizeHandle::Se, 20.0, 10.0);
    assert_eq!(r, Rect::new(10.0, 10.0, 120.0, 60.0));
}

#[test]
fn resize_nw_keeps_bottom_right_fixed() {
    let r = resize_bounds(&Rect::new(10.0, 10.0, 100.0, 50.0), ResizeHandle::Nw, -10.0, -5.0);
    assert_eq!(r, Rect::new(0.0, 5.0, 110.0, 55.0));
}

#[test]
fn resize_respects_minimum_size() {
    let r = resize_bounds(&Rect::new(0.0, 0.0, 100.0, 50.0), ResizeHandle::Ne, -500.0, 500.0);
    assert_eq!(r.width, MIN_ELEMENT_SIZE);
    assert_eq!(r.height, MIN_ELEMENT_SIZE);
    assert_eq!(r.x, 0.0);
    assert_eq!(r.bottom(), 50.0);
}

#[test]
fn pointer_angle_quadrants() {
    let c = pt(0.0, 0.0);
    assert!((pointer_angle(c, pt(10.0, 0.0)) - 0.0).abs() < 1e-9);
    assert!((pointer_angle(c, pt(0.0, 10.0)) - 90.0).abs() < 1e-9);
    assert!((pointer_angle(c, pt(-10.0, 0.0)) - 180.0).abs() < 1e-9);
}
