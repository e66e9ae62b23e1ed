#![allow(clippy::float_cmp)]

use super::*;
use crate::scene::IdGenerator;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn triangle() -> RoomBoundary {
    RoomBoundary::closed_polygon(vec![pt(0.0, 0.0), pt(100.0, 0.0), pt(50.0, 100.0)]).unwrap()
}

/// A 10x10 table at `(x, y)`.
fn small_element(x: f64, y: f64) -> LayoutElement {
    let mut scene = Scene::with_ids(IdGenerator::sequential());
    let mut e = scene.add_element("table", Some(pt(x, y))).unwrap().clone();
    e.width = 10.0;
    e.height = 10.0;
    e
}

// =============================================================
// is_element_within_boundary
// =============================================================

#[test]
fn element_inside_triangle() {
    let e = small_element(40.0, 40.0);
    assert!(is_element_within_boundary(&e, Some(&triangle())));
}

#[test]
fn element_with_one_corner_outside_is_rejected() {
    // Right edge of the triangle passes x = 100 - y/2; at y = 50 that is 75.
    let e = small_element(70.0, 40.0);
    assert!(!is_element_within_boundary(&e, Some(&triangle())));
}

#[test]
fn no_boundary_means_no_constraint() {
    let e = small_element(5000.0, -5000.0);
    assert!(is_element_within_boundary(&e, None));
}

#[test]
fn open_boundary_means_no_constraint() {
    let open = RoomBoundary { vertices: triangle().vertices, closed: false };
    assert!(is_element_within_boundary(&small_element(500.0, 500.0), Some(&open)));
}

#[test]
fn degenerate_closed_boundary_means_no_constraint() {
    let bad = RoomBoundary { vertices: vec![pt(0.0, 0.0), pt(1.0, 1.0)], closed: true };
    assert!(is_element_within_boundary(&small_element(500.0, 500.0), Some(&bad)));
}

#[test]
fn circle_uses_bounding_square() {
    let room = RoomBoundary::closed_polygon(vec![pt(0.0, 0.0), pt(200.0, 0.0), pt(200.0, 200.0), pt(0.0, 200.0)])
        .unwrap();
    let mut scene = Scene::with_ids(IdGenerator::sequential());
    // Radius 40 centred at (50, 50) spans 10..90.
    let inside = scene.add_element("round-table", Some(pt(50.0, 50.0))).unwrap().clone();
    assert!(is_element_within_boundary(&inside, Some(&room)));
    // Centred at (30, 50) the square pokes out to x = -10.
    assert!(!is_element_within_boundary(&inside.moved_to(pt(30.0, 50.0)), Some(&room)));
}

// =============================================================
// constrain_to_boundary
// =============================================================

#[test]
fn constrain_accepts_move_inside() {
    let e = small_element(40.0, 40.0);
    let result = constrain_to_boundary(&e, pt(45.0, 20.0), Some(&triangle()));
    assert_eq!(result, Constrained::Accepted(pt(45.0, 20.0)));
    assert!(result.is_accepted());
}

#[test]
fn constrain_rejects_move_outside_and_keeps_original() {
    let e = small_element(40.0, 40.0);
    let result = constrain_to_boundary(&e, pt(200.0, 200.0), Some(&triangle()));
    assert_eq!(result, Constrained::Rejected { original: pt(40.0, 40.0) });
    assert_eq!(result.position(), pt(40.0, 40.0));
}

#[test]
fn constrain_without_boundary_accepts_anything() {
    let e = small_element(40.0, 40.0);
    assert_eq!(constrain_to_boundary(&e, pt(-900.0, 900.0), None), Constrained::Accepted(pt(-900.0, 900.0)));
}

// =============================================================
// BoundaryDraft
// =============================================================

#[test]
fn draft_closes_near_first_vertex_with_three_points() {
    let mut draft = BoundaryDraft::new();
    assert_eq!(draft.add_vertex(pt(0.0, 0.0), 10.0), DraftStep::Added(1));
    assert_eq!(draft.add_vertex(pt(100.0, 0.0), 10.0), DraftStep::Added(2));
    assert_eq!(draft.add_vertex(pt(100.0, 100.0), 10.0), DraftStep::Added(3));
    let step = draft.add_vertex(pt(4.0, 3.0), 10.0);
    let DraftStep::Closed(boundary) = step else {
        panic!("expected the draft to close, got {step:?}");
    };
    assert!(boundary.closed);
    assert_eq!(boundary.vertices, vec![pt(0.0, 0.0), pt(100.0, 0.0), pt(100.0, 100.0)]);
    assert!(draft.is_empty());
}

#[test]
fn draft_does_not_close_with_two_vertices() {
    let mut draft = BoundaryDraft::new();
    draft.add_vertex(pt(0.0, 0.0), 10.0);
    draft.add_vertex(pt(100.0, 0.0), 10.0);
    assert_eq!(draft.add_vertex(pt(1.0, 1.0), 10.0), DraftStep::Added(3));
}

#[test]
fn draft_far_click_adds_vertex() {
    let mut draft = BoundaryDraft::new();
    for p in [pt(0.0, 0.0), pt(100.0, 0.0), pt(100.0, 100.0)] {
        draft.add_vertex(p, 10.0);
    }
    assert_eq!(draft.add_vertex(pt(0.0, 100.0), 10.0), DraftStep::Added(4));
}

#[test]
fn draft_undo_and_cancel() {
    let mut draft = BoundaryDraft::new();
    draft.add_vertex(pt(0.0, 0.0), 10.0);
    draft.add_vertex(pt(50.0, 0.0), 10.0);
    assert_eq!(draft.undo_vertex(), Some(pt(50.0, 0.0)));
    assert_eq!(draft.vertices(), &[pt(0.0, 0.0)]);
    draft.cancel();
    assert!(draft.is_empty());
}

#[test]
fn point_in_triangle() {
    let tri = triangle();
    assert!(is_point_in_polygon(pt(50.0, 10.0), &tri.vertices));
    assert!(!is_point_in_polygon(pt(95.0, 90.0), &tri.vertices));
}

#[test]
fn elements_outside_boundary_lists_only_escapees() {
    let mut scene = Scene::with_ids(IdGenerator::sequential());
    scene.add_element("cocktail-table", Some(pt(20.0, 20.0))).unwrap();
    scene.add_element("cocktail-table", Some(pt(500.0, 500.0))).unwrap();
    assert_eq!(elements_outside_boundary(&scene).count(), 0);

    let square = vec![pt(0.0, 0.0), pt(200.0, 0.0), pt(200.0, 200.0), pt(0.0, 200.0)];
    scene.set_room_boundary(Some(RoomBoundary::closed_polygon(square).unwrap()));
    let outside: Vec<_> = elements_outside_boundary(&scene).map(|e| e.id.as_str()).collect();
    assert_eq!(outside, vec!["cocktail-table-2"]);
}
