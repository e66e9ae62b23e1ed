#![allow(clippy::float_cmp)]

use super::*;

fn scene() -> Scene {
    Scene::with_ids(IdGenerator::sequential())
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// add_element
// =============================================================

#[test]
fn add_element_copies_catalog_defaults() {
    let mut s = scene();
    let e = s.add_element("table", Some(pt(40.0, 60.0))).unwrap().clone();
    assert_eq!(e.id, "table-1");
    assert_eq!(e.kind, "table");
    assert_eq!((e.x, e.y), (40.0, 60.0));
    assert_eq!((e.width, e.height), (120.0, 60.0));
    assert_eq!(e.capacity, 6);
    assert_eq!(e.rotation, 0.0);
    assert!(e.assigned_guests.is_empty());
    assert_eq!(e.name, "Rectangular table");
}

#[test]
fn add_round_table_sizes_from_radius() {
    let mut s = scene();
    let e = s.add_element("round-table", Some(pt(200.0, 200.0))).unwrap();
    assert_eq!(e.radius, Some(40.0));
    assert_eq!((e.width, e.height), (80.0, 80.0));
}

#[test]
fn add_element_unknown_kind_fails() {
    let mut s = scene();
    let err = s.add_element("piano", Some(pt(0.0, 0.0))).unwrap_err();
    assert!(matches!(err, LayoutError::UnknownKind(ref k) if k == "piano"));
    assert!(s.is_empty());
}

#[test]
fn add_element_without_position_uses_default() {
    let mut s = scene();
    let e = s.add_element("door", None).unwrap();
    assert_eq!(e.position(), pt(DEFAULT_PLACEMENT_X, DEFAULT_PLACEMENT_Y));
}

#[test]
fn add_element_rejects_non_finite_position() {
    let mut s = scene();
    assert!(matches!(
        s.add_element("table", Some(pt(f64::NAN, 0.0))),
        Err(LayoutError::InvalidGeometry(_))
    ));
}

#[test]
fn rapid_insertions_get_unique_ids() {
    let mut s = Scene::new();
    for _ in 0..200 {
        s.add_element("table", Some(pt(0.0, 0.0))).unwrap();
    }
    let mut ids: Vec<&str> = s.elements().iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 200);
}

#[test]
fn sequential_ids_count_per_scene() {
    let mut s = scene();
    let a = s.add_element("table", None).unwrap().id.clone();
    let b = s.add_element("stage", None).unwrap().id.clone();
    assert_eq!(a, "table-1");
    assert_eq!(b, "stage-2");
}

#[test]
fn sequential_ids_skip_loaded_collisions() {
    let mut s = scene();
    let existing = LayoutElement::from_config("table-1".into(), catalog::lookup("table").unwrap(), pt(0.0, 0.0));
    s.load(vec![existing], None);
    let id = s.add_element("table", None).unwrap().id.clone();
    assert_eq!(id, "table-2");
}

// =============================================================
// update_element
// =============================================================

#[test]
fn update_element_merges_fields() {
    let mut s = scene();
    let id = s.add_element("table", Some(pt(0.0, 0.0))).unwrap().id.clone();
    s.update_element(&id, &PartialElement { name: Some("Head table".into()), x: Some(15.0), ..Default::default() })
        .unwrap();
    let e = s.element(&id).unwrap();
    assert_eq!(e.name, "Head table");
    assert_eq!(e.x, 15.0);
    assert_eq!(e.y, 0.0);
}

#[test]
fn update_missing_element_reports_not_found() {
    let mut s = scene();
    let err = s.update_element("nope", &PartialElement::position(pt(1.0, 1.0))).unwrap_err();
    assert!(matches!(err, LayoutError::ElementNotFound(ref id) if id == "nope"));
}

#[test]
fn update_rotation_is_normalized() {
    let mut s = scene();
    let id = s.add_element("table", None).unwrap().id.clone();
    s.update_element(&id, &PartialElement { rotation: Some(-45.0), ..Default::default() })
        .unwrap();
    assert_eq!(s.element(&id).unwrap().rotation, 315.0);
}

#[test]
fn update_radius_resizes_circle() {
    let mut s = scene();
    let id = s.add_element("round-table", None).unwrap().id.clone();
    s.update_element(&id, &PartialElement { radius: Some(55.0), ..Default::default() })
        .unwrap();
    let e = s.element(&id).unwrap();
    assert_eq!((e.width, e.height), (110.0, 110.0));
}

#[test]
fn update_rejects_non_positive_size_without_partial_write() {
    let mut s = scene();
    let id = s.add_element("table", Some(pt(5.0, 5.0))).unwrap().id.clone();
    let err = s
        .update_element(&id, &PartialElement { x: Some(99.0), width: Some(0.0), ..Default::default() })
        .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidGeometry(_)));
    assert_eq!(s.element(&id).unwrap().x, 5.0);
}

#[test]
fn update_capacity_below_assigned_is_rejected() {
    let mut s = scene();
    let id = s.add_element("table", None).unwrap().id.clone();
    s.element_mut(&id).unwrap().assigned_guests = vec!["g1".into(), "g2".into(), "g3".into()];
    let err = s
        .update_element(&id, &PartialElement { capacity: Some(2), ..Default::default() })
        .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidCapacity { requested: 2, .. }));
    assert_eq!(s.element(&id).unwrap().capacity, 6);
    s.update_element(&id, &PartialElement { capacity: Some(3), ..Default::default() })
        .unwrap();
    assert_eq!(s.element(&id).unwrap().capacity, 3);
}

#[test]
fn update_capacity_zero_on_seating_kind_is_rejected() {
    let mut s = scene();
    let id = s.add_element("round-table", None).unwrap().id.clone();
    assert!(matches!(
        s.update_element(&id, &PartialElement { capacity: Some(0), ..Default::default() }),
        Err(LayoutError::InvalidCapacity { .. })
    ));
}

// =============================================================
// Boundary, bounds, lookup helpers
// =============================================================

#[test]
fn set_room_boundary_replaces_wholesale() {
    let mut s = scene();
    let square = RoomBoundary::closed_polygon(vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)])
        .unwrap();
    s.set_room_boundary(Some(square.clone()));
    assert_eq!(s.boundary(), Some(&square));
    s.set_room_boundary(None);
    assert!(s.boundary().is_none());
}

#[test]
fn closed_polygon_needs_three_vertices() {
    assert!(matches!(
        RoomBoundary::closed_polygon(vec![pt(0.0, 0.0), pt(1.0, 1.0)]),
        Err(LayoutError::InvalidBoundary(_))
    ));
}

#[test]
fn open_boundary_is_not_constraining() {
    let open = RoomBoundary { vertices: vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(5.0, 5.0)], closed: false };
    assert!(!open.is_constraining());
}

#[test]
fn rect_bounds_anchor_top_left() {
    let mut s = scene();
    let e = s.add_element("table", Some(pt(40.0, 40.0))).unwrap();
    assert_eq!(e.bounds(), Rect::new(40.0, 40.0, 120.0, 60.0));
}

#[test]
fn circle_bounds_are_the_square_around_center() {
    let mut s = scene();
    let e = s.add_element("round-table", Some(pt(100.0, 100.0))).unwrap();
    assert_eq!(e.bounds(), Rect::new(60.0, 60.0, 80.0, 80.0));
}

#[test]
fn ellipse_bounds_center_on_position() {
    let mut s = scene();
    let e = s.add_element("oval-table", Some(pt(100.0, 100.0))).unwrap();
    assert_eq!(e.bounds(), Rect::new(30.0, 60.0, 140.0, 80.0));
}

#[test]
fn element_at_prefers_topmost() {
    let mut s = scene();
    let lower = s.add_element("dance-floor", Some(pt(0.0, 0.0))).unwrap().id.clone();
    let upper = s.add_element("table", Some(pt(10.0, 10.0))).unwrap().id.clone();
    assert_eq!(s.element_at(pt(20.0, 20.0)).map(|e| e.id.clone()), Some(upper));
    assert_eq!(s.element_at(pt(200.0, 200.0)).map(|e| e.id.clone()), Some(lower));
    assert!(s.element_at(pt(-5.0, -5.0)).is_none());
}

#[test]
fn element_at_follows_rotation() {
    let mut s = scene();
    let id = s.add_element("table", Some(pt(10.0, 10.0))).unwrap().id.clone();
    s.update_element(&id, &PartialElement { rotation: Some(90.0), ..Default::default() })
        .unwrap();
    // 120x60 turned upright about (70, 40): now spans x 40..100, y -20..100.
    assert!(s.element_at(pt(70.0, 90.0)).is_some());
    assert!(s.element_at(pt(120.0, 40.0)).is_none());
}

#[test]
fn remove_element_returns_the_removed_instance() {
    let mut s = scene();
    let id = s.add_element("bar", None).unwrap().id.clone();
    let removed = s.remove_element(&id).unwrap();
    assert_eq!(removed.id, id);
    assert!(s.is_empty());
    assert!(s.remove_element(&id).is_none());
}

#[test]
fn seats_free_and_full() {
    let mut s = scene();
    let id = s.add_element("cocktail-table", None).unwrap().id.clone();
    let e = s.element_mut(&id).unwrap();
    e.assigned_guests = vec!["a".into(), "b".into()];
    assert_eq!(e.seats_free(), 2);
    assert!(!e.is_full());
    e.assigned_guests.extend(["c".to_owned(), "d".to_owned()]);
    assert!(e.is_full());
    assert_eq!(s.total_capacity(), 4);
}

#[test]
fn layout_element_wire_names() {
    let mut s = scene();
    let e = s.add_element("round-table", Some(pt(1.0, 2.0))).unwrap();
    let json = serde_json::to_value(e).unwrap();
    assert_eq!(json["type"], "round-table");
    assert!(json.get("assignedGuests").is_some());
    assert!(json.get("kind").is_none());
}

// =============================================================
// CanvasSettings
// =============================================================

#[test]
fn canvas_settings_default_is_valid() {
    let c = CanvasSettings::default();
    assert!(c.validate().is_ok());
    assert_eq!(c.size(), Size::new(1200.0, 800.0));
    assert_eq!(c.size_in_meters(), Size::new(24.0, 16.0));
}

#[test]
fn canvas_settings_rejects_non_positive_values() {
    let c = CanvasSettings { width: 0.0, ..Default::default() };
    assert!(matches!(c.validate(), Err(LayoutError::InvalidGeometry(_))));
    let c = CanvasSettings { pixels_per_meter: -1.0, ..Default::default() };
    assert!(matches!(c.validate(), Err(LayoutError::InvalidGeometry(_))));
}
