use std::collections::HashSet;

use super::*;
use crate::geometry::Point;
use crate::scene::IdGenerator;

fn roster(n: usize) -> GuestRoster {
    GuestRoster::new((1..=n).map(|i| Guest::new(format!("g{i}"), format!("Guest {i}"))).collect())
}

fn scene_with(kinds: &[&str]) -> (Scene, Vec<ElementId>) {
    let mut scene = Scene::with_ids(IdGenerator::sequential());
    let ids = kinds
        .iter()
        .map(|k| scene.add_element(k, Some(Point::new(0.0, 0.0))).unwrap().id.clone())
        .collect();
    (scene, ids)
}

fn assert_consistent(scene: &Scene, roster: &GuestRoster) {
    let mut seen = HashSet::new();
    for element in scene.elements() {
        assert!(
            element.assigned_guests.len() <= element.capacity as usize,
            "{} holds {} guests with capacity {}",
            element.id,
            element.assigned_guests.len(),
            element.capacity
        );
        for g in &element.assigned_guests {
            assert!(seen.insert(g.clone()), "guest {g} seated twice");
            assert_eq!(roster.get(g).and_then(|guest| guest.element_id.clone()), Some(element.id.clone()));
        }
    }
    for guest in roster.guests() {
        if let Some(element_id) = &guest.element_id {
            let holder = scene.element_holding(&guest.id).map(|e| e.id.clone());
            assert_eq!(holder.as_ref(), Some(element_id), "guest {} reference is stale", guest.id);
        }
    }
}

// =============================================================
// assign
// =============================================================

#[test]
fn assign_updates_both_sides() {
    let (mut scene, ids) = scene_with(&["table"]);
    let mut guests = roster(1);
    let a = assign(&mut scene, &mut guests, "g1", &ids[0]).unwrap();
    assert_eq!(a.previous, None);
    assert_eq!(scene.element(&ids[0]).unwrap().assigned_guests, vec!["g1".to_owned()]);
    assert_eq!(guests.get("g1").unwrap().element_id.as_deref(), Some(ids[0].as_str()));
}

#[test]
fn assign_moves_guest_between_elements() {
    let (mut scene, ids) = scene_with(&["table", "round-table"]);
    let mut guests = roster(1);
    assign(&mut scene, &mut guests, "g1", &ids[0]).unwrap();
    let a = assign(&mut scene, &mut guests, "g1", &ids[1]).unwrap();
    assert_eq!(a.previous.as_deref(), Some(ids[0].as_str()));
    assert!(scene.element(&ids[0]).unwrap().assigned_guests.is_empty());
    assert_eq!(scene.element(&ids[1]).unwrap().assigned_guests, vec!["g1".to_owned()]);
    assert_consistent(&scene, &guests);
}

#[test]
fn assign_to_full_element_fails_without_side_effects() {
    let (mut scene, ids) = scene_with(&["cocktail-table", "table"]);
    let mut guests = roster(6);
    for g in ["g1", "g2", "g3", "g4"] {
        assign(&mut scene, &mut guests, g, &ids[0]).unwrap();
    }
    assign(&mut scene, &mut guests, "g5", &ids[1]).unwrap();
    let err = assign(&mut scene, &mut guests, "g5", &ids[0]).unwrap_err();
    assert!(matches!(err, LayoutError::CapacityExceeded { capacity: 4, .. }));
    // g5 stays where they were.
    assert_eq!(guests.get("g5").unwrap().element_id.as_deref(), Some(ids[1].as_str()));
    assert_eq!(scene.element(&ids[1]).unwrap().assigned_guests, vec!["g5".to_owned()]);
    assert_consistent(&scene, &guests);
}

#[test]
fn assign_to_non_seating_element_fails() {
    let (mut scene, ids) = scene_with(&["stage"]);
    let mut guests = roster(1);
    assert!(matches!(
        assign(&mut scene, &mut guests, "g1", &ids[0]),
        Err(LayoutError::CapacityExceeded { capacity: 0, .. })
    ));
}

#[test]
fn reassign_to_same_full_element_is_idempotent() {
    let (mut scene, ids) = scene_with(&["cocktail-table"]);
    let mut guests = roster(4);
    for g in ["g1", "g2", "g3", "g4"] {
        assign(&mut scene, &mut guests, g, &ids[0]).unwrap();
    }
    let a = assign(&mut scene, &mut guests, "g2", &ids[0]).unwrap();
    assert_eq!(a.previous, None);
    assert_eq!(scene.element(&ids[0]).unwrap().assigned_guests.len(), 4);
}

#[test]
fn assign_unknown_guest_or_element() {
    let (mut scene, ids) = scene_with(&["table"]);
    let mut guests = roster(1);
    assert!(matches!(assign(&mut scene, &mut guests, "ghost", &ids[0]), Err(LayoutError::GuestNotFound(_))));
    assert!(matches!(assign(&mut scene, &mut guests, "g1", "nowhere"), Err(LayoutError::ElementNotFound(_))));
    assert!(guests.get("g1").unwrap().element_id.is_none());
}

// =============================================================
// unassign / release
// =============================================================

#[test]
fn unassign_clears_both_sides() {
    let (mut scene, ids) = scene_with(&["table"]);
    let mut guests = roster(2);
    assign(&mut scene, &mut guests, "g1", &ids[0]).unwrap();
    assign(&mut scene, &mut guests, "g2", &ids[0]).unwrap();
    assert_eq!(unassign(&mut scene, &mut guests, "g1"), Some(ids[0].clone()));
    assert_eq!(scene.element(&ids[0]).unwrap().assigned_guests, vec!["g2".to_owned()]);
    assert!(guests.get("g1").unwrap().element_id.is_none());
    assert_eq!(unassign(&mut scene, &mut guests, "g1"), None);
}

#[test]
fn release_element_unassigns_every_holder() {
    let (mut scene, ids) = scene_with(&["table", "table"]);
    let mut guests = roster(3);
    assign(&mut scene, &mut guests, "g1", &ids[0]).unwrap();
    assign(&mut scene, &mut guests, "g2", &ids[0]).unwrap();
    assign(&mut scene, &mut guests, "g3", &ids[1]).unwrap();
    let released = release_element(&mut scene, &mut guests, &ids[0]);
    assert_eq!(released, vec!["g1".to_owned(), "g2".to_owned()]);
    assert!(guests.get("g1").unwrap().element_id.is_none());
    assert!(guests.get("g2").unwrap().element_id.is_none());
    assert_eq!(guests.get("g3").unwrap().element_id.as_deref(), Some(ids[1].as_str()));
    assert_eq!(guests.unseated().count(), 2);
    assert_eq!(guests.seated_at(&ids[1]).count(), 1);
}

// =============================================================
// Invariants under arbitrary operation sequences
// =============================================================

/// Tiny deterministic generator so the sequence is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound
    }
}

#[test]
fn capacity_and_single_assignment_hold_for_any_sequence() {
    let (mut scene, ids) = scene_with(&["cocktail-table", "table", "round-table", "stage"]);
    let mut guests = roster(25);
    let mut rng = Lcg(42);
    for _ in 0..2_000 {
        let guest = format!("g{}", rng.next(25) + 1);
        if rng.next(4) == 0 {
            unassign(&mut scene, &mut guests, &guest);
        } else {
            let element = &ids[rng.next(ids.len())];
            match assign(&mut scene, &mut guests, &guest, element) {
                Ok(_) | Err(LayoutError::CapacityExceeded { .. }) => {}
                Err(other) => panic!("unexpected error {other}"),
            }
        }
        assert_consistent(&scene, &guests);
    }
}

// =============================================================
// reconcile
// =============================================================

#[test]
fn reconcile_drops_unknown_guests_and_repairs_references() {
    let (mut scene, ids) = scene_with(&["table", "table"]);
    scene.element_mut(&ids[0]).unwrap().assigned_guests = vec!["g1".into(), "stranger".into()];
    let mut guests = roster(2);
    // g2 claims a seat the element does not list.
    guests.get_mut("g2").unwrap().element_id = Some(ids[1].clone());
    let fixes = guests.reconcile(&mut scene);
    assert_eq!(fixes, 3);
    assert_eq!(scene.element(&ids[0]).unwrap().assigned_guests, vec!["g1".to_owned()]);
    assert_eq!(guests.get("g1").unwrap().element_id.as_deref(), Some(ids[0].as_str()));
    assert!(guests.get("g2").unwrap().element_id.is_none());
    assert_consistent(&scene, &guests);
}

#[test]
fn guest_accepts_table_id_alias() {
    let g: Guest = serde_json::from_str(r#"{"id":"g1","name":"Ada","tableId":"table-3"}"#).unwrap();
    assert_eq!(g.element_id.as_deref(), Some("table-3"));
    assert!(g.dietary.is_empty());
}
