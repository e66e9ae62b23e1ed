//! Seat assignment: the guest roster and the guest ⇄ element cross-reference.
//!
//! Two sides must agree at all times: each element's `assigned_guests` and
//! each guest's `element_id`. Every function here validates first and only
//! then touches both sides, so callers never observe a half-applied change.

#[cfg(test)]
#[path = "seating_test.rs"]
mod seating_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::scene::{ElementId, Scene};

/// Unique identifier for a guest, issued by the guest service.
pub type GuestId = String;

/// A guest as supplied by the guest service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(default)]
    pub accessibility: Vec<String>,
    /// Element this guest is seated at.
    #[serde(default, alias = "tableId")]
    pub element_id: Option<ElementId>,
}

impl Guest {
    #[must_use]
    pub fn new(id: impl Into<GuestId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), dietary: Vec::new(), accessibility: Vec::new(), element_id: None }
    }
}

/// Result of a successful [`assign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub guest_id: GuestId,
    pub element_id: ElementId,
    /// Where the guest sat before, if anywhere else.
    pub previous: Option<ElementId>,
}

/// Guests for the current event, in service order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestRoster {
    guests: Vec<Guest>,
}

impl GuestRoster {
    #[must_use]
    pub fn new(guests: Vec<Guest>) -> Self {
        Self { guests }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Guest> {
        self.guests.iter().find(|g| g.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Guest> {
        self.guests.iter_mut().find(|g| g.id == id)
    }

    #[must_use]
    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    /// Guests with no seat.
    pub fn unseated(&self) -> impl Iterator<Item = &Guest> {
        self.guests.iter().filter(|g| g.element_id.is_none())
    }

    /// Guests whose reference points at `element_id`.
    pub fn seated_at<'a>(&'a self, element_id: &'a str) -> impl Iterator<Item = &'a Guest> {
        self.guests.iter().filter(move |g| g.element_id.as_deref() == Some(element_id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }

    /// Bring both sides back into agreement after a load.
    ///
    /// Element lists are authoritative: guest ids no roster entry knows are
    /// dropped from elements, and every guest's reference is rewritten to the
    /// element that lists them (or cleared). Returns the number of fixes.
    pub fn reconcile(&mut self, scene: &mut Scene) -> usize {
        let mut fixes = 0;
        for element in scene.elements_mut() {
            let before = element.assigned_guests.len();
            element.assigned_guests.retain(|g| self.guests.iter().any(|known| &known.id == g));
            let dropped = before - element.assigned_guests.len();
            if dropped > 0 {
                warn!(element_id = %element.id, dropped, "dropped unknown guests from element");
                fixes += dropped;
            }
        }
        for guest in &mut self.guests {
            let holder = scene.element_holding(&guest.id).map(|e| e.id.clone());
            if guest.element_id != holder {
                debug!(guest_id = %guest.id, from = ?guest.element_id, to = ?holder, "guest seat reference repaired");
                guest.element_id = holder;
                fixes += 1;
            }
        }
        fixes
    }
}

/// Seat `guest_id` at `element_id`, moving them from any previous seat.
///
/// Re-assigning a guest to the element they already occupy succeeds without
/// changes, even when that element is full.
///
/// # Errors
///
/// [`LayoutError::GuestNotFound`], [`LayoutError::ElementNotFound`], or
/// [`LayoutError::CapacityExceeded`] when the target is already full. Nothing
/// is modified on error.
pub fn assign(
    scene: &mut Scene,
    roster: &mut GuestRoster,
    guest_id: &str,
    element_id: &str,
) -> Result<Assignment, LayoutError> {
    if roster.get(guest_id).is_none() {
        return Err(LayoutError::GuestNotFound(guest_id.to_owned()));
    }
    let target = scene
        .element(element_id)
        .ok_or_else(|| LayoutError::ElementNotFound(element_id.to_owned()))?;
    if target.assigned_guests.iter().any(|g| g == guest_id) {
        if let Some(guest) = roster.get_mut(guest_id) {
            guest.element_id = Some(element_id.to_owned());
        }
        return Ok(Assignment { guest_id: guest_id.to_owned(), element_id: element_id.to_owned(), previous: None });
    }
    if target.is_full() {
        return Err(LayoutError::CapacityExceeded { element_id: element_id.to_owned(), capacity: target.capacity });
    }

    let previous = detach(scene, guest_id);
    if let Some(element) = scene.element_mut(element_id) {
        element.assigned_guests.push(guest_id.to_owned());
    }
    if let Some(guest) = roster.get_mut(guest_id) {
        guest.element_id = Some(element_id.to_owned());
    }
    debug!(guest_id, element_id, ?previous, "guest assigned");
    Ok(Assignment { guest_id: guest_id.to_owned(), element_id: element_id.to_owned(), previous })
}

/// Remove `guest_id` from whichever element holds it and clear their reference.
///
/// Returns the element the guest was removed from. Guests unknown to the
/// roster are still removed from elements.
pub fn unassign(scene: &mut Scene, roster: &mut GuestRoster, guest_id: &str) -> Option<ElementId> {
    let previous = detach(scene, guest_id);
    if let Some(guest) = roster.get_mut(guest_id) {
        guest.element_id = None;
    }
    if previous.is_some() {
        debug!(guest_id, ?previous, "guest unassigned");
    }
    previous
}

/// Unassign every guest seated at `element_id`. Returns who was released.
pub fn release_element(scene: &mut Scene, roster: &mut GuestRoster, element_id: &str) -> Vec<GuestId> {
    let holders = scene
        .element(element_id)
        .map(|e| e.assigned_guests.clone())
        .unwrap_or_default();
    for guest_id in &holders {
        unassign(scene, roster, guest_id);
    }
    // References that point here without the element listing them.
    for guest in &mut roster.guests {
        if guest.element_id.as_deref() == Some(element_id) {
            guest.element_id = None;
        }
    }
    holders
}

/// Strip `guest_id` from every element; returns the first element that held it.
fn detach(scene: &mut Scene, guest_id: &str) -> Option<ElementId> {
    let mut previous = None;
    for element in scene.elements_mut() {
        let before = element.assigned_guests.len();
        element.assigned_guests.retain(|g| g != guest_id);
        if element.assigned_guests.len() != before && previous.is_none() {
            previous = Some(element.id.clone());
        }
    }
    previous
}
