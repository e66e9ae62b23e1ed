//! Floor-plan persistence contract.
//!
//! DESIGN
//! ======
//! The spatial core never talks to a backend directly. It produces and
//! consumes [`FloorPlanRecord`]s, and reaches storage through the
//! [`FloorPlanStore`] and [`GuestService`] traits. Only the catalog `type`
//! key is persisted per element; styling is re-derived from the catalog on
//! load, and any extra fields a client attached are ignored.
//!
//! ERROR HANDLING
//! ==============
//! Loading never fails on bad content. [`sanitize`] drops or repairs the
//! offending element or boundary and reports a [`LoadWarning`] instead, so a
//! single malformed row cannot lock the user out of their layout. Store
//! failures surface as [`LayoutError::Store`] and leave in-memory state alone.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::boundary::elements_outside_boundary;
use crate::catalog::{self, ShapeKind};
use crate::config::EditorConfig;
use crate::consts::{DEFAULT_PLACEMENT_X, DEFAULT_PLACEMENT_Y};
use crate::error::LayoutError;
use crate::geometry::{Size, normalize_degrees};
use crate::scene::{CanvasSettings, ElementId, LayoutElement, RoomBoundary, Scene};
use crate::seating::{Guest, GuestId};
use crate::session::{Action, EditorSession};

// =============================================================================
// WIRE TYPES
// =============================================================================

/// A floor plan as stored by the floor-plan service.
///
/// Deserializing is lenient: a field of the wrong type is noted in
/// `read_warnings` and replaced by its default instead of failing the whole
/// document. Only a missing `eventId` is fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawFloorPlanRecord")]
pub struct FloorPlanRecord {
    pub event_id: String,
    pub canvas_size: Size,
    pub pixels_per_meter: f64,
    pub elements: Vec<ElementRecord>,
    pub room_boundary: Option<RoomBoundary>,
    #[serde(skip)]
    pub(crate) read_warnings: Vec<LoadWarning>,
}

impl FloorPlanRecord {
    /// An empty plan for `event_id`.
    #[must_use]
    pub fn empty(event_id: impl Into<String>, canvas: CanvasSettings) -> Self {
        Self {
            event_id: event_id.into(),
            canvas_size: canvas.size(),
            pixels_per_meter: canvas.pixels_per_meter,
            elements: Vec::new(),
            room_boundary: None,
            read_warnings: Vec::new(),
        }
    }
}

/// Top-level shape of a stored document before any typed parsing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFloorPlanRecord {
    event_id: String,
    #[serde(default)]
    canvas_size: Option<Value>,
    #[serde(default)]
    pixels_per_meter: Option<Value>,
    #[serde(default)]
    elements: Option<Value>,
    #[serde(default)]
    room_boundary: Option<Value>,
}

impl From<RawFloorPlanRecord> for FloorPlanRecord {
    fn from(raw: RawFloorPlanRecord) -> Self {
        let defaults = CanvasSettings::default();
        let mut record = Self::empty(raw.event_id, defaults);

        if let Some(v) = raw.canvas_size {
            match serde_json::from_value::<Size>(v) {
                Ok(size) => record.canvas_size = size,
                Err(_) => record.read_warnings.push(LoadWarning::InvalidCanvas),
            }
        }
        if let Some(v) = raw.pixels_per_meter {
            match v.as_f64() {
                Some(ppm) => record.pixels_per_meter = ppm,
                None if record.read_warnings.is_empty() => record.read_warnings.push(LoadWarning::InvalidCanvas),
                None => {}
            }
        }
        match raw.elements {
            None => {}
            Some(Value::Array(rows)) => record.elements = rows.into_iter().map(ElementRecord::from).collect(),
            Some(_) => record.read_warnings.push(LoadWarning::MalformedElementList),
        }
        if let Some(v) = raw.room_boundary {
            match serde_json::from_value::<RoomBoundary>(v) {
                Ok(boundary) => record.room_boundary = Some(boundary),
                Err(e) => record.read_warnings.push(LoadWarning::InvalidBoundary { reason: e.to_string() }),
            }
        }
        record
    }
}

/// One element as persisted.
///
/// Built from raw JSON one field at a time. A number field holding some other
/// type reads as NaN so [`sanitize`] repairs it like any non-finite value;
/// other mistyped fields are listed in `malformed` and read as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct ElementRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    pub capacity: Option<i64>,
    pub name: String,
    pub assigned_guests: Vec<GuestId>,
    #[serde(skip)]
    pub(crate) malformed: Vec<&'static str>,
}

/// Row-level marker in `ElementRecord::malformed`: the row was not an object.
const MALFORMED_ROW: &str = "element";

impl From<Value> for ElementRecord {
    fn from(value: Value) -> Self {
        let mut row = Self::default();
        let Value::Object(map) = value else {
            row.malformed.push(MALFORMED_ROW);
            return row;
        };
        let mut malformed = Vec::new();
        let mut text = |key: &'static str| match map.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                malformed.push(key);
                String::new()
            }
        };
        row.id = text("id");
        row.kind = text("type");
        row.name = text("name");

        let number = |key: &str| match map.get(key) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_f64().unwrap_or(f64::NAN)),
        };
        row.x = number("x");
        row.y = number("y");
        row.width = number("width");
        row.height = number("height");
        row.rotation = number("rotation");
        row.radius = number("radius");

        row.capacity = match map.get("capacity") {
            None | Some(Value::Null) => None,
            Some(v) => {
                let parsed = v.as_i64();
                if parsed.is_none() {
                    malformed.push("capacity");
                }
                parsed
            }
        };

        match map.get("assignedGuests") {
            None | Some(Value::Null) => {}
            Some(Value::Array(ids)) => {
                for id in ids {
                    match id.as_str() {
                        Some(g) => row.assigned_guests.push(g.to_owned()),
                        None if !malformed.contains(&"assignedGuests") => malformed.push("assignedGuests"),
                        None => {}
                    }
                }
            }
            Some(_) => malformed.push("assignedGuests"),
        }
        row.malformed = malformed;
        row
    }
}

impl From<&LayoutElement> for ElementRecord {
    fn from(e: &LayoutElement) -> Self {
        Self {
            id: e.id.clone(),
            kind: e.kind.clone(),
            x: Some(e.x),
            y: Some(e.y),
            width: Some(e.width),
            height: Some(e.height),
            rotation: Some(e.rotation),
            radius: e.radius,
            capacity: Some(i64::from(e.capacity)),
            name: e.name.clone(),
            assigned_guests: e.assigned_guests.clone(),
            malformed: Vec::new(),
        }
    }
}

// =============================================================================
// SANITIZING
// =============================================================================

/// Something [`sanitize`] had to drop or repair.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadWarning {
    #[error("element {id} has unknown type {kind:?}; skipped")]
    UnknownKind { id: String, kind: String },
    #[error("element id {id:?} is empty or duplicated; skipped")]
    DuplicateElementId { id: String },
    #[error("element {id} has invalid {field}; reset to default")]
    InvalidGeometry { id: ElementId, field: &'static str },
    #[error("element {id} capacity {found} replaced with {replaced}")]
    CapacityReset { id: ElementId, found: i64, replaced: u32 },
    #[error("element {id} over capacity; unseated {dropped:?}")]
    CapacityTruncated { id: ElementId, dropped: Vec<GuestId> },
    #[error("guest {guest_id} listed more than once; removed from {element_id}")]
    DuplicateGuest { guest_id: GuestId, element_id: ElementId },
    #[error("room boundary is unusable ({reason}); dropped")]
    InvalidBoundary { reason: String },
    #[error("canvas settings invalid; defaults used")]
    InvalidCanvas,
    #[error("element #{index} is not an object; skipped")]
    MalformedElement { index: usize },
    #[error("element {id:?} has a malformed {field}; ignored")]
    MalformedField { id: String, field: &'static str },
    #[error("element list is not an array; no elements loaded")]
    MalformedElementList,
}

/// A record reduced to values the scene model accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedPlan {
    pub event_id: String,
    pub canvas: CanvasSettings,
    pub elements: Vec<LayoutElement>,
    pub boundary: Option<RoomBoundary>,
}

/// Repair or drop whatever in `record` would break scene invariants.
#[must_use]
pub fn sanitize(record: FloorPlanRecord) -> (SanitizedPlan, Vec<LoadWarning>) {
    let mut warnings = record.read_warnings;

    let mut canvas = CanvasSettings {
        width: record.canvas_size.width,
        height: record.canvas_size.height,
        pixels_per_meter: record.pixels_per_meter,
    };
    if canvas.validate().is_err() {
        if !warnings.contains(&LoadWarning::InvalidCanvas) {
            warnings.push(LoadWarning::InvalidCanvas);
        }
        canvas = CanvasSettings::default();
    }

    let mut seen_ids = HashSet::new();
    let mut seated = HashSet::new();
    let mut elements = Vec::with_capacity(record.elements.len());
    for (index, raw) in record.elements.into_iter().enumerate() {
        if raw.malformed.contains(&MALFORMED_ROW) {
            warnings.push(LoadWarning::MalformedElement { index });
            continue;
        }
        for &field in &raw.malformed {
            warnings.push(LoadWarning::MalformedField { id: raw.id.clone(), field });
        }
        let Some(config) = catalog::lookup(&raw.kind) else {
            warnings.push(LoadWarning::UnknownKind { id: raw.id, kind: raw.kind });
            continue;
        };
        if raw.id.is_empty() || !seen_ids.insert(raw.id.clone()) {
            warnings.push(LoadWarning::DuplicateElementId { id: raw.id });
            continue;
        }
        let id = raw.id;
        let mut fix = |value: Option<f64>, fallback: f64, field: &'static str, positive: bool| match value {
            Some(v) if v.is_finite() && (!positive || v > 0.0) => v,
            _ => {
                warnings.push(LoadWarning::InvalidGeometry { id: id.clone(), field });
                fallback
            }
        };
        let x = fix(raw.x, DEFAULT_PLACEMENT_X, "x", false);
        let y = fix(raw.y, DEFAULT_PLACEMENT_Y, "y", false);
        let rotation = normalize_degrees(fix(Some(raw.rotation.unwrap_or(0.0)), 0.0, "rotation", false));
        let (width, height, radius) = if config.shape == ShapeKind::Circle {
            let fallback = config.default_radius.unwrap_or(config.default_width / 2.0);
            let r = fix(raw.radius.or(raw.width.map(|w| w / 2.0)), fallback, "radius", true);
            (r * 2.0, r * 2.0, Some(r))
        } else {
            let w = fix(raw.width, config.default_width, "width", true);
            let h = fix(raw.height, config.default_height, "height", true);
            (w, h, raw.radius.filter(|r| r.is_finite() && *r > 0.0))
        };

        let capacity = match raw.capacity {
            None => config.default_capacity,
            Some(c) if c > 0 || (c == 0 && !config.is_seating()) => u32::try_from(c).unwrap_or(u32::MAX),
            Some(found) => {
                warnings.push(LoadWarning::CapacityReset {
                    id: id.clone(),
                    found,
                    replaced: config.default_capacity,
                });
                config.default_capacity
            }
        };

        let mut assigned_guests = Vec::with_capacity(raw.assigned_guests.len());
        for guest_id in raw.assigned_guests {
            if seated.contains(&guest_id) {
                warnings.push(LoadWarning::DuplicateGuest { guest_id, element_id: id.clone() });
            } else {
                seated.insert(guest_id.clone());
                assigned_guests.push(guest_id);
            }
        }
        if assigned_guests.len() > capacity as usize {
            let dropped = assigned_guests.split_off(capacity as usize);
            for g in &dropped {
                seated.remove(g);
            }
            warnings.push(LoadWarning::CapacityTruncated { id: id.clone(), dropped });
        }

        let name = if raw.name.trim().is_empty() { config.description.to_owned() } else { raw.name };
        elements.push(LayoutElement {
            id,
            kind: config.id.to_owned(),
            x,
            y,
            width,
            height,
            rotation,
            radius,
            capacity,
            name,
            assigned_guests,
        });
    }

    let boundary = match record.room_boundary {
        Some(b) if b.vertices.iter().any(|v| !v.is_finite()) => {
            warnings.push(LoadWarning::InvalidBoundary { reason: "non-finite vertex".into() });
            None
        }
        Some(b) if b.closed && b.vertices.len() < 3 => {
            warnings.push(LoadWarning::InvalidBoundary {
                reason: format!("closed with {} vertices", b.vertices.len()),
            });
            None
        }
        other => other,
    };

    for w in &warnings {
        warn!(event_id = %record.event_id, warning = %w, "floor plan sanitized");
    }
    let plan = SanitizedPlan { event_id: record.event_id, canvas, elements, boundary };
    (plan, warnings)
}

// =============================================================================
// STORES
// =============================================================================

/// Floor-plan service: one plan per event.
#[async_trait]
pub trait FloorPlanStore: Send + Sync {
    /// Fetch the plan for `event_id`; `Ok(None)` when none exists yet.
    async fn load(&self, event_id: &str) -> Result<Option<FloorPlanRecord>, LayoutError>;

    /// Replace the stored plan for `record.event_id`.
    async fn save(&self, record: &FloorPlanRecord) -> Result<(), LayoutError>;
}

/// Guest service: the event's guest list and seat persistence.
#[async_trait]
pub trait GuestService: Send + Sync {
    async fn list_guests(&self, event_id: &str) -> Result<Vec<Guest>, LayoutError>;

    /// Record `guest_id`'s seat; `None` clears it.
    async fn persist_assignment(
        &self,
        event_id: &str,
        guest_id: &str,
        element_id: Option<&str>,
    ) -> Result<(), LayoutError>;
}

/// Process-local floor-plan store.
#[derive(Debug, Default)]
pub struct MemoryFloorPlanStore {
    plans: RwLock<HashMap<String, FloorPlanRecord>>,
    unavailable: AtomicBool,
}

impl MemoryFloorPlanStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`LayoutError::Store`] until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn check_available(&self) -> Result<(), LayoutError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(LayoutError::Store("floor plan service unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl FloorPlanStore for MemoryFloorPlanStore {
    async fn load(&self, event_id: &str) -> Result<Option<FloorPlanRecord>, LayoutError> {
        self.check_available()?;
        Ok(self.plans.read().await.get(event_id).cloned())
    }

    async fn save(&self, record: &FloorPlanRecord) -> Result<(), LayoutError> {
        self.check_available()?;
        self.plans.write().await.insert(record.event_id.clone(), record.clone());
        Ok(())
    }
}

/// Floor plans as `<dir>/<event_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, event_id: &str) -> Result<PathBuf, LayoutError> {
        let valid = !event_id.is_empty()
            && event_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(LayoutError::Store(format!("invalid event id {event_id:?}")));
        }
        Ok(self.dir.join(format!("{event_id}.json")))
    }
}

#[async_trait]
impl FloorPlanStore for JsonFileStore {
    async fn load(&self, event_id: &str) -> Result<Option<FloorPlanRecord>, LayoutError> {
        let path = self.path_for(event_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, record: &FloorPlanRecord) -> Result<(), LayoutError> {
        let path = self.path_for(&record.event_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec_pretty(record)?;
        // Atomic replace.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        info!(event_id = %record.event_id, path = %path.display(), elements = record.elements.len(), "floor plan saved");
        Ok(())
    }
}

/// Process-local guest service.
#[derive(Debug, Default)]
pub struct MemoryGuestService {
    events: RwLock<HashMap<String, Vec<Guest>>>,
}

impl MemoryGuestService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_event(&self, event_id: impl Into<String>, guests: Vec<Guest>) {
        self.events.write().await.insert(event_id.into(), guests);
    }
}

#[async_trait]
impl GuestService for MemoryGuestService {
    async fn list_guests(&self, event_id: &str) -> Result<Vec<Guest>, LayoutError> {
        Ok(self.events.read().await.get(event_id).cloned().unwrap_or_default())
    }

    async fn persist_assignment(
        &self,
        event_id: &str,
        guest_id: &str,
        element_id: Option<&str>,
    ) -> Result<(), LayoutError> {
        let mut events = self.events.write().await;
        let guest = events
            .get_mut(event_id)
            .and_then(|guests| guests.iter_mut().find(|g| g.id == guest_id))
            .ok_or_else(|| LayoutError::GuestNotFound(guest_id.to_owned()))?;
        guest.element_id = element_id.map(str::to_owned);
        Ok(())
    }
}

// =============================================================================
// SESSION I/O
// =============================================================================

/// Open the editor for `event_id`, starting empty when no plan is stored yet.
///
/// # Errors
///
/// Store and guest-service failures. Bad stored content is repaired and
/// reported in the returned warnings instead.
pub async fn open_session(
    store: &dyn FloorPlanStore,
    guests: &dyn GuestService,
    event_id: &str,
    container: Size,
    config: &EditorConfig,
) -> Result<(EditorSession, Vec<LoadWarning>), LayoutError> {
    let record = store.load(event_id).await?;
    let roster = guests.list_guests(event_id).await?;
    let mut session = EditorSession::from_config(event_id, container, config);
    let warnings = match record {
        Some(record) => session.load_record(record, roster),
        None => {
            info!(event_id, "no stored floor plan; starting empty");
            session.set_guests(roster);
            Vec::new()
        }
    };
    Ok((session, warnings))
}

/// Save `session` through `store`. The session stays dirty if the store fails.
///
/// # Errors
///
/// [`LayoutError::SaveInFlight`] when a save is already running, otherwise
/// whatever the store returned.
pub async fn save_session(store: &dyn FloorPlanStore, session: &mut EditorSession) -> Result<(), LayoutError> {
    let record = session.begin_save()?;
    match store.save(&record).await {
        Ok(()) => session.finish_save(Ok(())),
        Err(e) => {
            session.finish_save(Err(e.to_string()))?;
            Err(e)
        }
    }
}

/// Forward the seat changes in `action` to the guest service.
///
/// # Errors
///
/// The first guest-service failure.
pub async fn sync_seating(guests: &dyn GuestService, event_id: &str, action: &Action) -> Result<(), LayoutError> {
    match action {
        Action::GuestAssigned(a) => guests.persist_assignment(event_id, &a.guest_id, Some(a.element_id.as_str())).await,
        Action::GuestUnassigned { guest_id, .. } => guests.persist_assignment(event_id, guest_id, None).await,
        Action::ElementDeleted { released, .. } => {
            for guest_id in released {
                guests.persist_assignment(event_id, guest_id, None).await?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Headline numbers for a stored plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub event_id: String,
    pub canvas: CanvasSettings,
    pub elements: usize,
    pub seating_elements: usize,
    pub capacity: u64,
    pub assigned: usize,
    pub boundary: Option<RoomBoundary>,
    /// Elements sitting partly or wholly outside a closed boundary.
    pub outside_boundary: Vec<ElementId>,
    pub warnings: Vec<LoadWarning>,
}

/// Sanitise `record` and count what it holds.
#[must_use]
pub fn summarize(record: FloorPlanRecord) -> PlanSummary {
    let (plan, warnings) = sanitize(record);
    let mut scene = Scene::new();
    scene.load(plan.elements, plan.boundary);
    let outside_boundary = elements_outside_boundary(&scene).map(|e| e.id.clone()).collect();
    PlanSummary {
        event_id: plan.event_id,
        canvas: plan.canvas,
        elements: scene.len(),
        seating_elements: scene.elements().iter().filter(|e| e.capacity > 0).count(),
        capacity: scene.total_capacity(),
        assigned: scene.elements().iter().map(|e| e.assigned_guests.len()).sum(),
        boundary: scene.boundary().cloned(),
        outside_boundary,
        warnings,
    }
}
