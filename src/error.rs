//! Crate error type and stable error codes.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::scene::ElementId;
use crate::seating::GuestId;

/// Machine-readable code attached to each error for host-side handling.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("unknown element kind: {0}")]
    UnknownKind(String),
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("guest not found: {0}")]
    GuestNotFound(GuestId),
    #[error("element {element_id} is full ({capacity} seats)")]
    CapacityExceeded { element_id: ElementId, capacity: u32 },
    #[error("invalid capacity {requested} for {element_id}: {reason}")]
    InvalidCapacity { element_id: ElementId, requested: i64, reason: &'static str },
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid room boundary: {0}")]
    InvalidBoundary(String),
    #[error("position ({x}, {y}) is outside the room boundary")]
    BoundaryViolation { x: f64, y: f64 },
    #[error("a save is already in flight")]
    SaveInFlight,
    #[error("no save is pending")]
    NoPendingSave,
    #[error("store error: {0}")]
    Store(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for LayoutError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKind(_) => "E_UNKNOWN_KIND",
            Self::ElementNotFound(_) => "E_ELEMENT_NOT_FOUND",
            Self::GuestNotFound(_) => "E_GUEST_NOT_FOUND",
            Self::CapacityExceeded { .. } => "E_CAPACITY_EXCEEDED",
            Self::InvalidCapacity { .. } => "E_INVALID_CAPACITY",
            Self::InvalidGeometry(_) => "E_INVALID_GEOMETRY",
            Self::InvalidBoundary(_) => "E_INVALID_BOUNDARY",
            Self::BoundaryViolation { .. } => "E_BOUNDARY_VIOLATION",
            Self::SaveInFlight => "E_SAVE_IN_FLIGHT",
            Self::NoPendingSave => "E_NO_PENDING_SAVE",
            Self::Store(_) => "E_STORE",
            Self::Json(_) => "E_JSON",
            Self::Io(_) => "E_IO",
        }
    }
}
