//! Spatial core for the venue layout editor.
//!
//! This crate owns the geometric model behind an event floor plan: placed
//! venue elements (tables, stages, doors, ...), an optional room-boundary
//! polygon, the pan/zoom viewport that maps scene coordinates onto the
//! container, and the guest-to-element seat assignments. The host (a browser
//! canvas, or the bundled CLI) forwards pointer and keyboard events to an
//! [`session::EditorSession`] and persists the resulting
//! [`session::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Editor session and its event handlers |
//! | [`scene`] | Placed elements, room boundary, id generation |
//! | [`catalog`] | Fixed registry of placeable element kinds |
//! | [`geometry`] | Points, rectangles, grid snapping, point-in-polygon |
//! | [`boundary`] | Room-boundary containment and the boundary drawing tool |
//! | [`viewport`] | Zoom/pan state and coordinate conversions |
//! | [`placement`] | Tools, grid settings, and the gesture state machine |
//! | [`seating`] | Guest roster and seat assignment |
//! | [`render`] | Draw-list construction and label-fit policy |
//! | [`persist`] | Floor-plan wire format, stores, and load sanitising |
//! | [`config`] | Environment-driven editor configuration |
//! | [`error`] | Crate error type |
//! | [`consts`] | Shared numeric constants |

pub mod boundary;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod persist;
pub mod placement;
pub mod render;
pub mod scene;
pub mod seating;
pub mod session;
pub mod viewport;
#[cfg(feature = "web")]
pub mod web;
