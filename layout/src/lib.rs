//! Placement geometry for campaign screens.
//!
//! This crate is shared by the funnel service and the browser editor (it
//! compiles to WebAssembly with no I/O). It answers two questions: where does
//! an element sit on a given device, and where may the user drag or resize it
//! without leaving its container or covering the game area. The host layer is
//! responsible for wiring DOM events to [`drag::DragPositioner`] and for
//! persisting the resulting [`drag::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`geom`] | Points, sizes, rectangles and the overlap test |
//! | [`device`] | Per-device element resolution and background selection |
//! | [`drag`] | Drag/resize gesture state machine with collision avoidance |
//! | [`consts`] | Default geometry and minimum sizes |

pub mod consts;
pub mod device;
pub mod drag;
pub mod geom;
