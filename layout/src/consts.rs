//! Shared numeric constants for the layout crate.

// ── Resolution defaults ─────────────────────────────────────────

/// X used when neither the device override nor the element defines one.
pub const DEFAULT_X: f64 = 0.0;

/// Y used when neither the device override nor the element defines one.
pub const DEFAULT_Y: f64 = 0.0;

/// Width used when neither the device override nor the element defines one.
pub const DEFAULT_WIDTH: f64 = 100.0;

/// Height used when neither the device override nor the element defines one.
pub const DEFAULT_HEIGHT: f64 = 100.0;

// ── Drag / resize ───────────────────────────────────────────────

/// Smallest width a resize gesture may produce.
pub const MIN_WIDTH: f64 = 100.0;

/// Smallest height a resize gesture may produce.
pub const MIN_HEIGHT: f64 = 50.0;

/// Position restored by an explicit reset.
pub const RESET_X: f64 = 20.0;
pub const RESET_Y: f64 = 20.0;

/// Size restored by an explicit reset.
pub const RESET_WIDTH: f64 = 200.0;
pub const RESET_HEIGHT: f64 = 80.0;

/// Side of the square resize grip in the bottom-right corner, in pixels.
pub const HANDLE_SIZE_PX: f64 = 12.0;
