//! Shared numeric constants for the canvas crate.

// ── Gestures ────────────────────────────────────────────────────

/// Pointer travel in screen pixels, on either axis, before a press becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Drawn side length of a resize handle, in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 8.0;

// ── Field lifecycle ─────────────────────────────────────────────

/// Offset applied to both axes when duplicating a field, in canvas units.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// How long a newly created field keeps its highlight.
pub const JUST_ADDED_MS: f64 = 1000.0;

/// Fade-out time between a delete request and removal from the store.
pub const DELETE_FADE_MS: f64 = 300.0;

/// Idle time after the last edit before an autosave is issued.
pub const AUTOSAVE_DELAY_MS: f64 = 5000.0;

/// Extra room added on top of the estimated text height by auto-adjust.
pub const HEIGHT_ADJUST_PADDING: f64 = 14.0;

// ── Zoom ────────────────────────────────────────────────────────

pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;
pub const ZOOM_DEFAULT: f64 = 1.0;

/// Horizontal margin kept free when fitting the canvas to the viewport.
pub const FIT_MARGIN_PX: f64 = 64.0;
