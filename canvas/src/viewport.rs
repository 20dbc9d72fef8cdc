//! Screen ↔ canvas conversion and zoom.
//!
//! The editor canvas is always 540×765 canvas units. On screen it is drawn
//! at `origin` (CSS pixels, the canvas element's top-left) and scaled by
//! `zoom`. There is no pan: the page scrolls, the canvas does not.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use fields::geometry::CANVAS_WIDTH;

use crate::consts::{FIT_MARGIN_PX, ZOOM_DEFAULT, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Placement and scale of the canvas element on screen.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub zoom: f64,
    /// Set once the operator picks a zoom; disables automatic fitting.
    pub manual_zoom: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { origin_x: 0.0, origin_y: 0.0, zoom: ZOOM_DEFAULT, manual_zoom: false }
    }
}

impl Viewport {
    /// Convert a screen-space point (CSS pixels) to canvas units.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.origin_x) / self.zoom,
            y: (screen.y - self.origin_y) / self.zoom,
        }
    }

    /// Convert a canvas-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point {
            x: canvas.x * self.zoom + self.origin_x,
            y: canvas.y * self.zoom + self.origin_y,
        }
    }

    /// Convert a screen-space distance (pixels) to canvas units.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    pub fn set_origin(&mut self, x: f64, y: f64) {
        self.origin_x = x;
        self.origin_y = y;
    }

    /// Step zoom up. Returns whether the value changed.
    pub fn zoom_in(&mut self) -> bool {
        self.set_manual(self.zoom + ZOOM_STEP)
    }

    /// Step zoom down. Returns whether the value changed.
    pub fn zoom_out(&mut self) -> bool {
        self.set_manual(self.zoom - ZOOM_STEP)
    }

    /// Return to 100%. Still counts as a manual choice.
    pub fn reset_zoom(&mut self) -> bool {
        self.set_manual(ZOOM_DEFAULT)
    }

    /// Shrink the canvas to fit a viewport `available_px` wide, never above
    /// 100%. Ignored once the operator has zoomed manually.
    pub fn fit_to_width(&mut self, available_px: f64) -> bool {
        if self.manual_zoom {
            return false;
        }
        let fitted = ((available_px - FIT_MARGIN_PX) / CANVAS_WIDTH).min(1.0);
        self.apply(fitted)
    }

    fn set_manual(&mut self, zoom: f64) -> bool {
        self.manual_zoom = true;
        self.apply(zoom)
    }

    fn apply(&mut self, zoom: f64) -> bool {
        let next = round_zoom(zoom);
        if (next - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = next;
        true
    }
}

/// Clamp to the zoom range and round to two decimals.
#[must_use]
pub fn round_zoom(zoom: f64) -> f64 {
    if !zoom.is_finite() {
        return ZOOM_DEFAULT;
    }
    (zoom.clamp(ZOOM_MIN, ZOOM_MAX) * 100.0).round() / 100.0
}
