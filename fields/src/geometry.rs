//! Canvas-space constants and the canvas ↔ PDF transform.
//!
//! The editor always presents a fixed 540×765 canvas regardless of the real
//! page size. Stored positions are in that space; the renderer scales them to
//! the page at draw time. Changing either constant invalidates every stored
//! position.
//!
//! Canvas origin is top-left with y growing down. PDF origin is bottom-left
//! with y growing up, so the y mapping subtracts the scaled height to keep the
//! visual top edge in place.

use crate::Position;

pub const CANVAS_WIDTH: f64 = 540.0;
pub const CANVAS_HEIGHT: f64 = 765.0;

/// Smallest width or height a field may have, in canvas units.
pub const MIN_FIELD_SIZE: f64 = 20.0;

/// Physical page size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4, used when a page carries no usable media box.
    pub const A4: Self = Self { width: 595.0, height: 842.0 };
}

/// A rectangle in PDF space. `y` is the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    /// The visual top edge (largest y).
    #[must_use]
    pub fn top(&self) -> f64 {
        self.y + self.height
    }
}

/// Per-page transform context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub page: PageSize,
}

impl Transform {
    #[must_use]
    pub fn new(page: PageSize) -> Self {
        Self { page }
    }

    #[must_use]
    pub fn to_pdf_x(&self, x: f64) -> f64 {
        x / CANVAS_WIDTH * self.page.width
    }

    #[must_use]
    pub fn to_pdf_width(&self, w: f64) -> f64 {
        w / CANVAS_WIDTH * self.page.width
    }

    #[must_use]
    pub fn to_pdf_height(&self, h: f64) -> f64 {
        h / CANVAS_HEIGHT * self.page.height
    }

    #[must_use]
    pub fn to_pdf_y(&self, y: f64, h: f64) -> f64 {
        self.page.height - (y / CANVAS_HEIGHT * self.page.height) - self.to_pdf_height(h)
    }

    #[must_use]
    pub fn to_pdf_rect(&self, pos: &Position) -> PdfRect {
        PdfRect {
            x: self.to_pdf_x(pos.x),
            y: self.to_pdf_y(pos.y, pos.height),
            width: self.to_pdf_width(pos.width),
            height: self.to_pdf_height(pos.height),
        }
    }

    #[must_use]
    pub fn to_canvas_x(&self, pdf_x: f64) -> f64 {
        pdf_x / self.page.width * CANVAS_WIDTH
    }

    #[must_use]
    pub fn to_canvas_width(&self, pdf_w: f64) -> f64 {
        pdf_w / self.page.width * CANVAS_WIDTH
    }

    #[must_use]
    pub fn to_canvas_height(&self, pdf_h: f64) -> f64 {
        pdf_h / self.page.height * CANVAS_HEIGHT
    }

    /// Inverse of [`Transform::to_pdf_y`]: recovers the canvas top edge from
    /// a PDF bottom edge and PDF height.
    #[must_use]
    pub fn to_canvas_y(&self, pdf_y: f64, pdf_h: f64) -> f64 {
        (self.page.height - pdf_y - pdf_h) / self.page.height * CANVAS_HEIGHT
    }
}

impl Position {
    /// Force the rectangle inside the canvas and above the size floor.
    ///
    /// Size is fixed first so the origin clamp always has room.
    pub fn clamp_to_canvas(&mut self) {
        self.width = clamp_size(self.width, CANVAS_WIDTH);
        self.height = clamp_size(self.height, CANVAS_HEIGHT);
        self.x = clamp_origin(self.x, CANVAS_WIDTH - self.width);
        self.y = clamp_origin(self.y, CANVAS_HEIGHT - self.height);
        if self.page == 0 {
            self.page = 1;
        }
    }

    /// Round every coordinate to whole canvas units.
    pub fn round(&mut self) {
        self.x = self.x.round();
        self.y = self.y.round();
        self.width = self.width.round();
        self.height = self.height.round();
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

fn clamp_size(v: f64, max: f64) -> f64 {
    if v.is_finite() { v.clamp(MIN_FIELD_SIZE, max) } else { MIN_FIELD_SIZE }
}

fn clamp_origin(v: f64, max: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, max.max(0.0)) } else { 0.0 }
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
