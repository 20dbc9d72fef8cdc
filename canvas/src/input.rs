//! Input model: editor modes, the interaction state machine, and drag math.
//!
//! [`InputState`] is the single source of truth for what the pointer is
//! doing. Adding a field and dragging one are separate variants, so a resize
//! can never be in progress while an add mode is armed. A [`DragSession`]
//! lives from pointer-down to pointer-up and carries everything needed to
//! recompute the field rectangle from scratch on every move: the starting
//! rectangle, the pointer origin, and what is being dragged.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use fields::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH, MIN_FIELD_SIZE};
use fields::{FieldId, FieldKind, Position};

use crate::consts::DRAG_THRESHOLD_PX;
use crate::hit::ResizeAnchor;
use crate::viewport::{Point, Viewport};

/// Toolbar mode as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Select,
    AddText,
    AddImage,
    AddRichText,
}

impl EditorMode {
    /// The kind of field a click creates in this mode.
    #[must_use]
    pub fn creates(self) -> Option<FieldKind> {
        match self {
            Self::Select => None,
            Self::AddText => Some(FieldKind::Text),
            Self::AddImage => Some(FieldKind::SignatureImage),
            Self::AddRichText => Some(FieldKind::CompositeText),
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// What a drag session manipulates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragMode {
    /// Moving the whole field. `offset` is the pointer position relative to
    /// the field's top-left at press time, in canvas units.
    Move { offset: Point },
    /// Resizing from one of the eight handles.
    Resize { anchor: ResizeAnchor },
}

/// An in-progress press on a field.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub field_id: FieldId,
    pub mode: DragMode,
    /// Screen position at pointer-down.
    pub origin: Point,
    /// Latest screen position.
    pub current: Point,
    pub crossed_threshold: bool,
    /// Field rectangle at pointer-down.
    pub start: Position,
}

impl DragSession {
    #[must_use]
    pub fn new(field_id: FieldId, mode: DragMode, origin: Point, start: Position) -> Self {
        Self { field_id, mode, origin, current: origin, crossed_threshold: false, start }
    }

    /// Record a pointer position. Returns true the first time the press
    /// travels past the drag threshold.
    pub fn track(&mut self, screen: Point) -> bool {
        self.current = screen;
        if self.crossed_threshold {
            return false;
        }
        let dx = (screen.x - self.origin.x).abs();
        let dy = (screen.y - self.origin.y).abs();
        if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
            self.crossed_threshold = true;
            return true;
        }
        false
    }

    /// The field rectangle implied by the current pointer position.
    #[must_use]
    pub fn proposed(&self, viewport: &Viewport) -> Position {
        match self.mode {
            DragMode::Move { offset } => {
                move_rect(self.start, viewport.screen_to_canvas(self.current), offset)
            }
            DragMode::Resize { anchor } => {
                let dx = viewport.screen_dist_to_canvas(self.current.x - self.origin.x);
                let dy = viewport.screen_dist_to_canvas(self.current.y - self.origin.y);
                resize_rect(self.start, anchor, dx, dy)
            }
        }
    }
}

/// Gesture state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// Select mode with nothing pressed.
    #[default]
    Idle,
    /// An add mode is armed; the next canvas click creates a field.
    Adding(FieldKind),
    /// The pointer is down on a field.
    Dragging(DragSession),
}

impl InputState {
    #[must_use]
    pub fn mode(&self) -> EditorMode {
        match self {
            Self::Idle | Self::Dragging(_) => EditorMode::Select,
            Self::Adding(FieldKind::Text) => EditorMode::AddText,
            Self::Adding(FieldKind::SignatureImage | FieldKind::PhotoImage) => EditorMode::AddImage,
            Self::Adding(FieldKind::CompositeText) => EditorMode::AddRichText,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Dragging(session) => Some(session),
            _ => None,
        }
    }
}

/// Place `start` so the pointer keeps its grab offset, clamped and rounded.
#[must_use]
pub fn move_rect(start: Position, pointer: Point, offset: Point) -> Position {
    let mut next = start;
    next.x = pointer.x - offset.x;
    next.y = pointer.y - offset.y;
    next.round();
    next.clamp_to_canvas();
    next
}

/// Resize `start` by a canvas-space pointer delta on the edges `anchor` owns.
///
/// East/south edges grow or shrink freely down to the floor. West/north
/// edges move the origin too; when the proposal would cross the floor the
/// opposite edge stays put and the size pins at the floor. The result is
/// kept inside the canvas without moving the fixed edges, then rounded.
#[must_use]
pub fn resize_rect(start: Position, anchor: ResizeAnchor, dx: f64, dy: f64) -> Position {
    let mut next = start;

    if anchor.moves_east() {
        next.width = (start.width + dx).max(MIN_FIELD_SIZE);
        next.width = next.width.min(CANVAS_WIDTH - next.x);
    }
    if anchor.moves_west() {
        let right = start.right();
        let proposed = start.width - dx;
        let x = if proposed >= MIN_FIELD_SIZE { start.x + dx } else { right - MIN_FIELD_SIZE };
        next.x = x.max(0.0);
        next.width = right - next.x;
    }
    if anchor.moves_south() {
        next.height = (start.height + dy).max(MIN_FIELD_SIZE);
        next.height = next.height.min(CANVAS_HEIGHT - next.y);
    }
    if anchor.moves_north() {
        let bottom = start.bottom();
        let proposed = start.height - dy;
        let y = if proposed >= MIN_FIELD_SIZE { start.y + dy } else { bottom - MIN_FIELD_SIZE };
        next.y = y.max(0.0);
        next.height = bottom - next.y;
    }

    next.round();
    next.clamp_to_canvas();
    next
}
