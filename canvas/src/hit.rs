#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use fields::{FieldId, Position};

use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::FieldStore;
use crate::viewport::{Point, Viewport};

/// Which part of a field was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [Self; 8] = [Self::Nw, Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W];

    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }

    /// Handle center on a rectangle, in canvas units.
    #[must_use]
    pub fn point_on(self, pos: &Position) -> Point {
        let cx = pos.x + pos.width * 0.5;
        let cy = pos.y + pos.height * 0.5;
        let x = if self.moves_west() {
            pos.x
        } else if self.moves_east() {
            pos.right()
        } else {
            cx
        };
        let y = if self.moves_north() {
            pos.y
        } else if self.moves_south() {
            pos.bottom()
        } else {
            cy
        };
        Point::new(x, y)
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub field_id: FieldId,
    pub part: HitPart,
}

/// Test which field on `page` (if any) is under `canvas_pt`.
///
/// The selected field's handles win over any body. Bodies are tested
/// topmost first. Fields fading out are ignored.
#[must_use]
pub fn hit_test(canvas_pt: Point, store: &FieldStore, viewport: &Viewport, page: u32) -> Option<Hit> {
    let slop = viewport.screen_dist_to_canvas(HANDLE_RADIUS_PX);

    if let Some(selected) = store.iter().find(|f| f.is_selected && f.position.page == page && !f.is_removing()) {
        for anchor in ResizeAnchor::ALL {
            let handle = anchor.point_on(&selected.position);
            if (canvas_pt.x - handle.x).abs() <= slop && (canvas_pt.y - handle.y).abs() <= slop {
                return Some(Hit { field_id: selected.id.clone(), part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    let fields: Vec<_> = store.on_page(page).filter(|f| !f.is_removing()).collect();
    fields
        .into_iter()
        .rev()
        .find(|f| f.position.contains(canvas_pt.x, canvas_pt.y))
        .map(|f| Hit { field_id: f.id.clone(), part: HitPart::Body })
}
