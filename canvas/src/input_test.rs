#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

fn rect(x: f64, y: f64, width: f64, height: f64) -> Position {
    Position { x, y, width, height, page: 1 }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn inside_canvas(p: &Position) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.right() <= CANVAS_WIDTH && p.bottom() <= CANVAS_HEIGHT
}

// =============================================================
// Modes
// =============================================================

#[test]
fn mode_default_is_select() {
    assert_eq!(EditorMode::default(), EditorMode::Select);
    assert_eq!(InputState::default().mode(), EditorMode::Select);
}

#[test]
fn add_modes_map_to_kinds_and_back() {
    for mode in [EditorMode::AddText, EditorMode::AddImage, EditorMode::AddRichText] {
        let kind = mode.creates().unwrap();
        assert_eq!(InputState::Adding(kind).mode(), mode);
    }
    assert_eq!(EditorMode::Select.creates(), None);
}

#[test]
fn dragging_reports_select_mode() {
    let session = DragSession::new(
        FieldId::new("1"),
        DragMode::Move { offset: pt(0.0, 0.0) },
        pt(0.0, 0.0),
        rect(0.0, 0.0, 50.0, 50.0),
    );
    let state = InputState::Dragging(session.clone());
    assert_eq!(state.mode(), EditorMode::Select);
    assert_eq!(state.session(), Some(&session));
    assert_eq!(InputState::Idle.session(), None);
}

// =============================================================
// Threshold
// =============================================================

#[test]
fn threshold_requires_more_than_three_pixels() {
    let mut s = DragSession::new(
        FieldId::new("1"),
        DragMode::Move { offset: pt(0.0, 0.0) },
        pt(100.0, 100.0),
        rect(100.0, 100.0, 50.0, 50.0),
    );
    assert!(!s.track(pt(103.0, 97.0)));
    assert!(!s.crossed_threshold);
    assert!(s.track(pt(103.5, 100.0)));
    assert!(s.crossed_threshold);
    // Only reported once, and moving back does not un-cross it.
    assert!(!s.track(pt(100.0, 100.0)));
    assert!(s.crossed_threshold);
}

// =============================================================
// Move
// =============================================================

#[test]
fn move_keeps_grab_offset() {
    let next = move_rect(rect(100.0, 100.0, 50.0, 20.0), pt(210.0, 160.0), pt(10.0, 5.0));
    assert_eq!((next.x, next.y), (200.0, 155.0));
    assert_eq!((next.width, next.height), (50.0, 20.0));
}

#[test]
fn move_is_clamped_and_rounded() {
    let next = move_rect(rect(100.0, 100.0, 50.0, 20.0), pt(900.4, -40.0), pt(0.0, 0.0));
    assert_eq!(next.x, 490.0);
    assert_eq!(next.y, 0.0);
    let next = move_rect(rect(100.0, 100.0, 50.0, 20.0), pt(10.6, 20.2), pt(0.0, 0.0));
    assert_eq!((next.x, next.y), (11.0, 20.0));
}

#[test]
fn session_move_uses_zoom() {
    let vp = Viewport { zoom: 2.0, ..Viewport::default() };
    let start = rect(100.0, 100.0, 50.0, 20.0);
    // Grabbed at canvas (110, 105) = screen (220, 210).
    let mut s = DragSession::new(FieldId::new("1"), DragMode::Move { offset: pt(10.0, 5.0) }, pt(220.0, 210.0), start);
    s.track(pt(240.0, 250.0));
    let next = s.proposed(&vp);
    assert_eq!((next.x, next.y), (110.0, 120.0));
}

// =============================================================
// Resize
// =============================================================

#[test]
fn east_and_south_grow_from_fixed_origin() {
    let next = resize_rect(rect(100.0, 100.0, 50.0, 50.0), ResizeAnchor::Se, 30.0, 10.0);
    assert_eq!(next, rect(100.0, 100.0, 80.0, 60.0));
}

#[test]
fn east_shrink_stops_at_floor() {
    let next = resize_rect(rect(100.0, 100.0, 50.0, 50.0), ResizeAnchor::E, -200.0, 0.0);
    assert_eq!(next.width, MIN_FIELD_SIZE);
    assert_eq!(next.x, 100.0);
}

#[test]
fn west_shrink_below_floor_pins_width_and_right_edge() {
    let start = rect(100.0, 100.0, 40.0, 40.0);
    for dx in [25.0, 30.0, 100.0, 400.0] {
        let next = resize_rect(start, ResizeAnchor::W, dx, 0.0);
        assert_eq!(next.width, 20.0, "dx {dx}");
        assert_eq!(next.x, 120.0, "dx {dx}");
        assert_eq!(next.right(), start.right());
    }
}

#[test]
fn west_grow_moves_origin_left() {
    let next = resize_rect(rect(100.0, 100.0, 40.0, 40.0), ResizeAnchor::W, -30.0, 0.0);
    assert_eq!((next.x, next.width), (70.0, 70.0));
}

#[test]
fn west_past_canvas_edge_keeps_right_edge() {
    let next = resize_rect(rect(10.0, 100.0, 40.0, 40.0), ResizeAnchor::W, -50.0, 0.0);
    assert_eq!((next.x, next.width), (0.0, 50.0));
}

#[test]
fn north_shrink_below_floor_pins_bottom() {
    let next = resize_rect(rect(100.0, 100.0, 40.0, 40.0), ResizeAnchor::N, 0.0, 35.0);
    assert_eq!((next.y, next.height), (120.0, 20.0));
}

#[test]
fn east_growth_stops_at_canvas_edge() {
    let next = resize_rect(rect(500.0, 100.0, 30.0, 40.0), ResizeAnchor::E, 200.0, 0.0);
    assert_eq!(next.right(), CANVAS_WIDTH);
    assert_eq!(next.x, 500.0);
}

#[test]
fn resize_never_breaks_floor_or_bounds() {
    let starts = [rect(0.0, 0.0, 20.0, 20.0), rect(100.0, 200.0, 60.0, 40.0), rect(520.0, 745.0, 20.0, 20.0)];
    let deltas = [-800.0, -300.0, -45.5, -19.0, -1.0, 0.0, 0.4, 7.0, 33.3, 250.0, 900.0];
    for start in starts {
        for anchor in ResizeAnchor::ALL {
            for dx in deltas {
                for dy in deltas {
                    let next = resize_rect(start, anchor, dx, dy);
                    assert!(next.width >= MIN_FIELD_SIZE, "{anchor:?} {dx} {dy}: {next:?}");
                    assert!(next.height >= MIN_FIELD_SIZE, "{anchor:?} {dx} {dy}: {next:?}");
                    assert!(inside_canvas(&next), "{anchor:?} {dx} {dy}: {next:?}");
                }
            }
        }
    }
}

#[test]
fn session_resize_scales_delta_by_zoom() {
    let vp = Viewport { zoom: 0.5, ..Viewport::default() };
    let mut s = DragSession::new(
        FieldId::new("1"),
        DragMode::Resize { anchor: ResizeAnchor::E },
        pt(100.0, 100.0),
        rect(100.0, 100.0, 50.0, 50.0),
    );
    s.track(pt(110.0, 100.0));
    assert_eq!(s.proposed(&vp).width, 70.0);
}
