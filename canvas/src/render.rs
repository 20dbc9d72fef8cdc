//! Rendering: draws the field overlay for the current page to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! The PDF page itself is drawn underneath by the host; this layer only paints
//! field boxes, their labels, and selection UI, in canvas units scaled by zoom.
//! It does not mutate any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use fields::FieldKind;
use fields::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH};
use fields::layout::wrap_lines;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::HANDLE_SIZE_PX;
use crate::doc::Field;
use crate::engine::EngineCore;
use crate::hit::ResizeAnchor;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// Inner padding between a field's border and its label, in canvas units.
const LABEL_PAD: f64 = 4.0;

const SELECT_COLOR: &str = "#1E90FF";
const WARNING_COLOR: &str = "#E0A100";
const JUST_ADDED_COLOR: &str = "#2EAF5B";

/// Draw every visible field on the current page plus selection UI.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, core: &EngineCore) -> Result<(), JsValue> {
    let zoom = core.viewport.zoom;
    let scale = zoom * core.dpr;

    // Layer 1: clear and scale canvas units to device pixels.
    ctx.set_transform(core.dpr, 0.0, 0.0, core.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, core.viewport_width, core.viewport_height);
    ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0)?;

    // Layer 2: fields in draw order.
    for field in core.store.on_page(core.page) {
        draw_field(ctx, field, core.has_height_warning(&field.id), zoom)?;
    }

    // Layer 3: selection UI on top.
    if let Some(field) = core.store.iter().find(|f| f.is_selected && f.position.page == core.page) {
        draw_selection(ctx, field, zoom)?;
    }

    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    Ok(())
}

// =============================================================
// Fields
// =============================================================

fn draw_field(ctx: &CanvasRenderingContext2d, field: &Field, warn: bool, zoom: f64) -> Result<(), JsValue> {
    let p = field.position;
    ctx.save();
    ctx.set_global_alpha(if field.is_removing() { 0.3 } else { 1.0 });

    let fill = match field.kind() {
        FieldKind::Text => "rgba(30, 144, 255, 0.10)",
        FieldKind::SignatureImage | FieldKind::PhotoImage => "rgba(46, 175, 91, 0.12)",
        FieldKind::CompositeText => "rgba(142, 68, 173, 0.10)",
    };
    ctx.set_fill_style_str(if warn { "rgba(224, 161, 0, 0.18)" } else { fill });
    ctx.fill_rect(p.x, p.y, p.width, p.height);

    let stroke = if field.just_added() {
        JUST_ADDED_COLOR
    } else if warn {
        WARNING_COLOR
    } else {
        "rgba(30, 144, 255, 0.6)"
    };
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(if field.just_added() { 2.0 / zoom } else { 1.0 / zoom });
    if field.is_dragging {
        set_dash(ctx, SELECTION_DASH_PX / zoom)?;
    }
    ctx.stroke_rect(p.x, p.y, p.width, p.height);
    ctx.set_line_dash(&js_sys::Array::new())?;

    draw_label(ctx, field)?;
    ctx.restore();
    Ok(())
}

fn draw_label(ctx: &CanvasRenderingContext2d, field: &Field) -> Result<(), JsValue> {
    let p = field.position;
    let font_size = field.style.font_size.clamp(6.0, 48.0);
    let weight = if field.style.bold { "bold " } else { "" };
    let slant = if field.style.italic { "italic " } else { "" };
    ctx.set_font(&format!("{slant}{weight}{font_size:.0}px sans-serif"));
    ctx.set_fill_style_str(&field.style.color);
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");

    let max_w = (p.width - LABEL_PAD * 2.0).max(0.0);
    match field.kind() {
        FieldKind::CompositeText => {
            let template = field.composite.as_ref().map_or("", |c| c.template.as_str());
            let source = if template.trim().is_empty() { field.name.as_str() } else { template };
            let line_height = font_size * 1.2;
            let lines = wrap_lines(source, max_w, |s| measured_text_width(ctx, s));
            let mut y = p.y + LABEL_PAD;
            for line in lines {
                if y + line_height > p.bottom() {
                    break;
                }
                ctx.fill_text(&line, p.x + LABEL_PAD, y)?;
                y += line_height;
            }
        }
        FieldKind::Text | FieldKind::SignatureImage | FieldKind::PhotoImage => {
            let label = match &field.variable {
                Some(var) => format!("{} {{{{{var}}}}}", field.name),
                None => field.name.clone(),
            };
            let fitted = fit_text_with_ellipsis(ctx, &label, max_w);
            ctx.fill_text(&fitted, p.x + LABEL_PAD, p.y + LABEL_PAD)?;
        }
    }
    Ok(())
}

fn fit_text_with_ellipsis(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if measured_text_width(ctx, trimmed) <= max_w {
        return trimmed.to_owned();
    }

    let ellipsis = "...";
    let mut chars: Vec<char> = trimmed.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}{}", chars.iter().collect::<String>().trim_end(), ellipsis);
        if measured_text_width(ctx, &candidate) <= max_w {
            return candidate;
        }
    }
    ellipsis.to_owned()
}

fn measured_text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => f64::INFINITY,
    }
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection(ctx: &CanvasRenderingContext2d, field: &Field, zoom: f64) -> Result<(), JsValue> {
    let p = field.position;
    ctx.save();
    ctx.set_stroke_style_str(SELECT_COLOR);
    ctx.set_line_width(1.0 / zoom);
    set_dash(ctx, SELECTION_DASH_PX / zoom)?;
    ctx.stroke_rect(p.x, p.y, p.width, p.height);
    ctx.set_line_dash(&js_sys::Array::new())?;

    let half = HANDLE_SIZE_PX * 0.5 / zoom;
    ctx.set_fill_style_str("#fff");
    for anchor in ResizeAnchor::ALL {
        let c = anchor.point_on(&p);
        // Keep handles on the visible canvas even when the field touches an edge.
        let x = c.x.clamp(half, CANVAS_WIDTH - half);
        let y = c.y.clamp(half, CANVAS_HEIGHT - half);
        ctx.fill_rect(x - half, y - half, half * 2.0, half * 2.0);
        ctx.stroke_rect(x - half, y - half, half * 2.0, half * 2.0);
    }
    ctx.restore();
    Ok(())
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash.into());
    dash_array.push(&dash.into());
    ctx.set_line_dash(&dash_array)
}
