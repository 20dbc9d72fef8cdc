use std::collections::HashSet;

use fields::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH};
use fields::layout::estimate_height;
use fields::template::Template;
use fields::{CompositeContent, FieldId, FieldKind, FieldRecord, FieldType, Position, Style};
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::{DUPLICATE_OFFSET, DELETE_FADE_MS, HEIGHT_ADJUST_PADDING, JUST_ADDED_MS};
use crate::doc::{Field, FieldPatch, FieldStore, new_temp_id};
use crate::hit::{HitPart, hit_test};
use crate::input::{Button, DragMode, DragSession, EditorMode, InputState};
use crate::net::ApiError;
use crate::persist::{ExitDecision, ExitTarget, SaveBridge, SaveKind, SaveRequest, SaveResolution};
use crate::render;
use crate::viewport::{Point, Viewport};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A message for the operator. Blocking notices must be dismissed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub blocking: bool,
}

impl Notice {
    fn info(message: &str) -> Self {
        Self { level: NoticeLevel::Info, message: message.to_owned(), blocking: false }
    }
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FieldCreated(Field),
    FieldUpdated { id: FieldId, patch: FieldPatch },
    FieldDeleted { id: FieldId },
    /// A temporary id was replaced by the server-issued one.
    FieldIdAssigned { old: FieldId, new: FieldId },
    SelectionChanged(Option<FieldId>),
    /// Start routing window-level pointer move/up events to the engine.
    AttachPointerListeners,
    /// Stop routing window-level pointer events.
    DetachPointerListeners,
    Save(SaveRequest),
    Notify(Notice),
    /// Ask the operator to discard unsaved changes or keep editing.
    ConfirmExit,
    Exit(ExitTarget),
    PageChanged(u32),
    ZoomChanged(f64),
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// Every method that takes `now` expects milliseconds from one monotonic clock.
pub struct EngineCore {
    pub store: FieldStore,
    pub viewport: Viewport,
    pub input: InputState,
    pub bridge: SaveBridge,
    pub template: Option<Template>,
    pub page: u32,
    pub total_pages: u32,
    pub height_warnings: HashSet<FieldId>,
    pub listeners_attached: bool,
    pub cursor: String,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            store: FieldStore::new(),
            viewport: Viewport::default(),
            input: InputState::default(),
            bridge: SaveBridge::default(),
            template: None,
            page: 1,
            total_pages: 1,
            height_warnings: HashSet::new(),
            listeners_attached: false,
            cursor: "default".to_owned(),
            viewport_width: CANVAS_WIDTH,
            viewport_height: CANVAS_HEIGHT,
            dpr: 1.0,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Hydrate the editor from a fetched template, repairing its fields.
    pub fn load_template(&mut self, mut template: Template) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.input = InputState::Idle;

        let report = self.store.load(std::mem::take(&mut template.fields));
        if !report.is_clean() {
            warn!(
                template_id = template.id,
                missing_ids = report.missing_ids,
                missing_positions = report.missing_positions,
                duplicate_ids = report.duplicate_ids.len(),
                "template fields repaired on load"
            );
        }

        self.bridge.reset();
        self.page = 1;
        self.height_warnings.clear();
        let ids: Vec<FieldId> = self.store.iter().map(|f| f.id.clone()).collect();
        for id in &ids {
            self.check_height(id);
        }
        debug!(template_id = template.id, fields = self.store.len(), "template loaded");
        self.template = Some(template);

        actions.push(Action::PageChanged(self.page));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Mode ---

    /// Switch toolbar mode. Any gesture in progress is cancelled.
    pub fn set_mode(&mut self, mode: EditorMode) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.input = match mode.creates() {
            Some(kind) => InputState::Adding(kind),
            None => InputState::Idle,
        };
        let cursor = if mode == EditorMode::Select { "default" } else { "crosshair" };
        actions.extend(self.set_cursor(cursor));
        actions
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, now: f64) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let canvas_pt = self.viewport.screen_to_canvas(screen_pt);

        match self.input {
            InputState::Adding(kind) => return self.create_field(kind, canvas_pt, now),
            InputState::Dragging(_) => return Vec::new(),
            InputState::Idle => {}
        }

        let mut actions = Vec::new();
        let Some(hit) = hit_test(canvas_pt, &self.store, &self.viewport, self.page) else {
            if self.store.select(None) {
                actions.push(Action::SelectionChanged(None));
                actions.push(Action::RenderNeeded);
            }
            return actions;
        };

        if self.store.select(Some(&hit.field_id)) {
            actions.push(Action::SelectionChanged(Some(hit.field_id.clone())));
        }
        let Some(start) = self.store.get(&hit.field_id).map(|f| f.position) else {
            return actions;
        };

        let (mode, cursor) = match hit.part {
            HitPart::Body => {
                let offset = Point::new(canvas_pt.x - start.x, canvas_pt.y - start.y);
                (DragMode::Move { offset }, "move")
            }
            HitPart::ResizeHandle(anchor) => (DragMode::Resize { anchor }, anchor.cursor()),
        };
        self.input = InputState::Dragging(DragSession::new(hit.field_id, mode, screen_pt, start));

        actions.extend(self.attach_listeners());
        actions.extend(self.set_cursor(cursor));
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let InputState::Dragging(session) = &mut self.input else {
            return self.hover(screen_pt);
        };

        let crossed_now = session.track(screen_pt);
        if !session.crossed_threshold {
            return Vec::new();
        }
        let id = session.field_id.clone();
        let next = session.proposed(&self.viewport);

        let mut actions = Vec::new();
        let Some(field) = self.store.get_mut(&id) else {
            return actions;
        };
        if crossed_now {
            field.is_dragging = true;
        }
        if field.position != next {
            field.position = next;
            actions.push(Action::FieldUpdated { id, patch: FieldPatch::position(next) });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, now: f64) -> Vec<Action> {
        if !matches!(self.input, InputState::Dragging(_)) {
            return Vec::new();
        }
        let InputState::Dragging(mut session) = std::mem::take(&mut self.input) else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        session.track(screen_pt);
        if session.crossed_threshold {
            let next = session.proposed(&self.viewport);
            if let Some(field) = self.store.get_mut(&session.field_id) {
                if field.position != next {
                    field.position = next;
                    actions.push(Action::FieldUpdated {
                        id: session.field_id.clone(),
                        patch: FieldPatch::position(next),
                    });
                }
            }
            self.bridge.mark_dirty(now);
            self.check_height(&session.field_id);
        }
        if let Some(field) = self.store.get_mut(&session.field_id) {
            field.is_dragging = false;
        }

        actions.extend(self.detach_listeners());
        actions.extend(self.set_cursor("default"));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Abort any drag in progress, restoring the field's starting rectangle.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if !matches!(self.input, InputState::Dragging(_)) {
            return actions;
        }
        let InputState::Dragging(session) = std::mem::take(&mut self.input) else {
            return actions;
        };
        if let Some(field) = self.store.get_mut(&session.field_id) {
            field.is_dragging = false;
            if field.position != session.start {
                field.position = session.start;
                actions.push(Action::FieldUpdated {
                    id: session.field_id.clone(),
                    patch: FieldPatch::position(session.start),
                });
            }
        }
        actions.extend(self.detach_listeners());
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_key_down(&mut self, key: &str, now: f64) -> Vec<Action> {
        match key {
            "Delete" | "Backspace" => match self.store.selected_id().cloned() {
                Some(id) => self.delete_field(&id, now),
                None => Vec::new(),
            },
            "Escape" => {
                let mut actions = self.cancel_gesture();
                self.input = InputState::Idle;
                actions.extend(self.set_cursor("default"));
                if self.store.select(None) {
                    actions.push(Action::SelectionChanged(None));
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
            _ => Vec::new(),
        }
    }

    fn hover(&mut self, screen_pt: Point) -> Vec<Action> {
        let cursor = match &self.input {
            InputState::Adding(_) => "crosshair",
            _ => {
                let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
                match hit_test(canvas_pt, &self.store, &self.viewport, self.page) {
                    Some(hit) => match hit.part {
                        HitPart::Body => "move",
                        HitPart::ResizeHandle(anchor) => anchor.cursor(),
                    },
                    None => "default",
                }
            }
        };
        self.set_cursor(cursor)
    }

    fn set_cursor(&mut self, cursor: &str) -> Vec<Action> {
        if self.cursor == cursor {
            return Vec::new();
        }
        cursor.clone_into(&mut self.cursor);
        vec![Action::SetCursor(cursor.to_owned())]
    }

    fn attach_listeners(&mut self) -> Vec<Action> {
        if self.listeners_attached {
            return Vec::new();
        }
        self.listeners_attached = true;
        vec![Action::AttachPointerListeners]
    }

    fn detach_listeners(&mut self) -> Vec<Action> {
        if !self.listeners_attached {
            return Vec::new();
        }
        self.listeners_attached = false;
        vec![Action::DetachPointerListeners]
    }

    // --- Field operations ---

    fn create_field(&mut self, kind: FieldKind, at: Point, now: f64) -> Vec<Action> {
        let order = i64::try_from(self.store.len()).unwrap_or(i64::MAX - 1) + 1;
        let mut field = blank_field(kind, order);
        field.position.x = at.x.round();
        field.position.y = at.y.round();
        field.position.page = self.page;
        field.position.clamp_to_canvas();
        field.just_added_until = Some(now + JUST_ADDED_MS);

        let id = field.id.clone();
        if !self.store.insert(field) {
            warn!(id = %id, "generated id already in use; field not created");
            return Vec::new();
        }
        self.store.select(Some(&id));
        self.input = InputState::Idle;
        self.check_height(&id);
        self.bridge.mark_dirty(now);
        debug!(id = %id, ?kind, "field created");

        let mut actions = Vec::new();
        if let Some(field) = self.store.get(&id) {
            actions.push(Action::FieldCreated(field.clone()));
        }
        actions.push(Action::SelectionChanged(Some(id)));
        actions.extend(self.set_cursor("default"));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Fade a field out and remove it once the fade completes (see [`EngineCore::tick`]).
    pub fn delete_field(&mut self, id: &FieldId, now: f64) -> Vec<Action> {
        if self.store.get(id).is_none_or(Field::is_removing) {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if self.input.session().is_some_and(|s| &s.field_id == id) {
            actions.extend(self.cancel_gesture());
        }
        if let Some(field) = self.store.get_mut(id) {
            field.removing_until = Some(now + DELETE_FADE_MS);
        }
        if self.store.selected_id() == Some(id) {
            self.store.select(None);
            actions.push(Action::SelectionChanged(None));
        }
        self.height_warnings.remove(id);
        self.bridge.mark_dirty(now);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Copy a field with a fresh id, offset down and right, and select it.
    pub fn duplicate_field(&mut self, id: &FieldId, now: f64) -> Vec<Action> {
        let Some(source) = self.store.get(id).filter(|f| !f.is_removing()) else {
            return Vec::new();
        };
        let mut copy = source.clone();
        copy.id = new_temp_id();
        while self.store.contains(&copy.id) {
            copy.id = new_temp_id();
        }
        let pos = &mut copy.position;
        pos.x = (pos.x + DUPLICATE_OFFSET).min(CANVAS_WIDTH - pos.width);
        pos.y = (pos.y + DUPLICATE_OFFSET).min(CANVAS_HEIGHT - pos.height);
        pos.clamp_to_canvas();
        copy.is_selected = false;
        copy.is_dragging = false;
        copy.removing_until = None;
        copy.just_added_until = Some(now + JUST_ADDED_MS);

        let new_id = copy.id.clone();
        self.store.insert(copy);
        self.store.select(Some(&new_id));
        self.check_height(&new_id);
        self.bridge.mark_dirty(now);

        let mut actions = Vec::new();
        if let Some(field) = self.store.get(&new_id) {
            actions.push(Action::FieldCreated(field.clone()));
        }
        actions.push(Action::SelectionChanged(Some(new_id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply an edit from the properties panel.
    pub fn update_field(&mut self, id: &FieldId, mut patch: FieldPatch, now: f64) -> Vec<Action> {
        if !self.store.apply_patch(id, &patch) {
            return Vec::new();
        }
        if patch.position.is_some() {
            patch.position = self.store.get(id).map(|f| f.position);
        }
        self.bridge.mark_dirty(now);
        self.check_height(id);
        vec![Action::FieldUpdated { id: id.clone(), patch }, Action::RenderNeeded]
    }

    /// Grow (or shrink) a text field to fit its estimated text height.
    pub fn adjust_height(&mut self, id: &FieldId, now: f64) -> Vec<Action> {
        let Some(field) = self.store.get(id) else {
            return Vec::new();
        };
        let Some(text) = field.sample_text() else {
            return Vec::new();
        };
        let estimate = estimate_height(text, field.position.width, field.style.font_size);
        let mut position = field.position;
        position.height = estimate.ceil() + HEIGHT_ADJUST_PADDING;
        self.update_field(id, FieldPatch::position(position), now)
    }

    fn check_height(&mut self, id: &FieldId) {
        let too_short = self.store.get(id).is_some_and(|f| {
            f.sample_text()
                .is_some_and(|text| estimate_height(text, f.position.width, f.style.font_size) > f.position.height)
        });
        if too_short {
            self.height_warnings.insert(id.clone());
        } else {
            self.height_warnings.remove(id);
        }
    }

    // --- Pages ---

    pub fn set_total_pages(&mut self, total: u32) -> Vec<Action> {
        self.total_pages = total.max(1);
        if self.page > self.total_pages {
            return self.set_page(self.total_pages);
        }
        Vec::new()
    }

    /// Show `page` (clamped). Deselects a selected field that lives elsewhere.
    pub fn set_page(&mut self, page: u32) -> Vec<Action> {
        let page = page.clamp(1, self.total_pages);
        if page == self.page {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        self.page = page;
        let off_page = self.store.selected_id().and_then(|id| self.store.get(id)).is_some_and(|f| f.position.page != page);
        if off_page {
            self.store.select(None);
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::PageChanged(page));
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn next_page(&mut self) -> Vec<Action> {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Vec<Action> {
        self.set_page(self.page.saturating_sub(1))
    }

    // --- Zoom / viewport ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        let changed = self.viewport.zoom_in();
        self.zoom_actions(changed)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        let changed = self.viewport.zoom_out();
        self.zoom_actions(changed)
    }

    pub fn reset_zoom(&mut self) -> Vec<Action> {
        let changed = self.viewport.reset_zoom();
        self.zoom_actions(changed)
    }

    /// Fit the canvas to a window `available_px` wide unless zoom was set manually.
    pub fn fit_to_width(&mut self, available_px: f64) -> Vec<Action> {
        let changed = self.viewport.fit_to_width(available_px);
        self.zoom_actions(changed)
    }

    fn zoom_actions(&self, changed: bool) -> Vec<Action> {
        if changed { vec![Action::ZoomChanged(self.viewport.zoom), Action::RenderNeeded] } else { Vec::new() }
    }

    /// Record where the canvas element sits on screen (its bounding rect).
    pub fn set_canvas_origin(&mut self, x: f64, y: f64) {
        self.viewport.set_origin(x, y);
    }

    // --- Time ---

    /// Advance timers: just-added highlight, delete fade, autosave.
    pub fn tick(&mut self, now: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut redraw = false;
        let mut finished = Vec::new();

        for field in self.store.iter_mut() {
            if field.just_added_until.is_some_and(|t| now >= t) {
                field.just_added_until = None;
                redraw = true;
            }
            if field.removing_until.is_some_and(|t| now >= t) {
                finished.push(field.id.clone());
            }
        }
        for id in finished {
            self.store.remove(&id);
            actions.push(Action::FieldDeleted { id });
            redraw = true;
        }

        if let Some(request) = self.bridge.poll(now, &self.store, self.template.as_ref()) {
            actions.push(Action::Save(request));
        }
        if redraw {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Persistence ---

    /// Operator pressed save.
    pub fn request_save(&mut self) -> Vec<Action> {
        let Some(template) = &self.template else {
            return vec![Action::Notify(Notice::info("Nenhum template carregado."))];
        };
        match self.bridge.begin_save(SaveKind::Manual, &self.store, template) {
            Some(request) => vec![Action::Save(request)],
            None if self.bridge.is_saving() => vec![Action::Notify(Notice::info("Salvamento em andamento."))],
            None => vec![Action::Notify(Notice {
                level: NoticeLevel::Error,
                message: "Não foi possível preparar o salvamento.".to_owned(),
                blocking: true,
            })],
        }
    }

    /// Feed back the outcome of a [`SaveRequest`].
    pub fn on_save_result(&mut self, ticket: u64, result: Result<Template, ApiError>, now: f64) -> Vec<Action> {
        let resolution = self.bridge.complete(ticket, result.as_ref(), &mut self.store, now);
        let mut actions = Vec::new();

        match resolution {
            SaveResolution::Saved { kind, adopted, .. } => {
                if let Ok(mut saved) = result {
                    saved.fields.clear();
                    self.template = Some(saved);
                }
                for (old, new) in adopted {
                    if self.height_warnings.remove(&old) {
                        self.height_warnings.insert(new.clone());
                    }
                    actions.push(Action::FieldIdAssigned { old, new });
                }
                if kind == SaveKind::Manual {
                    actions.push(Action::Notify(Notice {
                        level: NoticeLevel::Success,
                        message: "Template salvo com sucesso.".to_owned(),
                        blocking: false,
                    }));
                }
            }
            SaveResolution::ManualFailed(message) => {
                actions.push(Action::Notify(Notice { level: NoticeLevel::Error, message, blocking: true }));
            }
            SaveResolution::AutosaveFailed | SaveResolution::Stale => {}
        }
        actions
    }

    /// Leaving the editor (link, back, unload).
    pub fn request_exit(&mut self, target: ExitTarget) -> Vec<Action> {
        match self.bridge.request_exit(target) {
            ExitDecision::Proceed(target) => vec![Action::Exit(target)],
            ExitDecision::Confirm => vec![Action::ConfirmExit],
        }
    }

    /// Answer to [`Action::ConfirmExit`].
    pub fn resolve_exit(&mut self, discard: bool) -> Vec<Action> {
        match self.bridge.resolve_exit(discard) {
            Some(target) => vec![Action::Exit(target)],
            None => Vec::new(),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<&FieldId> {
        self.store.selected_id()
    }

    #[must_use]
    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.store.get(id)
    }

    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.input.mode()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.bridge.is_dirty()
    }

    #[must_use]
    pub fn has_height_warning(&self, id: &FieldId) -> bool {
        self.height_warnings.contains(id)
    }

    /// Persistable field records, e.g. for a preview render of unsaved edits.
    #[must_use]
    pub fn records(&self) -> Vec<FieldRecord> {
        self.store.to_records()
    }
}

/// A new field of `kind` with the editor's defaults, placed at the origin.
fn blank_field(kind: FieldKind, order: i64) -> Field {
    let (name, variable, width, height) = match kind {
        FieldKind::Text => ("Nome Completo", Some("cliente.nome_completo"), 200.0, 20.0),
        FieldKind::SignatureImage => ("Assinatura", Some("assinatura.assinatura_base64"), 120.0, 60.0),
        FieldKind::PhotoImage => ("Foto", Some("assinatura.foto_base64"), 120.0, 60.0),
        FieldKind::CompositeText => ("Texto Composto", None, 400.0, 80.0),
    };
    let record = FieldRecord {
        name: name.to_owned(),
        variable: variable.map(str::to_owned),
        field_type: FieldType::from(kind),
        style: Some(Style::default()),
        required: true,
        order,
        composite: (kind == FieldKind::CompositeText).then(CompositeContent::default),
        ..FieldRecord::default()
    };
    let position = Position { x: 0.0, y: 0.0, width, height, page: 1 };
    Field::from_record(record, new_temp_id(), position)
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EngineCore::new() }
    }

    pub fn load_template(&mut self, template: Template) -> Vec<Action> {
        self.core.load_template(template)
    }

    pub fn set_mode(&mut self, mode: EditorMode) -> Vec<Action> {
        self.core.set_mode(mode)
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio, resizing the
    /// backing store of the canvas to match.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.viewport_width = width_css;
        self.core.viewport_height = height_css;
        self.core.dpr = dpr;
        self.canvas.set_width(device_px(width_css * dpr));
        self.canvas.set_height(device_px(height_css * dpr));
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, now: f64) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, now)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, now: f64) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, now)
    }

    pub fn on_key_down(&mut self, key: &str, now: f64) -> Vec<Action> {
        self.core.on_key_down(key, now)
    }

    pub fn tick(&mut self, now: f64) -> Vec<Action> {
        self.core.tick(now)
    }

    // --- Render ---

    /// Draw the field overlay for the current page.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("2d context has unexpected type"))?;
        render::draw(&ctx, &self.core)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_px(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 { v.round().min(f64::from(u32::MAX)) as u32 } else { 0 }
}
