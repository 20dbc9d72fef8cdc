//! Document model: editor fields and the in-memory field store.
//!
//! A [`Field`] is a [`FieldRecord`] after load repair: it always has an id, a
//! position and a style, plus the transient flags the editor needs for
//! feedback (selection, drag, just-added highlight, delete fade). Transient
//! flags never leave this crate; [`Field::to_record`] strips them along with
//! temporary ids.
//!
//! The store keeps fields in insertion order, which is also draw order.
//! Payloads arrive from an untrusted backend, so [`FieldStore::load`] repairs
//! missing ids and positions and regenerates duplicate ids instead of
//! rejecting the template.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use fields::{CompositeContent, FieldId, FieldKind, FieldRecord, FieldType, Position, Style};
use serde_json::Value;
use tracing::{error, warn};
use uuid::Uuid;

/// Generate a fresh temporary field id.
#[must_use]
pub fn new_temp_id() -> FieldId {
    FieldId::temporary(&Uuid::new_v4().simple().to_string())
}

/// A field as held by the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub variable: Option<String>,
    pub field_type: FieldType,
    pub position: Position,
    pub style: Style,
    pub required: bool,
    pub order: i64,
    pub composite: Option<CompositeContent>,
    pub default_value: Option<String>,
    pub template_id: Option<Value>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,

    pub is_selected: bool,
    pub is_dragging: bool,
    /// Clock time (ms) until which the just-added highlight shows.
    pub just_added_until: Option<f64>,
    /// Clock time (ms) at which a pending delete completes.
    pub removing_until: Option<f64>,
}

impl Field {
    /// Build an editor field from a repaired record.
    #[must_use]
    pub fn from_record(record: FieldRecord, id: FieldId, position: Position) -> Self {
        Self {
            id,
            name: record.name,
            variable: record.variable,
            field_type: record.field_type,
            position,
            style: record.style.unwrap_or_default(),
            required: record.required,
            order: record.order,
            composite: record.composite,
            default_value: record.default_value,
            template_id: record.template_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            is_selected: false,
            is_dragging: false,
            just_added_until: None,
            removing_until: None,
        }
    }

    /// Persistable form: transient flags dropped, temporary id removed.
    #[must_use]
    pub fn to_record(&self) -> FieldRecord {
        FieldRecord {
            id: (!self.id.is_temporary()).then(|| self.id.clone()),
            template_id: self.template_id.clone(),
            name: self.name.clone(),
            variable: self.variable.clone(),
            field_type: self.field_type.clone(),
            position: Some(self.position),
            style: Some(self.style.clone()),
            required: self.required,
            order: self.order,
            composite: self.composite.clone(),
            default_value: self.default_value.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.field_type.kind()
    }

    #[must_use]
    pub fn is_removing(&self) -> bool {
        self.removing_until.is_some()
    }

    #[must_use]
    pub fn just_added(&self) -> bool {
        self.just_added_until.is_some()
    }

    /// Text the height heuristic measures. Only composite fields have text
    /// known at edit time; plain text fields draw a value resolved later.
    #[must_use]
    pub fn sample_text(&self) -> Option<&str> {
        match self.kind() {
            FieldKind::CompositeText => {
                self.composite.as_ref().map(|c| c.template.as_str()).filter(|t| !t.trim().is_empty())
            }
            FieldKind::Text | FieldKind::SignatureImage | FieldKind::PhotoImage => None,
        }
    }
}

/// Sparse update for a field. Only present values are applied.
///
/// The doubled `Option`s distinguish "leave alone" from "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub name: Option<String>,
    pub variable: Option<Option<String>>,
    pub field_type: Option<FieldType>,
    pub position: Option<Position>,
    pub style: Option<Style>,
    pub required: Option<bool>,
    pub order: Option<i64>,
    pub composite: Option<Option<CompositeContent>>,
    pub default_value: Option<Option<String>>,
}

impl FieldPatch {
    #[must_use]
    pub fn position(position: Position) -> Self {
        Self { position: Some(position), ..Self::default() }
    }
}

/// What [`FieldStore::load`] had to repair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub missing_ids: usize,
    pub missing_positions: usize,
    /// Ids that appeared more than once; every later occurrence was renamed.
    pub duplicate_ids: Vec<FieldId>,
}

impl LoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing_ids == 0 && self.missing_positions == 0 && self.duplicate_ids.is_empty()
    }
}

/// Ordered in-memory store of editor fields.
#[derive(Debug, Default)]
pub struct FieldStore {
    fields: Vec<Field>,
}

impl FieldStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `records`, repairing structural defects.
    pub fn load(&mut self, records: Vec<FieldRecord>) -> LoadReport {
        let mut report = LoadReport::default();
        self.fields.clear();

        for record in records {
            let id = match record.id.clone() {
                Some(id) if !id.as_str().trim().is_empty() => id,
                _ => {
                    report.missing_ids += 1;
                    new_temp_id()
                }
            };
            let mut position = record.position.unwrap_or_else(|| {
                report.missing_positions += 1;
                Position::default()
            });
            position.clamp_to_canvas();
            self.fields.push(Field::from_record(record, id, position));
        }

        let mut seen = HashSet::new();
        for field in &mut self.fields {
            if seen.insert(field.id.clone()) {
                continue;
            }
            let duplicate = field.id.clone();
            let mut fresh = new_temp_id();
            while seen.contains(&fresh) {
                fresh = new_temp_id();
            }
            error!(id = %duplicate, replacement = %fresh, "duplicate field id regenerated");
            seen.insert(fresh.clone());
            field.id = fresh;
            report.duplicate_ids.push(duplicate);
        }

        if report.missing_ids > 0 {
            warn!(count = report.missing_ids, "fields without id received temporary ids");
        }
        if report.missing_positions > 0 {
            warn!(count = report.missing_positions, "fields without position received the default rectangle");
        }
        report
    }

    /// Append a field. Returns `false` and leaves the store untouched if the
    /// id is already present.
    pub fn insert(&mut self, field: Field) -> bool {
        if self.contains(&field.id) {
            return false;
        }
        self.fields.push(field);
        true
    }

    pub fn remove(&mut self, id: &FieldId) -> Option<Field> {
        let idx = self.index_of(id)?;
        Some(self.fields.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn get_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| &f.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &FieldId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }

    /// Apply a partial update. Position is re-clamped. Returns false if the
    /// field doesn't exist.
    pub fn apply_patch(&mut self, id: &FieldId, patch: &FieldPatch) -> bool {
        let Some(field) = self.get_mut(id) else {
            return false;
        };
        if let Some(name) = &patch.name {
            field.name.clone_from(name);
        }
        if let Some(variable) = &patch.variable {
            field.variable.clone_from(variable);
        }
        if let Some(field_type) = &patch.field_type {
            field.field_type = field_type.clone();
        }
        if let Some(position) = patch.position {
            field.position = position;
            field.position.clamp_to_canvas();
        }
        if let Some(style) = &patch.style {
            field.style = style.clone();
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        if let Some(order) = patch.order {
            field.order = order;
        }
        if let Some(composite) = &patch.composite {
            field.composite.clone_from(composite);
        }
        if let Some(default_value) = &patch.default_value {
            field.default_value.clone_from(default_value);
        }
        true
    }

    /// Mark exactly one field selected (or none). Returns whether the
    /// selection changed.
    pub fn select(&mut self, id: Option<&FieldId>) -> bool {
        let before = self.selected_id().cloned();
        for field in &mut self.fields {
            field.is_selected = Some(&field.id) == id;
        }
        before.as_ref() != self.selected_id()
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&FieldId> {
        self.fields.iter().find(|f| f.is_selected).map(|f| &f.id)
    }

    /// Swap an id in place. Refuses if `new` is already taken.
    pub fn replace_id(&mut self, old: &FieldId, new: FieldId) -> bool {
        if self.contains(&new) {
            return false;
        }
        match self.get_mut(old) {
            Some(field) => {
                field.id = new;
                true
            }
            None => false,
        }
    }

    /// Fields in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.fields.iter_mut()
    }

    /// Fields on `page`, in draw order.
    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.position.page == page)
    }

    /// Persistable records, skipping fields that are fading out.
    #[must_use]
    pub fn to_records(&self) -> Vec<FieldRecord> {
        self.persisted().map(Field::to_record).collect()
    }

    /// Ids in the same order as [`FieldStore::to_records`].
    #[must_use]
    pub fn persisted_ids(&self) -> Vec<FieldId> {
        self.persisted().map(|f| f.id.clone()).collect()
    }

    fn persisted(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_removing())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
