//! Template service: load, save, and render templates.
//!
//! DESIGN
//! ======
//! Saves are full-column updates. Before a body reaches the store the
//! service bumps `versao` and gives every field lacking a persisted integer
//! id (missing, temporary, or colliding) the next free id, so stored
//! payloads never carry client-only identifiers.
//!
//! Rendering is CPU-bound and runs on the blocking pool; each call owns its
//! own copy of the source document.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is folded into [`TemplateError`], which route handlers map
//! to a status code. Source and render errors carry the template id, and
//! render errors also keep their field id, so the caller can point at the
//! offending template and field.

use std::collections::{HashMap, HashSet};

use fields::template::{Template, TemplateSaveBody};
use fields::{FieldId, FieldRecord};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::pdf::{self, DataContext, RenderError, Rendered};
use crate::state::AppState;
use crate::store::{SourceError, StoreError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template {0} não encontrado")]
    NotFound(i64),
    #[error("{0}")]
    BadRequest(String),
    #[error("PDF de origem do template {template_id} indisponível: {source}")]
    Source { template_id: i64, source: SourceError },
    #[error("template {template_id}: {source}")]
    Render { template_id: i64, source: RenderError },
    #[error("database error: {0}")]
    Database(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for TemplateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Invalid(msg) => Self::Database(msg),
            StoreError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

// =============================================================================
// LOAD / SAVE
// =============================================================================

pub async fn get_template(state: &AppState, id: i64) -> Result<Template, TemplateError> {
    Ok(state.store.get(id).await?)
}

/// Give every field without a usable persisted id the next free integer.
///
/// Returns how many ids were assigned. Existing positive, unique ids are
/// kept; a repeated id keeps its first occurrence.
pub fn assign_ids(fields: &mut [FieldRecord]) -> usize {
    let mut next = fields.iter().filter_map(|f| f.id.as_ref().and_then(FieldId::as_persisted)).max().unwrap_or(0);
    let mut seen = HashSet::new();
    let mut assigned = 0;
    for field in fields.iter_mut() {
        let persisted = field.id.as_ref().and_then(FieldId::as_persisted);
        if let Some(id) = persisted.filter(|id| seen.insert(*id)) {
            field.id = Some(FieldId::from(id));
            continue;
        }
        next += 1;
        seen.insert(next);
        field.id = Some(FieldId::from(next));
        assigned += 1;
    }
    assigned
}

pub async fn save_template(state: &AppState, id: i64, mut body: TemplateSaveBody) -> Result<Template, TemplateError> {
    let current = state.store.get(id).await?;
    let mut fields = body.parse_fields().map_err(|e| TemplateError::BadRequest(format!("campos inválido: {e}")))?;

    let assigned = assign_ids(&mut fields);
    if assigned > 0 {
        info!(template_id = id, assigned, "assigned ids to new fields");
    }
    body.fields = fields::encode_fields(&fields).map_err(|e| TemplateError::Internal(e.to_string()))?;
    body.version = current.version + 1;

    let saved = state.store.save(id, &body).await?;
    info!(template_id = id, version = saved.version, fields = saved.fields.len(), "template saved");
    Ok(saved)
}

// =============================================================================
// SOURCE / RENDER
// =============================================================================

async fn fetch_source(state: &AppState, template: &Template) -> Result<Vec<u8>, TemplateError> {
    let source_error = |source| TemplateError::Source { template_id: template.id, source };
    if template.source_url.trim().is_empty() {
        return Err(source_error(SourceError::MissingUrl));
    }
    state.pdf_source.fetch(&template.source_url).await.map_err(source_error)
}

pub async fn source_pdf(state: &AppState, id: i64) -> Result<Vec<u8>, TemplateError> {
    let template = state.store.get(id).await?;
    fetch_source(state, &template).await
}

async fn render_blocking(
    template_id: i64,
    source: Vec<u8>,
    fields: Vec<FieldRecord>,
    data: DataContext,
    images: HashMap<String, String>,
) -> Result<Rendered, TemplateError> {
    let rendered = tokio::task::spawn_blocking(move || pdf::render(&source, &fields, &data, &images))
        .await
        .map_err(|e| TemplateError::Internal(format!("render task failed: {e}")))?
        .map_err(|source| TemplateError::Render { template_id, source })?;
    for warning in &rendered.warnings {
        warn!(template_id, warning = %warning, "render warning");
    }
    Ok(rendered)
}

/// Render the stored template's fields with caller-supplied data.
pub async fn generate(
    state: &AppState,
    id: i64,
    data: DataContext,
    images: HashMap<String, String>,
) -> Result<Rendered, TemplateError> {
    let template = state.store.get(id).await?;
    let source = fetch_source(state, &template).await?;
    let rendered = render_blocking(id, source, template.fields, data, images).await?;
    info!(template_id = id, bytes = rendered.bytes.len(), "document generated");
    Ok(rendered)
}

/// Render an unsaved field layout against built-in sample data.
pub async fn preview_test(state: &AppState, id: i64, campos: Value) -> Result<Rendered, TemplateError> {
    let template = state.store.get(id).await?;
    let fields = match campos {
        Value::String(raw) => fields::parse_fields(&raw),
        other => fields::fields_from_value(other),
    }
    .map_err(|e| TemplateError::BadRequest(format!("campos inválido: {e}")))?;

    let source = fetch_source(state, &template).await?;
    let protocolo = format!("PREVIEW-{}", uuid::Uuid::new_v4().simple());
    let data = DataContext::sample(&today(), &protocolo);
    render_blocking(id, source, fields, data, HashMap::new()).await
}

/// Current UTC date as `DD/MM/YYYY`.
fn today() -> String {
    let now = OffsetDateTime::now_utc();
    format!("{:02}/{:02}/{}", now.day(), u8::from(now.month()), now.year())
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
