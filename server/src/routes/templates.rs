//! Template routes: load, save, source preview, and rendering.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use fields::template::TemplateSaveBody;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::pdf::{DataContext, RenderError};
use crate::services::template::{self, TemplateError};
use crate::state::AppState;

pub const WARNINGS_HEADER: &str = "x-render-warnings";

#[derive(Deserialize)]
pub struct GenerateBody {
    #[serde(default)]
    pub data: DataContext,
    #[serde(default)]
    pub images: HashMap<String, String>,
}

#[derive(Deserialize)]
pub struct PreviewTestBody {
    pub campos: Value,
}

pub(crate) fn template_error_to_status(err: &TemplateError) -> StatusCode {
    match err {
        TemplateError::NotFound(_) => StatusCode::NOT_FOUND,
        TemplateError::BadRequest(_) => StatusCode::BAD_REQUEST,
        TemplateError::Source { .. } | TemplateError::Render { source: RenderError::Load(_), .. } => {
            StatusCode::BAD_GATEWAY
        }
        TemplateError::Render { source: RenderError::PageOutOfRange { .. } | RenderError::Image { .. }, .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TemplateError::Render { source: RenderError::Encode(_), .. }
        | TemplateError::Database(_)
        | TemplateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Failure envelope shared by every template route.
pub struct ApiError(TemplateError);

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = template_error_to_status(&self.0);
        if status.is_server_error() {
            warn!(error = %self.0, status = status.as_u16(), "template request failed");
        }
        (status, Json(json!({ "success": false, "message": self.0.to_string() }))).into_response()
    }
}

fn pdf_response(bytes: Vec<u8>, file_name: &str) -> Response {
    (
        [
            (CONTENT_TYPE, "application/pdf".to_owned()),
            (CONTENT_DISPOSITION, format!("inline; filename=\"{file_name}\"")),
        ],
        bytes,
    )
        .into_response()
}

/// `GET /api/templates/{id}`
pub async fn get_template(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let template = template::get_template(&state, id).await?;
    Ok(Json(json!({ "success": true, "data": template })))
}

/// `PUT /api/templates/{id}`: full-column save.
pub async fn save_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<TemplateSaveBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body.map_err(|e| TemplateError::BadRequest(e.body_text()))?;
    let saved = template::save_template(&state, id, body).await?;
    Ok(Json(json!({ "success": true, "data": saved })))
}

/// `GET /api/templates/{id}/preview`: source PDF proxy.
pub async fn preview(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, ApiError> {
    let bytes = template::source_pdf(&state, id).await?;
    Ok(pdf_response(bytes, &format!("template-{id}.pdf")))
}

/// `POST /api/templates/{id}/generate`
pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| TemplateError::BadRequest(e.body_text()))?;
    let rendered = template::generate(&state, id, body.data, body.images).await?;

    let mut response = pdf_response(rendered.bytes, &format!("documento-{id}.pdf"));
    response
        .headers_mut()
        .insert(HeaderName::from_static(WARNINGS_HEADER), HeaderValue::from(rendered.warnings.len()));
    Ok(response)
}

/// `POST /api/templates/{id}/preview-test`: render unsaved fields with sample data.
pub async fn preview_test(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<PreviewTestBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body.map_err(|e| TemplateError::BadRequest(e.body_text()))?;
    let rendered = template::preview_test(&state, id, body.campos).await?;
    Ok(Json(json!({
        "success": true,
        "pdf_base64": STANDARD.encode(&rendered.bytes),
        "avisos": rendered.warnings,
    })))
}

#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;
