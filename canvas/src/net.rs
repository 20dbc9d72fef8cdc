//! HTTP client for the template endpoints the editor calls.
//!
//! The editor only ever fetches a template, saves it back in full, and asks
//! for a preview render of unsaved fields. Every response uses the
//! `{success, data | message}` envelope.
//!
//! ERROR HANDLING
//! ==============
//! Failures are classified into [`ApiError`] by HTTP status so the editor
//! can show the right message. Nothing here panics; a body that cannot be
//! read degrades to a generic message.

#[cfg(test)]
#[path = "net_test.rs"]
mod net_test;

use fields::template::{Template, TemplateSaveBody};
use fields::FieldRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Error returned by [`TemplateClient`] calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("session expired")]
    Unauthorized,
    #[error("permission denied")]
    Forbidden,
    #[error("template not found")]
    NotFound,
    #[error("server error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            _ => Self::Status { status, message: message.into() },
        }
    }

    /// Message shown to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Sessão expirada. Faça login novamente.".to_owned(),
            Self::Forbidden => "Você não tem permissão para editar este template.".to_owned(),
            Self::NotFound => "Template não encontrado.".to_owned(),
            Self::Status { message, .. } | Self::Rejected(message) | Self::Transport(message) => {
                format!("Erro ao salvar: {message}")
            }
            Self::Decode(message) => format!("Resposta inválida do servidor: {message}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() { Self::Decode(e.to_string()) } else { Self::Transport(e.to_string()) }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    message: Option<String>,
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, ApiError> {
        let message = self.message.or(self.error);
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ApiError::Decode("missing data".to_owned())),
            (false, _) => Err(ApiError::Rejected(message.unwrap_or_else(|| "unknown error".to_owned()))),
        }
    }
}

#[derive(Debug, Serialize)]
struct PreviewTestBody<'a> {
    campos: &'a [FieldRecord],
}

/// Result of `POST /templates/{id}/preview-test`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreviewTest {
    pub pdf_base64: String,
    #[serde(rename = "avisos", default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewTestEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(flatten)]
    preview: Option<PreviewTest>,
    message: Option<String>,
}

/// Client for the template REST endpoints under `base_url`.
#[derive(Debug, Clone)]
pub struct TemplateClient {
    http: reqwest::Client,
    base_url: String,
}

impl TemplateClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url }
    }

    #[must_use]
    pub fn template_url(&self, id: i64) -> String {
        format!("{}/templates/{id}", self.base_url)
    }

    #[must_use]
    pub fn preview_url(&self, id: i64) -> String {
        format!("{}/templates/{id}/preview", self.base_url)
    }

    /// `GET /templates/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an
    /// envelope with `success: false`.
    pub async fn fetch_template(&self, id: i64) -> Result<Template, ApiError> {
        let resp = self.http.get(self.template_url(id)).send().await?;
        let resp = check_status(resp).await?;
        resp.json::<Envelope<Template>>().await?.into_data()
    }

    /// `PUT /templates/{id}` with every column.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateClient::fetch_template`].
    pub async fn save_template(&self, id: i64, body: &TemplateSaveBody) -> Result<Template, ApiError> {
        debug!(template_id = id, "saving template");
        let resp = self.http.put(self.template_url(id)).json(body).send().await?;
        let resp = check_status(resp).await?;
        resp.json::<Envelope<Template>>().await?.into_data()
    }

    /// Render unsaved fields against sample data.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateClient::fetch_template`].
    pub async fn preview_test(&self, id: i64, fields: &[FieldRecord]) -> Result<PreviewTest, ApiError> {
        let url = format!("{}/preview-test", self.template_url(id));
        let resp = self.http.post(url).json(&PreviewTestBody { campos: fields }).send().await?;
        let resp = check_status(resp).await?;
        let envelope = resp.json::<PreviewTestEnvelope>().await?;
        match (envelope.success, envelope.preview) {
            (true, Some(preview)) => Ok(preview),
            (true, None) => Err(ApiError::Decode("missing pdf".to_owned())),
            (false, _) => Err(ApiError::Rejected(envelope.message.unwrap_or_default())),
        }
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.json::<Envelope<serde_json::Value>>().await {
        Ok(envelope) => envelope.message.or(envelope.error),
        Err(_) => None,
    };
    let message = message.unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());
    Err(ApiError::from_status(status.as_u16(), message))
}
