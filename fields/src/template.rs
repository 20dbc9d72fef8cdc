//! Template record as served by the backend, and the body of a save.
//!
//! The remote contract only accepts full-column updates, so every save
//! carries all metadata alongside the field array. `campos` is stored as a
//! JSON-encoded string; on read it is accepted either as that string or as
//! an inline array.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{FieldRecord, FieldsError, encode_fields, fields_from_value, parse_fields};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    #[serde(default)]
    pub template_uuid: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "arquivo_original", default)]
    pub source_url: String,
    #[serde(rename = "arquivo_nome", default)]
    pub file_name: String,
    #[serde(rename = "arquivo_tamanho", default)]
    pub file_size: i64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(rename = "versao", default = "default_version")]
    pub version: i64,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
    #[serde(rename = "campos", default, deserialize_with = "lenient_fields")]
    pub fields: Vec<FieldRecord>,
    #[serde(rename = "conteudo_markdown", default)]
    pub markdown: Option<String>,
    #[serde(rename = "criado_por", default)]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_status() -> String {
    "rascunho".to_owned()
}

fn default_version() -> i64 {
    1
}

fn default_active() -> bool {
    true
}

/// Accept `campos` as a JSON string, an inline array, or null.
///
/// A malformed stored payload degrades to an empty list so the editor can
/// still open the template.
fn lenient_fields<'de, D>(deserializer: D) -> Result<Vec<FieldRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let parsed = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => return Ok(Vec::new()),
        Value::String(s) => parse_fields(&s),
        other => fields_from_value(other),
    };
    Ok(parsed.unwrap_or_else(|e| {
        warn!(error = %e, "template campos unreadable; starting with no fields");
        Vec::new()
    }))
}

/// Full-column body for `PUT /templates/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateSaveBody {
    #[serde(default)]
    pub template_uuid: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "arquivo_original", default)]
    pub source_url: String,
    #[serde(rename = "arquivo_nome", default)]
    pub file_name: String,
    #[serde(rename = "arquivo_tamanho", default)]
    pub file_size: i64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(rename = "versao", default = "default_version")]
    pub version: i64,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
    /// JSON-encoded field array.
    #[serde(rename = "campos")]
    pub fields: String,
    #[serde(rename = "conteudo_markdown", default)]
    pub markdown: Option<String>,
    #[serde(rename = "criado_por", default)]
    pub created_by: Option<String>,
}

impl Template {
    /// Build a save body carrying this template's metadata and `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldsError::Json`] if the fields cannot be encoded.
    pub fn save_body(&self, fields: &[FieldRecord]) -> Result<TemplateSaveBody, FieldsError> {
        Ok(TemplateSaveBody {
            template_uuid: self.template_uuid.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            source_url: self.source_url.clone(),
            file_name: self.file_name.clone(),
            file_size: self.file_size,
            status: self.status.clone(),
            version: self.version,
            active: self.active,
            fields: encode_fields(fields)?,
            markdown: self.markdown.clone(),
            created_by: self.created_by.clone(),
        })
    }
}

impl TemplateSaveBody {
    /// Decode the embedded field array.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldsError`] when `campos` is not a JSON field array.
    pub fn parse_fields(&self) -> Result<Vec<FieldRecord>, FieldsError> {
        parse_fields(&self.fields)
    }

    /// The template row this body describes once stored under `id`.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateSaveBody::parse_fields`].
    pub fn into_template(self, id: i64) -> Result<Template, FieldsError> {
        let fields = self.parse_fields()?;
        Ok(Template {
            id,
            template_uuid: self.template_uuid,
            name: self.name,
            description: self.description,
            source_url: self.source_url,
            file_name: self.file_name,
            file_size: self.file_size,
            status: self.status,
            version: self.version,
            active: self.active,
            fields,
            markdown: self.markdown,
            created_by: self.created_by,
            created_at: None,
            updated_at: None,
        })
    }
}

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;
