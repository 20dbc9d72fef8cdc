//! Shared field model for the template field-mapping editor and renderer.
//!
//! This crate owns the JSON representation of a placed field as it is stored
//! inside a template's `campos` column. Both `canvas` (the editor) and
//! `server` (the renderer) depend on it, along with the two pure engines they
//! must agree on exactly:
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Canvas-space constants and the canvas ↔ PDF transform |
//! | [`layout`] | Greedy word wrap and line/height estimation |
//! | [`template`] | Template record and the full-column save body |
//!
//! Wire keys are Portuguese (`nome`, `posicao`, `estilo`, ...); the Rust side
//! uses English names and `serde` renames.

pub mod geometry;
pub mod layout;
pub mod template;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Prefix carried by client-generated identifiers that were never persisted.
pub const TEMP_ID_PREFIX: &str = "field-";

/// Error returned when encoding or decoding the field collection.
#[derive(Debug, thiserror::Error)]
pub enum FieldsError {
    /// The payload was not valid JSON or did not match the record shape.
    #[error("invalid field json: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload parsed but its top level was not an array.
    #[error("field collection must be a json array")]
    NotAnArray,
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Field identifier.
///
/// Accepts a JSON string or number on input and always serializes as a
/// string. Server-issued ids are integers; temporary ids start with
/// [`TEMP_ID_PREFIX`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(String);

impl FieldId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a temporary id from an opaque unique suffix.
    #[must_use]
    pub fn temporary(suffix: &str) -> Self {
        Self(format!("{TEMP_ID_PREFIX}{suffix}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id was generated on the client and never persisted.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    /// The integer value of a server-issued id, if this is one.
    #[must_use]
    pub fn as_persisted(&self) -> Option<i64> {
        if self.is_temporary() {
            return None;
        }
        match self.0.trim().parse::<i64>() {
            Ok(v) if v > 0 => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for FieldId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for FieldId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FieldId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
            Raw::Float(n) => Self(format!("{n}")),
        })
    }
}

// =============================================================================
// FIELD TYPES
// =============================================================================

/// Rendering family of a field, derived from its wire [`FieldType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    SignatureImage,
    PhotoImage,
    CompositeText,
}

impl FieldKind {
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, Self::SignatureImage | Self::PhotoImage)
    }
}

/// Semantic type stored in the `tipo` key.
///
/// Unknown values round-trip unchanged through [`FieldType::Other`] and
/// behave like plain text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Cpf,
    Cnpj,
    Date,
    Phone,
    Address,
    System,
    Segment,
    Signature,
    Photo,
    Composite,
    Other(String),
}

impl FieldType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "texto",
            Self::Cpf => "cpf",
            Self::Cnpj => "cnpj",
            Self::Date => "data",
            Self::Phone => "telefone",
            Self::Address => "endereco",
            Self::System => "sistema",
            Self::Segment => "segmento",
            Self::Signature => "assinatura",
            Self::Photo => "foto",
            Self::Composite => "texto_composto",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Signature => FieldKind::SignatureImage,
            Self::Photo => FieldKind::PhotoImage,
            Self::Composite => FieldKind::CompositeText,
            _ => FieldKind::Text,
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "texto" => Self::Text,
            "cpf" => Self::Cpf,
            "cnpj" => Self::Cnpj,
            "data" => Self::Date,
            "telefone" => Self::Phone,
            "endereco" => Self::Address,
            "sistema" => Self::System,
            "segmento" => Self::Segment,
            "assinatura" => Self::Signature,
            "foto" => Self::Photo,
            "texto_composto" => Self::Composite,
            _ => Self::Other(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Other(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl From<FieldKind> for FieldType {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::Text,
            FieldKind::SignatureImage => Self::Signature,
            FieldKind::PhotoImage => Self::Photo,
            FieldKind::CompositeText => Self::Composite,
        }
    }
}

// =============================================================================
// POSITION / STYLE
// =============================================================================

/// Rectangle in canvas space plus its 1-indexed page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "pagina", default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

impl Default for Position {
    /// Rectangle assigned to records that arrive without a position.
    fn default() -> Self {
        Self { x: 100.0, y: 100.0, width: 200.0, height: 40.0, page: 1 }
    }
}

/// Horizontal text alignment inside the field rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_COLOR: &str = "#000000";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(rename = "fonte", default = "default_font_family")]
    pub font_family: String,
    #[serde(rename = "tamanho_fonte", default = "default_font_size")]
    pub font_size: f64,
    #[serde(rename = "cor", default = "default_color")]
    pub color: String,
    #[serde(rename = "alinhamento", default)]
    pub alignment: Alignment,
    #[serde(rename = "negrito", default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(rename = "italico", default, skip_serializing_if = "is_false")]
    pub italic: bool,
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_owned()
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: DEFAULT_FONT_SIZE,
            color: default_color(),
            alignment: Alignment::Left,
            bold: false,
            italic: false,
        }
    }
}

/// Body of a composite-text field: a placeholder template plus the rich-text
/// document it was authored from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeContent {
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub json: Value,
}

impl Default for CompositeContent {
    fn default() -> Self {
        Self {
            template: String::new(),
            json: serde_json::json!({ "type": "doc", "content": [{ "type": "paragraph" }] }),
        }
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// One field exactly as persisted in a template's `campos` array.
///
/// `id` and `posicao` are optional here because stored payloads are not
/// trusted; the editor repairs them on load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FieldId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Value>,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "variavel", default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(rename = "tipo", default)]
    pub field_type: FieldType,
    #[serde(rename = "posicao", default)]
    pub position: Option<Position>,
    #[serde(rename = "estilo", default)]
    pub style: Option<Style>,
    #[serde(rename = "obrigatorio", default)]
    pub required: bool,
    #[serde(rename = "ordem", default)]
    pub order: i64,
    #[serde(rename = "conteudo_composto", default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeContent>,
    #[serde(rename = "valor_padrao", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(rename = "criado_em", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "atualizado_em", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl FieldRecord {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.field_type.kind()
    }

    /// The style to render with, falling back to defaults.
    #[must_use]
    pub fn effective_style(&self) -> Style {
        self.style.clone().unwrap_or_default()
    }
}

/// Parse a JSON-encoded field array.
///
/// # Errors
///
/// Returns [`FieldsError::NotAnArray`] when the top level is not an array
/// and [`FieldsError::Json`] when any element does not match the record.
pub fn parse_fields(raw: &str) -> Result<Vec<FieldRecord>, FieldsError> {
    let value: Value = serde_json::from_str(raw)?;
    fields_from_value(value)
}

/// Interpret an already-parsed JSON value as a field array.
///
/// # Errors
///
/// Same as [`parse_fields`].
pub fn fields_from_value(value: Value) -> Result<Vec<FieldRecord>, FieldsError> {
    if !value.is_array() {
        return Err(FieldsError::NotAnArray);
    }
    Ok(serde_json::from_value(value)?)
}

/// Encode a field array into the string form stored in `campos`.
///
/// # Errors
///
/// Returns [`FieldsError::Json`] if serialization fails.
pub fn encode_fields(fields: &[FieldRecord]) -> Result<String, FieldsError> {
    Ok(serde_json::to_string(fields)?)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
