use fields::{FieldType, Position};
use serde_json::json;

use super::*;
use crate::pdf::RenderError;
use crate::state::test_helpers::{SOURCE_URL, seed_template, test_harness};

fn field(id: Option<&str>, name: &str) -> FieldRecord {
    FieldRecord {
        id: id.map(FieldId::new),
        name: name.to_owned(),
        variable: Some("cliente.nome_completo".into()),
        field_type: FieldType::Text,
        position: Some(Position { x: 10.0, y: 10.0, width: 200.0, height: 20.0, page: 1 }),
        ..FieldRecord::default()
    }
}

fn ids(fields: &[FieldRecord]) -> Vec<String> {
    fields.iter().map(|f| f.id.as_ref().map(ToString::to_string).unwrap_or_default()).collect()
}

// =============================================================================
// assign_ids
// =============================================================================

#[test]
fn new_fields_get_ids_after_the_current_max() {
    let mut fields =
        vec![field(Some("4"), "a"), field(Some("field-abc"), "b"), field(None, "c"), field(Some("2"), "d")];
    assert_eq!(assign_ids(&mut fields), 2);
    assert_eq!(ids(&fields), ["4", "5", "6", "2"]);
}

#[test]
fn duplicate_and_invalid_ids_are_replaced() {
    let mut fields = vec![field(Some("5"), "a"), field(Some("5"), "b"), field(Some("-1"), "c"), field(Some("x"), "d")];
    assert_eq!(assign_ids(&mut fields), 3);
    assert_eq!(ids(&fields), ["5", "6", "7", "8"]);
}

#[test]
fn persisted_unique_ids_are_untouched() {
    let mut fields = vec![field(Some("1"), "a"), field(Some("2"), "b")];
    assert_eq!(assign_ids(&mut fields), 0);
    assert_eq!(ids(&fields), ["1", "2"]);
}

// =============================================================================
// save
// =============================================================================

#[tokio::test]
async fn save_bumps_version_and_assigns_ids() {
    let harness = test_harness();
    seed_template(&harness, 1, vec![field(Some("1"), "Nome")]).await;

    let current = get_template(&harness.state, 1).await.unwrap();
    let body = current.save_body(&[field(Some("1"), "Nome"), field(Some("field-new"), "CPF")]).unwrap();

    let saved = save_template(&harness.state, 1, body).await.unwrap();
    assert_eq!(saved.version, 4);
    assert_eq!(ids(&saved.fields), ["1", "2"]);
    assert_eq!(saved.fields[1].name, "CPF");
    assert_eq!(saved.created_at.as_deref(), Some("2025-01-02T03:04:05Z"));
}

#[tokio::test]
async fn save_rejects_non_array_campos() {
    let harness = test_harness();
    seed_template(&harness, 1, vec![]).await;
    let mut body = get_template(&harness.state, 1).await.unwrap().save_body(&[]).unwrap();
    body.fields = r#"{"id":"1"}"#.into();

    let err = save_template(&harness.state, 1, body).await.unwrap_err();
    assert!(matches!(err, TemplateError::BadRequest(_)));
}

#[tokio::test]
async fn save_of_unknown_template_is_not_found() {
    let harness = test_harness();
    seed_template(&harness, 1, vec![]).await;
    let body = get_template(&harness.state, 1).await.unwrap().save_body(&[]).unwrap();

    let err = save_template(&harness.state, 99, body).await.unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(99)));
    assert_eq!(err.to_string(), "Template 99 não encontrado");
}

// =============================================================================
// source / render
// =============================================================================

#[tokio::test]
async fn source_pdf_returns_stored_bytes() {
    let harness = test_harness();
    seed_template(&harness, 1, vec![]).await;
    let bytes = source_pdf(&harness.state, 1).await.unwrap();
    assert!(bytes.starts_with(b"%PDF-1.5"));
}

#[tokio::test]
async fn missing_source_is_a_source_error() {
    let harness = test_harness();
    harness.store.insert(crate::state::test_helpers::template_with(2, vec![])).await;
    // No bytes registered under SOURCE_URL.
    let err = source_pdf(&harness.state, 2).await.unwrap_err();
    assert!(matches!(err, TemplateError::Source { template_id: 2, source: SourceError::Status(404) }));
    assert!(err.to_string().contains("template 2"));

    let mut no_url = crate::state::test_helpers::template_with(3, vec![]);
    no_url.source_url = String::new();
    harness.store.insert(no_url).await;
    harness.source.insert(SOURCE_URL, vec![]).await;
    let err = source_pdf(&harness.state, 3).await.unwrap_err();
    assert!(matches!(err, TemplateError::Source { template_id: 3, source: SourceError::MissingUrl }));
}

#[tokio::test]
async fn generate_renders_stored_fields() {
    let harness = test_harness();
    seed_template(&harness, 1, vec![field(Some("1"), "Nome")]).await;
    let mut data = DataContext::default();
    data.cliente.nome_completo = Some("Maria".into());

    let rendered = generate(&harness.state, 1, data, HashMap::new()).await.unwrap();
    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert!(rendered.warnings.is_empty());
}

#[tokio::test]
async fn generate_surfaces_field_errors() {
    let harness = test_harness();
    let mut off_page = field(Some("8"), "Nome");
    if let Some(pos) = off_page.position.as_mut() {
        pos.page = 2;
    }
    seed_template(&harness, 1, vec![off_page]).await;

    let err = generate(&harness.state, 1, DataContext::default(), HashMap::new()).await.unwrap_err();
    assert!(matches!(err, TemplateError::Render { template_id: 1, source: RenderError::PageOutOfRange { .. } }));
    let message = err.to_string();
    assert!(message.contains("template 1"), "{message}");
    assert!(message.contains("field 8"), "{message}");
}

#[tokio::test]
async fn preview_test_accepts_array_or_string_campos() {
    let harness = test_harness();
    seed_template(&harness, 1, vec![]).await;
    let campos = json!([{ "id": "field-x", "nome": "Nome", "variavel": "cliente.nome_completo",
        "tipo": "texto", "posicao": { "x": 10, "y": 10, "width": 200, "height": 20, "pagina": 1 } }]);

    let rendered = preview_test(&harness.state, 1, campos.clone()).await.unwrap();
    assert!(rendered.bytes.starts_with(b"%PDF"));

    let as_string = Value::String(campos.to_string());
    assert!(preview_test(&harness.state, 1, as_string).await.is_ok());

    let err = preview_test(&harness.state, 1, json!({ "nope": true })).await.unwrap_err();
    assert!(matches!(err, TemplateError::BadRequest(_)));
}

#[test]
fn today_is_brazilian_date() {
    let d = today();
    assert_eq!(d.len(), 10);
    assert_eq!(&d[2..3], "/");
    assert_eq!(&d[5..6], "/");
}
