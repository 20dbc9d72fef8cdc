use super::*;
use crate::FieldId;

fn template_json(campos: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": 3,
        "template_uuid": "7b0c1e9e-0000-4000-8000-000000000001",
        "nome": "Contrato",
        "descricao": null,
        "arquivo_original": "https://files.example/contrato.pdf",
        "arquivo_nome": "contrato.pdf",
        "arquivo_tamanho": 1024,
        "status": "ativo",
        "versao": 4,
        "ativo": true,
        "campos": campos,
        "conteudo_markdown": null,
        "criado_por": "ana"
    })
}

#[test]
fn campos_accepts_json_string() {
    let campos = serde_json::json!(r#"[{"id": 1, "nome": "a", "tipo": "cpf"}]"#);
    let t: Template = serde_json::from_value(template_json(&campos)).expect("template");
    assert_eq!(t.fields.len(), 1);
    assert_eq!(t.fields[0].id, Some(FieldId::new("1")));
    assert_eq!(t.version, 4);
}

#[test]
fn campos_accepts_inline_array() {
    let campos = serde_json::json!([{"nome": "a"}, {"nome": "b"}]);
    let t: Template = serde_json::from_value(template_json(&campos)).expect("template");
    assert_eq!(t.fields.len(), 2);
}

#[test]
fn unreadable_campos_degrades_to_empty() {
    for campos in [serde_json::json!("{broken"), serde_json::json!(null), serde_json::json!("")] {
        let t: Template = serde_json::from_value(template_json(&campos)).expect("template");
        assert!(t.fields.is_empty());
    }
}

#[test]
fn save_body_carries_every_column() {
    let t: Template =
        serde_json::from_value(template_json(&serde_json::json!([]))).expect("template");
    let fields = crate::parse_fields(r#"[{"id": "9", "nome": "x"}]"#).expect("fields");
    let body = t.save_body(&fields).expect("body");

    let value = serde_json::to_value(&body).expect("json");
    for key in [
        "template_uuid",
        "nome",
        "descricao",
        "arquivo_original",
        "arquivo_nome",
        "arquivo_tamanho",
        "status",
        "versao",
        "ativo",
        "campos",
        "conteudo_markdown",
        "criado_por",
    ] {
        assert!(value.get(key).is_some(), "missing column {key}");
    }
    assert!(value["campos"].is_string());
    assert_eq!(body.parse_fields().expect("parse"), fields);
}

#[test]
fn body_becomes_template_under_new_id() {
    let t: Template =
        serde_json::from_value(template_json(&serde_json::json!([]))).expect("template");
    let fields = crate::parse_fields(r#"[{"id": 3, "nome": "x"}]"#).expect("fields");
    let body = t.save_body(&fields).expect("body");

    let stored = body.into_template(77).expect("template");
    assert_eq!(stored.id, 77);
    assert_eq!(stored.name, t.name);
    assert_eq!(stored.fields, fields);
    assert!(stored.created_at.is_none());
}

#[test]
fn body_with_object_campos_is_rejected() {
    let t: Template =
        serde_json::from_value(template_json(&serde_json::json!([]))).expect("template");
    let mut body = t.save_body(&[]).expect("body");
    body.fields = r#"{"nome": "x"}"#.to_owned();
    assert!(matches!(body.into_template(1), Err(FieldsError::NotAnArray)));
}
