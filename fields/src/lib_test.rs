#![allow(clippy::float_cmp)]

use super::*;

fn sample_json() -> &'static str {
    r##"[
        {
            "id": 7,
            "nome": "Nome Completo",
            "variavel": "cliente.nome_completo",
            "tipo": "texto",
            "posicao": {"x": 100, "y": 100, "width": 200, "height": 20, "pagina": 1},
            "estilo": {"fonte": "Helvetica", "tamanho_fonte": 12, "cor": "#000000", "alinhamento": "left", "negrito": true},
            "obrigatorio": true,
            "ordem": 1
        },
        {
            "id": "field-abc",
            "nome": "Texto Composto",
            "tipo": "texto_composto",
            "posicao": {"x": 10, "y": 20, "width": 400, "height": 80, "pagina": 2},
            "obrigatorio": false,
            "ordem": 2,
            "conteudo_composto": {"template": "Olá {{cliente.nome_completo}}", "json": {"type": "doc"}}
        }
    ]"##
}

// =============================================================================
// IDS
// =============================================================================

#[test]
fn numeric_id_is_read_and_written_as_string() {
    let fields = parse_fields(sample_json()).expect("parse");
    let id = fields[0].id.clone().expect("id");
    assert_eq!(id.as_str(), "7");
    assert_eq!(id.as_persisted(), Some(7));

    let out = serde_json::to_value(&fields[0]).expect("serialize");
    assert_eq!(out["id"], serde_json::json!("7"));
}

#[test]
fn temporary_ids_are_recognized_by_prefix() {
    let id = FieldId::temporary("123");
    assert!(id.is_temporary());
    assert_eq!(id.as_str(), "field-123");
    assert_eq!(id.as_persisted(), None);
    assert!(!FieldId::new("42").is_temporary());
}

#[test]
fn non_numeric_id_is_not_persisted() {
    assert_eq!(FieldId::new("abc").as_persisted(), None);
    assert_eq!(FieldId::new("0").as_persisted(), None);
}

#[test]
fn null_or_missing_id_parses_as_none() {
    let fields = parse_fields(r#"[{"id": null, "nome": "a"}, {"nome": "b"}]"#).expect("parse");
    assert!(fields[0].id.is_none());
    assert!(fields[1].id.is_none());
}

// =============================================================================
// TYPES
// =============================================================================

#[test]
fn field_type_maps_to_kind() {
    assert_eq!(FieldType::Cpf.kind(), FieldKind::Text);
    assert_eq!(FieldType::Signature.kind(), FieldKind::SignatureImage);
    assert_eq!(FieldType::Photo.kind(), FieldKind::PhotoImage);
    assert_eq!(FieldType::Composite.kind(), FieldKind::CompositeText);
    assert!(FieldKind::PhotoImage.is_image());
    assert!(!FieldKind::CompositeText.is_image());
}

#[test]
fn unknown_field_type_round_trips_unchanged() {
    let fields = parse_fields(r#"[{"nome": "x", "tipo": "rg"}]"#).expect("parse");
    assert_eq!(fields[0].field_type, FieldType::Other("rg".to_owned()));
    assert_eq!(fields[0].kind(), FieldKind::Text);
    let out = serde_json::to_value(&fields[0]).expect("serialize");
    assert_eq!(out["tipo"], serde_json::json!("rg"));
}

// =============================================================================
// RECORD SHAPE
// =============================================================================

#[test]
fn parses_position_style_and_composite() {
    let fields = parse_fields(sample_json()).expect("parse");
    let pos = fields[0].position.expect("position");
    assert_eq!((pos.x, pos.y, pos.width, pos.height, pos.page), (100.0, 100.0, 200.0, 20.0, 1));
    let style = fields[0].effective_style();
    assert!(style.bold);
    assert_eq!(style.alignment, Alignment::Left);

    let composite = fields[1].composite.clone().expect("composite");
    assert_eq!(composite.template, "Olá {{cliente.nome_completo}}");
    assert!(fields[1].style.is_none());
    assert_eq!(fields[1].effective_style(), Style::default());
}

#[test]
fn missing_style_keys_take_defaults() {
    let fields = parse_fields(r#"[{"nome": "x", "estilo": {"tamanho_fonte": 9}}]"#).expect("parse");
    let style = fields[0].style.clone().expect("style");
    assert_eq!(style.font_size, 9.0);
    assert_eq!(style.font_family, DEFAULT_FONT_FAMILY);
    assert_eq!(style.color, DEFAULT_COLOR);
}

#[test]
fn encode_uses_portuguese_wire_keys() {
    let fields = parse_fields(sample_json()).expect("parse");
    let raw = encode_fields(&fields).expect("encode");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let first = &value[0];
    assert_eq!(first["nome"], "Nome Completo");
    assert_eq!(first["posicao"]["pagina"], 1);
    assert_eq!(first["estilo"]["negrito"], true);
    assert!(first.get("italico").is_none());
    assert!(first["estilo"].get("italico").is_none());
}

#[test]
fn parse_rejects_non_array_payload() {
    let err = parse_fields(r#"{"nome": "x"}"#).expect_err("object is not an array");
    assert!(matches!(err, FieldsError::NotAnArray));
    let err = parse_fields("not json").expect_err("garbage");
    assert!(matches!(err, FieldsError::Json(_)));
}
