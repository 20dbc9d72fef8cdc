//! Data context a template is filled from, variable resolution, and
//! per-type value formatting.
//!
//! Resolution never fails: an unknown or null variable resolves to `""` and
//! the field falls back to its default value.

use fields::FieldType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cliente {
    #[serde(default)]
    pub nome_completo: Option<String>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub tipo_pessoa: Option<String>,
    /// Any further client attribute (`email`, `celular`, `cep`, ...).
    #[serde(flatten)]
    pub outros: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParteContraria {
    #[serde(default)]
    pub nome: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmento {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sistema {
    #[serde(default)]
    pub protocolo: Option<String>,
    #[serde(default)]
    pub ip_cliente: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub data_geracao: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formulario {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Everything a render may substitute into fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataContext {
    #[serde(default)]
    pub cliente: Cliente,
    #[serde(default)]
    pub parte_contraria: Option<ParteContraria>,
    #[serde(default)]
    pub segmento: Segmento,
    #[serde(default)]
    pub sistema: Sistema,
    #[serde(default)]
    pub formulario: Formulario,
    /// Free-form values keyed by the full variable name, e.g. `acao.numero_processo`.
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl DataContext {
    /// Built-in data used to preview unsaved layouts.
    #[must_use]
    pub fn sample(today: &str, protocolo: &str) -> Self {
        let mut outros = Map::new();
        for (key, value) in [
            ("email", "maria.santos@example.com"),
            ("celular", "11987654321"),
            ("telefone", "1133334444"),
            ("endereco_completo", "Av. Paulista, 1000, Bela Vista, São Paulo/SP"),
            ("cep", "01310-100"),
            ("data_nascimento", "1985-03-15"),
        ] {
            outros.insert(key.to_owned(), Value::String(value.to_owned()));
        }

        let mut extras = Map::new();
        extras.insert("acao.data_inicio".to_owned(), Value::String(today.to_owned()));
        extras.insert("acao.numero_processo".to_owned(), Value::String("0001234-56.2024.5.02.0001".to_owned()));

        Self {
            cliente: Cliente {
                nome_completo: Some("Maria da Silva Santos".to_owned()),
                nome: Some("Maria da Silva Santos".to_owned()),
                cpf: Some("12345678909".to_owned()),
                cnpj: Some("12345678000195".to_owned()),
                tipo_pessoa: Some("pf".to_owned()),
                outros,
            },
            parte_contraria: Some(ParteContraria { nome: Some("Empresa Exemplo Ltda".to_owned()) }),
            segmento: Segmento {
                id: Some(Value::from(1)),
                nome: Some("Trabalhista".to_owned()),
                slug: Some("trabalhista".to_owned()),
                descricao: Some("Ações trabalhistas".to_owned()),
            },
            sistema: Sistema {
                protocolo: Some(protocolo.to_owned()),
                ip_cliente: Some("127.0.0.1".to_owned()),
                user_agent: Some("preview".to_owned()),
                data_geracao: Some(today.to_owned()),
            },
            formulario: Formulario {
                id: Some(Value::from(1)),
                nome: Some("Formulário de Teste".to_owned()),
                slug: Some("formulario-teste".to_owned()),
            },
            extras,
        }
    }

    fn known(&self, variable: &str) -> Option<Value> {
        let text = |v: &Option<String>| v.clone().map(Value::String);
        match variable {
            "cliente.nome_completo" => text(&self.cliente.nome_completo).or_else(|| text(&self.cliente.nome)),
            "cliente.nome" => text(&self.cliente.nome).or_else(|| text(&self.cliente.nome_completo)),
            "cliente.cpf" => text(&self.cliente.cpf),
            "cliente.cnpj" => text(&self.cliente.cnpj),
            "cliente.tipo_pessoa" => text(&self.cliente.tipo_pessoa),
            "parte_contraria.nome" => self.parte_contraria.as_ref().and_then(|p| text(&p.nome)),
            "segmento.id" => self.segmento.id.clone(),
            "segmento.nome" => text(&self.segmento.nome),
            "segmento.slug" => text(&self.segmento.slug),
            "segmento.descricao" => text(&self.segmento.descricao),
            "sistema.protocolo" => text(&self.sistema.protocolo),
            "sistema.ip_cliente" => text(&self.sistema.ip_cliente),
            "sistema.user_agent" => text(&self.sistema.user_agent),
            "sistema.data_geracao" => text(&self.sistema.data_geracao),
            "formulario.id" => self.formulario.id.clone(),
            "formulario.nome" => text(&self.formulario.nome),
            "formulario.slug" => text(&self.formulario.slug),
            _ => None,
        }
    }

    /// Resolve a variable name to display text.
    ///
    /// Known namespace keys win; then `extras` under the full name; then, for
    /// `cliente.*`, any extra client attribute.
    #[must_use]
    pub fn resolve(&self, variable: &str) -> String {
        let variable = variable.trim();
        if variable.is_empty() {
            return String::new();
        }
        let value = self
            .known(variable)
            .filter(|v| !v.is_null())
            .or_else(|| self.extras.get(variable).filter(|v| !v.is_null()).cloned())
            .or_else(|| {
                let key = variable.strip_prefix("cliente.")?;
                self.cliente.outros.get(key).filter(|v| !v.is_null()).cloned()
            });
        value.map(value_to_text).unwrap_or_default()
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Replace every `{{ variable }}` token using `resolve`.
///
/// An opening `{{` without a matching `}}`, or with braces inside, is kept
/// literally.
pub fn substitute(template: &str, resolve: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let inner = &after[..end];
        if inner.trim().is_empty() || inner.contains('{') || inner.contains('}') {
            out.push_str("{{");
            rest = after;
            continue;
        }
        out.push_str(&resolve(inner.trim()));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Apply the display format implied by a field's semantic type.
///
/// Formatting only happens when the input has exactly the expected number
/// of digits; otherwise the value passes through unchanged.
#[must_use]
pub fn format_value(field_type: &FieldType, raw: &str) -> String {
    match field_type {
        FieldType::Cpf => {
            let d = digits(raw);
            if d.len() == 11 {
                return format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]);
            }
        }
        FieldType::Cnpj => {
            let d = digits(raw);
            if d.len() == 14 {
                return format!("{}.{}.{}/{}-{}", &d[0..2], &d[2..5], &d[5..8], &d[8..12], &d[12..14]);
            }
        }
        FieldType::Phone => {
            let d = digits(raw);
            match d.len() {
                10 => return format!("({}) {}-{}", &d[0..2], &d[2..6], &d[6..10]),
                11 => return format!("({}) {}-{}", &d[0..2], &d[2..7], &d[7..11]),
                _ => {}
            }
        }
        FieldType::Date => {
            if let Some(formatted) = format_iso_date(raw) {
                return formatted;
            }
        }
        _ => {}
    }
    raw.to_owned()
}

/// `YYYY-MM-DD` (optionally followed by a time part) to `DD/MM/YYYY`.
fn format_iso_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = raw.get(..10)?;
    if raw.len() > 10 && !raw[10..].starts_with(['T', ' ']) {
        return None;
    }
    let mut parts = date.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    let all_digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(year, 4) || !all_digits(month, 2) || !all_digits(day, 2) {
        return None;
    }
    let month_num: u8 = month.parse().ok()?;
    let day_num: u8 = day.parse().ok()?;
    if !(1..=12).contains(&month_num) || !(1..=31).contains(&day_num) {
        return None;
    }
    Some(format!("{day}/{month}/{year}"))
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
