//! `PostgreSQL` template store.
//!
//! ERROR HANDLING
//! ==============
//! A stored `campos` string that no longer parses is logged and served as an
//! empty field list, so a damaged row can still be opened and re-saved.

use fields::template::{Template, TemplateSaveBody};
use sqlx::PgPool;
use tracing::{info, warn};

use super::{StoreError, TemplateStore};

const TEMPLATE_COLUMNS: &str = "id, template_uuid, nome, descricao, arquivo_original, arquivo_nome, \
     arquivo_tamanho, status, versao, ativo, campos, conteudo_markdown, criado_por, \
     to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS created_at, \
     to_char(updated_at AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TemplateRow {
    id: i64,
    template_uuid: String,
    nome: String,
    descricao: Option<String>,
    arquivo_original: String,
    arquivo_nome: String,
    arquivo_tamanho: i64,
    status: String,
    versao: i64,
    ativo: bool,
    campos: String,
    conteudo_markdown: Option<String>,
    criado_por: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl From<TemplateRow> for Template {
    fn from(row: TemplateRow) -> Self {
        let fields = match fields::parse_fields(&row.campos) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(template_id = row.id, error = %e, "stored campos unreadable; serving no fields");
                Vec::new()
            }
        };
        Self {
            id: row.id,
            template_uuid: row.template_uuid,
            name: row.nome,
            description: row.descricao,
            source_url: row.arquivo_original,
            file_name: row.arquivo_nome,
            file_size: row.arquivo_tamanho,
            status: row.status,
            version: row.versao,
            active: row.ativo,
            fields,
            markdown: row.conteudo_markdown,
            created_by: row.criado_por,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgTemplateStore {
    pool: PgPool,
}

impl PgTemplateStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TemplateStore for PgTemplateStore {
    async fn get(&self, id: i64) -> Result<Template, StoreError> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        Ok(row.into())
    }

    async fn save(&self, id: i64, body: &TemplateSaveBody) -> Result<Template, StoreError> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            "UPDATE templates SET
                 template_uuid = $2, nome = $3, descricao = $4, arquivo_original = $5,
                 arquivo_nome = $6, arquivo_tamanho = $7, status = $8, versao = $9,
                 ativo = $10, campos = $11, conteudo_markdown = $12, criado_por = $13,
                 updated_at = now()
             WHERE id = $1
             RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(id)
        .bind(&body.template_uuid)
        .bind(&body.name)
        .bind(&body.description)
        .bind(&body.source_url)
        .bind(&body.file_name)
        .bind(body.file_size)
        .bind(&body.status)
        .bind(body.version)
        .bind(body.active)
        .bind(&body.fields)
        .bind(&body.markdown)
        .bind(&body.created_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        info!(template_id = id, version = row.versao, "template row updated");
        Ok(row.into())
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
