//! In-memory stores for tests.

use std::collections::HashMap;

use fields::template::{Template, TemplateSaveBody};
use tokio::sync::RwLock;

use super::{PdfSource, SourceError, StoreError, TemplateStore};

#[derive(Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<HashMap<i64, Template>>,
}

impl MemoryTemplateStore {
    pub async fn insert(&self, template: Template) {
        self.templates.write().await.insert(template.id, template);
    }
}

#[async_trait::async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn get(&self, id: i64) -> Result<Template, StoreError> {
        self.templates.read().await.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, id: i64, body: &TemplateSaveBody) -> Result<Template, StoreError> {
        let mut templates = self.templates.write().await;
        let current = templates.get(&id).ok_or(StoreError::NotFound(id))?;
        let mut stored = body
            .clone()
            .into_template(id)
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        stored.created_at.clone_from(&current.created_at);
        templates.insert(id, stored.clone());
        Ok(stored)
    }
}

#[derive(Default)]
pub struct MemoryPdfSource {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryPdfSource {
    pub async fn insert(&self, url: &str, bytes: Vec<u8>) {
        self.files.write().await.insert(url.to_owned(), bytes);
    }
}

#[async_trait::async_trait]
impl PdfSource for MemoryPdfSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        if url.trim().is_empty() {
            return Err(SourceError::MissingUrl);
        }
        self.files.read().await.get(url).cloned().ok_or(SourceError::Status(404))
    }
}
