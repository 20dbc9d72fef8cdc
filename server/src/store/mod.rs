//! Storage seams: template rows and source PDF bytes.
//!
//! DESIGN
//! ======
//! Both seams are async traits so handlers and services can be exercised
//! against in-memory implementations. Production wires [`postgres`] for
//! templates and [`http`] for source PDFs.

pub mod http;
#[cfg(test)]
pub mod memory;
pub mod postgres;

use fields::template::{Template, TemplateSaveBody};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("template not found: {0}")]
    NotFound(i64),
    #[error("stored template is invalid: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Template rows keyed by integer id.
#[async_trait::async_trait]
pub trait TemplateStore: Send + Sync {
    /// Load one template.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    async fn get(&self, id: i64) -> Result<Template, StoreError>;

    /// Overwrite every column of an existing template and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    async fn save(&self, id: i64, body: &TemplateSaveBody) -> Result<Template, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source PDF request failed: {0}")]
    Transport(String),
    #[error("source PDF responded with status {0}")]
    Status(u16),
    #[error("template has no source PDF")]
    MissingUrl,
}

/// Where template source PDFs are downloaded from.
#[async_trait::async_trait]
pub trait PdfSource: Send + Sync {
    /// Fetch the full PDF at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the bytes cannot be retrieved.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}
