//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the two storage seams as trait objects so tests can swap in the
//! in-memory implementations from `store::memory`.

use std::sync::Arc;

use crate::store::{PdfSource, TemplateStore};

/// Clone is required by Axum; both fields are `Arc`-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TemplateStore>,
    pub pdf_source: Arc<dyn PdfSource>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn TemplateStore>, pdf_source: Arc<dyn PdfSource>) -> Self {
        Self { store, pdf_source }
    }
}
