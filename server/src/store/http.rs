//! Source PDF download over HTTP.

use std::time::Duration;

use tracing::{debug, warn};

use super::{PdfSource, SourceError};

pub struct HttpPdfSource {
    http: reqwest::Client,
}

impl HttpPdfSource {
    /// Build a client with the given request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl PdfSource for HttpPdfSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        if url.trim().is_empty() {
            return Err(SourceError::MissingUrl);
        }
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "source PDF fetch rejected");
            return Err(SourceError::Status(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        debug!(%url, bytes = bytes.len(), "source PDF fetched");
        Ok(bytes.to_vec())
    }
}
