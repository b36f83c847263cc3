//! HTTP implementation of [`SearchBackend`].
//!
//! One endpoint: `GET {base_url}/search?query=<text>`. No retries, no timeout.

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::backend::{BackendError, SearchBackend, SearchResponse};

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, BackendError> {
        info!("Search request: url={}, query_len={}", self.search_url(), query.len());

        let response = self
            .client
            .get(self.search_url())
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Search response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Search backend error: {} - {}", status, body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        serde_json::from_str::<SearchResponse>(&body).map_err(|e| {
            warn!("Failed to decode search response: {} (body={} bytes)", e, body.len());
            BackendError::Decode(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.search_url(), "http://localhost:8000/search");
    }
}
