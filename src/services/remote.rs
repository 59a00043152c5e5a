use reqwest::Client;

use crate::config::RemoteConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::Document;
use crate::services::schema::parse_document;

const MASTER_KEY_HEADER: &str = "X-Master-Key";

/// Whole-document reads and writes against the hosted JSON bin.
pub struct BinClient {
    client: Client,
    config: RemoteConfig,
}

impl BinClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// `GET <endpoint>/latest`. The body may be wrapped in `record`.
    pub async fn fetch(&self) -> StoreResult<Document> {
        if !self.is_configured() {
            return Err(StoreError::NotConfigured);
        }

        let url = format!("{}/latest", self.config.endpoint());
        tracing::debug!("Fetching document from {}", url);

        let response = self.client
            .get(&url)
            .header(MASTER_KEY_HEADER, &self.config.api_key)
            .send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Transport(format!("GET {} returned {}: {}", url, status, body)));
        }

        let body = response.text().await?;
        parse_document(&body)
    }

    /// `PUT <endpoint>` with the full document. Only ok/not-ok matters.
    pub async fn put(&self, doc: &Document) -> StoreResult<()> {
        if !self.is_configured() {
            return Err(StoreError::NotConfigured);
        }

        let url = self.config.endpoint();
        tracing::debug!("Writing {} predictions to {}", doc.predictions.len(), url);

        let response = self.client
            .put(&url)
            .header(MASTER_KEY_HEADER, &self.config.api_key)
            .json(doc)
            .send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Transport(format!("PUT {} returned {}: {}", url, status, body)));
        }

        Ok(())
    }
}
