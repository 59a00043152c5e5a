pub mod seed;
pub use seed::*;

use std::path::{Path, PathBuf};

use crate::error::StoreResult;
use crate::models::{Document, Prediction};
use crate::services::schema::{parse_document, parse_predictions};

/// Key holding the whole serialized Document (cloud variant backup).
pub const DOCUMENT_KEY: &str = "scoresage_data";
/// Key holding only the predictions sequence (local-only variant).
pub const PREDICTIONS_KEY: &str = "scoresage_predictions";

/// Browser-local style key/value store: one JSON file per key under `dir`.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Raw value for `key`, `None` when the key was never written.
    pub async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        // Write then rename so a crash never leaves half a document behind
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.{}.json.tmp", key, uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> StoreResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // Document operations

    /// Cached Document, verbatim. Unreadable or malformed entries count as absent.
    pub async fn load_document(&self) -> Option<Document> {
        let raw = match self.get(DOCUMENT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Local cache read failed: {}", e);
                return None;
            }
        };
        match parse_document(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Ignoring cached document: {}", e);
                None
            }
        }
    }

    pub async fn store_document(&self, doc: &Document) -> StoreResult<()> {
        self.set(DOCUMENT_KEY, &serde_json::to_string(doc)?).await
    }

    // Predictions-only operations (local-only variant)

    pub async fn load_predictions(&self) -> Option<Vec<Prediction>> {
        let raw = match self.get(PREDICTIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Local cache read failed: {}", e);
                return None;
            }
        };
        match parse_predictions(&raw) {
            Ok(predictions) => Some(predictions),
            Err(e) => {
                tracing::warn!("Ignoring cached predictions: {}", e);
                None
            }
        }
    }

    pub async fn store_predictions(&self, predictions: &[Prediction]) -> StoreResult<()> {
        self.set(PREDICTIONS_KEY, &serde_json::to_string(predictions)?).await
    }
}
