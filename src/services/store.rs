use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::config::{Settings, Variant};
use crate::db::{default_document, demo_document, load_snapshot, LocalCache};
use crate::error::{StoreError, StoreResult};
use crate::models::{Document, Prediction};
use crate::services::remote::BinClient;
use crate::services::stats::recompute_stats;

/// One ranked data source in a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Remote,
    LocalCache,
    Snapshot,
    Default,
    Demo,
}

pub const CLOUD_TIERS: &[Tier] = &[Tier::Remote, Tier::LocalCache, Tier::Default];
pub const LOCAL_TIERS: &[Tier] = &[Tier::LocalCache, Tier::Snapshot, Tier::Default];

/// A document together with the tier that produced it.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub document: Document,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Persisted to the system of record.
    Synced,
    /// Remote write failed; only the local cache holds this version.
    LocalOnly(String),
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Synced)
    }
}

/// Reads and writes the whole Document for one page context.
///
/// Operations on the same store are serialized. Separate stores (two tabs,
/// two visitors) are not coordinated at all: concurrent read-modify-write
/// cycles resolve by last full-document write wins.
pub struct RecordStore {
    variant: Variant,
    cache: LocalCache,
    remote: BinClient,
    snapshot_path: PathBuf,
    op_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(settings: &Settings) -> Self {
        Self::from_parts(
            settings.variant,
            LocalCache::new(settings.cache_dir.clone()),
            BinClient::new(settings.remote.clone()),
            settings.snapshot_path.clone(),
        )
    }

    pub fn from_parts(variant: Variant, cache: LocalCache, remote: BinClient, snapshot_path: PathBuf) -> Self {
        Self {
            variant,
            cache,
            remote,
            snapshot_path,
            op_lock: Mutex::new(()),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Fallback order the store itself reads with.
    pub fn store_tiers(&self) -> &'static [Tier] {
        match self.variant {
            Variant::Cloud => CLOUD_TIERS,
            Variant::Local => LOCAL_TIERS,
        }
    }

    // Tiers

    async fn load_tier(&self, tier: Tier) -> Option<Document> {
        match tier {
            Tier::Remote => {
                if !self.remote.is_configured() {
                    tracing::warn!("Remote bin not configured, skipping remote tier");
                    return None;
                }
                match self.remote.fetch().await {
                    Ok(doc) => Some(doc),
                    Err(e) => {
                        tracing::warn!("Remote fetch failed: {}", e);
                        None
                    }
                }
            }
            Tier::LocalCache => match self.variant {
                Variant::Cloud => self.cache.load_document().await,
                Variant::Local => self.cache.load_predictions().await.map(|predictions| {
                    let mut doc = default_document();
                    doc.stats = recompute_stats(&predictions);
                    doc.predictions = predictions;
                    doc
                }),
            },
            Tier::Snapshot => match load_snapshot(&self.snapshot_path).await {
                Ok(doc) => {
                    tracing::info!(
                        "Imported {} predictions from snapshot {}",
                        doc.predictions.len(),
                        self.snapshot_path.display()
                    );
                    if let Err(e) = self.seed_cache(&doc).await {
                        tracing::warn!("Could not seed local cache from snapshot: {}", e);
                    }
                    Some(doc)
                }
                Err(e) => {
                    tracing::warn!("Snapshot {} unavailable: {}", self.snapshot_path.display(), e);
                    None
                }
            },
            Tier::Default => Some(default_document()),
            Tier::Demo => Some(demo_document()),
        }
    }

    async fn seed_cache(&self, doc: &Document) -> StoreResult<()> {
        match self.variant {
            Variant::Cloud => self.cache.store_document(doc).await,
            Variant::Local => self.cache.store_predictions(&doc.predictions).await,
        }
    }

    /// First tier in `tiers` that yields a document wins. `None` once every tier is exhausted.
    pub async fn first_available(&self, tiers: &[Tier]) -> Option<Loaded> {
        let _guard = self.op_lock.lock().await;
        self.first_available_unlocked(tiers).await
    }

    async fn first_available_unlocked(&self, tiers: &[Tier]) -> Option<Loaded> {
        for &tier in tiers {
            if let Some(document) = self.load_tier(tier).await {
                tracing::debug!("Loaded {} predictions from {:?}", document.predictions.len(), tier);
                return Some(Loaded { document, tier });
            }
        }
        tracing::error!("No data available from any of {:?}", tiers);
        None
    }

    // Reads

    pub async fn fetch_document(&self) -> Document {
        self.fetch_loaded().await.document
    }

    pub async fn fetch_loaded(&self) -> Loaded {
        let _guard = self.op_lock.lock().await;
        self.fetch_unlocked().await
    }

    async fn fetch_unlocked(&self) -> Loaded {
        match self.first_available_unlocked(self.store_tiers()).await {
            Some(loaded) => loaded,
            None => Loaded { document: default_document(), tier: Tier::Default },
        }
    }

    pub async fn get_predictions(&self) -> Vec<Prediction> {
        self.fetch_document().await.predictions
    }

    // Writes

    /// Recompute stats, back up locally, then push to the remote bin (cloud variant).
    pub async fn save_document(&self, doc: Document) -> StoreResult<SaveOutcome> {
        let _guard = self.op_lock.lock().await;
        self.save_unlocked(doc).await
    }

    async fn save_unlocked(&self, mut doc: Document) -> StoreResult<SaveOutcome> {
        doc.stats = recompute_stats(&doc.predictions);

        match self.variant {
            Variant::Local => {
                self.cache.store_predictions(&doc.predictions).await?;
                tracing::info!("Saved {} predictions to local cache", doc.predictions.len());
                Ok(SaveOutcome::Synced)
            }
            Variant::Cloud => {
                let cached = self.cache.store_document(&doc).await;
                if let Err(e) = &cached {
                    tracing::warn!("Local backup write failed: {}", e);
                }

                if !self.remote.is_configured() {
                    tracing::warn!("Remote bin not configured, saved to local cache only");
                    return cached.map(|_| SaveOutcome::Synced);
                }

                match self.remote.put(&doc).await {
                    Ok(()) => {
                        tracing::info!("Saved {} predictions to remote bin", doc.predictions.len());
                        Ok(SaveOutcome::Synced)
                    }
                    Err(e) => {
                        tracing::error!("Error saving to remote bin: {}", e);
                        match cached {
                            Ok(()) => Ok(SaveOutcome::LocalOnly(e.to_string())),
                            Err(_) => Err(e),
                        }
                    }
                }
            }
        }
    }

    /// Read-modify-write: newest prediction goes first.
    pub async fn append_prediction(&self, prediction: Prediction) -> StoreResult<SaveOutcome> {
        let _guard = self.op_lock.lock().await;
        let mut doc = self.fetch_unlocked().await.document;
        doc.predictions.insert(0, prediction);
        self.save_unlocked(doc).await
    }

    /// Replace the whole sequence. Records left out are deleted.
    pub async fn replace_predictions(&self, predictions: Vec<Prediction>) -> StoreResult<SaveOutcome> {
        let _guard = self.op_lock.lock().await;
        let mut doc = self.fetch_unlocked().await.document;
        doc.predictions = predictions;
        self.save_unlocked(doc).await
    }

    /// Seed the system of record with the default document unless it already holds one.
    /// The local variant imports the bundled snapshot first, the way a read would.
    pub async fn init(&self) -> StoreResult<Option<SaveOutcome>> {
        let _guard = self.op_lock.lock().await;
        let existing = match self.variant {
            Variant::Cloud => {
                if !self.remote.is_configured() {
                    return Err(StoreError::NotConfigured);
                }
                match self.remote.fetch().await {
                    Ok(doc) => Some(doc),
                    Err(StoreError::MalformedPayload(reason)) => {
                        tracing::warn!("Remote bin holds no usable document ({}), seeding", reason);
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            Variant::Local => match self.load_tier(Tier::LocalCache).await {
                Some(doc) => Some(doc),
                None => self.load_tier(Tier::Snapshot).await,
            },
        };

        if existing.is_some() {
            tracing::info!("Document already present, nothing to initialize");
            return Ok(None);
        }
        self.save_unlocked(default_document()).await.map(Some)
    }
}
