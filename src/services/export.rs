use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Variant;
use crate::db::{default_document, LocalCache};
use crate::error::{StoreError, StoreResult};
use crate::models::Document;
use crate::services::stats::recompute_stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Same shape as the served `predictions.json`
    Json,
    /// One row per prediction, for spreadsheets
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub generated_at: DateTime<Utc>,
}

/// Current cache contents with freshly computed stats.
pub async fn cached_snapshot(cache: &LocalCache, variant: Variant) -> StoreResult<Document> {
    let mut doc = match variant {
        Variant::Local => cache.load_predictions().await.map(|predictions| {
            let mut doc = default_document();
            doc.predictions = predictions;
            doc
        }),
        Variant::Cloud => cache.load_document().await,
    }
    .ok_or(StoreError::NothingToExport)?;

    if doc.predictions.is_empty() {
        return Err(StoreError::NothingToExport);
    }
    doc.stats = recompute_stats(&doc.predictions);
    Ok(doc)
}

pub fn render_snapshot(doc: &Document, format: ExportFormat) -> StoreResult<Vec<u8>> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(doc)?),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record([
                "id", "league_id", "league_name", "home_team", "away_team", "match_date",
                "match_time", "prediction", "odds", "confidence", "result", "is_vip", "analysis",
            ])?;
            for p in &doc.predictions {
                writer.write_record([
                    p.id.to_string(),
                    p.league_id.map(|id| id.to_string()).unwrap_or_default(),
                    p.league_name.clone().unwrap_or_default(),
                    p.home_team.clone(),
                    p.away_team.clone(),
                    p.match_date.clone(),
                    p.match_time.clone(),
                    p.prediction.clone(),
                    format!("{:.2}", p.odds),
                    serde_json::to_value(p.confidence)?.as_str().unwrap_or_default().to_string(),
                    serde_json::to_value(p.result)?.as_str().unwrap_or_default().to_string(),
                    u8::from(p.is_vip).to_string(),
                    p.analysis.clone().unwrap_or_default(),
                ])?;
            }
            writer.into_inner().map_err(|e| StoreError::Io(e.into_error()))
        }
    }
}

/// Write the cache out so it can be promoted to the statically served document.
pub async fn export_snapshot(
    cache: &LocalCache,
    variant: Variant,
    out: &Path,
    format: ExportFormat,
) -> StoreResult<ExportSummary> {
    let doc = cached_snapshot(cache, variant).await?;
    let bytes = render_snapshot(&doc, format)?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(out, bytes).await?;

    tracing::info!("Exported {} predictions to {}", doc.predictions.len(), out.display());
    Ok(ExportSummary {
        path: out.to_path_buf(),
        rows: doc.predictions.len(),
        generated_at: Utc::now(),
    })
}

/// `predictions_<timestamp>.<ext>` next to the other exports.
pub fn default_export_path(dir: &Path, format: ExportFormat) -> PathBuf {
    dir.join(format!("predictions_{}.{}", Utc::now().timestamp(), format.extension()))
}
