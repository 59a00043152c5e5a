//! Store-boundary schema check.
//!
//! Every payload (remote body, cache entry, bundled snapshot) passes through
//! here before anything renders it. Missing `leagues` get the fixed list,
//! missing `stats` get recomputed, and a payload without a `predictions`
//! array is rejected as malformed. A `leagues` or `stats` block that does
//! not parse is treated like a missing one, so a save never drops the
//! predictions it was read alongside.

use serde::Deserialize;
use serde_json::Value;

use crate::db::default_leagues;
use crate::error::{StoreError, StoreResult};
use crate::models::{Document, League, Prediction, Stats};
use crate::services::stats::recompute_stats;

#[derive(Deserialize)]
struct RawDocument {
    predictions: Vec<Prediction>,
    #[serde(default)]
    leagues: Option<Value>,
    #[serde(default)]
    stats: Option<Value>,
}

/// Parse a document body. Accepts the bare document or one wrapped in `record`.
pub fn parse_document(body: &str) -> StoreResult<Document> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| StoreError::MalformedPayload(format!("not JSON: {}", e)))?;
    normalize_document(value)
}

pub fn normalize_document(value: Value) -> StoreResult<Document> {
    let value = unwrap_record(value);

    match value.get("predictions") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(StoreError::MalformedPayload("`predictions` is not an array".into())),
        None => return Err(StoreError::MalformedPayload("missing `predictions`".into())),
    }

    let raw: RawDocument = serde_json::from_value(value)
        .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

    let stats = match raw.stats.map(serde_json::from_value::<Stats>) {
        Some(Ok(stats)) => stats,
        Some(Err(e)) => {
            tracing::warn!("Unreadable stats, recomputing: {}", e);
            recompute_stats(&raw.predictions)
        }
        None => recompute_stats(&raw.predictions),
    };

    let leagues = match raw.leagues.map(serde_json::from_value::<Vec<League>>) {
        Some(Ok(leagues)) => leagues,
        Some(Err(e)) => {
            tracing::warn!("Unreadable league list, using the default leagues: {}", e);
            default_leagues()
        }
        None => default_leagues(),
    };

    Ok(Document {
        leagues,
        predictions: raw.predictions,
        stats,
    })
}

/// The hosted store answers `{ "record": {...}, "metadata": {...} }`.
fn unwrap_record(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("record").map_or(false, Value::is_object) => {
            map.remove("record").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Predictions-only cache entry of the local-only variant.
pub fn parse_predictions(body: &str) -> StoreResult<Vec<Prediction>> {
    serde_json::from_str(body).map_err(|e| StoreError::MalformedPayload(e.to_string()))
}
