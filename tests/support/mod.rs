#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, put},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use scoresage::config::{RemoteConfig, Variant};
use scoresage::db::LocalCache;
use scoresage::models::{Confidence, Outcome, Prediction, PredictionId};
use scoresage::services::{BinClient, RecordStore};

pub const BIN_ID: &str = "698238ceae596e708f0e91b4";
pub const API_KEY: &str = "test-master-key";

#[derive(Default)]
struct BinState {
    record: Mutex<Option<Value>>,
    failing: AtomicBool,
    puts: AtomicUsize,
}

/// In-process stand-in for the hosted JSON bin.
pub struct FakeBin {
    pub addr: SocketAddr,
    state: Arc<BinState>,
}

impl FakeBin {
    pub async fn start() -> Self {
        let state = Arc::new(BinState::default());
        let app = Router::new()
            .route("/b/{bin}/latest", get(read_bin))
            .route("/b/{bin}", put(write_bin))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: format!("http://{}", self.addr),
            bin_id: BIN_ID.to_string(),
            api_key: API_KEY.to_string(),
        }
    }

    pub fn set_record(&self, record: Value) {
        *self.state.record.lock().unwrap() = Some(record);
    }

    pub fn record(&self) -> Option<Value> {
        self.state.record.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn put_count(&self) -> usize {
        self.state.puts.load(Ordering::SeqCst)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("X-Master-Key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn read_bin(
    State(state): State<Arc<BinState>>,
    Path(bin): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid X-Master-Key"})));
    }
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "boom"})));
    }
    // A freshly created bin holds `{}`
    let record = state.record.lock().unwrap().clone().unwrap_or_else(|| json!({}));
    (StatusCode::OK, Json(json!({"record": record, "metadata": {"id": bin, "private": true}})))
}

async fn write_bin(
    State(state): State<Arc<BinState>>,
    Path(bin): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid X-Master-Key"})));
    }
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"message": "boom"})));
    }
    state.puts.fetch_add(1, Ordering::SeqCst);
    *state.record.lock().unwrap() = Some(body.clone());
    (StatusCode::OK, Json(json!({"record": body, "metadata": {"parentId": bin}})))
}

pub fn cloud_store(bin: &FakeBin, cache_dir: &FsPath) -> RecordStore {
    RecordStore::from_parts(
        Variant::Cloud,
        LocalCache::new(cache_dir),
        BinClient::new(bin.remote_config()),
        cache_dir.join("missing-snapshot.json"),
    )
}

pub fn unconfigured_store(cache_dir: &FsPath) -> RecordStore {
    RecordStore::from_parts(
        Variant::Cloud,
        LocalCache::new(cache_dir),
        BinClient::new(RemoteConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            bin_id: "YOUR_BIN_ID".to_string(),
            api_key: String::new(),
        }),
        cache_dir.join("missing-snapshot.json"),
    )
}

pub fn local_store(cache_dir: &FsPath, snapshot: &FsPath) -> RecordStore {
    RecordStore::from_parts(
        Variant::Local,
        LocalCache::new(cache_dir),
        BinClient::new(RemoteConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            bin_id: String::new(),
            api_key: String::new(),
        }),
        snapshot.to_path_buf(),
    )
}

pub fn prediction(id: u64, league_id: u32, result: Outcome) -> Prediction {
    Prediction {
        id: PredictionId::Number(id),
        league_id: Some(league_id),
        league_name: Some("Premier League".to_string()),
        home_team: format!("Home {}", id),
        away_team: format!("Away {}", id),
        match_date: "2026-10-19".to_string(),
        match_time: "15:00:00".to_string(),
        prediction: "Over 2.5 Goals".to_string(),
        odds: 1.85,
        confidence: Confidence::High,
        result,
        is_vip: false,
        analysis: None,
    }
}

pub fn record_with(predictions: &[Prediction]) -> Value {
    json!({
        "predictions": predictions,
        "leagues": [{"id": 1, "name": "Premier League"}, {"id": 2, "name": "La Liga"}],
        "stats": {"won": 0, "lost": 0, "pending": 0}
    })
}
