use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::Settings;
use crate::error::StoreError;
use crate::models::{ApiResponse, Document, League, Prediction, PredictionId};
use crate::services::{
    cached_snapshot, render_snapshot, ExportFormat, LeagueFilter, RecordStore, SaveOutcome, StatCounters, Tier,
    ViewOptions, ViewState,
};
use crate::utils;

pub struct AppState {
    pub store: RecordStore,
    pub view_options: ViewOptions,
}

pub type SharedState = Arc<AppState>;

pub async fn serve(settings: Settings, port: u16) -> anyhow::Result<()> {
    let public_dir = settings.public_dir.clone();
    let state = Arc::new(AppState {
        store: RecordStore::new(&settings),
        view_options: ViewOptions::default(),
    });

    let app = create_router(state, Some(public_dir));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("ScoreSage API server listening on port {} ({:?} mode)", port, settings.variant);

    axum::serve(listener, app).await?;
    Ok(())
}

/// API routes, plus the static public page when `public_dir` is given.
pub fn create_router(state: SharedState, public_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/document", get(get_document_handler))
        .route("/api/leagues", get(get_leagues_handler))
        .route("/api/stats", get(get_stats_handler))
        .route(
            "/api/predictions",
            get(get_predictions_handler)
                .post(append_prediction_handler)
                .put(replace_predictions_handler),
        )
        .route("/api/export", get(export_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
        )
        .with_state(state);

    match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ScoreSage API is running"))
}

#[derive(Serialize)]
struct DocumentView {
    source: Tier,
    document: Document,
    counters: StatCounters,
}

// GET /api/document - Whole document as one page visit sees it
async fn get_document_handler(State(state): State<SharedState>) -> Json<ApiResponse<DocumentView>> {
    let view = ViewState::load(&state.store, state.view_options).await;
    Json(ApiResponse::success(DocumentView {
        source: view.source(),
        counters: view.counters(),
        document: view.document().clone(),
    }))
}

// GET /api/leagues
async fn get_leagues_handler(State(state): State<SharedState>) -> Json<ApiResponse<Vec<League>>> {
    let view = ViewState::load(&state.store, state.view_options).await;
    Json(ApiResponse::success(view.document().leagues.clone()))
}

// GET /api/stats - Counters with win rate
async fn get_stats_handler(State(state): State<SharedState>) -> Json<ApiResponse<StatCounters>> {
    let view = ViewState::load(&state.store, state.view_options).await;
    Json(ApiResponse::success(view.counters()))
}

// GET /api/predictions?league=all|<id>
#[derive(Deserialize)]
struct PredictionsQuery {
    league: Option<String>,
}

async fn get_predictions_handler(
    State(state): State<SharedState>,
    Query(params): Query<PredictionsQuery>,
) -> Result<Json<ApiResponse<Vec<Prediction>>>, (StatusCode, Json<ApiResponse<Vec<Prediction>>>)> {
    let filter: LeagueFilter = match params.league.as_deref().unwrap_or("all").parse() {
        Ok(filter) => filter,
        Err(e) => return Err((StatusCode::BAD_REQUEST, Json(ApiResponse::error(e)))),
    };

    let view = ViewState::load(&state.store, state.view_options).await.filter(filter);
    let visible = view.visible_predictions().into_iter().cloned().collect();
    Ok(Json(ApiResponse::success(visible)))
}

type SaveResponse = (StatusCode, Json<ApiResponse<SaveOutcome>>);

fn save_response(result: Result<SaveOutcome, StoreError>) -> SaveResponse {
    match result {
        Ok(SaveOutcome::Synced) => (StatusCode::OK, Json(ApiResponse::success(SaveOutcome::Synced))),
        Ok(outcome @ SaveOutcome::LocalOnly(_)) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::partial(outcome, "Error saving to cloud. Data saved locally.".to_string())),
        ),
        Err(e) => {
            tracing::error!("Failed to save document: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(e.to_string())))
        }
    }
}

fn bad_request(message: String) -> SaveResponse {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

// POST /api/predictions - Admin add; assigns an id when the body has none
async fn append_prediction_handler(State(state): State<SharedState>, Json(mut body): Json<Value>) -> SaveResponse {
    if let Value::Object(map) = &mut body {
        if !map.contains_key("id") {
            let id = serde_json::to_value(PredictionId::new_random()).unwrap_or(Value::Null);
            map.insert("id".to_string(), id);
        }
    }
    let prediction: Prediction = match serde_json::from_value(body) {
        Ok(p) => p,
        Err(e) => return bad_request(format!("invalid prediction: {}", e)),
    };
    if !utils::validate_odds(prediction.odds) {
        return bad_request("odds must be a number above zero".to_string());
    }
    if !utils::validate_team_name(&prediction.home_team) || !utils::validate_team_name(&prediction.away_team) {
        return bad_request("team names must be 1 to 100 characters".to_string());
    }

    save_response(state.store.append_prediction(prediction).await)
}

// PUT /api/predictions - Replace the whole list; omitted records are deleted
async fn replace_predictions_handler(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> SaveResponse {
    let predictions: Vec<Prediction> = match serde_json::from_value(body) {
        Ok(list) => list,
        Err(e) => return bad_request(format!("invalid prediction list: {}", e)),
    };

    save_response(state.store.replace_predictions(predictions).await)
}

// GET /api/export?format=json|csv - Download the cached document
#[derive(Deserialize)]
struct ExportQuery {
    format: Option<String>,
}

async fn export_handler(State(state): State<SharedState>, Query(params): Query<ExportQuery>) -> Response {
    let format = match params.format.as_deref() {
        None | Some("json") => ExportFormat::Json,
        Some("csv") => ExportFormat::Csv,
        Some(other) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(format!("Unsupported format: {}", other))),
            )
                .into_response()
        }
    };

    let rendered = cached_snapshot(state.store.cache(), state.store.variant())
        .await
        .and_then(|doc| render_snapshot(&doc, format));

    match rendered {
        Ok(bytes) => {
            let content_type = match format {
                ExportFormat::Json => "application/json",
                ExportFormat::Csv => "text/csv",
            };
            let disposition = format!("attachment; filename=\"predictions.{}\"", format.extension());
            (
                [(header::CONTENT_TYPE, content_type.to_string()), (header::CONTENT_DISPOSITION, disposition)],
                bytes,
            )
                .into_response()
        }
        Err(StoreError::NothingToExport) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(StoreError::NothingToExport.to_string())),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to export snapshot: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
        }
    }
}
