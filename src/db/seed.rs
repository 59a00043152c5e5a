use chrono::Local;
use std::path::Path;

use crate::error::StoreResult;
use crate::models::{Confidence, Document, League, Outcome, Prediction, PredictionId, Stats};
use crate::services::schema::parse_document;

const LEAGUES: [(u32, &str); 7] = [
    (1, "Premier League"),
    (2, "La Liga"),
    (3, "Serie A"),
    (4, "Bundesliga"),
    (5, "Ligue 1"),
    (6, "Champions League"),
    (7, "Europa League"),
];

/// Headline counters shown with the demo cards. Not derived from the two demo records.
pub const DEMO_STATS: Stats = Stats { won: 156, lost: 23, pending: 2 };

pub fn default_leagues() -> Vec<League> {
    LEAGUES
        .iter()
        .map(|(id, name)| League { id: *id, name: name.to_string() })
        .collect()
}

/// The document a fresh bin starts with: no predictions, the fixed leagues, zeroed stats.
pub fn default_document() -> Document {
    Document {
        predictions: Vec::new(),
        leagues: default_leagues(),
        stats: Stats::default(),
    }
}

/// Last-resort dataset for the public view, dated today on the local clock.
pub fn demo_document() -> Document {
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();

    let predictions = vec![
        Prediction {
            id: PredictionId::Number(1),
            league_id: None,
            league_name: Some("Premier League".to_string()),
            home_team: "Manchester United".to_string(),
            away_team: "Liverpool".to_string(),
            match_date: today.clone(),
            match_time: "15:00:00".to_string(),
            prediction: "Over 2.5 Goals".to_string(),
            odds: 1.85,
            confidence: Confidence::High,
            result: Outcome::Pending,
            is_vip: false,
            analysis: Some("Both teams score frequently in derbies.".to_string()),
        },
        Prediction {
            id: PredictionId::Number(2),
            league_id: None,
            league_name: Some("La Liga".to_string()),
            home_team: "Real Madrid".to_string(),
            away_team: "Barcelona".to_string(),
            match_date: today,
            match_time: "20:00:00".to_string(),
            prediction: "Both Teams to Score".to_string(),
            odds: 1.65,
            confidence: Confidence::VeryHigh,
            result: Outcome::Pending,
            is_vip: true,
            analysis: Some("El Clasico always delivers goals!".to_string()),
        },
    ];

    Document {
        predictions,
        leagues: default_leagues(),
        stats: DEMO_STATS,
    }
}

/// Bundled static snapshot (the publicly served `predictions.json`).
pub async fn load_snapshot(path: &Path) -> StoreResult<Document> {
    let raw = tokio::fs::read_to_string(path).await?;
    parse_document(&raw)
}
