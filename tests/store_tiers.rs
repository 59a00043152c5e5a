mod support;

use serde_json::json;
use tempfile::tempdir;

use scoresage::db::{default_document, DOCUMENT_KEY, PREDICTIONS_KEY};
use scoresage::models::{Outcome, Stats};
use scoresage::services::{SaveOutcome, Tier, CLOUD_TIERS};
use support::*;

#[tokio::test]
async fn test_remote_document_wins_when_reachable() {
    let bin = FakeBin::start().await;
    bin.set_record(record_with(&[prediction(1, 1, Outcome::Won)]));
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let loaded = store.fetch_loaded().await;
    assert_eq!(loaded.tier, Tier::Remote);
    assert_eq!(loaded.document.predictions.len(), 1);
    // Stale stats are shown as stored until the next save
    assert_eq!(loaded.document.stats, Stats::default());
}

#[tokio::test]
async fn test_remote_failure_returns_cache_verbatim() {
    let bin = FakeBin::start().await;
    bin.set_failing(true);
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let mut cached = default_document();
    cached.predictions = vec![prediction(7, 2, Outcome::Lost)];
    cached.stats = Stats { won: 4, lost: 4, pending: 4 };
    store.cache().store_document(&cached).await.unwrap();

    let loaded = store.fetch_loaded().await;
    assert_eq!(loaded.tier, Tier::LocalCache);
    assert_eq!(loaded.document, cached);
}

#[tokio::test]
async fn test_remote_failure_without_cache_gives_default() {
    let bin = FakeBin::start().await;
    bin.set_failing(true);
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let loaded = store.fetch_loaded().await;
    assert_eq!(loaded.tier, Tier::Default);
    assert!(loaded.document.predictions.is_empty());
    assert_eq!(loaded.document.leagues.len(), 7);
    assert_eq!(loaded.document.stats, Stats::default());
}

#[tokio::test]
async fn test_malformed_remote_is_treated_as_failure() {
    let bin = FakeBin::start().await;
    bin.set_record(json!({"leagues": [], "stats": {"won": 1}}));
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let mut cached = default_document();
    cached.predictions = vec![prediction(3, 1, Outcome::Pending)];
    store.cache().store_document(&cached).await.unwrap();

    let loaded = store.fetch_loaded().await;
    assert_eq!(loaded.tier, Tier::LocalCache);
    assert_eq!(loaded.document.predictions[0].home_team, "Home 3");
}

#[tokio::test]
async fn test_wrong_key_falls_back() {
    let bin = FakeBin::start().await;
    bin.set_record(record_with(&[prediction(1, 1, Outcome::Won)]));
    let dir = tempdir().unwrap();
    let mut remote = bin.remote_config();
    remote.api_key = "nope".to_string();
    let store = scoresage::services::RecordStore::from_parts(
        scoresage::config::Variant::Cloud,
        scoresage::db::LocalCache::new(dir.path()),
        scoresage::services::BinClient::new(remote),
        dir.path().join("none.json"),
    );

    assert_eq!(store.fetch_loaded().await.tier, Tier::Default);
}

#[tokio::test]
async fn test_tier_order_is_strict() {
    let bin = FakeBin::start().await;
    bin.set_record(record_with(&[prediction(1, 1, Outcome::Won)]));
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let mut cached = default_document();
    cached.predictions = vec![prediction(2, 1, Outcome::Lost)];
    store.cache().store_document(&cached).await.unwrap();

    let loaded = store.first_available(CLOUD_TIERS).await.unwrap();
    assert_eq!(loaded.tier, Tier::Remote);

    let loaded = store.first_available(&[Tier::LocalCache, Tier::Remote]).await.unwrap();
    assert_eq!(loaded.tier, Tier::LocalCache);

    assert!(store.first_available(&[Tier::Snapshot]).await.is_none());
}

#[tokio::test]
async fn test_save_recomputes_stats_and_writes_both() {
    let bin = FakeBin::start().await;
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let mut doc = default_document();
    doc.predictions = vec![
        prediction(1, 1, Outcome::Won),
        prediction(2, 1, Outcome::Void),
        prediction(3, 2, Outcome::Pending),
    ];
    doc.stats = Stats { won: 99, lost: 99, pending: 99 };

    let outcome = store.save_document(doc).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Synced);
    assert!(outcome.is_success());

    let remote = bin.record().unwrap();
    assert_eq!(remote["stats"], json!({"won": 1, "lost": 0, "pending": 1}));
    let cached = store.cache().load_document().await.unwrap();
    assert_eq!(cached.stats, Stats { won: 1, lost: 0, pending: 1 });
}

#[tokio::test]
async fn test_failed_put_still_writes_cache_and_reports_failure() {
    let bin = FakeBin::start().await;
    bin.set_failing(true);
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let mut doc = default_document();
    doc.predictions = vec![prediction(1, 1, Outcome::Lost)];

    let outcome = store.save_document(doc).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::LocalOnly(_)));
    assert!(!outcome.is_success());
    assert_eq!(bin.put_count(), 0);

    let cached = store.cache().load_document().await.unwrap();
    assert_eq!(cached.predictions.len(), 1);
    assert_eq!(cached.stats.lost, 1);
}

#[tokio::test]
async fn test_unconfigured_bin_uses_cache_only() {
    let dir = tempdir().unwrap();
    let store = unconfigured_store(dir.path());

    assert_eq!(store.fetch_loaded().await.tier, Tier::Default);

    let outcome = store.append_prediction(prediction(5, 3, Outcome::Pending)).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Synced);

    let loaded = store.fetch_loaded().await;
    assert_eq!(loaded.tier, Tier::LocalCache);
    assert_eq!(loaded.document.predictions.len(), 1);
}

#[tokio::test]
async fn test_append_prepends() {
    let bin = FakeBin::start().await;
    bin.set_record(record_with(&[prediction(1, 1, Outcome::Won), prediction(2, 1, Outcome::Lost)]));
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let newest = prediction(3, 2, Outcome::Pending);
    store.append_prediction(newest.clone()).await.unwrap();

    let doc = store.fetch_document().await;
    assert_eq!(doc.predictions.len(), 3);
    assert_eq!(doc.predictions[0], newest);
    assert_eq!(doc.stats, Stats { won: 1, lost: 1, pending: 1 });
}

#[tokio::test]
async fn test_append_keeps_hand_edited_remote_records() {
    let bin = FakeBin::start().await;
    bin.set_record(json!({
        "predictions": [
            {"id": 1, "league_id": "1", "home_team": "Arsenal", "away_team": "Chelsea",
             "prediction": "Home Win", "odds": 0, "confidence": "certain", "result": "won"},
            {"id": "2", "league_id": 2, "home_team": "Getafe", "away_team": "Sevilla",
             "prediction": "Under 2.5", "odds": "1.85", "result": "lost", "is_vip": "1"}
        ],
        "leagues": [{"id": "1", "name": "Premier League"}, {"id": 2, "name": "La Liga"}],
        "stats": {"won": "1", "lost": 1, "pending": 0}
    }));
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let loaded = store.fetch_loaded().await;
    assert_eq!(loaded.tier, Tier::Remote);
    assert_eq!(loaded.document.predictions.len(), 2);

    let outcome = store.append_prediction(prediction(3, 1, Outcome::Pending)).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Synced);

    let record = bin.record().unwrap();
    assert_eq!(record["predictions"].as_array().unwrap().len(), 3);
    assert_eq!(record["leagues"], json!([{"id": 1, "name": "Premier League"}, {"id": 2, "name": "La Liga"}]));
    assert_eq!(record["stats"], json!({"won": 1, "lost": 1, "pending": 1}));
}

#[tokio::test]
async fn test_appends_from_one_store_are_serialized() {
    let bin = FakeBin::start().await;
    bin.set_record(record_with(&[]));
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let (a, b) = tokio::join!(
        store.append_prediction(prediction(1, 1, Outcome::Pending)),
        store.append_prediction(prediction(2, 1, Outcome::Pending)),
    );
    assert!(a.unwrap().is_success());
    assert!(b.unwrap().is_success());
    assert_eq!(store.fetch_document().await.predictions.len(), 2);
}

#[tokio::test]
async fn test_concurrent_clients_last_write_wins() {
    let bin = FakeBin::start().await;
    bin.set_record(record_with(&[prediction(1, 1, Outcome::Won)]));
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    let tab_a = cloud_store(&bin, dir_a.path());
    let tab_b = cloud_store(&bin, dir_b.path());

    // Both tabs read before either writes
    let mut doc_a = tab_a.fetch_document().await;
    let mut doc_b = tab_b.fetch_document().await;
    doc_a.predictions.insert(0, prediction(10, 1, Outcome::Pending));
    doc_b.predictions.insert(0, prediction(20, 2, Outcome::Pending));

    tab_a.save_document(doc_a).await.unwrap();
    tab_b.save_document(doc_b).await.unwrap();

    let final_doc = tab_a.fetch_document().await;
    let ids: Vec<String> = final_doc.predictions.iter().map(|p| p.id.to_string()).collect();
    assert_eq!(ids, vec!["20", "1"]);
}

#[tokio::test]
async fn test_replace_deletes_by_omission() {
    let bin = FakeBin::start().await;
    bin.set_record(record_with(&[
        prediction(1, 1, Outcome::Won),
        prediction(2, 1, Outcome::Lost),
        prediction(3, 1, Outcome::Pending),
    ]));
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    let kept: Vec<_> = store
        .get_predictions()
        .await
        .into_iter()
        .filter(|p| p.id.to_string() != "2")
        .collect();
    store.replace_predictions(kept).await.unwrap();

    let doc = store.fetch_document().await;
    assert_eq!(doc.predictions.len(), 2);
    assert_eq!(doc.stats, Stats { won: 1, lost: 0, pending: 1 });
    // Leagues from the stored document survive the rewrite
    assert_eq!(doc.leagues.len(), 2);
}

#[tokio::test]
async fn test_init_seeds_empty_bin_once() {
    let bin = FakeBin::start().await;
    let dir = tempdir().unwrap();
    let store = cloud_store(&bin, dir.path());

    assert_eq!(store.init().await.unwrap(), Some(SaveOutcome::Synced));
    let record = bin.record().unwrap();
    assert_eq!(record["leagues"].as_array().unwrap().len(), 7);
    assert_eq!(record["predictions"], json!([]));

    assert_eq!(store.init().await.unwrap(), None);
    assert_eq!(bin.put_count(), 1);
}

#[tokio::test]
async fn test_local_variant_imports_snapshot_once() {
    let dir = tempdir().unwrap();
    let snapshot = dir.path().join("predictions.json");
    std::fs::write(&snapshot, record_with(&[prediction(1, 1, Outcome::Won)]).to_string()).unwrap();
    let store = local_store(&dir.path().join("cache"), &snapshot);

    let first = store.fetch_loaded().await;
    assert_eq!(first.tier, Tier::Snapshot);
    assert_eq!(first.document.predictions.len(), 1);
    assert!(store.cache().get(PREDICTIONS_KEY).await.unwrap().is_some());
    assert!(store.cache().get(DOCUMENT_KEY).await.unwrap().is_none());

    // The seeded cache now answers, even if the snapshot goes away
    std::fs::remove_file(&snapshot).unwrap();
    let second = store.fetch_loaded().await;
    assert_eq!(second.tier, Tier::LocalCache);
    assert_eq!(second.document.stats, Stats { won: 1, lost: 0, pending: 0 });
}

#[tokio::test]
async fn test_local_init_imports_snapshot_instead_of_seeding() {
    let dir = tempdir().unwrap();
    let snapshot = dir.path().join("predictions.json");
    std::fs::write(
        &snapshot,
        record_with(&[prediction(1, 1, Outcome::Won), prediction(2, 3, Outcome::Pending)]).to_string(),
    )
    .unwrap();
    let store = local_store(&dir.path().join("cache"), &snapshot);

    assert_eq!(store.init().await.unwrap(), None);

    std::fs::remove_file(&snapshot).unwrap();
    let loaded = store.fetch_loaded().await;
    assert_eq!(loaded.tier, Tier::LocalCache);
    assert_eq!(loaded.document.predictions.len(), 2);
    assert_eq!(loaded.document.stats, Stats { won: 1, lost: 0, pending: 1 });
}

#[tokio::test]
async fn test_local_init_without_snapshot_seeds_empty_cache() {
    let dir = tempdir().unwrap();
    let store = local_store(dir.path(), &dir.path().join("absent.json"));

    assert_eq!(store.init().await.unwrap(), Some(SaveOutcome::Synced));
    assert_eq!(store.cache().get(PREDICTIONS_KEY).await.unwrap().as_deref(), Some("[]"));
    assert_eq!(store.fetch_loaded().await.tier, Tier::LocalCache);
}

#[tokio::test]
async fn test_local_variant_without_snapshot_is_empty() {
    let dir = tempdir().unwrap();
    let store = local_store(dir.path(), &dir.path().join("absent.json"));

    let loaded = store.fetch_loaded().await;
    assert_eq!(loaded.tier, Tier::Default);
    assert!(loaded.document.predictions.is_empty());
}

#[tokio::test]
async fn test_local_variant_save_is_success() {
    let dir = tempdir().unwrap();
    let store = local_store(dir.path(), &dir.path().join("absent.json"));

    let outcome = store.append_prediction(prediction(1, 4, Outcome::Pending)).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Synced);
    assert_eq!(store.init().await.unwrap(), None);
    assert_eq!(store.get_predictions().await.len(), 1);
}
