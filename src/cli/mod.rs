use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use strsim::jaro_winkler;

use crate::models::{Confidence, League, Outcome, Prediction, PredictionId};
use crate::services::{
    default_export_path, export_snapshot, ExportFormat, LeagueFilter, RecordStore, SaveOutcome, Tier,
    ViewOptions, ViewState,
};
use crate::utils::{
    format_kickoff, team_initials, validate_match_date, validate_match_time, validate_odds, validate_team_name,
};

/// Resolve a league argument given as an id or a (possibly misspelled) name.
pub fn resolve_league<'a>(leagues: &'a [League], raw: &str) -> Option<&'a League> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u32>() {
        return leagues.iter().find(|l| l.id == id);
    }

    let wanted = raw.to_lowercase();
    if let Some(exact) = leagues.iter().find(|l| l.name.to_lowercase() == wanted) {
        return Some(exact);
    }

    leagues
        .iter()
        .map(|l| (l, jaro_winkler(&l.name.to_lowercase(), &wanted)))
        .filter(|(_, score)| *score >= 0.85)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(l, _)| l)
}

/// Terminal rendition of one prediction card.
pub fn render_card(pred: &Prediction) -> String {
    let level = pred.confidence.level();
    let dots: String = (1..=4).map(|i| if i <= level { '●' } else { '○' }).collect();
    let vip = if pred.is_vip { "👑 VIP  " } else { "" };

    let mut card = format!(
        "┌ {} │ {}{}\n│ [{}] {}  vs  {} [{}]\n│ Prediction: {}\n│ Odds: {:.2}   Confidence: {}   Status: {}\n",
        pred.league_name.as_deref().unwrap_or("Football"),
        vip,
        format_kickoff(&pred.match_date, &pred.match_time),
        team_initials(&pred.home_team),
        pred.home_team,
        pred.away_team,
        team_initials(&pred.away_team),
        pred.prediction,
        pred.odds,
        dots,
        pred.result.label(),
    );
    if let Some(analysis) = pred.analysis.as_deref().filter(|a| !a.trim().is_empty()) {
        card.push_str(&format!("│ {}\n", analysis));
    }
    card.push_str(&format!("└ #{}", pred.id));
    card
}

pub async fn show_predictions(store: &RecordStore, league: Option<&str>, demo_fallback: bool) -> Result<()> {
    let view = ViewState::load(store, ViewOptions { demo_fallback }).await;

    let filter = match league {
        None => LeagueFilter::All,
        Some(raw) if raw.trim().eq_ignore_ascii_case("all") => LeagueFilter::All,
        Some(raw) => match resolve_league(&view.document().leagues, raw) {
            Some(l) => LeagueFilter::League(l.id),
            // Unknown ids filter to nothing, unknown names are a typo
            None => match raw.parse::<LeagueFilter>() {
                Ok(filter) => filter,
                Err(_) => {
                    println!("❌ Unknown league '{}'. Use 'scoresage leagues' to list them.", raw);
                    return Ok(());
                }
            },
        },
    };
    let view = view.filter(filter);

    if view.source() == Tier::Demo {
        println!("⚠️  Showing demo predictions, no stored data could be loaded.\n");
    }

    let tabs: Vec<String> = view
        .league_tabs()
        .into_iter()
        .map(|t| if t.active { format!("[{}]", t.name) } else { t.name })
        .collect();
    println!("🏆 {}\n", tabs.join(" · "));

    let visible = view.visible_predictions();
    if visible.is_empty() {
        println!("📭 No predictions for this league yet.");
    } else {
        for pred in visible {
            println!("{}\n", render_card(pred));
        }
    }

    print_counters(&view);
    Ok(())
}

pub async fn show_stats(store: &RecordStore) -> Result<()> {
    let view = ViewState::load(store, ViewOptions::default()).await;
    print_counters(&view);
    Ok(())
}

fn print_counters(view: &ViewState) {
    let c = view.counters();
    println!("📊 Won: {} | Lost: {} | Pending: {} | Win rate: {}%", c.won, c.lost, c.pending, c.win_rate);
}

pub async fn show_leagues(store: &RecordStore) -> Result<()> {
    let doc = store.fetch_document().await;
    println!("🏆 Leagues:\n");
    for league in &doc.leagues {
        let count = doc.predictions.iter().filter(|p| p.league_id == Some(league.id)).count();
        println!("   {}. {} ({} predictions)", league.id, league.name, count);
    }
    Ok(())
}

/// Admin form input, before it becomes a stored Prediction.
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub id: Option<String>,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub match_date: String,
    pub match_time: String,
    pub prediction: String,
    pub odds: f64,
    pub confidence: Confidence,
    pub vip: bool,
    pub analysis: Option<String>,
}

impl NewPrediction {
    pub fn into_prediction(self, leagues: &[League]) -> Result<Prediction> {
        if !validate_team_name(&self.home_team) || !validate_team_name(&self.away_team) {
            bail!("team names must be non-empty and at most 100 characters");
        }
        if self.prediction.trim().is_empty() {
            bail!("prediction text is required");
        }
        if !validate_odds(self.odds) {
            bail!("odds must be positive, got {}", self.odds);
        }
        if !validate_match_date(&self.match_date) {
            bail!("match date must be YYYY-MM-DD, got '{}'", self.match_date);
        }
        if !validate_match_time(&self.match_time) {
            bail!("match time must be HH:MM, got '{}'", self.match_time);
        }
        let league = resolve_league(leagues, &self.league)
            .ok_or_else(|| anyhow!("unknown league '{}'", self.league))?;

        Ok(Prediction {
            id: self.id.as_deref().map(PredictionId::from).unwrap_or_else(PredictionId::new_random),
            league_id: Some(league.id),
            league_name: Some(league.name.clone()),
            home_team: self.home_team.trim().to_string(),
            away_team: self.away_team.trim().to_string(),
            match_date: self.match_date,
            match_time: self.match_time,
            prediction: self.prediction.trim().to_string(),
            odds: self.odds,
            confidence: self.confidence,
            result: Outcome::Pending,
            is_vip: self.vip,
            analysis: self.analysis.filter(|a| !a.trim().is_empty()),
        })
    }
}

fn report_save(outcome: &SaveOutcome, what: &str) {
    match outcome {
        SaveOutcome::Synced => println!("✅ {}", what),
        SaveOutcome::LocalOnly(reason) => {
            println!("⚠️  {} locally only, the remote save failed: {}", what, reason)
        }
    }
}

pub async fn add_prediction(store: &RecordStore, input: NewPrediction) -> Result<SaveOutcome> {
    let leagues = store.fetch_document().await.leagues;
    let prediction = input.into_prediction(&leagues)?;
    let label = format!("Added {} vs {}", prediction.home_team, prediction.away_team);

    let outcome = store.append_prediction(prediction).await?;
    report_save(&outcome, &label);
    Ok(outcome)
}

pub async fn set_result(store: &RecordStore, id: &str, result: Outcome) -> Result<SaveOutcome> {
    let mut predictions = store.get_predictions().await;
    let pred = predictions
        .iter_mut()
        .find(|p| p.id.matches(id))
        .ok_or_else(|| anyhow!("no prediction with id {}", id))?;
    pred.result = result;
    let label = format!("Marked {} vs {} as {}", pred.home_team, pred.away_team, result.label());

    let outcome = store.replace_predictions(predictions).await?;
    report_save(&outcome, &label);
    Ok(outcome)
}

pub async fn remove_prediction(store: &RecordStore, id: &str) -> Result<SaveOutcome> {
    let predictions = store.get_predictions().await;
    let before = predictions.len();
    let kept: Vec<Prediction> = predictions.into_iter().filter(|p| !p.id.matches(id)).collect();
    if kept.len() == before {
        bail!("no prediction with id {}", id);
    }

    let outcome = store.replace_predictions(kept).await?;
    report_save(&outcome, &format!("Removed prediction {}", id));
    Ok(outcome)
}

pub async fn export(store: &RecordStore, out: Option<PathBuf>, format: ExportFormat) -> Result<()> {
    let out = out.unwrap_or_else(|| default_export_path(std::path::Path::new("../data/exports"), format));
    let summary = export_snapshot(store.cache(), store.variant(), &out, format).await?;
    println!("📦 Exported {} predictions to {}", summary.rows, summary.path.display());
    println!("💡 Copy it over the served predictions.json to publish these edits.");
    Ok(())
}

pub async fn init(store: &RecordStore) -> Result<()> {
    match store.init().await? {
        Some(outcome) => report_save(&outcome, "Initialized document with the default leagues"),
        None => println!("📋 A document already exists, left untouched."),
    }
    Ok(())
}
