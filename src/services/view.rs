use serde::Serialize;

use crate::models::{Document, League, Prediction, Stats};
use crate::services::store::{Loaded, RecordStore, Tier};
use crate::utils::win_rate;

/// Selected league tab. `All` disables filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueFilter {
    #[default]
    All,
    League(u32),
}

impl std::str::FromStr for LeagueFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(LeagueFilter::All);
        }
        s.parse::<u32>()
            .map(LeagueFilter::League)
            .map_err(|_| format!("league filter must be 'all' or a league id, got '{}'", s))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    /// Degrade to the built-in demo dataset instead of an empty page.
    pub demo_fallback: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self { demo_fallback: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeagueTab {
    pub id: Option<u32>,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatCounters {
    pub won: u32,
    pub lost: u32,
    pub pending: u32,
    pub win_rate: u32,
}

impl From<Stats> for StatCounters {
    fn from(stats: Stats) -> Self {
        Self {
            won: stats.won,
            lost: stats.lost,
            pending: stats.pending,
            win_rate: win_rate(stats.won, stats.lost),
        }
    }
}

/// Snapshot of the document taken once per page load, plus the selected tab.
#[derive(Debug, Clone)]
pub struct ViewState {
    data: Document,
    source: Tier,
    selected: LeagueFilter,
}

impl ViewState {
    /// View tiers: the store's own chain, ending in demo data when enabled.
    pub fn tiers_for(store: &RecordStore, options: ViewOptions) -> Vec<Tier> {
        store
            .store_tiers()
            .iter()
            .map(|&t| if t == Tier::Default && options.demo_fallback { Tier::Demo } else { t })
            .collect()
    }

    pub async fn load(store: &RecordStore, options: ViewOptions) -> Self {
        let tiers = Self::tiers_for(store, options);
        let loaded = match store.first_available(&tiers).await {
            Some(loaded) => loaded,
            None => Loaded { document: crate::db::default_document(), tier: Tier::Default },
        };
        if loaded.tier == Tier::Demo {
            tracing::warn!("No stored predictions reachable, showing demo data");
        }
        Self::from_document(loaded.document, loaded.tier)
    }

    pub fn from_document(data: Document, source: Tier) -> Self {
        Self {
            data,
            source,
            selected: LeagueFilter::All,
        }
    }

    pub fn source(&self) -> Tier {
        self.source
    }

    pub fn selected(&self) -> LeagueFilter {
        self.selected
    }

    pub fn document(&self) -> &Document {
        &self.data
    }

    /// Switch tabs. Works on the in-memory snapshot only, never re-fetches.
    pub fn filter(self, selected: LeagueFilter) -> Self {
        Self { selected, ..self }
    }

    pub fn visible_predictions(&self) -> Vec<&Prediction> {
        filter_predictions(&self.data.predictions, self.selected)
    }

    /// "All" first, then one tab per league in document order.
    pub fn league_tabs(&self) -> Vec<LeagueTab> {
        let mut tabs = vec![LeagueTab {
            id: None,
            name: "All".to_string(),
            active: self.selected == LeagueFilter::All,
        }];
        tabs.extend(self.data.leagues.iter().map(|l: &League| LeagueTab {
            id: Some(l.id),
            name: l.name.clone(),
            active: self.selected == LeagueFilter::League(l.id),
        }));
        tabs
    }

    pub fn counters(&self) -> StatCounters {
        self.data.stats.into()
    }
}

pub fn filter_predictions(predictions: &[Prediction], selected: LeagueFilter) -> Vec<&Prediction> {
    match selected {
        LeagueFilter::All => predictions.iter().collect(),
        LeagueFilter::League(id) => predictions.iter().filter(|p| p.league_id == Some(id)).collect(),
    }
}
