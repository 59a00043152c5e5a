use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The single persisted object: every prediction, the league reference list
/// and the derived stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub predictions: Vec<Prediction>,
    pub leagues: Vec<League>,
    pub stats: Stats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    #[serde(deserialize_with = "lenient_league_ref")]
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub won: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub lost: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub pending: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: PredictionId,
    #[serde(default, deserialize_with = "lenient_league_id", skip_serializing_if = "Option::is_none")]
    pub league_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_name: Option<String>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub match_date: String, // "YYYY-MM-DD", local wall clock
    #[serde(default)]
    pub match_time: String, // "HH:MM[:SS]", local wall clock
    pub prediction: String,
    #[serde(default, deserialize_with = "lenient_odds")]
    pub odds: f64, // stored as found; admin input is checked for > 0
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub result: Outcome,
    #[serde(default, with = "vip_flag")]
    pub is_vip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// Caller-assigned identifier. Kept as whichever JSON type it arrived as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionId {
    Number(u64),
    Text(String),
}

impl PredictionId {
    pub fn new_random() -> Self {
        PredictionId::Text(uuid::Uuid::new_v4().to_string())
    }

    /// Loose comparison against user input, so `42` matches both `42` and `"42"`.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            PredictionId::Number(n) => raw.trim().parse::<u64>().map_or(false, |r| r == *n),
            PredictionId::Text(s) => s == raw.trim(),
        }
    }
}

impl fmt::Display for PredictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionId::Number(n) => write!(f, "{}", n),
            PredictionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PredictionId {
    fn from(raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(n) => PredictionId::Number(n),
            Err(_) => PredictionId::Text(raw.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
}

impl Confidence {
    /// Dot count on the card, 1..=4.
    pub fn level(self) -> u8 {
        match self {
            Confidence::Low => 1,
            Confidence::Medium => 2,
            Confidence::High => 3,
            Confidence::VeryHigh => 4,
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            "very_high" => Ok(Confidence::VeryHigh),
            other => Err(format!("unknown confidence '{}' (low, medium, high, very_high)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    Won,
    Lost,
    Void,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Won => "✓ Won",
            Outcome::Lost => "✗ Lost",
            Outcome::Pending => "⏳ Pending",
            Outcome::Void => "⊘ Void",
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Outcome::Pending),
            "won" => Ok(Outcome::Won),
            "lost" => Ok(Outcome::Lost),
            "void" => Ok(Outcome::Void),
            other => Err(format!("unknown result '{}' (pending, won, lost, void)", other)),
        }
    }
}

// Lenient field readers. Stored documents are hand-edited, so a single odd
// value falls back to a default instead of rejecting the whole document.

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
    Flag(bool),
    Other(de::IgnoredAny),
}

impl NumberOrText {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(n) => Some(*n).filter(|n| n.is_finite()),
            NumberOrText::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    fn as_u32(&self) -> Option<u32> {
        self.as_f64()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX))
            .map(|n| n as u32)
    }
}

fn lenient_league_id<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.and_then(|v| v.as_u32()))
}

/// League ids in the reference list must still be numeric, but `"1"` is fine.
fn lenient_league_ref<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrText::deserialize(deserializer)?
        .as_u32()
        .ok_or_else(|| de::Error::custom("league id must be a non-negative integer"))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?
        .and_then(|v| v.as_u32())
        .unwrap_or(0))
}

fn lenient_odds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Text(s)) => Some(s),
        _ => None,
    })
}

/// Unknown confidence shows as medium, like a missing one.
impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient_text(deserializer)?
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// Unknown results read as pending.
impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient_text(deserializer)?
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// VIP is stored as `0`/`1` but older documents carry booleans or strings.
mod vip_flag {
    use super::*;

    pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*flag))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(false),
            Some(NumberOrText::Flag(b)) => Ok(b),
            Some(NumberOrText::Number(n)) => Ok(n != 0.0),
            Some(NumberOrText::Text(s)) => Ok(matches!(s.trim(), "1" | "true")),
            Some(NumberOrText::Other(_)) => Ok(false),
        }
    }
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }

    /// Carries data but still reports failure, e.g. a save that only reached the local cache.
    pub fn partial(data: T, message: String) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
