use std::env;
use std::path::PathBuf;

use crate::utils::is_bin_configured;

pub const DEFAULT_BASE_URL: &str = "https://api.jsonbin.io/v3";

/// Which system of record the deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// Hosted JSON document is the source of truth, local cache is a backup.
    Cloud,
    /// Local cache is the source of truth, seeded from the bundled snapshot.
    Local,
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloud" | "remote" => Ok(Variant::Cloud),
            "local" | "local-only" | "local_only" => Ok(Variant::Local),
            other => Err(format!("unknown mode '{}' (cloud, local)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub bin_id: String,
    pub api_key: String,
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        is_bin_configured(&self.bin_id)
    }

    /// `<base>/b/<bin>`; reads go to `<endpoint>/latest`.
    pub fn endpoint(&self) -> String {
        format!("{}/b/{}", self.base_url.trim_end_matches('/'), self.bin_id)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub variant: Variant,
    pub remote: RemoteConfig,
    pub cache_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub public_dir: PathBuf,
}

impl Settings {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Self {
        let variant = match env::var("SCORESAGE_MODE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!("{}; falling back to cloud mode", e);
                Variant::Cloud
            }),
            Err(_) => Variant::Cloud,
        };

        Self {
            variant,
            remote: RemoteConfig {
                base_url: env::var("JSONBIN_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                bin_id: env::var("JSONBIN_BIN_ID").unwrap_or_default(),
                api_key: env::var("JSONBIN_API_KEY").unwrap_or_default(),
            },
            cache_dir: env::var("SCORESAGE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("../data/cache")),
            snapshot_path: env::var("SCORESAGE_SNAPSHOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("../public/predictions.json")),
            public_dir: env::var("SCORESAGE_PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("../public")),
        }
    }

    pub fn with_variant(mut self, variant: Option<Variant>) -> Self {
        if let Some(v) = variant {
            self.variant = v;
        }
        self
    }
}
