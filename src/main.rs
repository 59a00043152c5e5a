use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use scoresage::cli::{self, NewPrediction};
use scoresage::config::{Settings, Variant};
use scoresage::models::{Confidence, Outcome};
use scoresage::services::{ExportFormat, RecordStore};
use scoresage::{api, utils};

#[derive(Parser)]
#[command(name = "scoresage")]
#[command(about = "Football predictions site backed by a hosted JSON document")]
struct Cli {
    /// Override SCORESAGE_MODE
    #[arg(long, value_enum, global = true)]
    mode: Option<Variant>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server and serve the public page
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Show predictions the way the public page does
    Show {
        /// League id or name; defaults to all leagues
        #[arg(short, long)]
        league: Option<String>,
        /// Show an empty list instead of demo data when nothing loads
        #[arg(long)]
        no_demo: bool,
    },
    /// Show won/lost/pending counters and the win rate
    Stats,
    /// List leagues
    Leagues,
    /// Add a prediction (newest first)
    Add {
        #[arg(long)]
        league: String,
        #[arg(long)]
        home: String,
        #[arg(long)]
        away: String,
        /// YYYY-MM-DD, local time
        #[arg(long)]
        date: String,
        /// HH:MM, local time
        #[arg(long)]
        time: String,
        /// Tip text, e.g. "Over 2.5 Goals"
        #[arg(long)]
        tip: String,
        #[arg(long)]
        odds: f64,
        #[arg(long, default_value = "medium")]
        confidence: Confidence,
        #[arg(long)]
        vip: bool,
        #[arg(long)]
        analysis: Option<String>,
        /// Explicit id; a random one is assigned otherwise
        #[arg(long)]
        id: Option<String>,
    },
    /// Settle a prediction
    SetResult {
        #[arg(long)]
        id: String,
        #[arg(long)]
        result: Outcome,
    },
    /// Delete a prediction
    Remove {
        #[arg(long)]
        id: String,
    },
    /// Export the local cache for publishing as the static snapshot
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
    },
    /// Create the document with the default leagues if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().with_variant(cli.mode);

    if settings.variant == Variant::Cloud && !utils::is_bin_configured(&settings.remote.bin_id) {
        tracing::warn!("JSONBIN_BIN_ID not configured, using the local cache only");
    }

    let store = RecordStore::new(&settings);

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting ScoreSage API server on port {}", port);
            api::serve(settings, port).await?;
        }
        Some(Commands::Show { league, no_demo }) => {
            cli::show_predictions(&store, league.as_deref(), !no_demo).await?;
        }
        Some(Commands::Stats) => {
            cli::show_stats(&store).await?;
        }
        Some(Commands::Leagues) => {
            cli::show_leagues(&store).await?;
        }
        Some(Commands::Add { league, home, away, date, time, tip, odds, confidence, vip, analysis, id }) => {
            tracing::info!("Adding prediction: {} vs {}", home, away);
            let input = NewPrediction {
                id,
                league,
                home_team: home,
                away_team: away,
                match_date: date,
                match_time: time,
                prediction: tip,
                odds,
                confidence,
                vip,
                analysis,
            };
            cli::add_prediction(&store, input).await?;
        }
        Some(Commands::SetResult { id, result }) => {
            cli::set_result(&store, &id, result).await?;
        }
        Some(Commands::Remove { id }) => {
            cli::remove_prediction(&store, &id).await?;
        }
        Some(Commands::Export { out, format }) => {
            cli::export(&store, out, format).await?;
        }
        Some(Commands::Init) => {
            tracing::info!("Initializing document...");
            cli::init(&store).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting ScoreSage API server on port 3000");
            api::serve(settings, 3000).await?;
        }
    }

    Ok(())
}
