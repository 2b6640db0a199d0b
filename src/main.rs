//! nutriwatch - Food Nutrient Severity Classifier
//!
//! Fetches a food's nutrient report from the USDA catalog and prints
//! its severity tier.
//!
//! # Usage
//!
//! ```bash
//! # Classify a food by NDB number
//! nutriwatch 01009 --api-key <KEY>
//!
//! # With custom cut points
//! nutriwatch 01009 --yellow-level 5 --red-level 15
//! ```
//!
//! # Environment Variables
//!
//! - `USDA_API_KEY`: Catalog API key (same as `--api-key`)
//! - `NUTRIWATCH_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use nutriwatch::{AppConfig, Food, FoodPipeline, Tier, UsdaClient};

#[derive(Parser, Debug)]
#[command(name = "nutriwatch")]
#[command(about = "Classify a food's nutrient severity via the USDA catalog")]
#[command(version)]
struct CliArgs {
    /// NDB number of the food to classify
    food_id: String,

    /// Catalog API key
    #[arg(long, env = "USDA_API_KEY")]
    api_key: Option<String>,

    /// Override the catalog base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the green → yellow cut point
    #[arg(long)]
    yellow_level: Option<f64>,

    /// Override the yellow → red cut point
    #[arg(long)]
    red_level: Option<f64>,

    /// Path to a TOML config file (overrides the default search order)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if let Some(api_key) = args.api_key {
        config.catalog.api_key = api_key;
    }
    if let Some(base_url) = args.base_url {
        config.catalog.base_url = base_url;
    }
    if let Some(yellow_level) = args.yellow_level {
        config.thresholds.yellow_level = yellow_level;
    }
    if let Some(red_level) = args.red_level {
        config.thresholds.red_level = red_level;
    }

    let client = UsdaClient::new(&config.catalog);
    info!("Catalog: {}", client.base_url());

    let pipeline = FoodPipeline::new(Arc::new(client), config.thresholds.clone());
    let channels = pipeline.channels();
    let mut green = channels.green.subscribe();
    let mut yellow = channels.yellow.subscribe();
    let mut red = channels.red.subscribe();
    let mut unknown = channels.unknown.subscribe();
    let mut progress = channels.progress.subscribe();
    let mut error = channels.error.subscribe();

    pipeline.fetch(&args.food_id);

    // A swallowed parse failure produces no emission at all, so cap the
    // wait a little beyond the transport timeout.
    let deadline = Duration::from_secs(config.catalog.timeout_secs + 5);
    let timeout = tokio::time::sleep(deadline);
    tokio::pin!(timeout);

    loop {
        tokio::select! {
            Some(food) = green.recv() => {
                report(Tier::Green, &food);
                break;
            }
            Some(food) = yellow.recv() => {
                report(Tier::Yellow, &food);
                break;
            }
            Some(food) = red.recv() => {
                report(Tier::Red, &food);
                break;
            }
            Some(food) = unknown.recv() => {
                report(Tier::Unknown, &food);
                break;
            }
            Some(err) = error.recv() => {
                pipeline.cleanup();
                bail!("{err}");
            }
            Some(in_progress) = progress.recv() => {
                debug!("[Host] progress = {}", in_progress);
            }
            () = &mut timeout => {
                pipeline.cleanup();
                bail!(
                    "no classification for {} within {:?} — the nutrient value may be unparsable (see logs)",
                    args.food_id, deadline,
                );
            }
        }
    }

    Ok(())
}

fn report(tier: Tier, food: &Food) {
    println!("{} [{}] {} ({})", tier, food.ndbno, food.name, food.measure);
    if let Some(nutrient) = food.nutrients.first() {
        println!("  {nutrient}");
    }
}
