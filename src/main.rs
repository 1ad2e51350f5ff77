//! SHARPLINE: Sports Edge Detection & Valuation Engine
//!
//! Entry point. Loads configuration and an input snapshot, runs one scan,
//! and prints the JSON report to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use sharpline::config::AppConfig;
use sharpline::data::snapshot::Snapshot;
use sharpline::data::Sources;
use sharpline::engine::EdgeEngine;

const DEFAULT_CONFIG: &str = "config.toml";
const DEFAULT_SNAPSHOT: &str = "snapshot.json";

fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = AppConfig::env_or("SHARPLINE_CONFIG", DEFAULT_CONFIG);
    let cfg = if Path::new(&config_path).exists() {
        AppConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "Config file not found, using defaults");
        AppConfig::default()
    };

    info!(
        bankroll = %cfg.engine.bankroll,
        currency = %cfg.engine.currency,
        risk_cap = cfg.engine.risk_cap,
        home_field = cfg.rating.home_field_advantage,
        "SHARPLINE starting up"
    );

    let snapshot_path = AppConfig::env_or("SHARPLINE_SNAPSHOT", DEFAULT_SNAPSHOT);
    let snapshot = Snapshot::load(&snapshot_path)?;

    let engine = EdgeEngine::from_config(&cfg);
    let report = engine.run(&snapshot.games, &Sources::from_snapshot(&snapshot));

    let json = serde_json::to_string_pretty(&report).context("Failed to serialise scan report")?;
    println!("{json}");

    for edge in report.edges.iter().take(5) {
        info!(edge = %edge, "Top edge");
    }
    for failure in &report.failures {
        warn!(game_id = %failure.game_id, error = %failure.message, "Unscored game");
    }

    info!(
        scored = report.games_scored,
        failed = report.games_failed,
        edges = report.edges.len(),
        suppressed = report.suppressed.len(),
        staked = %report.total_staked(),
        currency = %cfg.engine.currency,
        "SHARPLINE finished"
    );

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sharpline=info"));

    let json_logging = std::env::var("SHARPLINE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
