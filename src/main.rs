// =============================================================================
// Short Scout — Main Entry Point
// =============================================================================
//
//   short-scout                              serve the REST API
//   short-scout run <YYYY-MM-DD> [long|short] run one analysis date and save
// =============================================================================

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use short_scout::api;
use short_scout::app_state::AppState;
use short_scout::providers::{BarIndex, JsonDirectorySink};
use short_scout::runtime_config::RuntimeConfig;
use short_scout::scoring::Direction;

const CONFIG_PATH: &str = "runtime_config.json";

enum Command {
    Serve,
    Run {
        date: NaiveDate,
        direction: Option<Direction>,
    },
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    match args {
        [] => Ok(Command::Serve),
        [cmd, rest @ ..] if cmd == "run" => {
            let (date, direction) = match rest {
                [date] => (date, None),
                [date, direction] => (date, Some(direction)),
                _ => bail!("usage: short-scout run <YYYY-MM-DD> [long|short]"),
            };
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("invalid analysis date '{date}'"))?;
            let direction = direction
                .map(|d| d.parse::<Direction>().map_err(anyhow::Error::msg))
                .transpose()?;
            Ok(Command::Run { date, direction })
        }
        [other, ..] => bail!("unknown command '{other}'; expected 'run' or no arguments"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    info!("Short Scout starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        let defaults = RuntimeConfig::default();
        if !Path::new(CONFIG_PATH).exists() {
            if let Err(e) = defaults.save(CONFIG_PATH) {
                warn!(error = %e, "Failed to write default config");
            }
        }
        defaults
    });
    config.apply_env_overrides();

    info!(
        candidates = config.candidates.len(),
        benchmark = %config.analysis.benchmark_symbol,
        direction = %config.direction,
        data_dir = %config.data_dir.display(),
        "Configuration ready"
    );

    // ── 2. Historical data, loaded once and read-only afterwards ─────────
    let index = BarIndex::load_json_dir(&config.data_dir)
        .context("failed to load historical bar index")?;
    info!(symbols = index.symbol_count(), "Historical bar index loaded");

    let sink = Arc::new(JsonDirectorySink::new(config.results_dir.clone()));
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, Arc::new(index), sink));

    // ── 3. One-shot run or API server ────────────────────────────────────
    match command {
        Command::Run { date, direction } => {
            let report = state.execute_run(date, direction).await?;
            for result in &report.results {
                info!(
                    symbol = %result.symbol,
                    final_score = result.final_score,
                    rs = result.relative_strength_score,
                    vol = result.volatility_score,
                    momentum = result.momentum_score,
                    trend = result.trend_score,
                    "scored"
                );
            }
            info!(run_id = %report.run_id, results = report.results.len(), "Run complete");
        }
        Command::Serve => {
            let app = api::router(state.clone());
            let listener = tokio::net::TcpListener::bind(&bind_addr)
                .await
                .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
            info!(addr = %bind_addr, "API server listening. Press Ctrl+C to stop.");

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!(error = %e, "Failed to listen for shutdown signal");
                    }
                    warn!("Shutdown signal received; stopping gracefully");
                })
                .await
                .context("API server failed")?;
        }
    }

    info!("Short Scout shut down complete.");
    Ok(())
}
