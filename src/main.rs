// CPR engine entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries the JSON snapshot)
// 2. Load config
// 3. Open the snapshot store
// 4. Wire the CSV data provider and orchestrator
// 5. Compute (or serve) the requested snapshot
// 6. Print the snapshot as JSON on stdout

use cpr_engine::config;
use cpr_engine::ingest::CsvFileProvider;
use cpr_engine::orchestrator::Orchestrator;
use cpr_engine::store::SnapshotStore;

use anyhow::{bail, Context};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not the terminal)
    init_tracing()?;
    info!("CPR engine starting up");

    // Usage: cpr <week> [--force]
    let mut week: Option<u16> = None;
    let mut force_refresh = false;
    for arg in std::env::args().skip(1) {
        if arg == "--force" {
            force_refresh = true;
        } else if week.is_none() {
            week = Some(
                arg.parse()
                    .with_context(|| format!("invalid week argument: {arg}"))?,
            );
        } else {
            bail!("unexpected argument: {arg}\nusage: cpr <week> [--force]");
        }
    }
    let Some(week) = week else {
        bail!("missing week argument\nusage: cpr <week> [--force]");
    };

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season={}, {} teams",
        config.league.league_id, config.league.season, config.league.num_teams
    );

    // 3. Open the snapshot store
    let store = Arc::new(
        SnapshotStore::open(&config.db_path).context("failed to open snapshot store")?,
    );
    info!("Snapshot store opened at {}", config.db_path);

    // 4. Wire the provider and orchestrator
    let provider = Arc::new(CsvFileProvider::new(config.data_paths.clone()));
    let league_id = config.league.league_id.clone();
    let season = config.league.season;
    let orchestrator = Orchestrator::new(config, store, provider);

    // 5. Compute (or serve) the snapshot
    let snapshot = orchestrator
        .compute_snapshot(&league_id, season, week, force_refresh)
        .await
        .context("failed to produce snapshot")?;
    info!(
        "Snapshot ready: {} teams, source={}, health={:.3}",
        snapshot.rankings.len(),
        snapshot.source,
        snapshot.league_health
    );

    // 6. Emit the snapshot on stdout
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}

/// Initialize tracing to log to a file, keeping stdout clean for the
/// JSON snapshot output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("cpr-engine.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cpr_engine=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
