use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod config;
mod dashboard;
mod db;
mod error;
mod gate;
mod league;

use config::{Config, RetentionMode};
use dashboard::AppState;
use db::{Database, MatchStore};
use gate::PinGate;
use league::LeagueService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);
    let store: Arc<dyn MatchStore> = Arc::new(db);

    // Load the shared PIN for this session, seeding the store on first run
    let gate = Arc::new(PinGate::load(store.as_ref(), &config.admin_pin)?);

    let league = LeagueService::new(
        store.clone(),
        config.history_window,
        config.retention_mode,
        config.snapshot_cache,
    );
    info!(
        "League tracker ready: {} vs {}, window {}, mode {:?}",
        config.home_team, config.away_team, config.history_window, config.retention_mode
    );

    // Bounded mode: trim at startup and on a periodic sweep so an interrupted
    // purge is retried without waiting for the next add
    if config.retention_mode == RetentionMode::Bounded {
        let report = league.enforce_retention()?;
        if !report.is_complete() {
            warn!(
                "startup trim incomplete: {}/{} purged",
                report.purged, report.requested
            );
        }
        let sweep_league = league.clone();
        let sweep_interval = Duration::from_secs(config.sweep_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            loop {
                interval.tick().await;
                if let Err(e) = sweep_league.enforce_retention() {
                    warn!("retention sweep failed: {}", e);
                }
            }
        });
    }

    // Start the dashboard HTTP server
    let state = AppState {
        league,
        gate,
        store,
        home_team: config.home_team.clone(),
        away_team: config.away_team.clone(),
    };
    let app = dashboard::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
