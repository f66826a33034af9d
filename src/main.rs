use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing::{debug, info, warn};

mod api;
mod config;
mod db;
mod nrr;
mod standings;

use api::AppState;
use config::Config;
use db::Database;
use nrr::rate::format_nrr;
use standings::{seed, StandingsSnapshot};

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

    // Open the standings store
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    // Seed the table on first start, or when asked to
    if config.reseed || db.standings_count()? == 0 {
        let teams = match &config.standings_file {
            Some(path) => seed::load_file(path)?,
            None => seed::default_table()?,
        };
        // validate before anything is written
        StandingsSnapshot::new(teams.clone())?;
        db.replace_standings(&teams)?;
        info!(
            "Seeded {} team(s) from {}",
            teams.len(),
            config.standings_file.as_deref().unwrap_or("built-in table")
        );
    }

    let snapshot = db.load_snapshot()?;
    if snapshot.is_empty() {
        warn!("Points table is empty; every calculation will be rejected");
    }
    for position in 1..=snapshot.len() {
        let row = snapshot.team_at(position)?;
        info!(
            "{:>2}. {:<30} {:>2} pts  NRR {}",
            position,
            row.team(),
            row.points(),
            format_nrr(row.nrr())
        );
    }
    debug!("Table order: {}", snapshot.ranking().join(" > "));

    let app = api::router(AppState { db });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("NRR calculator listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run the API server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
