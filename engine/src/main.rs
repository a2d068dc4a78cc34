//! Surgical Inventory Report
//!
//! Loads a JSON snapshot and prints the dashboard and analytics reports as
//! JSON. Usage: `sit-report [snapshot.json]`

use std::{env, fs};

use anyhow::Context;
use serde::Serialize;
use shared::{
    AnalyticsSummary, CategoryBreakdown, DashboardStats, DeadStockEntry, Role,
    SurgeonPortfolioEntry, SurgeryProfitability,
};
use surgical_inventory_engine::{Config, Engine, Session, Snapshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Serialize)]
struct Report {
    dashboard: DashboardStats,
    categories: Vec<CategoryBreakdown>,
    summary: AnalyticsSummary,
    dead_stock: Vec<DeadStockEntry>,
    surgeon_portfolio: Vec<SurgeonPortfolioEntry>,
    surgeries: Vec<SurgeryProfitability>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "surgical_inventory_engine=info,sit_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Environment: {}", config.environment);

    let snapshot = match env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading snapshot from {}", path);
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read snapshot {}", path))?;
            serde_json::from_str::<Snapshot>(&raw)
                .with_context(|| format!("invalid snapshot {}", path))?
        }
        None => {
            tracing::warn!("No snapshot given, reporting on an empty store");
            Snapshot::default()
        }
    };

    let engine = Engine::from_snapshot(config, snapshot)?;
    let session = Session::new(Uuid::nil(), "sit-report", Role::Stakeholder);

    let report = Report {
        dashboard: engine.analytics.dashboard(&session)?,
        categories: engine.analytics.inventory_by_category(&session)?,
        summary: engine.analytics.analytics_summary(&session, None)?,
        dead_stock: engine.analytics.dead_stock_report(&session, None)?,
        surgeon_portfolio: engine.analytics.surgeon_portfolio(&session)?,
        surgeries: engine.analytics.surgery_profitability(&session)?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
