use anyhow::{Context, Result};
use clap::Parser;
use review_service::{
    command::{self, Cli, ReportRequest},
    config::AppConfig,
    metrics_export, observability,
    ordering::OrderCache,
    report::ReviewEngine,
    store::PgReadingStore,
};
use sqlx::postgres::PgPoolOptions;
use std::{path::Path, sync::Arc};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Local wall-clock time. The local offset can only be read safely while the
/// process is single-threaded, so this runs before the runtime starts.
fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| {
        tracing::warn!("local UTC offset unavailable, using UTC for default dates");
        OffsetDateTime::now_utc()
    });
    PrimitiveDateTime::new(now.date(), now.time())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing();

    let now = local_now();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(run(cli.report, now))
}

async fn run(request: ReportRequest, now: PrimitiveDateTime) -> Result<()> {
    // Load configuration
    let cfg = AppConfig::load()?;

    if cfg.metrics.is_some() {
        metrics_export::init()?;
    }

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await
        .context("failed to connect to the reading store")?;

    let store = PgReadingStore::new(pool, cfg.database.cache_key());
    let engine = ReviewEngine::new(Arc::new(store), Arc::new(OrderCache::new()), cfg.station.clone());

    let report = command::execute(&engine, &request, now).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_export::write_textfile(Path::new(&metrics_cfg.textfile_path))?;
    }

    Ok(())
}
