mod cli;

use anyhow::{Context, Result};
use cli::CollectorSelection;
use scout_api::ScoutClient;
use scout_ingest_core::{
    AccountUsageCollector, CheckpointStore, ConnectorResult, FileCheckpointStore,
    IndicatorCollector, IndicatorKind, IngestionForwarder, RunSummary,
};
use scout_sink::LogAnalyticsSink;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = cli::parse_args();
    if args.past_due {
        info!("the timer trigger fired past its schedule");
    }

    let config = scout_config::load_config(&args.config_path)
        .with_context(|| format!("failed to load config {}", args.config_path.display()))?;

    let client = ScoutClient::new(&config.api).context("failed to construct api client")?;
    let sink = LogAnalyticsSink::new(config.sink.clone()).context("failed to construct log sink")?;
    let forwarder = IngestionForwarder::new(Arc::new(sink));
    let store: Arc<dyn CheckpointStore> =
        Arc::new(FileCheckpointStore::new(&config.ingest.state_dir));

    // Watchlist queries run against the log workspace's own query API and
    // are wired in by the hosting environment; the standalone binary
    // processes the static indicator lists only.
    let selection = args.selection;

    if matches!(selection, CollectorSelection::Ip | CollectorSelection::All) {
        let collector = IndicatorCollector::new(
            &config,
            IndicatorKind::Ip,
            client.clone(),
            store.clone(),
            forwarder.clone(),
            None,
        )?;
        run_timed("ip", collector.run()).await?;
    }

    if matches!(selection, CollectorSelection::Domain | CollectorSelection::All) {
        let collector = IndicatorCollector::new(
            &config,
            IndicatorKind::Domain,
            client.clone(),
            store.clone(),
            forwarder.clone(),
            None,
        )?;
        run_timed("domain", collector.run()).await?;
    }

    if matches!(
        selection,
        CollectorSelection::AccountUsage | CollectorSelection::All
    ) {
        let collector = AccountUsageCollector::new(&config, client.clone(), forwarder.clone())?;
        run_timed("account usage", collector.run()).await?;
    }

    Ok(())
}

async fn run_timed<F>(label: &str, run: F) -> Result<()>
where
    F: Future<Output = ConnectorResult<RunSummary>>,
{
    let started = Instant::now();
    let summary = run
        .await
        .with_context(|| format!("{label} collector run failed"))?;
    info!(
        "time taken to ingest {label} data is {:.3}s ({} api calls, {} records forwarded)",
        started.elapsed().as_secs_f64(),
        summary.api_calls,
        summary.records_forwarded
    );
    Ok(())
}
