use crate::checkpoint::CheckpointStore;
use crate::diff::unseen_suffix;
use crate::error::{ConnectorError, ConnectorResult};
use crate::forward::IngestionForwarder;
use crate::model::{Indicator, IndicatorKind, IngestionBatch, RunSummary};
use crate::watchlist::WatchlistSource;
use scout_api::{ApiError, ScoutClient};
use scout_config::{AppConfig, TablesConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

const ACCOUNT_USAGE_ENDPOINT: &str = "/api/scout/usage";
const DOMAIN_SEARCH_ENDPOINT: &str = "/api/scout/search";

fn ip_details_endpoint(ip: &str) -> String {
    format!("/api/scout/ip/{ip}/details")
}

/// Checks every setting the connector needs before any network call is
/// made. Each missing field is error-logged by name so an operator can fix
/// the whole configuration in one pass.
fn validate_config(cfg: &AppConfig) -> ConnectorResult<()> {
    let mut required: Vec<(&str, &str)> = vec![
        ("api.base_url", cfg.api.base_url.as_str()),
        ("sink.workspace_id", cfg.sink.workspace_id.as_str()),
        ("sink.shared_key", cfg.sink.shared_key.as_str()),
        ("tables.ip", cfg.tables.ip.as_str()),
        ("tables.ip_foundation", cfg.tables.ip_foundation.as_str()),
        ("tables.domain", cfg.tables.domain.as_str()),
        ("tables.account_usage", cfg.tables.account_usage.as_str()),
        ("ingest.state_dir", cfg.ingest.state_dir.as_str()),
    ];

    match cfg.api.auth_type.to_ascii_lowercase().as_str() {
        "api_key" => required.push(("api.api_key", cfg.api.api_key.as_str())),
        "basic" => {
            required.push(("api.username", cfg.api.username.as_str()));
            required.push(("api.password", cfg.api.password.as_str()));
        }
        other => {
            return Err(ConnectorError::Configuration(format!(
                "unsupported auth_type \"{other}\"; expected \"api_key\" or \"basic\""
            )));
        }
    }

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        debug!("all required settings are present in the configuration");
        return Ok(());
    }

    for name in &missing {
        error!("\"{name}\" is not set in the configuration; set it and rerun the connector");
    }
    Err(ConnectorError::Configuration(format!(
        "required fields missing: {}",
        missing.join(", ")
    )))
}

/// Splits a comma-separated input list into validated indicators. Invalid
/// entries are dropped (and debug-logged by `Indicator::new`), not fatal.
fn parse_static_values(kind: IndicatorKind, raw: &str) -> Vec<Indicator> {
    raw.split(',')
        .filter(|piece| !piece.trim().is_empty())
        .filter_map(|piece| Indicator::new(kind, piece))
        .collect()
}

/// Compact per-IP record for the foundation table: the response's summary
/// object when present, always carrying the queried ip.
fn foundation_record(ip: &str, details: &Value) -> Value {
    let mut record = match details.get("summary") {
        Some(Value::Object(fields)) => Value::Object(fields.clone()),
        _ => json!({}),
    };
    if let Value::Object(fields) = &mut record {
        fields.entry("ip".to_string()).or_insert_with(|| json!(ip));
    }
    record
}

/// Driver for one indicator kind (IP or domain). Each run fetches the
/// static input list plus the unseen watchlist suffix, forwards the
/// accumulated batch, then advances the checkpoint, in that order; a
/// failed run never certifies progress past unforwarded items.
pub struct IndicatorCollector {
    kind: IndicatorKind,
    client: ScoutClient,
    store: Arc<dyn CheckpointStore>,
    forwarder: IngestionForwarder,
    watchlist: Option<Arc<dyn WatchlistSource>>,
    static_input: String,
    tables: TablesConfig,
}

impl std::fmt::Debug for IndicatorCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorCollector")
            .field("kind", &self.kind)
            .field("static_input", &self.static_input)
            .field("tables", &self.tables)
            .field("has_watchlist", &self.watchlist.is_some())
            .finish_non_exhaustive()
    }
}

impl IndicatorCollector {
    /// Fails fast with `ConnectorError::Configuration` before any network
    /// call when a required setting is missing.
    pub fn new(
        cfg: &AppConfig,
        kind: IndicatorKind,
        client: ScoutClient,
        store: Arc<dyn CheckpointStore>,
        forwarder: IngestionForwarder,
        watchlist: Option<Arc<dyn WatchlistSource>>,
    ) -> ConnectorResult<Self> {
        validate_config(cfg)?;

        let static_input = match kind {
            IndicatorKind::Ip => cfg.ingest.ip_values.clone(),
            IndicatorKind::Domain => cfg.ingest.domain_values.clone(),
        };

        Ok(Self {
            kind,
            client,
            store,
            forwarder,
            watchlist,
            static_input,
            tables: cfg.tables.clone(),
        })
    }

    pub async fn run(&self) -> ConnectorResult<RunSummary> {
        let mut indicators = parse_static_values(self.kind, &self.static_input);
        debug!(
            "{} static input values to fetch: {}",
            self.kind,
            indicators.len()
        );

        // Last unseen watchlist value included in this run's batch; the
        // checkpoint may only ever move here, and only after forwarding.
        let mut checkpoint_candidate: Option<String> = None;

        if let Some(source) = &self.watchlist {
            let snapshot = match source.snapshot(self.kind).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    error!("aborting {} run: {err}", self.kind);
                    return Err(err.into());
                }
            };

            let checkpoint = match self.store.get(self.kind) {
                Ok(value) => value,
                Err(err) => {
                    error!("aborting {} run: {err}", self.kind);
                    return Err(err.into());
                }
            };
            debug!("last {} checkpoint: {checkpoint:?}", self.kind);

            let suffix = unseen_suffix(&snapshot, checkpoint.as_deref());
            debug!(
                "{} watchlist snapshot holds {} values, {} unseen since last run",
                self.kind,
                snapshot.len(),
                suffix.len()
            );

            let unseen: Vec<Indicator> = suffix
                .iter()
                .filter_map(|value| Indicator::new(self.kind, value))
                .collect();
            checkpoint_candidate = unseen.last().map(|indicator| indicator.value.clone());
            indicators.extend(unseen);
        }

        if indicators.is_empty() {
            info!(
                "no {} indicators to process; checkpoint left untouched",
                self.kind
            );
            return Ok(RunSummary::default());
        }

        let mut records = Vec::with_capacity(indicators.len());
        let mut foundation_records = Vec::new();
        let mut api_calls = 0;

        for indicator in &indicators {
            let response = match self.fetch(indicator).await {
                Ok(response) => response,
                Err(err) => {
                    error!(
                        "aborting {} run: fetch failed for indicator={}: {err}",
                        self.kind, indicator.value
                    );
                    return Err(err.into());
                }
            };
            api_calls += 1;

            if self.kind == IndicatorKind::Ip {
                foundation_records.push(foundation_record(&indicator.value, &response));
            }
            records.push(response);
        }

        let primary_table = match self.kind {
            IndicatorKind::Ip => &self.tables.ip,
            IndicatorKind::Domain => &self.tables.domain,
        };
        let mut records_forwarded = self.forward_batch(records, primary_table).await?;
        if self.kind == IndicatorKind::Ip {
            records_forwarded += self
                .forward_batch(foundation_records, &self.tables.ip_foundation)
                .await?;
        }

        if let Some(value) = checkpoint_candidate {
            match self.store.set(self.kind, &value) {
                Ok(()) => info!("advanced {} checkpoint to {value}", self.kind),
                Err(err) => {
                    // Data already landed in the sink; the next run will
                    // re-deliver everything past the stale checkpoint.
                    error!(
                        "{} run forwarded data but could not record progress: {err}",
                        self.kind
                    );
                    return Err(err.into());
                }
            }
        }

        Ok(RunSummary {
            api_calls,
            records_forwarded,
        })
    }

    async fn fetch(&self, indicator: &Indicator) -> Result<Value, ApiError> {
        match self.kind {
            IndicatorKind::Ip => {
                self.client
                    .call(&ip_details_endpoint(&indicator.value), &[])
                    .await
            }
            IndicatorKind::Domain => {
                self.client
                    .call(
                        DOMAIN_SEARCH_ENDPOINT,
                        &[("query", indicator.value.as_str())],
                    )
                    .await
            }
        }
    }

    async fn forward_batch(&self, records: Vec<Value>, table: &str) -> ConnectorResult<usize> {
        let batch = IngestionBatch {
            records,
            table: table.to_string(),
        };
        match self.forwarder.forward(&batch).await {
            Ok(count) => Ok(count),
            Err(err) => {
                error!(
                    "aborting {} run: {err}; checkpoint left unchanged",
                    self.kind
                );
                Err(err.into())
            }
        }
    }
}

/// Driver for the account-usage endpoint: exactly one API call and one
/// forward per run, with no watchlist or checkpoint involvement.
pub struct AccountUsageCollector {
    client: ScoutClient,
    forwarder: IngestionForwarder,
    table: String,
}

impl AccountUsageCollector {
    pub fn new(
        cfg: &AppConfig,
        client: ScoutClient,
        forwarder: IngestionForwarder,
    ) -> ConnectorResult<Self> {
        validate_config(cfg)?;

        Ok(Self {
            client,
            forwarder,
            table: cfg.tables.account_usage.clone(),
        })
    }

    pub async fn run(&self) -> ConnectorResult<RunSummary> {
        debug!("fetching account usage data");
        let usage = match self.client.call(ACCOUNT_USAGE_ENDPOINT, &[]).await {
            Ok(value) => value,
            Err(err) => {
                error!("aborting account usage run: {err}");
                return Err(err.into());
            }
        };

        let batch = IngestionBatch {
            records: vec![usage],
            table: self.table.clone(),
        };
        let records_forwarded = match self.forwarder.forward(&batch).await {
            Ok(count) => count,
            Err(err) => {
                error!("aborting account usage run: {err}");
                return Err(err.into());
            }
        };

        Ok(RunSummary {
            api_calls: 1,
            records_forwarded,
        })
    }
}
