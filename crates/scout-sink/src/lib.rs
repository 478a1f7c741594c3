use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use scout_config::SinkConfig;
use scout_ingest_core::{LogSink, SinkError};
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, error};

type HmacSha256 = Hmac<Sha256>;

const INGESTION_RESOURCE: &str = "/api/logs";
const API_VERSION: &str = "2016-04-01";

/// Shared-key signed sink for a log-analytics workspace ingestion
/// endpoint. One instance per process; the signature is recomputed per
/// request because it covers the body length and the request date.
#[derive(Clone)]
pub struct LogAnalyticsSink {
    cfg: SinkConfig,
    http: Client,
}

impl LogAnalyticsSink {
    pub fn new(cfg: SinkConfig) -> Result<Self> {
        let timeout = Duration::from_secs_f64(cfg.timeout_seconds.max(1.0));
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to construct reqwest client")?;

        Ok(Self { cfg, http })
    }

    fn ingestion_url(&self) -> String {
        if !self.cfg.ingestion_url.trim().is_empty() {
            return self.cfg.ingestion_url.clone();
        }
        format!(
            "https://{}.ods.opinsights.azure.com{}?api-version={}",
            self.cfg.workspace_id, INGESTION_RESOURCE, API_VERSION
        )
    }
}

/// `SharedKey {workspace_id}:{base64(hmac-sha256(key, string_to_sign))}`
/// over `POST\n{length}\napplication/json\nx-ms-date:{date}\n/api/logs`.
fn build_signature(
    workspace_id: &str,
    shared_key: &str,
    date: &str,
    content_length: usize,
) -> Result<String, SinkError> {
    let decoded_key = BASE64
        .decode(shared_key)
        .map_err(|err| SinkError::Signature(format!("shared key is not valid base64: {err}")))?;

    let string_to_sign = format!(
        "POST\n{content_length}\napplication/json\nx-ms-date:{date}\n{INGESTION_RESOURCE}"
    );

    let mut mac = HmacSha256::new_from_slice(&decoded_key)
        .map_err(|err| SinkError::Signature(err.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let encoded_hash = BASE64.encode(mac.finalize().into_bytes());

    Ok(format!("SharedKey {workspace_id}:{encoded_hash}"))
}

#[async_trait]
impl LogSink for LogAnalyticsSink {
    async fn post(&self, body: &str, table: &str) -> Result<(), SinkError> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let signature =
            build_signature(&self.cfg.workspace_id, &self.cfg.shared_key, &date, body.len())?;

        let response = self
            .http
            .post(self.ingestion_url())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, signature)
            .header("Log-Type", table)
            .header("x-ms-date", date)
            .body(body.to_string())
            .send()
            .await
            .map_err(|err| SinkError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!("data posted successfully into {table} of the log analytics workspace");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            "response code {} from posting data to the log sink: {body}",
            status.as_u16()
        );
        Err(SinkError::Remote {
            status: status.as_u16(),
            body,
        })
    }
}
