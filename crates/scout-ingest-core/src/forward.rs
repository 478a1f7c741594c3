use crate::model::IngestionBatch;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors originating inside a sink implementation.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink returned status {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("transport failure while posting to sink: {0}")]
    Transport(String),
    #[error("failed to build request signature: {0}")]
    Signature(String),
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to serialize batch for table {table}: {source}")]
    Serialize {
        table: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to post {count} records to table {table}: {source}")]
    Sink {
        table: String,
        count: usize,
        #[source]
        source: SinkError,
    },
}

/// The log-ingestion destination. Callers serialize the record collection
/// before posting; the sink only sees an opaque JSON body and a table name.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn post(&self, body: &str, table: &str) -> Result<(), SinkError>;
}

/// Serializes one batch and hands it to the sink. Performs no batching or
/// splitting itself; sizing batches for the sink's limits is the caller's
/// concern.
#[derive(Clone)]
pub struct IngestionForwarder {
    sink: Arc<dyn LogSink>,
}

impl IngestionForwarder {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub async fn forward(&self, batch: &IngestionBatch) -> Result<usize, ForwardError> {
        let count = batch.records.len();
        let body = serde_json::to_string(&batch.records).map_err(|source| {
            ForwardError::Serialize {
                table: batch.table.clone(),
                source,
            }
        })?;

        debug!("sending {count} records to sink table {}", batch.table);
        self.sink
            .post(&body, &batch.table)
            .await
            .map_err(|source| ForwardError::Sink {
                table: batch.table.clone(),
                count,
                source,
            })?;

        info!(
            "posted {count} records into {} of the log analytics workspace",
            batch.table
        );
        Ok(count)
    }
}
