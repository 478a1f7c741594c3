use crate::model::IndicatorKind;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("watchlist query for {kind} failed: {message}")]
pub struct WatchlistError {
    pub kind: IndicatorKind,
    pub message: String,
}

impl WatchlistError {
    pub fn new(kind: IndicatorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Supplies the full, ordered list of currently-watched values for a kind.
///
/// The snapshot is recomputed fresh on every run and never persisted; its
/// order is the query result order and is assumed stable/append-only, which
/// is what makes the checkpoint cut in [`crate::diff::unseen_suffix`] valid.
#[async_trait]
pub trait WatchlistSource: Send + Sync {
    async fn snapshot(&self, kind: IndicatorKind) -> Result<Vec<String>, WatchlistError>;
}
