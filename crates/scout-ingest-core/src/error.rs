use crate::checkpoint::CheckpointError;
use crate::forward::ForwardError;
use crate::watchlist::WatchlistError;
use scout_api::ApiError;
use thiserror::Error;

pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// The single error type a run surfaces to the invoking scheduler. Every
/// component failure is logged with context at the collector boundary and
/// re-raised as one of these. Nothing is retried internally; "retryable"
/// is a classification hint for the external retry policy.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// A required setting is missing or empty. Raised before any network
    /// call is made.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Watchlist(#[from] WatchlistError),
    #[error(transparent)]
    Forward(#[from] ForwardError),
}
