mod checkpoint;
mod collector;
mod diff;
mod error;
mod forward;
mod model;
mod watchlist;

pub use checkpoint::{CheckpointError, CheckpointStore, FileCheckpointStore};
pub use collector::{AccountUsageCollector, IndicatorCollector};
pub use diff::unseen_suffix;
pub use error::{ConnectorError, ConnectorResult};
pub use forward::{ForwardError, IngestionForwarder, LogSink, SinkError};
pub use model::{Indicator, IndicatorKind, IngestionBatch, RunSummary};
pub use watchlist::{WatchlistError, WatchlistSource};
