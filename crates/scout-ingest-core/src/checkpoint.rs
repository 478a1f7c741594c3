use crate::model::IndicatorKind;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to read {kind} checkpoint: {source}")]
    Read {
        kind: IndicatorKind,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to persist {kind} checkpoint: {source}")]
    Write {
        kind: IndicatorKind,
        #[source]
        source: std::io::Error,
    },
}

/// Persists the last successfully processed indicator value per kind.
///
/// A failed `set` must be treated by callers as "assume nothing advanced":
/// the next run re-delivers a bounded amount of duplicates, which is
/// acceptable, whereas a checkpoint recorded past unforwarded items would
/// silently drop data.
pub trait CheckpointStore: Send + Sync {
    fn get(&self, kind: IndicatorKind) -> Result<Option<String>, CheckpointError>;
    fn set(&self, kind: IndicatorKind, value: &str) -> Result<(), CheckpointError>;
}

/// One checkpoint file per indicator kind under `state_dir`. Writes land
/// in a temp file first and are renamed into place so a crash mid-write
/// leaves the previous checkpoint intact.
pub struct FileCheckpointStore {
    state_dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    fn checkpoint_path(&self, kind: IndicatorKind) -> PathBuf {
        self.state_dir.join(format!("{}.checkpoint", kind.as_str()))
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn get(&self, kind: IndicatorKind) -> Result<Option<String>, CheckpointError> {
        match std::fs::read_to_string(self.checkpoint_path(kind)) {
            Ok(contents) => {
                let value = contents.trim();
                if value.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(value.to_string()))
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CheckpointError::Read { kind, source }),
        }
    }

    fn set(&self, kind: IndicatorKind, value: &str) -> Result<(), CheckpointError> {
        std::fs::create_dir_all(&self.state_dir)
            .map_err(|source| CheckpointError::Write { kind, source })?;

        let path = self.checkpoint_path(kind);
        let tmp_path = self.state_dir.join(format!(
            "{}.checkpoint.tmp.{}",
            kind.as_str(),
            std::process::id()
        ));

        std::fs::write(&tmp_path, value)
            .map_err(|source| CheckpointError::Write { kind, source })?;
        std::fs::rename(&tmp_path, &path)
            .map_err(|source| CheckpointError::Write { kind, source })?;

        Ok(())
    }
}
