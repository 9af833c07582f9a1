use std::path::PathBuf;

use thiserror::Error;

use crate::data::LevelId;

pub type LoadResult<T> = Result<T, LoadError>;

/// Failures reading level files, saves, or the hall of fame.
///
/// Callers report these and carry on as if there was nothing to load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout line {line}: {reason}")]
    Layout { line: usize, reason: String },
    #[error("record line {line}: {reason}")]
    Record { line: usize, reason: String },
    #[error("no level files found in {0}")]
    NoLevels(PathBuf),
    #[error("starting level {0} is not loaded")]
    UnknownLevel(LevelId),
    #[error("unusable checkpoint: {0}")]
    Checkpoint(String),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode json: {0}")]
    Json(#[from] serde_json::Error),
}
