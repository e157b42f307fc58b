use std::path::PathBuf;

use launchreel_common::LaunchreelError;
use launchreel_project_model::ProjectError;

/// Storage failures. Callers on the save path log these and carry on.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {key}: {source}")]
    Parse {
        key: String,
        source: serde_json::Error,
    },

    #[error("Asset not found: {id}")]
    AssetNotFound { id: String },

    #[error("Not a local media reference: {reference}")]
    NotLocal { reference: String },

    #[error(transparent)]
    Project(#[from] ProjectError),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<StoreError> for LaunchreelError {
    fn from(err: StoreError) -> Self {
        LaunchreelError::persistence(err.to_string())
    }
}
