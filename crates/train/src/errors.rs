use std::path::PathBuf;
use thiserror::Error;

/// A result type for emulator training
pub type Result<T> = std::result::Result<T, TrainError>;

/// An error for dataset building and emulator training
#[derive(Error, Debug)]
pub enum TrainError {
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// When array shapes are inconsistent
    #[error("Data shape error: {0}")]
    DataShapeError(String),
    /// When a checkpoint cannot be written or read back
    #[error("Persistence error on {path:?}: {source}")]
    PersistenceError {
        /// Checkpoint location
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// When the model or optimizer produces non finite values
    #[error("Numeric failure: {0}")]
    NumericFailure(String),
    /// When a stateful object is used outside of its contract
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// When the design of experiments configuration is invalid
    #[error(transparent)]
    DoeError(#[from] gpemu_doe::DoeError),
    /// When an external model or optimizer fails
    #[error(transparent)]
    ModelError(#[from] Box<dyn std::error::Error + Send + Sync>),
    /// When numpy array read fails
    #[error("IO error")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),
    /// When numpy array write fails
    #[error("IO error")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),
    /// When json (de)serialization fails
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// When IO fails outside of checkpointing
    #[error("IO error")]
    IoError(#[from] std::io::Error),
}

impl TrainError {
    /// Builds a [`TrainError::PersistenceError`] for the given path
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrainError::PersistenceError {
            path: path.into(),
            source,
        }
    }
}
