use thiserror::Error;

/// A result type for design of experiments
pub type Result<T> = std::result::Result<T, DoeError>;

/// An error when building a sampling method
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DoeError {
    /// When the sampler configuration is not valid (unknown strategy, bad bounds, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
