//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover invalid configuration, permutation build failures, missing
//! resources, and resample faults.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("permutation build error: {0}")]
    Build(String),

    #[error("missing resource '{0}' required by the active permutation")]
    MissingResource(String),

    #[error("resample error: {0}")]
    Resample(String),

    #[error("atlas holds {capacity} volumes but {requested} were requested")]
    AtlasCapacity { capacity: u32, requested: u32 },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
