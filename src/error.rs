use std::io;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivationError {
    #[error("keyboard overlay is already active")]
    AlreadyActive,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
    #[error("preference file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("preference file is malformed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not encode preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}
