use casetrack_import::ImportError;
use thiserror::Error;

use crate::repository::RepositoryError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Storage failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
