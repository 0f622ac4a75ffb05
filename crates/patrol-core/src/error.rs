use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatrolError {
    #[error("session not found or expired: {0}")]
    SessionExpired(String),

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("required field '{0}' must not be empty")]
    Validation(String),

    #[error("not a presented option: {0}")]
    UnknownOption(String),

    #[error("failed to persist counter store to {path}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PatrolError>;
