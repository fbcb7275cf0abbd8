//! Errors for the ambient operations around the core (config files, state blobs).
//!
//! The coordination logic itself has no error paths: stale references, contention
//! and budget exhaustion all degrade to "try again next tick".

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColonyError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to encode config: {0}")]
    ConfigEncode(#[source] serde_yaml::Error),

    #[error("malformed persisted state: {0}")]
    State(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ColonyError>;
