use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`DeviceStore`](super::DeviceStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read device store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("device store {} is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode device store: {0}")]
    Serialize(serde_json::Error),
    #[error("failed to write device store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
