use std::io;
use std::path::PathBuf;

/// Failures at the I/O edges: config, passage files and report sinks.
/// The typing core itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no passages found in {}", .0.display())]
    NoPassages(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
