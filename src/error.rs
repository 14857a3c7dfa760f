//! Error types for proximity scoring

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProximityError {
    #[error("invalid seed set: {reason}")]
    InvalidSeedSet { reason: String },

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("graph is disconnected: no path from {from} to {to}")]
    DisconnectedGraph { from: String, to: String },

    #[error("fundamental matrix is singular (is the graph connected?)")]
    SingularMatrix,

    #[error("cached artifact {key} is unusable: {reason}")]
    CacheCorruption { key: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ProximityError>;
