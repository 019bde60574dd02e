use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OathError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    JsonLine { line: usize, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("request for oath {oath_id} failed: {source}")]
    Http {
        oath_id: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("oath {oath_id}: site returned an error or timeout page")]
    InvalidPage { oath_id: u32 },
}

impl OathError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OathError::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OathError::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OathError>;
