use std::path::PathBuf;
use thiserror::Error;

/// Errors from the rating store, its exports, and series files.
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("outcome score must be within [0, 1], got {0}")]
    InvalidScore(f64),

    #[error("model `{0}` cannot be rated against itself")]
    SameModel(String),

    #[error("invalid rating config: {0}")]
    InvalidConfig(String),

    #[error("inconsistent rating state: {0}")]
    Inconsistent(String),
}

impl RatingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(line: usize, message: impl Into<String>) -> Self {
        Self::Csv {
            line,
            message: message.into(),
        }
    }
}
