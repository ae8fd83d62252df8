//! Error types for game setup and choice sources.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a [`Match`](crate::Match). All of them are
/// fatal: a game never starts with a broken configuration.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("roster is empty: at least one model with agents is required")]
    EmptyRoster,

    #[error("num_actions must be at least 1")]
    NoActions,

    #[error("num_turns must be at least 1")]
    NoTurns,

    #[error("model `{0}` has no agents")]
    NoAgents(String),

    #[error("model name must not be empty")]
    EmptyModelName,

    #[error("model `{0}` appears more than once in the roster")]
    DuplicateModel(String),

    #[error("participant name `{0}` is used twice")]
    DuplicateParticipant(String),

    #[error("reward weights must be finite and non-negative (action={action}, bet={bet})")]
    InvalidWeights { action: f64, bet: f64 },

    #[error("no source registered for model `{model}` (backend `{backend}`)")]
    UnknownBackend { model: String, backend: String },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failure reported by an [`ActionSource`](crate::ActionSource).
///
/// The round engine recovers from every variant locally; these never reach
/// the caller of [`Match::play_all`](crate::Match::play_all).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The backend call itself failed (network, remote error, ...)
    #[error("backend error: {0}")]
    Backend(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// A reply arrived but no legal integer could be recovered from it
    #[error("no legal choice in reply: {0:?}")]
    Unparseable(String),

    #[error("choice {value} outside [0, {num_actions})")]
    OutOfRange { value: i64, num_actions: usize },
}

impl SourceError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
