//! Run file for the `tournament` binary.
//!
//! ```toml
//! data_dir = "data/ratings"
//!
//! [game]
//! num_actions = 4
//! num_turns = 10
//! seed = 7
//! models = [
//!     { name = "crowd", backend = "crowd", num_agents = 2 },
//!     { name = "noise", backend = "random", num_agents = 2 },
//! ]
//!
//! [rating]
//! k_factor = 24
//! ```

use guess_core::{GameConfig, GameError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::elo::EloConfig;
use crate::manager::DEFAULT_DATA_DIR;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub game: GameConfig,
    #[serde(default)]
    pub rating: EloConfig,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Parse a run file and validate its game section.
    pub fn from_toml_str(contents: &str) -> Result<Self, GameError> {
        let config: RunConfig = toml::from_str(contents)?;
        config.game.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rating data directory: `cli` wins, then the run file, then the
    /// default.
    pub fn resolve_data_dir(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}
