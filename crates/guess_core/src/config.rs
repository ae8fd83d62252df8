//! Game configuration.
//!
//! A [`GameConfig`] is built once (in code or from TOML), validated, and then
//! handed to [`Match::create`](crate::Match::create). Nothing mutates it
//! afterwards.
//!
//! ```toml
//! num_actions = 16
//! num_turns = 4
//! agents_per_model = 2
//!
//! [rewards]
//! action = 4.0
//! bet = 0.5
//!
//! [[models]]
//! name = "r1-32b"
//! backend = "random"
//! num_agents = 2
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::GameError;

/// Payoff weights used by the [`scorer`](crate::scorer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    /// Multiplier on the number of participants sharing your private action
    pub action: f64,
    /// Multiplier on the number of participants whose action matches your bet
    pub bet: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            action: 4.0,
            bet: 0.5,
        }
    }
}

/// One roster entry: a model label and how many agents it drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Short label used for grouping and ratings
    pub name: String,
    /// Registry key, optionally followed by `:argument` (e.g. `constant:3`)
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_num_agents")]
    pub num_agents: usize,
}

fn default_backend() -> String {
    "random".to_string()
}

fn default_num_agents() -> usize {
    1
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, backend: impl Into<String>, num_agents: usize) -> Self {
        Self {
            name: name.into(),
            backend: backend.into(),
            num_agents,
        }
    }

    /// Backend key without its argument: `"constant:3"` -> `"constant"`.
    pub fn backend_kind(&self) -> &str {
        match self.backend.split_once(':') {
            Some((kind, _)) => kind,
            None => &self.backend,
        }
    }

    /// Backend argument, if any: `"constant:3"` -> `Some("3")`.
    pub fn backend_arg(&self) -> Option<&str> {
        self.backend.split_once(':').map(|(_, arg)| arg)
    }
}

/// Shape of a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of legal values for bets and actions
    pub num_actions: usize,
    /// Number of turns to play
    pub num_turns: usize,
    /// Forces every model to field this many agents, overriding `num_agents`
    #[serde(default)]
    pub agents_per_model: Option<usize>,
    /// Seed for the fallback RNG (None = from entropy)
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rewards: RewardWeights,
    pub models: Vec<ModelConfig>,
}

impl GameConfig {
    pub fn new(num_actions: usize, num_turns: usize, models: Vec<ModelConfig>) -> Self {
        Self {
            num_actions,
            num_turns,
            agents_per_model: None,
            seed: None,
            rewards: RewardWeights::default(),
            models,
        }
    }

    pub fn with_rewards(mut self, rewards: RewardWeights) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_agents_per_model(mut self, agents: usize) -> Self {
        self.agents_per_model = Some(agents);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, GameError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check the game shape (everything except the roster).
    pub fn validate_shape(&self) -> Result<(), GameError> {
        if self.num_actions == 0 {
            return Err(GameError::NoActions);
        }
        if self.num_turns == 0 {
            return Err(GameError::NoTurns);
        }
        let RewardWeights { action, bet } = self.rewards;
        // every payoff must stay non-negative
        let usable = |w: f64| w.is_finite() && w >= 0.0;
        if !usable(action) || !usable(bet) {
            return Err(GameError::InvalidWeights { action, bet });
        }
        Ok(())
    }

    /// Full validation: game shape plus roster.
    pub fn validate(&self) -> Result<(), GameError> {
        self.validate_shape()?;
        if self.models.is_empty() {
            return Err(GameError::EmptyRoster);
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if model.name.is_empty() {
                return Err(GameError::EmptyModelName);
            }
            if !seen.insert(model.name.as_str()) {
                return Err(GameError::DuplicateModel(model.name.clone()));
            }
            if self.agents_for(model) == 0 {
                return Err(GameError::NoAgents(model.name.clone()));
            }
        }
        Ok(())
    }

    /// Agent count for a roster entry, honoring `agents_per_model`.
    pub fn agents_for(&self, model: &ModelConfig) -> usize {
        self.agents_per_model.unwrap_or(model.num_agents)
    }

    pub fn num_players(&self) -> usize {
        self.models.iter().map(|m| self.agents_for(m)).sum()
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
