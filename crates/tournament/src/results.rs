//! Series results storage and reporting

use chrono::{DateTime, Utc};
use guess_core::{GameConfig, GameResult, GameSummary};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::RatingError;

/// Complete results of a series of games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResults {
    /// Name/description of the series
    pub name: String,
    /// Participating model labels
    pub models: Vec<String>,
    /// One entry per game, in play order
    pub games: Vec<SeriesEntry>,
    /// Configuration the series was started from
    pub config: GameConfig,
}

/// A single game in the series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub game: usize,
    /// `(model, average final score)` for the models that played
    pub scores: Vec<(String, f64)>,
    pub turns: usize,
    pub fallbacks: usize,
    pub timestamp: DateTime<Utc>,
}

impl SeriesEntry {
    /// Model with the strictly highest score, if any.
    pub fn winner(&self) -> Option<&str> {
        let (best, score) = self
            .scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        let tied = self.scores.iter().filter(|(_, s)| s == score).count() > 1;
        (!tied).then_some(best.as_str())
    }
}

/// Aggregate record of one model over the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub model: String,
    pub games: usize,
    pub wins: usize,
    pub average_score: f64,
}

impl SeriesResults {
    pub fn new(name: &str, config: GameConfig) -> Self {
        Self {
            name: name.to_string(),
            models: config.models.iter().map(|m| m.name.clone()).collect(),
            games: Vec::new(),
            config,
        }
    }

    /// Add a finished game
    pub fn add_game(&mut self, summary: &GameSummary, result: &GameResult) {
        self.games.push(SeriesEntry {
            game: self.games.len() + 1,
            scores: result.scores.clone(),
            turns: summary.turns_played,
            fallbacks: summary.fallbacks,
            timestamp: result.timestamp,
        });
    }

    /// Per-model record, in roster order. Models that never played are
    /// listed with zero games.
    pub fn standings(&self) -> Vec<Standing> {
        self.models
            .iter()
            .map(|model| {
                let scores: Vec<f64> = self
                    .games
                    .iter()
                    .filter_map(|g| g.scores.iter().find(|(m, _)| m == model).map(|(_, s)| *s))
                    .collect();
                let wins = self
                    .games
                    .iter()
                    .filter(|g| g.winner() == Some(model.as_str()))
                    .count();
                let average_score = if scores.is_empty() {
                    0.0
                } else {
                    scores.iter().sum::<f64>() / scores.len() as f64
                };
                Standing {
                    model: model.clone(),
                    games: scores.len(),
                    wins,
                    average_score,
                }
            })
            .collect()
    }

    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> Result<(), RatingError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RatingError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| RatingError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|e| RatingError::io(path, e))
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> Result<Self, RatingError> {
        let contents = fs::read_to_string(path).map_err(|e| RatingError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|source| RatingError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Generate a text report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("=== Series: {} ===\n\n", self.name));
        report.push_str(&format!("Models: {}\n", self.models.join(", ")));
        report.push_str(&format!(
            "Config: {} actions, {} turns/game, rewards {}/{}\n\n",
            self.config.num_actions,
            self.config.num_turns,
            self.config.rewards.action,
            self.config.rewards.bet
        ));

        report.push_str("Games:\n");
        report.push_str(&format!("{:>4}  {:<40} {:>8}\n", "#", "Scores", "Fallback"));
        report.push_str(&"-".repeat(56));
        report.push('\n');
        for entry in &self.games {
            let scores: Vec<String> = entry
                .scores
                .iter()
                .map(|(m, s)| format!("{m} {s:.1}"))
                .collect();
            report.push_str(&format!(
                "{:>4}  {:<40} {:>8}\n",
                entry.game,
                scores.join(" / "),
                entry.fallbacks
            ));
        }

        report.push_str("\nStandings:\n");
        report.push_str(&format!(
            "{:<30} {:>6} {:>6} {:>10}\n",
            "Model", "Games", "Wins", "Avg score"
        ));
        for s in self.standings() {
            report.push_str(&format!(
                "{:<30} {:>6} {:>6} {:>10.2}\n",
                s.model, s.games, s.wins, s.average_score
            ));
        }

        report
    }
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod results_tests;
