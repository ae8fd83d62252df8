//! A full game: roster, turn loop, and per-model aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::participant::Participant;
use crate::registry::SourceRegistry;
use crate::round::{RoundEngine, TurnRecord};

/// Outcome of a finished game, as consumed by the rating system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    /// `(model label, average final score)` in roster order
    pub scores: Vec<(String, f64)>,
    pub timestamp: DateTime<Utc>,
}

impl GameResult {
    pub fn new(scores: Vec<(String, f64)>) -> Self {
        Self {
            scores,
            timestamp: Utc::now(),
        }
    }

    pub fn models(&self) -> Vec<&str> {
        self.scores.iter().map(|(m, _)| m.as_str()).collect()
    }

    pub fn score(&self, model: &str) -> Option<f64> {
        self.scores.iter().find(|(m, _)| m == model).map(|(_, s)| *s)
    }
}

/// Final standing of one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantScore {
    pub name: String,
    pub model: String,
    pub score: f64,
}

/// Game-level summary, produced even when some turns used fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub turns_played: usize,
    pub participants: Vec<ParticipantScore>,
    pub model_averages: Vec<(String, f64)>,
    pub score_history: Vec<(String, Vec<f64>)>,
    pub fallbacks: usize,
}

impl GameSummary {
    pub fn report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!(
            "=== Game finished after {} turns ===\n\n",
            self.turns_played
        ));

        report.push_str(&format!("{:<30} {:>10}\n", "Player", "Score"));
        report.push_str(&"-".repeat(41));
        report.push('\n');
        for p in &self.participants {
            let label = format!("{} ({})", p.name, p.model);
            report.push_str(&format!("{:<30} {:>10.2}\n", label, p.score));
        }

        report.push_str("\nAverage score per model:\n");
        for (model, avg) in &self.model_averages {
            report.push_str(&format!("  {:<28} {:>10.2}\n", model, avg));
        }

        if self.fallbacks > 0 {
            report.push_str(&format!(
                "\n{} choices were replaced with random fallbacks\n",
                self.fallbacks
            ));
        }
        report
    }
}

/// One game between a fixed roster.
///
/// Participant order is fixed at creation; index `i` in every bet, action
/// and score vector refers to `participants()[i]`.
#[derive(Debug)]
pub struct Match {
    config: GameConfig,
    participants: Vec<Participant>,
    engine: RoundEngine,
    turn: usize,
    previous_actions: Vec<usize>,
    /// Model labels in order of first appearance in the roster
    models: Vec<String>,
    score_history: HashMap<String, Vec<f64>>,
    turns: Vec<TurnRecord>,
}

impl Match {
    /// Build the roster from `config`, resolving one source per agent.
    ///
    /// Participants are created model by model in roster order, then
    /// instance by instance, and named `"<model> #<n>"`.
    pub fn create(config: GameConfig, registry: &SourceRegistry) -> Result<Self, GameError> {
        config.validate()?;

        let mut participants = Vec::with_capacity(config.num_players());
        for model in &config.models {
            for instance in 0..config.agents_for(model) {
                let source = registry.resolve(model, instance)?;
                let name = format!("{} #{}", model.name, instance + 1);
                participants.push(Participant::new(name, model.name.clone(), source));
            }
        }

        Self::with_participants(config, participants)
    }

    /// Use an already built roster. The config's `models` list is ignored;
    /// only the game shape is checked.
    pub fn with_participants(
        config: GameConfig,
        mut participants: Vec<Participant>,
    ) -> Result<Self, GameError> {
        config.validate_shape()?;
        if participants.is_empty() {
            return Err(GameError::EmptyRoster);
        }

        let mut names = HashSet::new();
        let mut models: Vec<String> = Vec::new();
        for p in &mut participants {
            if !names.insert(p.name().to_string()) {
                return Err(GameError::DuplicateParticipant(p.name().to_string()));
            }
            if !models.iter().any(|m| m == p.model()) {
                models.push(p.model().to_string());
            }
            p.new_game();
        }

        let score_history = models.iter().map(|m| (m.clone(), Vec::new())).collect();
        let engine = RoundEngine::new(config.num_actions, config.rewards, config.seed);

        info!(
            players = participants.len(),
            models = models.len(),
            turns = config.num_turns,
            actions = config.num_actions,
            "match created"
        );

        Ok(Self {
            config,
            participants,
            engine,
            turn: 0,
            previous_actions: Vec::new(),
            models,
            score_history,
            turns: Vec::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Number of completed turns
    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn is_finished(&self) -> bool {
        self.turn >= self.config.num_turns
    }

    /// Private actions of the last completed turn (empty before turn 1)
    pub fn previous_actions(&self) -> &[usize] {
        &self.previous_actions
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    /// Model labels in roster order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Average participant score after each turn, for one model.
    pub fn score_history(&self, model: &str) -> &[f64] {
        self.score_history
            .get(model)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Play a single turn. Returns `None` once all turns have been played.
    pub async fn play_turn(&mut self) -> Option<&TurnRecord> {
        if self.is_finished() {
            return None;
        }

        let record = self
            .engine
            .play_turn(&mut self.participants, self.turn, &self.previous_actions)
            .await;

        for (participant, points) in self.participants.iter_mut().zip(&record.scores) {
            participant.add_points(*points);
        }
        self.record_model_averages();
        self.previous_actions = record.actions.clone();
        self.turn += 1;

        info!(
            turn = record.turn,
            bets = ?record.bets,
            actions = ?record.actions,
            scores = ?record.scores,
            fallbacks = record.fallback_count(),
            "turn complete"
        );

        self.turns.push(record);
        self.turns.last()
    }

    /// Play every remaining turn, strictly one after another.
    pub async fn play_all(&mut self) -> GameSummary {
        while self.play_turn().await.is_some() {}
        let summary = self.summary();
        info!(
            turns = summary.turns_played,
            fallbacks = summary.fallbacks,
            "match finished"
        );
        summary
    }

    fn record_model_averages(&mut self) {
        for (model, average) in self.model_averages() {
            self.score_history.entry(model).or_default().push(average);
        }
    }

    /// Mean cumulative score per model label, in roster order.
    pub fn model_averages(&self) -> Vec<(String, f64)> {
        self.models
            .iter()
            .map(|model| {
                let scores: Vec<f64> = self
                    .participants
                    .iter()
                    .filter(|p| p.model() == model)
                    .map(Participant::score)
                    .collect();
                (model.clone(), mean(&scores))
            })
            .collect()
    }

    /// Same as [`model_averages`](Self::model_averages); named for use once
    /// the game is over.
    pub fn final_model_averages(&self) -> Vec<(String, f64)> {
        self.model_averages()
    }

    /// Result handed to the rating system.
    pub fn game_result(&self) -> GameResult {
        GameResult::new(self.final_model_averages())
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            turns_played: self.turn,
            participants: self
                .participants
                .iter()
                .map(|p| ParticipantScore {
                    name: p.name().to_string(),
                    model: p.model().to_string(),
                    score: p.score(),
                })
                .collect(),
            model_averages: self.model_averages(),
            score_history: self
                .models
                .iter()
                .map(|m| (m.clone(), self.score_history(m).to_vec()))
                .collect(),
            fallbacks: self.turns.iter().map(TurnRecord::fallback_count).sum(),
        }
    }
}

/// Arithmetic mean; zero for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
