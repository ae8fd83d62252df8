//! Turn engine for the guess-the-action arena.
//!
//! A [`Match`] drives a roster of [`Participant`]s through a fixed number of
//! turns. Every turn has two concurrent phases: each participant first posts a
//! public bet, then, having seen every bet, picks a private action. The
//! [`scorer`] turns the bets and actions into payoffs.
//!
//! Choice backends (language models, baselines, test stubs) plug in through
//! the [`ActionSource`] trait and are resolved once per participant from a
//! [`SourceRegistry`].

pub mod config;
pub mod error;
pub mod game;
pub mod participant;
pub mod registry;
pub mod round;
pub mod scorer;

#[cfg(test)]
mod test_sources;

pub use config::*;
pub use error::*;
pub use game::*;
pub use participant::*;
pub use registry::*;
pub use round::*;
pub use scorer::{action_counts, score_turn};

use async_trait::async_trait;

// =============================================================================
// ActionSource trait: implemented by every choice backend (LLM, baselines)
// =============================================================================

/// What a participant is being asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPhase {
    /// Public bet. The participant sees its own cumulative score and the
    /// private actions of the previous turn (empty on turn 0).
    Bet {
        score: f64,
        previous_actions: Vec<usize>,
    },
    /// Private action. The participant sees every public bet of this turn,
    /// its own included.
    Action { public_bets: Vec<usize> },
}

/// A single request sent to an [`ActionSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceRequest {
    /// Zero-based turn index
    pub turn: usize,
    /// Size of the action space; legal answers are `0..num_actions`
    pub num_actions: usize,
    pub phase: TurnPhase,
}

impl ChoiceRequest {
    pub fn bet(turn: usize, num_actions: usize, score: f64, previous_actions: Vec<usize>) -> Self {
        Self {
            turn,
            num_actions,
            phase: TurnPhase::Bet {
                score,
                previous_actions,
            },
        }
    }

    pub fn action(turn: usize, num_actions: usize, public_bets: Vec<usize>) -> Self {
        Self {
            turn,
            num_actions,
            phase: TurnPhase::Action { public_bets },
        }
    }

    /// Short label used in logs.
    pub fn phase_name(&self) -> &'static str {
        match self.phase {
            TurnPhase::Bet { .. } => "bet",
            TurnPhase::Action { .. } => "action",
        }
    }
}

/// Trait that all choice backends must implement.
///
/// Implementations may keep per-participant state (a conversation, an RNG)
/// since each participant owns its source exclusively. The returned value is
/// not trusted: anything outside `0..num_actions` is treated as a failure by
/// the engine and replaced with a uniformly random legal choice.
#[async_trait]
pub trait ActionSource: Send {
    /// Produce a choice for the given request.
    async fn choose(&mut self, request: &ChoiceRequest) -> Result<i64, SourceError>;

    /// Backend name for logs and reports
    fn name(&self) -> &str;

    /// Reset internal state before a new game.
    fn new_game(&mut self) {}
}
