//! One turn of play: bet phase, action phase, scoring.
//!
//! Both phases fan out one request per participant and wait for every reply
//! before moving on. Replies are reassembled by participant index, never by
//! arrival order. A failed or illegal reply is replaced with a uniformly
//! random legal value so a turn always completes.

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RewardWeights;
use crate::participant::Participant;
use crate::scorer::score_turn;
use crate::ChoiceRequest;

/// Values collected in one phase, in participant order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub values: Vec<usize>,
    /// Indices of participants whose value was substituted
    pub fallbacks: Vec<usize>,
}

/// Everything that happened in one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: usize,
    pub bets: Vec<usize>,
    pub actions: Vec<usize>,
    /// Payoff earned this turn, per participant
    pub scores: Vec<f64>,
    pub bet_fallbacks: Vec<usize>,
    pub action_fallbacks: Vec<usize>,
}

impl TurnRecord {
    pub fn fallback_count(&self) -> usize {
        self.bet_fallbacks.len() + self.action_fallbacks.len()
    }

    /// Multi-line turn summary.
    pub fn report(&self) -> String {
        let mut report = format!("Turn {}:\n", self.turn);
        report.push_str(&format!("  Public bets: {:?}\n", self.bets));
        report.push_str(&format!("  Actions:     {:?}\n", self.actions));
        report.push_str(&format!("  Scores:      {:?}\n", self.scores));
        if self.fallback_count() > 0 {
            report.push_str(&format!(
                "  Fallbacks:   bets {:?}, actions {:?}\n",
                self.bet_fallbacks, self.action_fallbacks
            ));
        }
        report
    }
}

/// Runs turns for a fixed action space and payoff rule.
#[derive(Debug)]
pub struct RoundEngine {
    num_actions: usize,
    weights: RewardWeights,
    rng: StdRng,
}

impl RoundEngine {
    /// `seed` makes the fallback substitutions reproducible.
    pub fn new(num_actions: usize, weights: RewardWeights, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            num_actions,
            weights,
            rng,
        }
    }

    /// Play one turn. Does not touch participant scores; the caller applies
    /// `TurnRecord::scores` once the turn is complete.
    pub async fn play_turn(
        &mut self,
        participants: &mut [Participant],
        turn: usize,
        previous_actions: &[usize],
    ) -> TurnRecord {
        let bet_requests: Vec<ChoiceRequest> = participants
            .iter()
            .map(|p| {
                ChoiceRequest::bet(turn, self.num_actions, p.score(), previous_actions.to_vec())
            })
            .collect();
        let bets = self.run_phase(participants, &bet_requests).await;

        // Every bet is in before any action is requested
        let action_requests: Vec<ChoiceRequest> = participants
            .iter()
            .map(|_| ChoiceRequest::action(turn, self.num_actions, bets.values.clone()))
            .collect();
        let actions = self.run_phase(participants, &action_requests).await;

        let scores = score_turn(&bets.values, &actions.values, self.num_actions, &self.weights);

        TurnRecord {
            turn,
            bets: bets.values,
            actions: actions.values,
            scores,
            bet_fallbacks: bets.fallbacks,
            action_fallbacks: actions.fallbacks,
        }
    }

    /// Fan out `requests[i]` to `participants[i]` and wait for all of them.
    pub async fn run_phase(
        &mut self,
        participants: &mut [Participant],
        requests: &[ChoiceRequest],
    ) -> PhaseOutcome {
        debug_assert_eq!(participants.len(), requests.len());

        // join_all yields results in input order: replies[i] is participant i
        let replies = join_all(
            participants
                .iter_mut()
                .zip(requests)
                .map(|(participant, request)| participant.request(request)),
        )
        .await;

        let mut values = Vec::with_capacity(replies.len());
        let mut fallbacks = Vec::new();
        for (index, reply) in replies.into_iter().enumerate() {
            let request = &requests[index];
            match reply {
                Ok(value) => {
                    debug!(
                        participant = participants[index].name(),
                        phase = request.phase_name(),
                        turn = request.turn,
                        value,
                        "choice received"
                    );
                    values.push(value);
                }
                Err(err) => {
                    let value = self.random_choice();
                    warn!(
                        participant = participants[index].name(),
                        phase = request.phase_name(),
                        turn = request.turn,
                        error = %err,
                        fallback = value,
                        "source failed, substituting random choice"
                    );
                    values.push(value);
                    fallbacks.push(index);
                }
            }
        }

        PhaseOutcome { values, fallbacks }
    }

    fn random_choice(&mut self) -> usize {
        self.rng.gen_range(0..self.num_actions)
    }
}

#[cfg(test)]
#[path = "round_tests.rs"]
mod round_tests;
