//! Baseline Action Sources
//!
//! Simple sources that need no language model:
//! - [`RandomSource`]: uniform over the action space, the floor any real
//!   player should beat
//! - [`ConstantSource`]: always the same value, handy for scripted games
//! - [`CrowdSource`]: bets on last turn's most popular action and then plays
//!   the most popular bet
//!
//! [`register_baselines`] wires all three into a [`SourceRegistry`] under the
//! backend keys `random`, `constant:<n>` and `crowd`.

use async_trait::async_trait;
use guess_core::{ActionSource, ChoiceRequest, SourceError, SourceRegistry, TurnPhase};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};


/// Picks uniformly at random from the legal values.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionSource for RandomSource {
    async fn choose(&mut self, request: &ChoiceRequest) -> Result<i64, SourceError> {
        if request.num_actions == 0 {
            return Err(SourceError::OutOfRange {
                value: 0,
                num_actions: 0,
            });
        }
        Ok(self.rng.gen_range(0..request.num_actions) as i64)
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Always answers with the same value, legal or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantSource {
    value: i64,
}

impl ConstantSource {
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}

#[async_trait]
impl ActionSource for ConstantSource {
    async fn choose(&mut self, _request: &ChoiceRequest) -> Result<i64, SourceError> {
        Ok(self.value)
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Follows the crowd.
///
/// Bets on the most frequent private action of the previous turn (0 on the
/// first turn), then plays the most frequent public bet. Ties go to the
/// lowest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrowdSource;

impl CrowdSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActionSource for CrowdSource {
    async fn choose(&mut self, request: &ChoiceRequest) -> Result<i64, SourceError> {
        let seen = match &request.phase {
            TurnPhase::Bet {
                previous_actions, ..
            } => previous_actions,
            TurnPhase::Action { public_bets } => public_bets,
        };
        Ok(most_frequent(seen, request.num_actions) as i64)
    }

    fn name(&self) -> &str {
        "crowd"
    }
}

/// Most frequent value below `num_actions`; lowest wins ties, 0 if none.
pub fn most_frequent(values: &[usize], num_actions: usize) -> usize {
    let counts = guess_core::action_counts(values, num_actions);
    let mut best = 0;
    for (value, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = value;
        }
    }
    best
}

/// Register `random`, `constant` and `crowd`.
///
/// `constant` reads its value from the backend argument (`constant:3`) and
/// defaults to 0.
pub fn register_baselines(registry: &mut SourceRegistry) {
    registry.register("random", |_, _| Box::new(RandomSource::new()));
    registry.register("constant", |model, _| {
        let value = model
            .backend_arg()
            .and_then(|arg| arg.trim().parse().ok())
            .unwrap_or(0);
        Box::new(ConstantSource::new(value))
    });
    registry.register("crowd", |_, _| Box::new(CrowdSource::new()));
}
