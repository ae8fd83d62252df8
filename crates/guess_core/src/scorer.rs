//! Payoff rule.
//!
//! With `count[v]` the number of participants whose private action is `v`:
//!
//! ```text
//! score_i = W_action * count[a_i] + W_bet * count[b_i]
//! ```
//!
//! An action pays more the more peers chose it too; a bet pays a smaller bonus
//! for naming a popular action ahead of time. Ties are not broken.

use crate::config::RewardWeights;

/// Number of participants that picked each action, indexed by action value.
///
/// Values outside `0..num_actions` are not counted.
pub fn action_counts(actions: &[usize], num_actions: usize) -> Vec<usize> {
    let mut counts = vec![0; num_actions];
    for &action in actions {
        if let Some(count) = counts.get_mut(action) {
            *count += 1;
        }
    }
    counts
}

/// Payoff for every participant, in participant order.
///
/// `bets[i]` and `actions[i]` belong to participant `i`; if the slices differ
/// in length the extra entries are ignored.
pub fn score_turn(
    bets: &[usize],
    actions: &[usize],
    num_actions: usize,
    weights: &RewardWeights,
) -> Vec<f64> {
    let counts = action_counts(actions, num_actions);
    let count_of = |value: usize| counts.get(value).copied().unwrap_or(0) as f64;

    bets.iter()
        .zip(actions)
        .map(|(&bet, &action)| weights.action * count_of(action) + weights.bet * count_of(bet))
        .collect()
}

#[cfg(test)]
#[path = "scorer_tests.rs"]
mod scorer_tests;
