//! Playing games and rotating model pairs across a series.

use guess_core::{GameConfig, GameError, GameResult, GameSummary, Match, SourceRegistry};
use tracing::info;

/// All unordered index pairs `(i, j)` with `i < j`, in lexicographic order.
pub fn pairings(num_models: usize) -> Vec<(usize, usize)> {
    (0..num_models)
        .flat_map(|i| (i + 1..num_models).map(move |j| (i, j)))
        .collect()
}

/// Config for game `game` (zero-based) of a series: two roster models,
/// rotating through every pair. A base seed is offset by the game index so
/// each game gets its own fallback stream.
///
/// `None` when the roster has fewer than two models.
pub fn series_game_config(base: &GameConfig, game: usize) -> Option<GameConfig> {
    let pairs = pairings(base.models.len());
    let &(i, j) = pairs.get(game % pairs.len().max(1))?;

    let mut config = base.clone();
    config.models = vec![base.models[i].clone(), base.models[j].clone()];
    config.seed = base.seed.map(|seed| seed.wrapping_add(game as u64));
    Some(config)
}

/// Play one full game and return its summary and rating input.
pub async fn play_game(
    config: GameConfig,
    registry: &SourceRegistry,
) -> Result<(GameSummary, GameResult), GameError> {
    let models = config.model_names().join(" vs ");
    let mut game = Match::create(config, registry)?;
    info!(models = %models, players = game.participants().len(), "starting game");

    let summary = game.play_all().await;
    Ok((summary, game.game_result()))
}

#[cfg(test)]
#[path = "series_tests.rs"]
mod series_tests;
