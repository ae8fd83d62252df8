use super::*;
use guess_core::ModelConfig;

fn roster(names: &[&str]) -> GameConfig {
    GameConfig::new(
        4,
        2,
        names
            .iter()
            .map(|n| ModelConfig::new(*n, "constant:1", 2))
            .collect(),
    )
}

#[test]
fn test_pairings() {
    assert_eq!(pairings(3), vec![(0, 1), (0, 2), (1, 2)]);
    assert!(pairings(1).is_empty());
}

#[test]
fn test_series_rotates_pairs_and_seeds() {
    let base = roster(&["a", "b", "c"]).with_seed(10);

    let names = |game| {
        let config = series_game_config(&base, game).unwrap();
        (config.model_names().join(","), config.seed)
    };
    assert_eq!(names(0), ("a,b".to_string(), Some(10)));
    assert_eq!(names(2), ("b,c".to_string(), Some(12)));
    assert_eq!(names(3), ("a,b".to_string(), Some(13)));
}

#[test]
fn test_series_needs_two_models() {
    assert!(series_game_config(&roster(&["solo"]), 0).is_none());
}

#[tokio::test]
async fn test_play_game_with_baselines() {
    let mut registry = SourceRegistry::new();
    baseline_sources::register_baselines(&mut registry);

    let (summary, result) = play_game(roster(&["a", "b"]), &registry).await.unwrap();
    assert_eq!(summary.turns_played, 2);
    assert_eq!(summary.fallbacks, 0);
    // four players all on 1: 4*4 + 0.5*4 per turn
    assert_eq!(result.scores, vec![("a".to_string(), 36.0), ("b".to_string(), 36.0)]);
}
