use super::*;
use crate::config::{ModelConfig, RewardWeights};
use crate::test_sources::{FailingSource, FixedSource};

fn registry() -> SourceRegistry {
    SourceRegistry::new()
        .with("fixed", |model, _| {
            let value = model
                .backend_arg()
                .and_then(|arg| arg.parse().ok())
                .unwrap_or(0);
            Box::new(FixedSource::new(value))
        })
        .with("failing", |_, _| Box::new(FailingSource))
}

fn config(num_actions: usize, num_turns: usize, models: Vec<ModelConfig>) -> GameConfig {
    GameConfig::new(num_actions, num_turns, models)
        .with_rewards(RewardWeights {
            action: 4.0,
            bet: 0.5,
        })
        .with_seed(11)
}

#[test]
fn test_roster_order_is_model_then_instance() {
    let config = config(
        4,
        1,
        vec![
            ModelConfig::new("beta", "fixed:1", 2),
            ModelConfig::new("alpha", "fixed:2", 1),
        ],
    );
    let game = Match::create(config, &registry()).unwrap();

    let names: Vec<&str> = game.participants().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["beta #1", "beta #2", "alpha #1"]);
    assert_eq!(game.models(), &["beta".to_string(), "alpha".to_string()]);
    assert_eq!(game.turn(), 0);
    assert!(game.previous_actions().is_empty());
}

#[test]
fn test_forced_equal_agents() {
    let config = config(
        4,
        1,
        vec![
            ModelConfig::new("a", "fixed", 1),
            ModelConfig::new("b", "fixed", 5),
        ],
    )
    .with_agents_per_model(3);
    let game = Match::create(config, &registry()).unwrap();
    assert_eq!(game.participants().len(), 6);
}

#[test]
fn test_unknown_backend_is_config_error() {
    let config = config(4, 1, vec![ModelConfig::new("a", "telepathy", 1)]);
    let err = Match::create(config, &registry()).unwrap_err();
    assert!(matches!(err, GameError::UnknownBackend { .. }));
}

#[test]
fn test_model_factory_overrides_backend() {
    let mut registry = registry();
    registry.register_model("special", |_, _| Box::new(FixedSource::new(3)));
    let config = config(4, 1, vec![ModelConfig::new("special", "telepathy", 1)]);
    let game = Match::create(config, &registry).unwrap();
    assert_eq!(game.participants()[0].source_name(), "fixed");
}

#[test]
fn test_empty_participants_rejected() {
    let config = config(4, 1, vec![ModelConfig::new("a", "fixed", 1)]);
    let err = Match::with_participants(config, vec![]).unwrap_err();
    assert!(matches!(err, GameError::EmptyRoster));
}

#[test]
fn test_duplicate_participant_names_rejected() {
    let config = config(4, 1, vec![ModelConfig::new("a", "fixed", 1)]);
    let players = vec![
        Participant::new("x", "a", Box::new(FixedSource::new(0))),
        Participant::new("x", "b", Box::new(FixedSource::new(0))),
    ];
    let err = Match::with_participants(config, players).unwrap_err();
    assert!(matches!(err, GameError::DuplicateParticipant(_)));
}

#[tokio::test]
async fn test_history_length_matches_turns() {
    let config = config(
        3,
        5,
        vec![
            ModelConfig::new("a", "fixed:0", 2),
            ModelConfig::new("b", "fixed:1", 3),
        ],
    );
    let mut game = Match::create(config, &registry()).unwrap();

    let summary = game.play_all().await;

    assert!(game.is_finished());
    assert_eq!(summary.turns_played, 5);
    assert_eq!(game.turns().len(), 5);
    for model in ["a", "b"] {
        assert_eq!(game.score_history(model).len(), 5);
    }
    // no more turns once finished
    assert!(game.play_turn().await.is_none());
    assert_eq!(game.score_history("a").len(), 5);
}

#[tokio::test]
async fn test_two_player_example_game() {
    let config = config(
        2,
        1,
        vec![
            ModelConfig::new("zero", "fixed:0", 1),
            ModelConfig::new("one", "fixed:1", 1),
        ],
    );
    let mut game = Match::create(config, &registry()).unwrap();
    game.play_all().await;

    // bets [0,1], actions [0,1] -> 4*1 + 0.5*1 each
    let averages = game.final_model_averages();
    assert_eq!(
        averages,
        vec![("zero".to_string(), 4.5), ("one".to_string(), 4.5)]
    );
    assert_eq!(game.previous_actions(), &[0, 1]);
}

#[tokio::test]
async fn test_scores_accumulate_and_history_is_cumulative() {
    let config = config(
        4,
        3,
        vec![
            ModelConfig::new("herd", "fixed:2", 3),
            ModelConfig::new("loner", "fixed:0", 1),
        ],
    );
    let mut game = Match::create(config, &registry()).unwrap();
    game.play_all().await;

    // herd: 4*3 + 0.5*3 = 13.5 per turn; loner: 4*1 + 0.5*1 = 4.5 per turn
    assert_eq!(game.score_history("herd"), &[13.5, 27.0, 40.5]);
    assert_eq!(game.score_history("loner"), &[4.5, 9.0, 13.5]);

    let result = game.game_result();
    assert_eq!(result.models(), vec!["herd", "loner"]);
    assert_eq!(result.score("herd"), Some(40.5));
    assert_eq!(result.score("nobody"), None);
}

#[tokio::test]
async fn test_game_with_failing_sources_completes() {
    let config = config(4, 3, vec![ModelConfig::new("broken", "failing", 2)]);
    let mut game = Match::create(config, &registry()).unwrap();

    let summary = game.play_all().await;

    assert_eq!(summary.turns_played, 3);
    assert_eq!(summary.fallbacks, 3 * 2 * 2);
    for record in game.turns() {
        assert!(record.bets.iter().all(|&b| b < 4));
        assert!(record.actions.iter().all(|&a| a < 4));
    }
    assert!(summary.report().contains("random fallbacks"));
}

#[tokio::test]
async fn test_previous_actions_feed_next_turn() {
    let config = config(3, 2, vec![ModelConfig::new("m", "fixed:2", 2)]);
    let mut game = Match::create(config, &registry()).unwrap();

    game.play_turn().await;
    assert_eq!(game.previous_actions(), &[2, 2]);
    assert_eq!(game.turn(), 1);
    assert!(!game.is_finished());
}

#[test]
fn test_mean_of_empty_is_zero() {
    assert_eq!(mean(&[]), 0.0);
    assert_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
}

#[test]
fn test_summary_report_lists_models() {
    let summary = GameSummary {
        turns_played: 2,
        participants: vec![ParticipantScore {
            name: "a #1".to_string(),
            model: "a".to_string(),
            score: 9.0,
        }],
        model_averages: vec![("a".to_string(), 9.0)],
        score_history: vec![("a".to_string(), vec![4.5, 9.0])],
        fallbacks: 0,
    };
    let report = summary.report();
    assert!(report.contains("after 2 turns"));
    assert!(report.contains("a #1 (a)"));
    assert!(!report.contains("fallbacks"));
}
