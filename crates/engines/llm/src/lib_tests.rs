use super::*;
use guess_core::{GameConfig, Match, ModelConfig};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned replies in order; repeats the last one when exhausted.
#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, SourceError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedBackend {
    fn new(replies: Vec<Result<&str, SourceError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call(&self) -> Vec<Message> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, _model: &str, messages: &[Message]) -> Result<String, SourceError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap_or_else(|| Ok(String::new()))
        }
    }
}

/// Never answers in time.
struct StalledBackend;

#[async_trait]
impl ChatBackend for StalledBackend {
    async fn complete(&self, _model: &str, _messages: &[Message]) -> Result<String, SourceError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("ACTION: 0".into())
    }
}

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        timeout: Duration::from_secs(1),
        backoff: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_reply_is_parsed_and_recorded() {
    let backend = ScriptedBackend::new(vec![Ok("I'll go with the crowd. BET: 2")]);
    let mut source = LlmSource::new(backend.clone(), "test-model");

    let request = ChoiceRequest::bet(0, 4, 0.0, vec![]);
    assert_eq!(source.choose(&request).await.unwrap(), 2);

    let roles: Vec<Role> = source.history().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_action_prompt_shows_public_bets() {
    let backend = ScriptedBackend::new(vec![Ok("ACTION: 1")]);
    let mut source = LlmSource::new(backend.clone(), "test-model");

    let request = ChoiceRequest::action(2, 4, vec![1, 3, 1]);
    source.choose(&request).await.unwrap();

    let sent = backend.last_call();
    let prompt = &sent.last().unwrap().content;
    assert_eq!(sent.last().unwrap().role, Role::User);
    assert!(prompt.contains("[1, 3, 1]"));
    assert!(prompt.contains("Turn 3"));
}

#[tokio::test]
async fn test_bet_prompt_shows_previous_actions_and_score() {
    let backend = ScriptedBackend::new(vec![Ok("BET: 0")]);
    let mut source = LlmSource::new(backend.clone(), "test-model");

    source
        .choose(&ChoiceRequest::bet(1, 4, 9.5, vec![0, 2]))
        .await
        .unwrap();

    let prompt = backend.last_call().last().unwrap().content.clone();
    assert!(prompt.contains("9.5"));
    assert!(prompt.contains("[0, 2]"));
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let backend = ScriptedBackend::new(vec![
        Err(SourceError::backend("503")),
        Err(SourceError::backend("503")),
        Ok("ACTION: 3"),
    ]);
    let mut source = LlmSource::new(backend.clone(), "test-model").with_policy(quick_policy(3));

    let request = ChoiceRequest::action(0, 4, vec![0]);
    assert_eq!(source.choose(&request).await.unwrap(), 3);
    assert_eq!(backend.call_count(), 3);
    // failed attempts leave no trace in the conversation
    assert_eq!(source.history().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_attempts() {
    let backend = ScriptedBackend::new(vec![Err(SourceError::backend("down"))]);
    let mut source = LlmSource::new(backend.clone(), "test-model").with_policy(quick_policy(3));

    let err = source
        .choose(&ChoiceRequest::action(0, 4, vec![]))
        .await
        .unwrap_err();
    assert_eq!(err, SourceError::backend("down"));
    assert_eq!(backend.call_count(), 3);
    assert_eq!(source.history().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_each_attempt_is_bounded_by_timeout() {
    let mut source = LlmSource::new(Arc::new(StalledBackend), "slow").with_policy(quick_policy(2));

    let err = source
        .choose(&ChoiceRequest::bet(0, 4, 0.0, vec![]))
        .await
        .unwrap_err();
    assert_eq!(err, SourceError::Timeout(1000));
}

#[tokio::test]
async fn test_unparseable_reply_is_an_error() {
    let backend = ScriptedBackend::new(vec![Ok("I refuse to pick a number.")]);
    let mut source = LlmSource::new(backend, "test-model");

    let err = source
        .choose(&ChoiceRequest::action(0, 4, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Unparseable(_)));
    // the reply still belongs to the conversation
    assert_eq!(source.history().last().unwrap().role, Role::Assistant);
}

#[tokio::test]
async fn test_new_game_resets_conversation() {
    let backend = ScriptedBackend::new(vec![Ok("BET: 1")]);
    let mut source = LlmSource::new(backend, "test-model").with_system_prompt("be brief");

    source
        .choose(&ChoiceRequest::bet(0, 4, 0.0, vec![]))
        .await
        .unwrap();
    source.new_game();

    assert_eq!(source.history(), &[Message::system("be brief")]);
}

#[test]
fn test_register_llm_uses_backend_argument() {
    let mut registry = SourceRegistry::new();
    register_llm(
        &mut registry,
        ScriptedBackend::new(vec![Ok("0")]),
        RetryPolicy::default(),
    );

    let named = registry
        .resolve(&ModelConfig::new("fast", "llm:gpt-4o-mini", 1), 0)
        .unwrap();
    assert_eq!(named.name(), "gpt-4o-mini");

    let bare = registry
        .resolve(&ModelConfig::new("claude-haiku", "llm", 1), 0)
        .unwrap();
    assert_eq!(bare.name(), "claude-haiku");
}

#[tokio::test]
async fn test_full_match_without_fallbacks() {
    let mut registry = SourceRegistry::new();
    register_llm(
        &mut registry,
        ScriptedBackend::new(vec![Ok("ACTION: 1")]),
        RetryPolicy::default(),
    );

    let config = GameConfig::new(
        3,
        2,
        vec![
            ModelConfig::new("alpha", "llm", 2),
            ModelConfig::new("beta", "llm", 1),
        ],
    );
    let mut game = Match::create(config, &registry).unwrap();
    let summary = game.play_all().await;

    assert_eq!(summary.turns_played, 2);
    assert_eq!(summary.fallbacks, 0);
    // everyone bets and plays 1: 4*3 + 0.5*3 per turn
    for p in &summary.participants {
        assert!((p.score - 27.0).abs() < 1e-9);
    }
}
