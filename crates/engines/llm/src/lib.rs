//! LLM Action Source
//!
//! An [`ActionSource`] that asks a chat model for every bet and action. The
//! transport is abstracted behind [`ChatBackend`]; this crate owns everything
//! around it: the per-participant conversation, the prompt text, bounded
//! retries with a per-attempt timeout, and reply parsing.
//!
//! ```text
//! request ──► prompt::render ──► history ──► ChatBackend::complete
//!                                               │  (retry, timeout)
//!                                               ▼
//!                                  parse_choice ◄── reply
//! ```

pub mod parse;
pub mod prompt;

pub use parse::{parse_choice, strip_think_blocks};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use guess_core::{ActionSource, ChoiceRequest, SourceError, SourceRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(test)]
mod lib_tests;

// ============================================================================
// Conversation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion endpoint.
///
/// One backend is shared by every participant using it, so implementations
/// must be `Sync`. Network clients live outside this crate.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String, SourceError>;
}

// ============================================================================
// Retry policy
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per choice, including the first
    pub max_attempts: u32,
    /// Upper bound on a single backend call
    pub timeout: Duration,
    /// Pause after failed attempt `n` is `backoff * n`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(60),
            backoff: Duration::from_millis(500),
        }
    }
}

// ============================================================================
// LlmSource
// ============================================================================

pub struct LlmSource<B: ChatBackend> {
    backend: Arc<B>,
    model: String,
    system_prompt: String,
    policy: RetryPolicy,
    history: Vec<Message>,
}

impl<B: ChatBackend> LlmSource<B> {
    /// `model` is the backend's name for the model, not the roster label.
    pub fn new(backend: Arc<B>, model: impl Into<String>) -> Self {
        let system_prompt = prompt::DEFAULT_SYSTEM_PROMPT.to_string();
        Self {
            backend,
            model: model.into(),
            history: vec![Message::system(system_prompt.clone())],
            system_prompt,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self.reset_history();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Conversation so far, system prompt first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    fn reset_history(&mut self) {
        self.history.clear();
        self.history.push(Message::system(self.system_prompt.clone()));
    }

    /// Call the backend until it answers or attempts run out. Only transport
    /// failures and timeouts are retried.
    async fn complete_with_retry(&self) -> Result<String, SourceError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = SourceError::backend("no attempt made");

        for attempt in 1..=attempts {
            let call = self.backend.complete(&self.model, &self.history);
            match tokio::time::timeout(self.policy.timeout, call).await {
                Ok(Ok(reply)) => return Ok(reply),
                Ok(Err(err)) => last_error = err,
                Err(_) => {
                    last_error = SourceError::Timeout(self.policy.timeout.as_millis() as u64)
                }
            }
            warn!(
                model = %self.model,
                attempt,
                max_attempts = attempts,
                error = %last_error,
                "chat completion failed"
            );
            if attempt < attempts {
                tokio::time::sleep(self.policy.backoff * attempt).await;
            }
        }
        Err(last_error)
    }
}

impl<B: ChatBackend> std::fmt::Debug for LlmSource<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSource")
            .field("model", &self.model)
            .field("policy", &self.policy)
            .field("history_len", &self.history.len())
            .finish()
    }
}

#[async_trait]
impl<B: ChatBackend + 'static> ActionSource for LlmSource<B> {
    async fn choose(&mut self, request: &ChoiceRequest) -> Result<i64, SourceError> {
        self.history.push(Message::user(prompt::render(request)));

        let reply = match self.complete_with_retry().await {
            Ok(reply) => reply,
            Err(err) => {
                // keep user/assistant turns paired
                self.history.pop();
                return Err(err);
            }
        };
        debug!(
            model = %self.model,
            turn = request.turn,
            phase = request.phase_name(),
            reply = %reply,
            "model reply"
        );
        self.history.push(Message::assistant(reply.clone()));

        parse_choice(&reply, request.num_actions)
            .ok_or_else(|| SourceError::Unparseable(truncate(&reply, 120)))
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn new_game(&mut self) {
        self.reset_history();
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Register `llm` on `registry`, backed by a shared `backend`.
///
/// The backend model name comes from the roster entry's argument
/// (`llm:gpt-4o-mini`) and defaults to the model label.
pub fn register_llm<B: ChatBackend + 'static>(
    registry: &mut SourceRegistry,
    backend: Arc<B>,
    policy: RetryPolicy,
) {
    registry.register("llm", move |model, _| {
        let api_model = model.backend_arg().unwrap_or(model.name.as_str()).to_string();
        Box::new(LlmSource::new(Arc::clone(&backend), api_model).with_policy(policy))
    });
}
