//! Stub sources shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::{ActionSource, ChoiceRequest, SourceError};

/// Returns the same value every time, optionally after a delay.
pub struct FixedSource {
    pub value: i64,
    pub delay: Duration,
}

impl FixedSource {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(value: i64, delay_ms: u64) -> Self {
        Self {
            value,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

#[async_trait]
impl ActionSource for FixedSource {
    async fn choose(&mut self, _request: &ChoiceRequest) -> Result<i64, SourceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.value)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Always fails.
pub struct FailingSource;

#[async_trait]
impl ActionSource for FailingSource {
    async fn choose(&mut self, _request: &ChoiceRequest) -> Result<i64, SourceError> {
        Err(SourceError::backend("connection refused"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Records every request it sees and answers with `value`.
pub struct RecordingSource {
    pub value: i64,
    pub seen: Arc<Mutex<Vec<ChoiceRequest>>>,
}

impl RecordingSource {
    pub fn new(value: i64) -> (Self, Arc<Mutex<Vec<ChoiceRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                value,
                seen: seen.clone(),
            },
            seen,
        )
    }
}

#[async_trait]
impl ActionSource for RecordingSource {
    async fn choose(&mut self, request: &ChoiceRequest) -> Result<i64, SourceError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.value)
    }

    fn name(&self) -> &str {
        "recording"
    }
}
