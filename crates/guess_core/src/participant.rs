//! A single player in a match.

use crate::error::SourceError;
use crate::{ActionSource, ChoiceRequest};

/// One player: identity, cumulative score, and the source that makes its
/// choices.
///
/// The score is only changed by the owning [`Match`](crate::Match), between
/// phases; the source only ever sees it as part of a bet request.
pub struct Participant {
    name: String,
    model: String,
    score: f64,
    source: Box<dyn ActionSource>,
}

impl Participant {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        source: Box<dyn ActionSource>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            score: 0.0,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model label shared by every participant driven by the same backend
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub(crate) fn add_points(&mut self, points: f64) {
        self.score += points;
    }

    pub(crate) fn new_game(&mut self) {
        self.score = 0.0;
        self.source.new_game();
    }

    /// Ask the source for a choice and check it is legal.
    pub async fn request(&mut self, request: &ChoiceRequest) -> Result<usize, SourceError> {
        let value = self.source.choose(request).await?;
        validate_choice(value, request.num_actions)
    }
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("score", &self.score)
            .field("source", &self.source.name())
            .finish()
    }
}

/// Accept `value` only if it lies in `0..num_actions`.
pub fn validate_choice(value: i64, num_actions: usize) -> Result<usize, SourceError> {
    match usize::try_from(value) {
        Ok(choice) if choice < num_actions => Ok(choice),
        _ => Err(SourceError::OutOfRange { value, num_actions }),
    }
}
