//! Lookup from roster entries to [`ActionSource`] constructors.
//!
//! Sources are resolved once, when a match builds its participants. A model
//! label can have its own factory; otherwise the entry's backend kind
//! (`"random"`, `"constant"`, ...) is looked up.

use std::collections::HashMap;

use crate::config::ModelConfig;
use crate::error::GameError;
use crate::ActionSource;

/// Builds a source for instance `n` (zero-based) of a roster entry.
pub type SourceFactory = Box<dyn Fn(&ModelConfig, usize) -> Box<dyn ActionSource> + Send + Sync>;

#[derive(Default)]
pub struct SourceRegistry {
    by_model: HashMap<String, SourceFactory>,
    by_backend: HashMap<String, SourceFactory>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a backend kind.
    pub fn register<F>(&mut self, backend: impl Into<String>, factory: F)
    where
        F: Fn(&ModelConfig, usize) -> Box<dyn ActionSource> + Send + Sync + 'static,
    {
        self.by_backend.insert(backend.into(), Box::new(factory));
    }

    /// Register a factory for one model label. Takes precedence over the
    /// backend kind.
    pub fn register_model<F>(&mut self, model: impl Into<String>, factory: F)
    where
        F: Fn(&ModelConfig, usize) -> Box<dyn ActionSource> + Send + Sync + 'static,
    {
        self.by_model.insert(model.into(), Box::new(factory));
    }

    pub fn with<F>(mut self, backend: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ModelConfig, usize) -> Box<dyn ActionSource> + Send + Sync + 'static,
    {
        self.register(backend, factory);
        self
    }

    pub fn resolve(
        &self,
        model: &ModelConfig,
        instance: usize,
    ) -> Result<Box<dyn ActionSource>, GameError> {
        let factory = self
            .by_model
            .get(&model.name)
            .or_else(|| self.by_backend.get(model.backend_kind()))
            .ok_or_else(|| GameError::UnknownBackend {
                model: model.name.clone(),
                backend: model.backend.clone(),
            })?;
        Ok(factory(model, instance))
    }

    /// Registered backend kinds, sorted.
    pub fn backends(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_backend.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("models", &self.by_model.keys().collect::<Vec<_>>())
            .field("backends", &self.backends())
            .finish()
    }
}
