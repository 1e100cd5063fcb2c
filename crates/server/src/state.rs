use std::sync::Arc;
use subhound_core::{Config, SearchBackend, SubtitleSearch};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: SubtitleSearch,
    backend: Option<Arc<dyn SearchBackend>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let engine = SubtitleSearch::from_config(&config);
        Self {
            config,
            engine,
            backend: None,
        }
    }

    /// Attach the backend used by `POST /search`.
    pub fn with_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &SubtitleSearch {
        &self.engine
    }

    pub fn backend(&self) -> Option<&Arc<dyn SearchBackend>> {
        self.backend.as_ref()
    }
}
