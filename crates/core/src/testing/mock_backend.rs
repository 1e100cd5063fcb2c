//! Mock subtitle backend for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::search::{BackendError, QueryTier, RawCandidate, SearchBackend, TierKind};

/// A recorded tier submission for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    /// The tier that was submitted.
    pub tier: QueryTier,
    /// When the submission was made.
    pub timestamp: Instant,
}

/// Mock implementation of the SearchBackend trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidates per tier kind
/// - Fail or delay individual tiers
/// - Track submissions and completion order for assertions
///
/// # Example
///
/// ```rust,ignore
/// use subhound_core::testing::{fixtures, MockBackend};
///
/// let backend = MockBackend::new()
///     .with_tier(TierKind::Tag, vec![fixtures::subtitle("1", "en")])
///     .with_failure(TierKind::Imdb, BackendError::Timeout);
///
/// let results = search(criteria, &backend).await;
/// assert_eq!(backend.submission_count().await, 2);
/// ```
#[derive(Debug, Default)]
pub struct MockBackend {
    /// Candidates returned per tier kind. Missing kinds return nothing.
    responses: RwLock<HashMap<TierKind, Vec<RawCandidate>>>,
    /// Tier kinds that fail with the given error.
    failures: RwLock<HashMap<TierKind, BackendError>>,
    /// Artificial latency per tier kind.
    delays: RwLock<HashMap<TierKind, Duration>>,
    /// Recorded submissions, in call order.
    submissions: RwLock<Vec<RecordedSubmission>>,
    /// Tier kinds in the order their calls completed.
    completions: RwLock<Vec<TierKind>>,
}

impl MockBackend {
    /// Create a new mock backend that returns no candidates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: candidates to return for `tier`.
    pub fn with_tier(mut self, tier: TierKind, candidates: Vec<RawCandidate>) -> Self {
        self.responses.get_mut().insert(tier, candidates);
        self
    }

    /// Builder: make `tier` fail.
    pub fn with_failure(mut self, tier: TierKind, error: BackendError) -> Self {
        self.failures.get_mut().insert(tier, error);
        self
    }

    /// Builder: delay `tier` before it answers.
    pub fn with_delay(mut self, tier: TierKind, delay: Duration) -> Self {
        self.delays.get_mut().insert(tier, delay);
        self
    }

    /// Set the candidates returned for `tier`.
    pub async fn set_tier(&self, tier: TierKind, candidates: Vec<RawCandidate>) {
        self.responses.write().await.insert(tier, candidates);
    }

    /// Make subsequent submissions of `tier` fail.
    pub async fn set_failure(&self, tier: TierKind, error: BackendError) {
        self.failures.write().await.insert(tier, error);
    }

    /// Clear all injected failures.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Get recorded submissions.
    pub async fn recorded_submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.read().await.clone()
    }

    /// Get the number of submissions performed.
    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }

    /// Tier kinds in completion order.
    pub async fn completion_order(&self) -> Vec<TierKind> {
        self.completions.read().await.clone()
    }

    /// Clear recorded submissions and completions.
    pub async fn clear_recorded(&self) {
        self.submissions.write().await.clear();
        self.completions.write().await.clear();
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, tier: &QueryTier) -> Result<Vec<RawCandidate>, BackendError> {
        let kind = tier.kind();

        self.submissions.write().await.push(RecordedSubmission {
            tier: tier.clone(),
            timestamp: Instant::now(),
        });

        let delay = self.delays.read().await.get(&kind).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = match self.failures.read().await.get(&kind) {
            Some(err) => Err(err.clone()),
            None => Ok(self
                .responses
                .read()
                .await
                .get(&kind)
                .cloned()
                .unwrap_or_default()),
        };

        self.completions.write().await.push(kind);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::LanguageFilter;
    use crate::testing::fixtures;

    fn tag_tier() -> QueryTier {
        QueryTier::Tag {
            filename: "The.Matrix.1999.mkv".to_string(),
            languages: LanguageFilter::All,
        }
    }

    #[tokio::test]
    async fn test_returns_configured_candidates() {
        let backend = MockBackend::new().with_tier(
            TierKind::Tag,
            vec![fixtures::subtitle("1", "en"), fixtures::subtitle("2", "fr")],
        );

        let records = backend.submit(&tag_tier()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(backend.submission_count().await, 1);
        assert_eq!(
            backend.recorded_submissions().await[0].tier.kind(),
            TierKind::Tag
        );
    }

    #[tokio::test]
    async fn test_unconfigured_tier_is_empty() {
        let backend = MockBackend::new();
        assert!(backend.submit(&tag_tier()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let backend = MockBackend::new();
        backend.set_failure(TierKind::Tag, BackendError::Timeout).await;
        assert!(matches!(
            backend.submit(&tag_tier()).await,
            Err(BackendError::Timeout)
        ));

        backend.clear_failures().await;
        assert!(backend.submit(&tag_tier()).await.is_ok());
        assert_eq!(backend.completion_order().await.len(), 2);

        backend.clear_recorded().await;
        assert_eq!(backend.submission_count().await, 0);
    }
}
