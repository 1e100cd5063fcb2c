//! Subtitle search.
//!
//! A search runs as a fixed pipeline:
//!
//! 1. Fingerprint the video when only a path is known.
//! 2. [`plan`] the query tiers.
//! 3. Submit every tier to the [`SearchBackend`] concurrently.
//! 4. Merge responses in tier order and [`Scorer::score`] them.
//! 5. [`filter`] each language group down to the requested limit.
//!
//! Nothing is shared between searches; a [`SubtitleSearch`] only holds the
//! scoring weights and failure policy.

mod backend;
mod dedup;
mod filter;
mod normalize;
mod planner;
mod scorer;
mod types;

pub use backend::{BackendError, SearchBackend};
pub use dedup::{merge_tiers, MergedCandidates};
pub use filter::filter;
pub use normalize::{fold_accents, tokenize};
pub use planner::{plan, PlanError, QueryTier, TierKind};
pub use scorer::Scorer;
pub(crate) use types::default_extensions;
pub use types::{
    parse_imdb_id, Candidate, EpisodeRef, GroupedCandidates, LanguageFilter, MalformedCandidate,
    MatchKind, RankedEntry, RankedResults, RawCandidate, ResultLimit, Score, ScoredCandidate,
    SearchCriteria, TierResponse,
};

use std::time::Instant;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ErrorKind;
use crate::fingerprint::{fingerprint, FingerprintError};
use crate::metrics::{BACKEND_REQUESTS, SEARCHES_TOTAL, SEARCH_DURATION};

/// Errors that can occur during a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error("Search backend failed on {tier} tier: {source}")]
    Backend {
        tier: TierKind,
        #[source]
        source: BackendError,
    },

    #[error("All {count} query tiers failed")]
    AllTiersFailed { count: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Plan(PlanError::InsufficientCriteria) => ErrorKind::Validation,
            Self::Plan(PlanError::Fingerprint(e)) | Self::Fingerprint(e) => e.kind(),
            Self::Backend { .. } | Self::AllTiersFailed { .. } => ErrorKind::Backend,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True when the underlying failure is a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Plan(PlanError::Fingerprint(e)) | Self::Fingerprint(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Runs searches against a backend.
#[derive(Debug, Clone, Default)]
pub struct SubtitleSearch {
    scorer: Scorer,
    partial_results: bool,
}

impl SubtitleSearch {
    pub fn new(scorer: Scorer) -> Self {
        Self {
            scorer,
            partial_results: false,
        }
    }

    /// Weights from `[scoring]`, failure policy from `[search]`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Scorer::with_config(&config.scoring))
            .with_partial_results(config.search.partial_results)
    }

    /// Skip failed tiers instead of failing the search.
    ///
    /// The search still fails if every tier fails.
    pub fn with_partial_results(mut self, enabled: bool) -> Self {
        self.partial_results = enabled;
        self
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Score and filter responses that were already fetched.
    pub fn rank(&self, responses: Vec<TierResponse>, criteria: &SearchCriteria) -> RankedResults {
        filter(self.scorer.score(responses, criteria), criteria.limit)
    }

    /// Run a complete search.
    pub async fn search(
        &self,
        criteria: SearchCriteria,
        backend: &dyn SearchBackend,
    ) -> Result<RankedResults, SearchError> {
        let start = Instant::now();
        let result = self.run(criteria, backend).await;

        let label = match &result {
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };
        SEARCHES_TOTAL.with_label_values(&[label]).inc();
        SEARCH_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn run(
        &self,
        criteria: SearchCriteria,
        backend: &dyn SearchBackend,
    ) -> Result<RankedResults, SearchError> {
        let criteria = resolve_fingerprint(criteria).await?;
        let tiers = plan(&criteria)?;

        // join_all yields results in input order, so responses stay in tier
        // order whatever order the calls complete in.
        let calls = tiers.iter().map(|tier| async move {
            let result = backend.submit(tier).await;
            let status = if result.is_ok() { "success" } else { "error" };
            BACKEND_REQUESTS
                .with_label_values(&[tier.kind().as_str(), status])
                .inc();
            (tier.kind(), result)
        });
        let results = join_all(calls).await;

        let mut responses = Vec::with_capacity(results.len());
        let mut failed = 0;
        for (tier, result) in results {
            match result {
                Ok(candidates) => {
                    debug!(
                        backend = backend.name(),
                        tier = %tier,
                        candidates = candidates.len(),
                        "Tier returned candidates"
                    );
                    responses.push(TierResponse { tier, candidates });
                }
                Err(source) if self.partial_results => {
                    warn!(
                        backend = backend.name(),
                        tier = %tier,
                        error = %source,
                        "Tier failed, skipping"
                    );
                    failed += 1;
                }
                Err(source) => return Err(SearchError::Backend { tier, source }),
            }
        }

        if responses.is_empty() && failed > 0 {
            return Err(SearchError::AllTiersFailed { count: failed });
        }

        let seen: usize = responses.iter().map(|r| r.candidates.len()).sum();
        let grouped = self.scorer.score(responses, &criteria);
        let survivors: usize = grouped.values().map(Vec::len).sum();
        let ranked = filter(grouped, criteria.limit);

        info!(
            backend = backend.name(),
            tiers = tiers.len(),
            failed_tiers = failed,
            candidates = seen,
            survivors = survivors,
            languages = ranked.len(),
            "Search complete"
        );

        Ok(ranked)
    }
}

/// Search with the default weights and abort-on-failure policy.
pub async fn search(
    criteria: SearchCriteria,
    backend: &dyn SearchBackend,
) -> Result<RankedResults, SearchError> {
    SubtitleSearch::default().search(criteria, backend).await
}

/// Fingerprint the video on a blocking thread when only a path is known.
///
/// Criteria that already carry a fingerprint, or have no path, pass through.
pub async fn resolve_fingerprint(
    mut criteria: SearchCriteria,
) -> Result<SearchCriteria, SearchError> {
    if criteria.fingerprint.is_some() {
        return Ok(criteria);
    }
    let Some(path) = criteria.video_path().cloned() else {
        return Ok(criteria);
    };

    let fp = tokio::task::spawn_blocking(move || fingerprint(&path))
        .await
        .map_err(|e| SearchError::Internal(format!("Fingerprint task failed: {}", e)))??;
    criteria.fingerprint = Some(fp);
    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            SearchError::from(PlanError::InsufficientCriteria).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            SearchError::from(FingerprintError::MissingPath).kind(),
            ErrorKind::Validation
        );

        let missing = FingerprintError::Io {
            path: Path::new("/nope.mkv").to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let err = SearchError::from(PlanError::Fingerprint(missing));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.is_not_found());

        let err = SearchError::Backend {
            tier: TierKind::Imdb,
            source: BackendError::Timeout,
        };
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert_eq!(
            err.to_string(),
            "Search backend failed on imdb tier: Request timeout"
        );
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolve_fingerprint_keeps_supplied() {
        let fp = crate::fingerprint::FileFingerprint::new("abc", 3).unwrap();
        let criteria = SearchCriteria {
            fingerprint: Some(fp.clone()),
            path: Some("/nonexistent/video.mkv".into()),
            ..Default::default()
        };
        let resolved = resolve_fingerprint(criteria).await.unwrap();
        assert_eq!(resolved.fingerprint, Some(fp));
    }

    #[tokio::test]
    async fn test_resolve_fingerprint_missing_file() {
        let criteria = SearchCriteria {
            path: Some("/nonexistent/video.mkv".into()),
            ..Default::default()
        };
        let err = resolve_fingerprint(criteria).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.search.partial_results = true;
        let engine = SubtitleSearch::from_config(&config);
        assert!(engine.partial_results);
    }
}
