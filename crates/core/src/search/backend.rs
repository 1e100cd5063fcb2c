//! Remote subtitle service abstraction.

use async_trait::async_trait;
use thiserror::Error;

use super::planner::QueryTier;
use super::types::RawCandidate;

/// Errors a search backend can report for a single tier request.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Subtitle service connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Subtitle service API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A remote subtitle search service.
///
/// Transport, authentication and session handling belong to the
/// implementation. The pipeline only submits query tiers and collects the
/// raw records each one returns.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Run one query tier. An empty result is `Ok(vec![])`, not an error.
    async fn submit(&self, tier: &QueryTier) -> Result<Vec<RawCandidate>, BackendError>;
}
