//! Plan, rank and search handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use subhound_core::{
    plan, resolve_fingerprint, QueryTier, RankedResults, ResultLimit, SearchCriteria,
    SearchDefaults, TierResponse,
};
use tracing::debug;

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Search criteria as submitted over HTTP.
///
/// `languages`, `extensions`, `limit` and `gzip` fall back to the `[search]`
/// section of the configuration when omitted.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub criteria: SearchCriteria,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<ResultLimit>,
    #[serde(default)]
    pub gzip: Option<bool>,
}

impl SearchRequest {
    pub fn into_criteria(self, defaults: &SearchDefaults) -> SearchCriteria {
        let mut criteria = self.criteria;
        criteria.languages = self
            .languages
            .unwrap_or_else(|| defaults.languages.clone());
        criteria.extensions = self
            .extensions
            .unwrap_or_else(|| defaults.extensions.clone());
        criteria.limit = self.limit.unwrap_or(defaults.limit);
        criteria.gzip = self.gzip.unwrap_or(defaults.gzip);
        criteria
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub tiers: Vec<QueryTier>,
}

/// Candidates the caller already fetched, one list per tier.
#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub criteria: SearchRequest,
    #[serde(default)]
    pub tiers: Vec<TierResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/plan
pub async fn plan_search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let criteria = body.into_criteria(&state.config().search);
    let criteria = resolve_fingerprint(criteria).await?;
    let tiers = plan(&criteria)?;
    Ok(Json(PlanResponse { tiers }))
}

/// POST /api/v1/rank
pub async fn rank_candidates(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RankRequest>,
) -> Result<Json<RankedResults>, ApiError> {
    let criteria = body.criteria.into_criteria(&state.config().search);
    let criteria = resolve_fingerprint(criteria).await?;

    debug!(tiers = body.tiers.len(), "Ranking caller-supplied candidates");
    Ok(Json(state.engine().rank(body.tiers, &criteria)))
}

/// POST /api/v1/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<RankedResults>, ApiError> {
    let backend = state
        .backend()
        .ok_or_else(|| ApiError::service_unavailable("Search backend not configured"))?;

    let criteria = body.into_criteria(&state.config().search);
    let results = state.engine().search(criteria, backend.as_ref()).await?;
    Ok(Json(results))
}
