//! File fingerprint, digest and payload handlers.
//!
//! All three read local files, so the work runs on the blocking pool.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use subhound_core::{
    compressed_payload, content_digest_with_buffer, fingerprint, DigestAlgorithm, FileFingerprint,
};

use super::error::{run_blocking, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PathRequest {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct DigestRequest {
    pub path: PathBuf,
    /// Falls back to `[fingerprint].digest`.
    #[serde(default)]
    pub algorithm: Option<DigestAlgorithm>,
}

#[derive(Debug, Serialize)]
pub struct DigestResponse {
    pub digest: String,
    pub algorithm: DigestAlgorithm,
}

#[derive(Debug, Serialize)]
pub struct PayloadResponse {
    pub payload: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/fingerprint
pub async fn fingerprint_file(
    Json(body): Json<PathRequest>,
) -> Result<Json<FileFingerprint>, ApiError> {
    let fp = run_blocking(move || fingerprint(&body.path)).await?;
    Ok(Json(fp))
}

/// POST /api/v1/digest
pub async fn digest_file(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DigestRequest>,
) -> Result<Json<DigestResponse>, ApiError> {
    let settings = &state.config().fingerprint;
    let algorithm = body.algorithm.unwrap_or(settings.digest);
    let buffer_size = settings.buffer_size;

    let digest =
        run_blocking(move || content_digest_with_buffer(&body.path, algorithm, buffer_size))
            .await?;
    Ok(Json(DigestResponse { digest, algorithm }))
}

/// POST /api/v1/payload
pub async fn payload_file(
    Json(body): Json<PathRequest>,
) -> Result<Json<PayloadResponse>, ApiError> {
    let payload = run_blocking(move || compressed_payload(&body.path)).await?;
    Ok(Json(PayloadResponse { payload }))
}
