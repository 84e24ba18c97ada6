//! Axum route handlers for the Fit Scoring API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::fit_scoring::models::{CandidateData, FitScoreResult, JobRequirement, RankedCandidate};
use crate::fit_scoring::scorer::FitScorer;
use crate::state::AppState;
use crate::store::{fit_score_key, fit_scores_of};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FitScoreRequest {
    pub talent_id: String,
    pub job_id: String,
    pub job_requirements: JobRequirement,
    pub candidate_data: CandidateData,
}

#[derive(Debug, Deserialize)]
pub struct BatchFitScoreRequest {
    pub job_id: String,
    pub job_requirements: JobRequirement,
    #[serde(default)]
    pub candidates: Vec<CandidateData>,
}

#[derive(Debug, Serialize)]
pub struct FitScoreResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: FitScoreResult,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BatchFitScoreResponse {
    pub success: bool,
    pub job_id: String,
    pub total_candidates: usize,
    pub results: Vec<FitScoreResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TalentScoresResponse {
    pub success: bool,
    pub talent_id: String,
    pub total: usize,
    pub results: Vec<FitScoreResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub success: bool,
    pub job_id: String,
    pub ranked_candidates: Vec<RankedCandidate>,
    pub timestamp: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /ai/screening/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<FitScoreRequest>,
) -> Result<Json<FitScoreResponse>, AppError> {
    require_id("talent_id", &request.talent_id)?;
    require_id("job_id", &request.job_id)?;

    let result = state.fit_scorer.score(
        &request.talent_id,
        &request.job_id,
        &request.job_requirements,
        &request.candidate_data,
    );
    store_results(&state, std::slice::from_ref(&result)).await?;

    Ok(Json(FitScoreResponse {
        success: true,
        result,
        timestamp: Utc::now(),
    }))
}

/// POST /ai/screening/batch-score
///
/// Results are in the same order as `candidates`.
pub async fn handle_batch_score(
    State(state): State<AppState>,
    Json(request): Json<BatchFitScoreRequest>,
) -> Result<Json<BatchFitScoreResponse>, AppError> {
    require_id("job_id", &request.job_id)?;

    let results = score_off_thread(
        &state,
        request.job_id.clone(),
        request.job_requirements,
        request.candidates,
        |scorer, job_id, job, candidates| scorer.batch_score(job_id, job, candidates),
    )
    .await?;
    store_results(&state, &results).await?;

    Ok(Json(BatchFitScoreResponse {
        success: true,
        job_id: request.job_id,
        total_candidates: results.len(),
        results,
        timestamp: Utc::now(),
    }))
}

/// POST /ai/screening/rank
///
/// Best fit first; ties keep submission order.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<BatchFitScoreRequest>,
) -> Result<Json<RankResponse>, AppError> {
    require_id("job_id", &request.job_id)?;

    let ranked = score_off_thread(
        &state,
        request.job_id.clone(),
        request.job_requirements,
        request.candidates,
        |scorer, job_id, job, candidates| scorer.rank_candidates(job_id, job, candidates),
    )
    .await?;

    let results: Vec<FitScoreResult> = ranked.iter().map(|r| r.result.clone()).collect();
    store_results(&state, &results).await?;

    Ok(Json(RankResponse {
        success: true,
        job_id: request.job_id,
        ranked_candidates: ranked,
        timestamp: Utc::now(),
    }))
}

/// GET /ai/screening/score/:talent_id/:job_id
pub async fn handle_get_score(
    State(state): State<AppState>,
    Path((talent_id, job_id)): Path<(String, String)>,
) -> Result<Json<FitScoreResponse>, AppError> {
    let result = state
        .fit_scores
        .get(&fit_score_key(&talent_id, &job_id))
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Fit score not found for this talent-job combination".to_string())
        })?;

    Ok(Json(FitScoreResponse {
        success: true,
        result,
        timestamp: Utc::now(),
    }))
}

/// GET /ai/screening/scores/:talent_id
///
/// Every stored score for the talent, ordered by job id. Empty is not an error.
pub async fn handle_list_scores(
    State(state): State<AppState>,
    Path(talent_id): Path<String>,
) -> Result<Json<TalentScoresResponse>, AppError> {
    let results = state.fit_scores.list(&fit_scores_of(&talent_id)).await?;

    Ok(Json(TalentScoresResponse {
        success: true,
        talent_id,
        total: results.len(),
        results,
        timestamp: Utc::now(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn require_id(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Batch scoring is CPU-bound; keep it off the async workers.
async fn score_off_thread<T, F>(
    state: &AppState,
    job_id: String,
    job: JobRequirement,
    candidates: Vec<CandidateData>,
    run: F,
) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&dyn FitScorer, &str, &JobRequirement, &[CandidateData]) -> T + Send + 'static,
{
    let scorer = state.fit_scorer.clone();
    tokio::task::spawn_blocking(move || run(scorer.as_ref(), &job_id, &job, &candidates))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Scoring task failed: {e}")))
}

async fn store_results(state: &AppState, results: &[FitScoreResult]) -> Result<(), AppError> {
    for result in results {
        state
            .fit_scores
            .put(&fit_score_key(&result.talent_id, &result.job_id), result.clone())
            .await?;
    }
    info!("Stored {} fit score(s)", results.len());
    Ok(())
}
