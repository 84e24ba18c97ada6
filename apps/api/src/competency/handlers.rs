//! Axum route handlers for the Competency API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::competency::models::CompetencySignal;
use crate::competency::sources::SourcePayload;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateSignalsRequest {
    pub talent_id: String,
    #[serde(flatten)]
    pub payload: SourcePayload,
}

#[derive(Debug, Serialize)]
pub struct SignalsResponse {
    pub success: bool,
    pub talent_id: String,
    pub signals: Vec<CompetencySignal>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub talent_id: String,
    pub message: String,
    pub job_id: Uuid,
    pub signal_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /ai/competency/signals
///
/// Generates signals from the submitted sources and replaces whatever was
/// stored for the talent. The payload is kept so the set can be refreshed.
pub async fn handle_generate_signals(
    State(state): State<AppState>,
    Json(request): Json<GenerateSignalsRequest>,
) -> Result<Json<SignalsResponse>, AppError> {
    let talent_id = request.talent_id.trim().to_string();
    if talent_id.is_empty() {
        return Err(AppError::Validation("talent_id cannot be empty".to_string()));
    }

    // Payload before signals: refresh replays whatever payload is stored.
    state.payloads.put(&talent_id, request.payload.clone()).await?;
    let signals = generate_and_store(&state, &talent_id, &request.payload).await?;

    Ok(Json(SignalsResponse {
        success: true,
        talent_id,
        signals,
        timestamp: Utc::now(),
    }))
}

/// GET /ai/competency/signals/:talent_id
pub async fn handle_get_signals(
    State(state): State<AppState>,
    Path(talent_id): Path<String>,
) -> Result<Json<SignalsResponse>, AppError> {
    let signals = state
        .signals
        .get(&talent_id)
        .await?
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::NotFound(format!("No competency signals found for talent: {talent_id}"))
        })?;

    Ok(Json(SignalsResponse {
        success: true,
        talent_id,
        signals,
        timestamp: Utc::now(),
    }))
}

/// POST /ai/competency/signals/:talent_id/refresh
///
/// Re-runs the pipeline over the last submitted payload.
pub async fn handle_refresh_signals(
    State(state): State<AppState>,
    Path(talent_id): Path<String>,
) -> Result<Json<RefreshResponse>, AppError> {
    let payload = state.payloads.get(&talent_id).await?.ok_or_else(|| {
        AppError::NotFound(format!("No source data stored for talent: {talent_id}"))
    })?;

    let job_id = Uuid::new_v4();
    let signals = generate_and_store(&state, &talent_id, &payload).await?;
    info!("Refresh {job_id} regenerated signals for talent {talent_id}");

    Ok(Json(RefreshResponse {
        success: true,
        talent_id,
        message: "Competency signals refreshed".to_string(),
        job_id,
        signal_count: signals.len(),
    }))
}

/// GET /ai/competency/skills/taxonomy
pub async fn handle_skills_taxonomy() -> Json<Value> {
    Json(skills_taxonomy())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn generate_and_store(
    state: &AppState,
    talent_id: &str,
    payload: &SourcePayload,
) -> Result<Vec<CompetencySignal>, AppError> {
    let mut signals = state.signal_generator.generate(talent_id, payload);

    let now = Utc::now();
    for signal in &mut signals {
        signal.last_updated = Some(now);
    }

    state.signals.put(talent_id, signals.clone()).await?;
    info!(
        "Stored {} competency signals for talent {}",
        signals.len(),
        talent_id
    );
    Ok(signals)
}

fn skills_taxonomy() -> Value {
    json!({
        "version": "1.0",
        "categories": [
            {
                "name": "Technical Skills",
                "skills": [
                    {"id": "python", "name": "Python", "category": "Programming"},
                    {"id": "javascript", "name": "JavaScript", "category": "Programming"},
                    {"id": "data_analysis", "name": "Data Analysis", "category": "Data Science"}
                ]
            },
            {
                "name": "Soft Skills",
                "skills": [
                    {"id": "communication", "name": "Communication", "category": "Interpersonal"},
                    {"id": "leadership", "name": "Leadership", "category": "Management"},
                    {"id": "problem_solving", "name": "Problem Solving", "category": "Cognitive"}
                ]
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_flattens_sources() {
        let request: GenerateSignalsRequest = serde_json::from_value(json!({
            "talent_id": "t-1",
            "cv_data": {"skills": ["Python"], "work_experience": []},
            "tapi_data": [{"skills_demonstrated": ["Python"], "performance_score": 80}],
            "courses": []
        }))
        .unwrap();

        assert_eq!(request.talent_id, "t-1");
        assert!(request.payload.cv_data.is_some());
        assert_eq!(request.payload.performance_intelligence.len(), 1);
    }

    #[test]
    fn test_taxonomy_has_two_categories() {
        let taxonomy = skills_taxonomy();
        let categories = taxonomy["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0]["skills"][0]["name"], "Python");
    }
}
