//! Backend operation handlers: resume parsing, LLM job matching and
//! screening. The LLM-backed operations always return a result; on failure
//! it is the neutral default with `error` set.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::ai_operations::models::{
    AiRequest, FileMetadata, JobMatchResult, ResumeParseResult, ScreeningScoreResult,
};
use crate::ai_operations::prompts::{
    job_match_user_prompt, screening_user_prompt, JOB_MATCH_ROLE, SCREENING_ROLE,
};
use crate::competency::sources::SourcePayload;
use crate::cv_parser::ParsedCv;
use crate::documents::extract::detect_mime_type;
use crate::errors::AppError;
use crate::llm_client::prompts::json_system_prompt;
use crate::llm_client::{complete_json, TextGenerator};
use crate::state::AppState;

/// Download (or reuse backend-extracted text), extract, parse, then derive
/// competency signals from the CV alone.
pub async fn resume_parse(
    state: &AppState,
    request: &AiRequest,
) -> Result<ResumeParseResult, AppError> {
    let file = request
        .primary_file()
        .ok_or_else(|| AppError::Validation("No file provided for resume parsing".to_string()))?;

    let cv = parse_file(state, file).await?;

    let payload = SourcePayload {
        cv_data: Some(cv.to_cv_data()),
        ..Default::default()
    };
    let competency_signals = state
        .signal_generator
        .generate(request.meta_data.talent_key(), &payload);

    let summary = format!("CV parsed for {}", cv.personal_info.name);
    Ok(ResumeParseResult {
        cv,
        competency_signals,
        summary,
    })
}

pub async fn job_match(llm: &dyn TextGenerator, request: &AiRequest) -> JobMatchResult {
    let meta = &request.meta_data;
    info!(
        "Job match for user {} against job {}",
        meta.user_id,
        meta.job_id.as_deref().unwrap_or("-")
    );

    let talent_profile = meta.talent_profile.clone().unwrap_or_else(|| json!({}));
    let job_details = json!({
        "title": meta.job_title,
        "company": meta.company_name,
        "description": meta.job_description,
        "required_skills": meta.required_skills.clone().unwrap_or_default(),
        "preferred_skills": meta.preferred_skills.clone().unwrap_or_default(),
        "experience_level": meta.experience_level,
    });

    let system = json_system_prompt(JOB_MATCH_ROLE);
    let user = job_match_user_prompt(&talent_profile, &job_details);
    match complete_json::<JobMatchResult>(llm, &system, &user).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Job match fell back to neutral result: {e}");
            JobMatchResult {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}

/// The CV is optional; a CV that cannot be fetched or read is scored as
/// absent rather than failing the request.
pub async fn screening_score(state: &AppState, request: &AiRequest) -> ScreeningScoreResult {
    let meta = &request.meta_data;
    info!(
        "Screening score for session {}",
        meta.session_id.as_deref().unwrap_or("-")
    );

    let cv: Value = match request.primary_file() {
        Some(file) => match parse_file(state, file).await {
            Ok(parsed) => serde_json::to_value(&parsed).unwrap_or_else(|_| json!({})),
            Err(e) => {
                warn!("Screening continues without CV: {e}");
                json!({})
            }
        },
        None => json!({}),
    };
    let criteria = meta.screening_criteria.clone().unwrap_or_else(|| json!({}));

    let system = json_system_prompt(SCREENING_ROLE);
    let user = screening_user_prompt(&cv, &criteria);
    match complete_json::<ScreeningScoreResult>(state.llm.as_ref(), &system, &user).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Screening fell back to neutral result: {e}");
            ScreeningScoreResult {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}

async fn parse_file(state: &AppState, file: &FileMetadata) -> Result<ParsedCv, AppError> {
    if let Some(text) = file.extracted_text.as_deref().filter(|t| !t.trim().is_empty()) {
        return Ok(state.cv_parser.parse_text(text).await);
    }

    let bytes = state
        .blobs
        .fetch(&file.url)
        .await
        .ok_or_else(|| AppError::Validation("Failed to download CV file".to_string()))?;

    let mime_type = if file.mime_type.is_empty() {
        detect_mime_type(&bytes, &file.original_name).to_string()
    } else {
        file.mime_type.clone()
    };

    Ok(state
        .cv_parser
        .parse_document(bytes.to_vec(), &mime_type, &file.original_name)
        .await?)
}
