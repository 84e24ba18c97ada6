//! Axum route handlers for the CV Parser API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cv_parser::models::ParsedCv;
use crate::documents::extract::detect_mime_type;
use crate::errors::AppError;
use crate::state::AppState;

const MIN_TEXT_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    pub text: String,
    /// Where the text came from (`text`, `linkedin`, ...). Informational.
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CvParseResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<ParsedCv>,
    pub errors: Vec<String>,
}

impl CvParseResponse {
    fn from_parsed(parsed: ParsedCv, ok_message: &str) -> Self {
        let errors: Vec<String> = parsed.error.iter().cloned().collect();
        let message = if parsed.fallback {
            "CV could not be fully parsed; returning fallback data".to_string()
        } else {
            ok_message.to_string()
        };
        Self {
            success: true,
            message,
            data: Some(parsed),
            errors,
        }
    }
}

/// POST /ai/cv/parse
///
/// Multipart upload with a `file` field. PDF, DOCX or TXT.
pub async fn handle_parse_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CvParseResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("unknown").to_string();
        let declared = field.content_type().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let mime_type = match declared.as_deref() {
            Some(ct) if ct != "application/octet-stream" => ct.to_string(),
            _ => detect_mime_type(&bytes, &filename).to_string(),
        };

        let parsed = state
            .cv_parser
            .parse_document(bytes.to_vec(), &mime_type, &filename)
            .await?;

        return Ok(Json(CvParseResponse::from_parsed(
            parsed,
            "CV parsed successfully",
        )));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// POST /ai/cv/parse-text
pub async fn handle_parse_cv_text(
    State(state): State<AppState>,
    Json(request): Json<ParseTextRequest>,
) -> Result<Json<CvParseResponse>, AppError> {
    if request.text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(AppError::Validation(format!(
            "text must be at least {MIN_TEXT_CHARS} characters"
        )));
    }

    debug!(
        "Parsing CV text from source '{}'",
        request.source.as_deref().unwrap_or("text")
    );
    let parsed = state.cv_parser.parse_text(&request.text).await;
    Ok(Json(CvParseResponse::from_parsed(
        parsed,
        "CV text parsed successfully",
    )))
}
