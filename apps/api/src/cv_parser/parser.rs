//! CV Parser: document bytes or raw text → `ParsedCv`.
//!
//! Text parsing never fails: any model or JSON problem produces a fallback
//! `ParsedCv` carrying the error. Only upload validation and text extraction
//! return errors.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::cv_parser::extractors::{
    extract_certifications, extract_education, extract_languages, extract_personal_info,
    extract_projects, extract_skills, extract_work_experience,
};
use crate::cv_parser::models::ParsedCv;
use crate::cv_parser::normalizers::{calculate_experience_years, normalize_skills};
use crate::cv_parser::prompts::{cv_parse_user_prompt, CV_PARSE_ROLE};
use crate::documents::extract::{MIME_DOCX, MIME_PDF, MIME_TEXT};
use crate::documents::{DocumentError, DocumentExtractor};
use crate::llm_client::prompts::json_system_prompt;
use crate::llm_client::{complete_json, LlmError, TextGenerator};

/// Mime types accepted at the upload boundary.
pub const ACCEPTED_MIME_TYPES: [&str; 3] = [MIME_PDF, MIME_DOCX, MIME_TEXT];

const DEFAULT_CONFIDENCE: f64 = 0.8;
const FALLBACK_INVALID_JSON: &str = "Unable to parse - Invalid JSON";
const FALLBACK_AI_ERROR: &str = "Unable to parse - AI service error";

#[derive(Clone)]
pub struct CvParser {
    llm: Arc<dyn TextGenerator>,
    extractor: Arc<dyn DocumentExtractor>,
    max_size_bytes: usize,
}

impl CvParser {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        extractor: Arc<dyn DocumentExtractor>,
        max_size_bytes: usize,
    ) -> Self {
        Self {
            llm,
            extractor,
            max_size_bytes,
        }
    }

    /// Rejects unsupported mime types and oversized files.
    pub fn validate_upload(&self, size: usize, mime_type: &str) -> Result<(), DocumentError> {
        if !ACCEPTED_MIME_TYPES.contains(&mime_type) {
            return Err(DocumentError::UnsupportedType(format!(
                "{mime_type}. Allowed: PDF, DOCX, TXT"
            )));
        }
        if size > self.max_size_bytes {
            return Err(DocumentError::TooLarge {
                size,
                limit: self.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Extraction runs on the blocking pool; a panicking PDF decoder surfaces
    /// as an extraction error.
    pub async fn extract_text(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, DocumentError> {
        let extractor = self.extractor.clone();
        let mime = mime_type.to_string();
        tokio::task::spawn_blocking(move || extractor.extract(&bytes, &mime))
            .await
            .map_err(|e| DocumentError::Extraction(format!("extraction task failed: {e}")))?
    }

    pub async fn parse_document(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        filename: &str,
    ) -> Result<ParsedCv, DocumentError> {
        self.validate_upload(bytes.len(), mime_type)?;
        let text = self.extract_text(bytes, mime_type).await?;
        info!("Extracted {} chars from {filename}", text.len());
        Ok(self.parse_text(&text).await)
    }

    pub async fn parse_text(&self, text: &str) -> ParsedCv {
        let system = json_system_prompt(CV_PARSE_ROLE);
        let user = cv_parse_user_prompt(text);
        let reply = complete_json::<Value>(self.llm.as_ref(), &system, &user).await;

        match reply {
            Ok(value) if value.is_object() => build_parsed_cv(&value, text),
            Ok(_) => {
                warn!("CV parse reply was JSON but not an object");
                ParsedCv::fallback(
                    FALLBACK_INVALID_JSON,
                    "JSON parsing error: expected an object".to_string(),
                    text,
                )
            }
            Err(LlmError::Parse(e)) => {
                warn!("CV parse reply was not valid JSON: {e}");
                ParsedCv::fallback(
                    FALLBACK_INVALID_JSON,
                    format!("JSON parsing error: {e}"),
                    text,
                )
            }
            Err(e) => {
                warn!("CV parse LLM call failed: {e}");
                ParsedCv::fallback(FALLBACK_AI_ERROR, e.to_string(), text)
            }
        }
    }
}

fn build_parsed_cv(value: &Value, raw_text: &str) -> ParsedCv {
    let work_experience = extract_work_experience(&value["work_experience"]);
    let experience_years = calculate_experience_years(&work_experience, Utc::now().date_naive());

    ParsedCv {
        personal_info: extract_personal_info(&value["personal_info"]),
        summary: value["summary"].as_str().map(String::from),
        education: extract_education(&value["education"]),
        skills: normalize_skills(extract_skills(&value["skills"])),
        certifications: extract_certifications(&value["certifications"]),
        projects: extract_projects(&value["projects"]),
        languages: extract_languages(&value["languages"]),
        work_experience,
        experience_years,
        raw_text: Some(raw_text.to_string()),
        confidence_score: value["confidence"]
            .as_f64()
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0),
        error: None,
        fallback: false,
    }
}
