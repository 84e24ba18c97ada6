use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::competency::models::CompetencySignal;
use crate::cv_parser::ParsedCv;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    ResumeParse,
    JobMatch,
    ScreeningScore,
}

impl OperationType {
    pub const SUPPORTED: [OperationType; 3] = [
        OperationType::ResumeParse,
        OperationType::JobMatch,
        OperationType::ScreeningScore,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::SUPPORTED.into_iter().find(|op| op.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::ResumeParse => "resume_parse",
            OperationType::JobMatch => "job_match",
            OperationType::ScreeningScore => "screening_score",
        }
    }
}

/// A file already uploaded by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileMetadata {
    pub original_name: String,
    pub mime_type: String,
    pub url: String,
    /// Text the backend already extracted; skips download and extraction.
    pub extracted_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestMetadata {
    pub user_id: String,
    pub veritalent_id: Option<String>,

    pub job_id: Option<String>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub job_description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub preferred_skills: Option<Vec<String>>,
    pub experience_level: Option<String>,

    pub talent_profile: Option<Value>,

    #[serde(alias = "screening_session_id")]
    pub session_id: Option<String>,
    #[serde(alias = "active_criteria")]
    pub screening_criteria: Option<Value>,
}

impl RequestMetadata {
    /// Key used when signals are derived for this request.
    pub fn talent_key(&self) -> &str {
        self.veritalent_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.user_id)
    }
}

/// Unified request from the platform backend.
#[derive(Debug, Clone, Deserialize)]
pub struct AiRequest {
    pub operation_type: String,
    #[serde(default)]
    pub file: Option<FileMetadata>,
    #[serde(default)]
    pub files: Vec<FileMetadata>,
    #[serde(default)]
    pub meta_data: RequestMetadata,
}

impl AiRequest {
    /// `file`, or the first of `files`.
    pub fn primary_file(&self) -> Option<&FileMetadata> {
        self.file.as_ref().or_else(|| self.files.first())
    }
}

/// Envelope the backend expects on every `/api/ai/*` response.
#[derive(Debug, Clone, Serialize)]
pub struct BackendResponse {
    pub success: bool,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl BackendResponse {
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            status: 200,
            data: Some(data),
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>, status: u16, errors: Value) -> Self {
        Self {
            success: false,
            message: message.into(),
            status,
            data: None,
            errors: Some(errors),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeParseResult {
    #[serde(flatten)]
    pub cv: ParsedCv,
    pub competency_signals: Vec<CompetencySignal>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobMatchResult {
    #[serde(deserialize_with = "score_0_100")]
    pub fit_score: u8,
    pub match_level: String,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for JobMatchResult {
    /// Neutral result used when the model cannot be consulted.
    fn default() -> Self {
        Self {
            fit_score: 50,
            match_level: "fair".to_string(),
            matching_skills: Vec::new(),
            missing_skills: Vec::new(),
            strengths: Vec::new(),
            recommendations: Vec::new(),
            explanation: "Unable to calculate detailed match".to_string(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningScoreResult {
    #[serde(deserialize_with = "score_0_100")]
    pub overall_score: u8,
    #[serde(deserialize_with = "score_0_100")]
    pub technical_score: u8,
    #[serde(deserialize_with = "score_0_100")]
    pub experience_score: u8,
    #[serde(deserialize_with = "score_0_100")]
    pub education_score: u8,
    pub fit_assessment: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for ScreeningScoreResult {
    fn default() -> Self {
        Self {
            overall_score: 50,
            technical_score: 50,
            experience_score: 50,
            education_score: 50,
            fit_assessment: "Unable to complete screening assessment".to_string(),
            strengths: Vec::new(),
            concerns: Vec::new(),
            recommendation: "maybe".to_string(),
            error: None,
        }
    }
}

/// Any JSON number (or numeric string), rounded and clamped to 0 – 100.
fn score_0_100<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let raw = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| serde::de::Error::custom(format!("expected a score, got {value}")))?;
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_type_parse() {
        assert_eq!(OperationType::parse("job_match"), Some(OperationType::JobMatch));
        assert_eq!(OperationType::parse("cover_letter"), None);
    }

    #[test]
    fn test_scores_are_clamped() {
        let result: ScreeningScoreResult = serde_json::from_value(json!({
            "overall_score": 140,
            "technical_score": -3,
            "experience_score": "72.6",
            "recommendation": "interview"
        }))
        .unwrap();
        assert_eq!(result.overall_score, 100);
        assert_eq!(result.technical_score, 0);
        assert_eq!(result.experience_score, 73);
        assert_eq!(result.education_score, 50);
        assert_eq!(result.recommendation, "interview");
    }

    #[test]
    fn test_job_match_defaults_are_neutral() {
        let result: JobMatchResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(result, JobMatchResult::default());
        assert_eq!(result.fit_score, 50);
        assert_eq!(result.match_level, "fair");
    }

    #[test]
    fn test_talent_key_prefers_veritalent_id() {
        let mut meta = RequestMetadata {
            user_id: "u1".into(),
            ..Default::default()
        };
        assert_eq!(meta.talent_key(), "u1");
        meta.veritalent_id = Some("VT/001".into());
        assert_eq!(meta.talent_key(), "VT/001");
    }

    #[test]
    fn test_request_accepts_files_list() {
        let request: AiRequest = serde_json::from_value(json!({
            "operation_type": "resume_parse",
            "has_multiple_files": true,
            "files": [{"url": "https://cdn.test/cv.pdf", "mime_type": "application/pdf", "original_name": "cv.pdf"}],
            "meta_data": {"user_id": "u1", "screening_session_id": "s1"}
        }))
        .unwrap();
        assert_eq!(request.primary_file().unwrap().original_name, "cv.pdf");
        assert_eq!(request.meta_data.session_id.as_deref(), Some("s1"));
    }
}
