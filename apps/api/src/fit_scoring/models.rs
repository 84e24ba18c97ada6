use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Axis weights for the fit score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub culture: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.40,
            experience: 0.30,
            education: 0.15,
            culture: 0.15,
        }
    }
}

/// What a job asks for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRequirement {
    pub title: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub min_experience_years: u32,
    pub education_requirements: Vec<String>,
    pub description: Option<String>,
    pub culture_keywords: Vec<String>,
}

/// What a candidate brings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateData {
    pub talent_id: String,
    pub name: String,
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub education: Vec<String>,
    /// Passed through untouched; not used by the weighted scorer.
    pub competency_signals: Vec<Value>,
}

/// Per-axis scores, each 0 – 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills_match: f64,
    pub experience_match: f64,
    pub education_match: f64,
    pub culture_fit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainabilityFactor {
    pub factor: String,
    pub weight: f64,
    /// axis score × weight
    pub contribution: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitScoreResult {
    pub talent_id: String,
    pub job_id: String,
    /// 0 – 100, floor of the weighted sum
    pub fit_score: u8,
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub explainability: Vec<ExplainabilityFactor>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

/// A batch result with its 1-based position after ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub rank: usize,
    #[serde(flatten)]
    pub result: FitScoreResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoringWeights::default();
        let sum = w.skills + w.experience + w.education + w.culture;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_candidate_defaults_missing_fields() {
        let candidate: CandidateData =
            serde_json::from_str(r#"{"talent_id": "t1", "name": "Ada"}"#).unwrap();
        assert!(candidate.skills.is_empty());
        assert_eq!(candidate.experience_years, 0.0);
    }

    #[test]
    fn test_ranked_candidate_flattens_result() {
        let ranked = RankedCandidate {
            rank: 1,
            result: FitScoreResult {
                talent_id: "t1".into(),
                job_id: "j1".into(),
                fit_score: 88,
                breakdown: ScoreBreakdown::default(),
                explainability: vec![],
                recommendations: vec![],
                matched_skills: vec![],
                missing_skills: vec![],
            },
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["rank"], 1);
        assert_eq!(json["fit_score"], 88);
        assert_eq!(json["talent_id"], "t1");
    }
}
