use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a piece of evidence came from. Serialized with the short tags the
/// backend already stores ("CV", "PR", "V.Cert", "TAPI", "Ref").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceSource {
    #[serde(rename = "CV")]
    Cv,
    #[serde(rename = "PR")]
    ProfessionalRecommendation,
    #[serde(rename = "V.Cert")]
    VerifiedCertification,
    #[serde(rename = "TAPI")]
    PerformanceIntelligence,
    #[serde(rename = "Ref")]
    WorkReference,
}

impl EvidenceSource {
    pub const ALL: [EvidenceSource; 5] = [
        EvidenceSource::Cv,
        EvidenceSource::ProfessionalRecommendation,
        EvidenceSource::VerifiedCertification,
        EvidenceSource::PerformanceIntelligence,
        EvidenceSource::WorkReference,
    ];

    /// Sources that mark a signal as third-party verified.
    pub fn verifies(self) -> bool {
        matches!(
            self,
            EvidenceSource::ProfessionalRecommendation
                | EvidenceSource::VerifiedCertification
                | EvidenceSource::WorkReference
        )
    }
}

/// One unit of support for a skill claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source: EvidenceSource,
    /// 0.0 – 1.0
    pub confidence: f64,
    /// Matched excerpt, at most `SNIPPET_MAX_CHARS` characters.
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Points the evidence's source bucket contributed to the final score.
    /// Back-filled once the score is composed.
    #[serde(default)]
    pub weight_contribution: f64,
}

impl Evidence {
    pub fn new(source: EvidenceSource, confidence: f64, snippet: impl AsRef<str>) -> Self {
        Self {
            source,
            confidence: confidence.clamp(0.0, 1.0),
            snippet: truncate_snippet(snippet.as_ref()),
            date: None,
            weight_contribution: 0.0,
        }
    }
}

pub const SNIPPET_MAX_CHARS: usize = 200;

/// Truncates on character boundaries, never mid code point.
pub fn truncate_snippet(text: &str) -> String {
    text.chars().take(SNIPPET_MAX_CHARS).collect()
}

/// Additive decomposition of a signal's score by source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub cv_analysis: f64,
    pub professional_recommendations: f64,
    pub verified_certifications: f64,
    #[serde(alias = "tapi_intelligence")]
    pub performance_intelligence: f64,
    pub work_references: f64,
    pub base_signal: f64,
}

impl Default for SourceBreakdown {
    fn default() -> Self {
        Self {
            cv_analysis: 0.0,
            professional_recommendations: 0.0,
            verified_certifications: 0.0,
            performance_intelligence: 0.0,
            work_references: 0.0,
            base_signal: 10.0,
        }
    }
}

impl SourceBreakdown {
    pub fn get(&self, source: EvidenceSource) -> f64 {
        match source {
            EvidenceSource::Cv => self.cv_analysis,
            EvidenceSource::ProfessionalRecommendation => self.professional_recommendations,
            EvidenceSource::VerifiedCertification => self.verified_certifications,
            EvidenceSource::PerformanceIntelligence => self.performance_intelligence,
            EvidenceSource::WorkReference => self.work_references,
        }
    }

    pub fn set(&mut self, source: EvidenceSource, value: f64) {
        let slot = match source {
            EvidenceSource::Cv => &mut self.cv_analysis,
            EvidenceSource::ProfessionalRecommendation => &mut self.professional_recommendations,
            EvidenceSource::VerifiedCertification => &mut self.verified_certifications,
            EvidenceSource::PerformanceIntelligence => &mut self.performance_intelligence,
            EvidenceSource::WorkReference => &mut self.work_references,
        };
        *slot = value;
    }

    pub fn total(&self) -> f64 {
        EvidenceSource::ALL.iter().map(|s| self.get(*s)).sum::<f64>() + self.base_signal
    }
}

/// Level band, a pure function of the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalLevel {
    #[default]
    Poor,
    Low,
    Good,
    #[serde(rename = "Very Good")]
    VeryGood,
    Excellent,
}

impl SignalLevel {
    /// 0–30 Poor, 31–50 Low, 51–60 Good, 61–75 Very Good, 76–100 Excellent.
    pub fn from_score(score: u8) -> Self {
        match score {
            76..=u8::MAX => SignalLevel::Excellent,
            61..=75 => SignalLevel::VeryGood,
            51..=60 => SignalLevel::Good,
            31..=50 => SignalLevel::Low,
            _ => SignalLevel::Poor,
        }
    }
}

/// Scored, leveled, evidenced assessment of one skill for one talent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencySignal {
    pub skill: String,
    /// 0 – 100
    pub score: u8,
    pub level: SignalLevel,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub source_breakdown: SourceBreakdown,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl CompetencySignal {
    /// Unscored placeholder, as seeded from a CV skill listing.
    pub fn seed(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            score: 0,
            level: SignalLevel::Poor,
            evidence: Vec::new(),
            source_breakdown: SourceBreakdown::default(),
            confidence: 0.0,
            verified: false,
            verified_by: None,
            last_updated: None,
        }
    }

    pub fn push_evidence(&mut self, evidence: Evidence) {
        if evidence.source.verifies() {
            self.verified = true;
        }
        self.evidence.push(evidence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_band_boundaries() {
        assert_eq!(SignalLevel::from_score(0), SignalLevel::Poor);
        assert_eq!(SignalLevel::from_score(30), SignalLevel::Poor);
        assert_eq!(SignalLevel::from_score(31), SignalLevel::Low);
        assert_eq!(SignalLevel::from_score(50), SignalLevel::Low);
        assert_eq!(SignalLevel::from_score(51), SignalLevel::Good);
        assert_eq!(SignalLevel::from_score(60), SignalLevel::Good);
        assert_eq!(SignalLevel::from_score(61), SignalLevel::VeryGood);
        assert_eq!(SignalLevel::from_score(75), SignalLevel::VeryGood);
        assert_eq!(SignalLevel::from_score(76), SignalLevel::Excellent);
        assert_eq!(SignalLevel::from_score(100), SignalLevel::Excellent);
    }

    #[test]
    fn test_level_serializes_with_space() {
        let json = serde_json::to_string(&SignalLevel::VeryGood).unwrap();
        assert_eq!(json, r#""Very Good""#);
    }

    #[test]
    fn test_source_serializes_as_short_tag() {
        let json = serde_json::to_string(&EvidenceSource::VerifiedCertification).unwrap();
        assert_eq!(json, r#""V.Cert""#);
        let src: EvidenceSource = serde_json::from_str(r#""TAPI""#).unwrap();
        assert_eq!(src, EvidenceSource::PerformanceIntelligence);
    }

    #[test]
    fn test_snippet_truncated_on_char_boundary() {
        let long = "é".repeat(250);
        let ev = Evidence::new(EvidenceSource::Cv, 0.7, &long);
        assert_eq!(ev.snippet.chars().count(), SNIPPET_MAX_CHARS);
    }

    #[test]
    fn test_evidence_confidence_clamped() {
        let ev = Evidence::new(EvidenceSource::PerformanceIntelligence, 1.4, "x");
        assert_eq!(ev.confidence, 1.0);
    }

    #[test]
    fn test_push_evidence_marks_verified_only_for_third_party_sources() {
        let mut signal = CompetencySignal::seed("Rust");
        signal.push_evidence(Evidence::new(EvidenceSource::Cv, 0.7, "Rust"));
        signal.push_evidence(Evidence::new(EvidenceSource::PerformanceIntelligence, 0.9, "Rust"));
        assert!(!signal.verified);
        signal.push_evidence(Evidence::new(EvidenceSource::WorkReference, 0.85, "Rust"));
        assert!(signal.verified);
    }

    #[test]
    fn test_breakdown_accepts_legacy_tapi_field() {
        let json = r#"{
            "cv_analysis": 1.0,
            "professional_recommendations": 0.0,
            "verified_certifications": 0.0,
            "tapi_intelligence": 4.0,
            "work_references": 0.0,
            "base_signal": 10.0
        }"#;
        let b: SourceBreakdown = serde_json::from_str(json).unwrap();
        assert_eq!(b.performance_intelligence, 4.0);
        assert!((b.total() - 15.0).abs() < 1e-9);
    }
}
