//! Raw multi-source payload for one talent.
//!
//! Every field is optional and defaults to empty: an absent source simply
//! contributes nothing. Field aliases cover the shapes the backend has sent
//! over time (`tapi_data`, `recommendation`, `text`).

use serde::{Deserialize, Serialize};

/// The full evidence payload consumed by `CompetencySignalGenerator::generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePayload {
    pub cv_data: Option<CvData>,
    pub professional_recommendations: Vec<ProfessionalRecommendation>,
    pub verified_certifications: Vec<VerifiedCertification>,
    #[serde(alias = "tapi_data")]
    pub performance_intelligence: Vec<PerformanceRecord>,
    pub work_references: Vec<WorkReference>,
    pub work_samples: Vec<WorkSample>,
}

impl SourcePayload {
    pub fn is_empty(&self) -> bool {
        self.cv_data.is_none()
            && self.professional_recommendations.is_empty()
            && self.verified_certifications.is_empty()
            && self.performance_intelligence.is_empty()
            && self.work_references.is_empty()
            && self.work_samples.is_empty()
    }
}

/// Skills and work history as extracted from a CV.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CvData {
    pub skills: Vec<SkillEntry>,
    pub work_experience: Vec<ExperienceRecord>,
}

/// CV skills arrive either as bare names or as `{ "name": .. }` objects. A
/// missing or null name reads as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillEntry {
    Name(String),
    Detailed {
        #[serde(default, alias = "skill")]
        name: Option<String>,
    },
}

impl SkillEntry {
    pub fn name(&self) -> &str {
        match self {
            SkillEntry::Name(name) => name,
            SkillEntry::Detailed { name } => name.as_deref().unwrap_or_default(),
        }
    }
}

impl From<&str> for SkillEntry {
    fn from(name: &str) -> Self {
        SkillEntry::Name(name.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceRecord {
    pub responsibilities: Vec<String>,
    pub achievements: Vec<String>,
}

impl ExperienceRecord {
    /// Responsibilities first, then achievements.
    pub fn bullets(&self) -> impl Iterator<Item = &str> {
        self.responsibilities
            .iter()
            .chain(self.achievements.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessionalRecommendation {
    pub text: Option<String>,
    pub recommendation: Option<String>,
    pub issuer: Option<String>,
}

impl ProfessionalRecommendation {
    pub fn body(&self) -> &str {
        non_empty(&self.text)
            .or_else(|| non_empty(&self.recommendation))
            .unwrap_or_default()
    }

    pub fn issuer(&self) -> &str {
        self.issuer.as_deref().unwrap_or("Professional")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifiedCertification {
    pub name: String,
    pub issuer: Option<String>,
    pub skills: Vec<String>,
}

impl VerifiedCertification {
    pub fn issuer(&self) -> &str {
        self.issuer.as_deref().unwrap_or("Unknown")
    }
}

/// An activity-performance record (formerly "TAPI").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceRecord {
    pub skills_demonstrated: Vec<String>,
    /// 0 – 100
    pub performance_score: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkReference {
    pub feedback: Option<String>,
    pub text: Option<String>,
    pub from: Option<String>,
}

impl WorkReference {
    pub fn body(&self) -> &str {
        non_empty(&self.feedback)
            .or_else(|| non_empty(&self.text))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkSample {
    pub description: String,
    pub technologies: Vec<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
