use serde::{Deserialize, Serialize};

use crate::competency::sources::{CvData, ExperienceRecord, SkillEntry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    /// Kept as written on the CV; see `normalizers::parse_date`.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    pub company: String,
    pub role: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub location: Option<String>,
    pub responsibilities: Vec<String>,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: String,
    pub issuer: Option<String>,
    pub date_obtained: Option<String>,
    pub expiry_date: Option<String>,
    pub credential_id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: Option<String>,
    pub role: Option<String>,
    pub technologies: Vec<String>,
    pub url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Structured CV. A failed parse is still a `ParsedCv`: `fallback` is set,
/// `confidence_score` is 0 and `error` says why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedCv {
    pub personal_info: PersonalInfo,
    pub summary: Option<String>,
    pub education: Vec<Education>,
    pub work_experience: Vec<WorkExperience>,
    pub skills: Vec<String>,
    pub certifications: Vec<Certification>,
    pub projects: Vec<Project>,
    pub languages: Vec<String>,
    pub experience_years: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    pub confidence_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl ParsedCv {
    pub fn fallback(name: &str, error: String, raw_text: &str) -> Self {
        Self {
            personal_info: PersonalInfo {
                name: name.to_string(),
                ..Default::default()
            },
            raw_text: Some(raw_text.to_string()),
            confidence_score: 0.0,
            error: Some(error),
            fallback: true,
            ..Default::default()
        }
    }

    /// The subset the competency engine consumes.
    pub fn to_cv_data(&self) -> CvData {
        CvData {
            skills: self.skills.iter().map(|s| SkillEntry::from(s.as_str())).collect(),
            work_experience: self
                .work_experience
                .iter()
                .map(|w| ExperienceRecord {
                    responsibilities: w.responsibilities.clone(),
                    achievements: w.achievements.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_shape() {
        let cv = ParsedCv::fallback("Unable to parse - Invalid JSON", "bad".into(), "text");
        assert!(cv.fallback);
        assert_eq!(cv.confidence_score, 0.0);
        assert!(cv.skills.is_empty());

        let json = serde_json::to_value(&cv).unwrap();
        assert_eq!(json["personal_info"]["name"], "Unable to parse - Invalid JSON");
        assert_eq!(json["error"], "bad");
        assert_eq!(json["fallback"], true);
    }

    #[test]
    fn test_successful_parse_omits_fallback_fields() {
        let json = serde_json::to_value(ParsedCv::default()).unwrap();
        assert!(json.get("fallback").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_to_cv_data() {
        let cv = ParsedCv {
            skills: vec!["Rust".into(), "SQL".into()],
            work_experience: vec![WorkExperience {
                company: "Acme".into(),
                role: "Engineer".into(),
                responsibilities: vec!["Built Rust services".into()],
                achievements: vec!["Cut SQL latency".into()],
                ..Default::default()
            }],
            ..Default::default()
        };

        let data = cv.to_cv_data();
        assert_eq!(data.skills, vec![SkillEntry::from("Rust"), SkillEntry::from("SQL")]);
        assert_eq!(data.work_experience.len(), 1);
        assert_eq!(
            data.work_experience[0].bullets().collect::<Vec<_>>(),
            ["Built Rust services", "Cut SQL latency"]
        );
    }
}
