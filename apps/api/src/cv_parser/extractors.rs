//! Permissive mapping from the model's JSON reply to `ParsedCv`.
//!
//! The reply shape drifts (`role` vs `title`, `gpa` vs `grade`, skills as
//! strings or objects), so fields are read from `serde_json::Value` with
//! fallbacks instead of a strict derive. Missing fields default.

use serde_json::Value;

use crate::cv_parser::models::{
    Certification, Education, PersonalInfo, Project, WorkExperience,
};

const UNKNOWN: &str = "Unknown";

pub fn extract_personal_info(value: &Value) -> PersonalInfo {
    PersonalInfo {
        name: text(value, &["name"]).unwrap_or_else(|| UNKNOWN.to_string()),
        email: text(value, &["email"]),
        phone: text(value, &["phone"]),
        location: text(value, &["location"]),
        linkedin: text(value, &["linkedin"]),
        github: text(value, &["github"]),
        portfolio: text(value, &["portfolio"]),
    }
}

pub fn extract_education(value: &Value) -> Vec<Education> {
    objects(value)
        .map(|entry| Education {
            institution: text(entry, &["institution"]).unwrap_or_else(|| UNKNOWN.to_string()),
            degree: text(entry, &["degree"]),
            field_of_study: text(entry, &["field_of_study", "field"]),
            start_date: text(entry, &["start_date"]),
            end_date: text(entry, &["end_date"]),
            grade: text(entry, &["grade", "gpa"]),
            description: text(entry, &["description"]),
        })
        .collect()
}

pub fn extract_work_experience(value: &Value) -> Vec<WorkExperience> {
    objects(value)
        .map(|entry| WorkExperience {
            company: text(entry, &["company"]).unwrap_or_else(|| UNKNOWN.to_string()),
            role: text(entry, &["role", "title"]).unwrap_or_else(|| UNKNOWN.to_string()),
            start_date: text(entry, &["start_date"]),
            end_date: text(entry, &["end_date"]),
            is_current: entry
                .get("is_current")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            location: text(entry, &["location"]),
            responsibilities: strings(entry.get("responsibilities")),
            achievements: strings(entry.get("achievements")),
            technologies: strings(entry.get("technologies")),
        })
        .collect()
}

/// Strings, or objects carrying `name` / `skill`. Empties dropped.
pub fn extract_skills(value: &Value) -> Vec<String> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => text(item, &["name", "skill"]),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty())
        .collect()
}

pub fn extract_certifications(value: &Value) -> Vec<Certification> {
    objects(value)
        .map(|entry| Certification {
            name: text(entry, &["name"]).unwrap_or_else(|| UNKNOWN.to_string()),
            issuer: text(entry, &["issuer", "organization"]),
            date_obtained: text(entry, &["date_obtained", "date"]),
            expiry_date: text(entry, &["expiry_date"]),
            credential_id: text(entry, &["credential_id"]),
            url: text(entry, &["url"]),
        })
        .collect()
}

pub fn extract_projects(value: &Value) -> Vec<Project> {
    objects(value)
        .map(|entry| Project {
            name: text(entry, &["name"]).unwrap_or_else(|| UNKNOWN.to_string()),
            description: text(entry, &["description"]),
            role: text(entry, &["role"]),
            technologies: strings(entry.get("technologies")),
            url: text(entry, &["url"]),
            start_date: text(entry, &["start_date"]),
            end_date: text(entry, &["end_date"]),
        })
        .collect()
}

pub fn extract_languages(value: &Value) -> Vec<String> {
    strings(Some(value))
}

// ────────────────────────────────────────────────────────────────────────────
// Value helpers
// ────────────────────────────────────────────────────────────────────────────

/// First key holding a non-empty string (numbers are stringified).
fn text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn objects(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten().filter(|v| v.is_object())
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_work_experience_aliases_and_defaults() {
        let value = json!([
            {"title": "Data Engineer", "responsibilities": ["ETL"], "is_current": true},
            "not an object",
            {"company": "Acme", "role": "SRE", "achievements": ["Cut MTTR", 42]}
        ]);

        let roles = extract_work_experience(&value);

        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].company, "Unknown");
        assert_eq!(roles[0].role, "Data Engineer");
        assert!(roles[0].is_current);
        assert_eq!(roles[1].achievements, vec!["Cut MTTR"]);
    }

    #[test]
    fn test_education_aliases() {
        let value = json!([{"institution": "MIT", "field": "CS", "gpa": 3.9}]);
        let education = extract_education(&value);
        assert_eq!(education[0].field_of_study.as_deref(), Some("CS"));
        assert_eq!(education[0].grade.as_deref(), Some("3.9"));
    }

    #[test]
    fn test_skills_strings_or_objects() {
        let value = json!(["Rust", {"name": "Go"}, {"skill": "SQL"}, {"level": 3}, "", 7]);
        assert_eq!(extract_skills(&value), vec!["Rust", "Go", "SQL"]);
    }

    #[test]
    fn test_certification_issuer_alias() {
        let value = json!([{"name": "CKA", "organization": "CNCF", "date": "2023"}]);
        let certs = extract_certifications(&value);
        assert_eq!(certs[0].issuer.as_deref(), Some("CNCF"));
        assert_eq!(certs[0].date_obtained.as_deref(), Some("2023"));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        assert!(extract_projects(&Value::Null).is_empty());
        assert!(extract_languages(&json!("English")).is_empty());
        assert_eq!(extract_personal_info(&Value::Null).name, "Unknown");
    }
}
