// Prompts for backend-integration operations.

use serde_json::Value;

pub const JOB_MATCH_ROLE: &str = "\
You are an expert job matching AI.
Calculate how well a talent matches a job and return JSON with:
- fit_score: int 0-100
- match_level: \"poor\" | \"fair\" | \"good\" | \"excellent\"
- matching_skills: [skills that match]
- missing_skills: [required skills not present]
- strengths: [3-5 key strengths for this role]
- recommendations: [2-3 suggestions to improve fit]
- explanation: brief explanation of the score
Be objective and thorough.";

pub const SCREENING_ROLE: &str = "\
You are a candidate screening AI.
Score the candidate against the criteria and return JSON with:
- overall_score: int 0-100
- technical_score: int 0-100
- experience_score: int 0-100
- education_score: int 0-100
- fit_assessment: brief assessment paragraph
- strengths: [3-5 strengths]
- concerns: [1-3 concerns if any]
- recommendation: \"reject\" | \"maybe\" | \"interview\" | \"strong_yes\"
Be thorough and objective.";

pub fn job_match_user_prompt(talent_profile: &Value, job_details: &Value) -> String {
    format!(
        "Talent Profile:\n{}\n\nJob Details:\n{}",
        pretty(talent_profile),
        pretty(job_details)
    )
}

pub fn screening_user_prompt(cv: &Value, criteria: &Value) -> String {
    format!(
        "Candidate CV:\n{}\n\nScreening Criteria:\n{}",
        pretty(cv),
        pretty(criteria)
    )
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
