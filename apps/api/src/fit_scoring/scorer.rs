//! Fit Scoring: pluggable, trait-based scorer that measures a candidate against a job.
//!
//! Default: `WeightedFitScorer` (pure-Rust, deterministic, no LLM call).
//! `AppState` holds an `Arc<dyn FitScorer>`.

use rayon::prelude::*;
use tracing::debug;

use crate::fit_scoring::models::{
    CandidateData, ExplainabilityFactor, FitScoreResult, JobRequirement, RankedCandidate,
    ScoreBreakdown, ScoringWeights,
};

/// Batches larger than this are scored on the rayon pool.
pub const PARALLEL_BATCH_THRESHOLD: usize = 64;

const CULTURE_NEUTRAL_SCORE: f64 = 75.0;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The fit scorer trait. Implement this to swap backends without touching
/// the endpoint or handler code.
pub trait FitScorer: Send + Sync {
    fn score(
        &self,
        talent_id: &str,
        job_id: &str,
        job: &JobRequirement,
        candidate: &CandidateData,
    ) -> FitScoreResult;

    /// One result per candidate, in input order.
    fn batch_score(
        &self,
        job_id: &str,
        job: &JobRequirement,
        candidates: &[CandidateData],
    ) -> Vec<FitScoreResult> {
        candidates
            .iter()
            .map(|c| self.score(&c.talent_id, job_id, job, c))
            .collect()
    }

    fn rank_candidates(
        &self,
        job_id: &str,
        job: &JobRequirement,
        candidates: &[CandidateData],
    ) -> Vec<RankedCandidate> {
        rank_results(self.batch_score(job_id, job, candidates))
    }
}

/// Sorts descending by `fit_score`; equal scores keep their input order.
pub fn rank_results(mut results: Vec<FitScoreResult>) -> Vec<RankedCandidate> {
    results.sort_by(|a, b| b.fit_score.cmp(&a.fit_score));
    results
        .into_iter()
        .enumerate()
        .map(|(i, result)| RankedCandidate { rank: i + 1, result })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedFitScorer (default implementation)
// ────────────────────────────────────────────────────────────────────────────

/// Four-axis weighted scorer.
///
/// Algorithm:
/// 1. skills      = required% × 0.7 + preferred% × 0.3 (100 when nothing required)
/// 2. experience  = step function on candidate years / required years
/// 3. education   = share of requirements found in any education entry
/// 4. culture     = keyword share found in the candidate's skills, + 50, capped
/// 5. fit_score   = floor(Σ axis × weight)
#[derive(Debug, Clone, Default)]
pub struct WeightedFitScorer {
    weights: ScoringWeights,
}

impl WeightedFitScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    fn explain(&self, breakdown: &ScoreBreakdown) -> Vec<ExplainabilityFactor> {
        let w = &self.weights;
        vec![
            factor(
                "Skills Match",
                w.skills,
                breakdown.skills_match,
                format!(
                    "Candidate matches {:.0}% of required skills",
                    breakdown.skills_match
                ),
            ),
            factor(
                "Experience",
                w.experience,
                breakdown.experience_match,
                format!(
                    "Experience alignment score: {:.0}%",
                    breakdown.experience_match
                ),
            ),
            factor(
                "Education",
                w.education,
                breakdown.education_match,
                format!("Education match: {:.0}%", breakdown.education_match),
            ),
            factor(
                "Culture Fit",
                w.culture,
                breakdown.culture_fit,
                format!("Culture alignment: {:.0}%", breakdown.culture_fit),
            ),
        ]
    }
}

impl FitScorer for WeightedFitScorer {
    fn score(
        &self,
        talent_id: &str,
        job_id: &str,
        job: &JobRequirement,
        candidate: &CandidateData,
    ) -> FitScoreResult {
        let breakdown = ScoreBreakdown {
            skills_match: skills_score(
                &job.required_skills,
                &job.preferred_skills,
                &candidate.skills,
            ),
            experience_match: experience_score(job.min_experience_years, candidate.experience_years),
            education_match: education_score(&job.education_requirements, &candidate.education),
            culture_fit: culture_score(&job.culture_keywords, &candidate.skills),
        };

        let w = &self.weights;
        let weighted = breakdown.skills_match * w.skills
            + breakdown.experience_match * w.experience
            + breakdown.education_match * w.education
            + breakdown.culture_fit * w.culture;
        let fit_score = weighted.clamp(0.0, 100.0).floor() as u8;

        let matched_skills: Vec<String> = candidate
            .skills
            .iter()
            .filter(|s| contains_ignore_case(&job.required_skills, s))
            .cloned()
            .collect();
        let missing_skills: Vec<String> = job
            .required_skills
            .iter()
            .filter(|r| !contains_ignore_case(&candidate.skills, r))
            .cloned()
            .collect();

        let recommendations = build_recommendations(
            fit_score,
            matched_skills.len(),
            &missing_skills,
            job.required_skills.len(),
        );

        debug!("Scored talent {talent_id} against job {job_id}: {fit_score}");

        FitScoreResult {
            talent_id: talent_id.to_string(),
            job_id: job_id.to_string(),
            fit_score,
            explainability: self.explain(&breakdown),
            breakdown,
            recommendations,
            matched_skills,
            missing_skills,
        }
    }

    fn batch_score(
        &self,
        job_id: &str,
        job: &JobRequirement,
        candidates: &[CandidateData],
    ) -> Vec<FitScoreResult> {
        if candidates.len() > PARALLEL_BATCH_THRESHOLD {
            // par_iter().collect() keeps input order.
            candidates
                .par_iter()
                .map(|c| self.score(&c.talent_id, job_id, job, c))
                .collect()
        } else {
            candidates
                .iter()
                .map(|c| self.score(&c.talent_id, job_id, job, c))
                .collect()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Axis scores
// ────────────────────────────────────────────────────────────────────────────

fn skills_score(required: &[String], preferred: &[String], candidate: &[String]) -> f64 {
    if required.is_empty() {
        return 100.0;
    }
    let required_pct = match_percent(required, candidate);
    let preferred_pct = if preferred.is_empty() {
        100.0
    } else {
        match_percent(preferred, candidate)
    };
    required_pct * 0.7 + preferred_pct * 0.3
}

fn match_percent(wanted: &[String], candidate: &[String]) -> f64 {
    let hits = wanted
        .iter()
        .filter(|w| contains_ignore_case(candidate, w))
        .count();
    hits as f64 / wanted.len() as f64 * 100.0
}

fn experience_score(required_years: u32, candidate_years: f64) -> f64 {
    if required_years == 0 {
        return 100.0;
    }
    let required = f64::from(required_years);
    if candidate_years >= required {
        100.0
    } else if candidate_years >= required * 0.75 {
        85.0
    } else if candidate_years >= required * 0.5 {
        70.0
    } else if candidate_years >= required * 0.25 {
        50.0
    } else {
        30.0
    }
}

fn education_score(requirements: &[String], education: &[String]) -> f64 {
    if requirements.is_empty() {
        return 100.0;
    }
    let education: Vec<String> = education.iter().map(|e| e.to_lowercase()).collect();
    let hits = requirements
        .iter()
        .filter(|req| {
            let req = req.to_lowercase();
            education.iter().any(|e| e.contains(&req))
        })
        .count();
    hits as f64 / requirements.len() as f64 * 100.0
}

fn culture_score(keywords: &[String], skills: &[String]) -> f64 {
    if keywords.is_empty() {
        return CULTURE_NEUTRAL_SCORE;
    }
    let text = skills.join(" ").to_lowercase();
    let hits = keywords
        .iter()
        .filter(|k| text.contains(&k.to_lowercase()))
        .count();
    (hits as f64 / keywords.len() as f64 * 100.0 + 50.0).min(100.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn contains_ignore_case(haystack: &[String], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    haystack.iter().any(|h| h.to_lowercase() == needle)
}

fn factor(name: &str, weight: f64, axis_score: f64, description: String) -> ExplainabilityFactor {
    ExplainabilityFactor {
        factor: name.to_string(),
        weight,
        contribution: axis_score * weight,
        description: Some(description),
    }
}

fn build_recommendations(
    fit_score: u8,
    matched: usize,
    missing: &[String],
    required_count: usize,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    let verdict = if fit_score >= 80 {
        "Strong candidate - recommend for interview"
    } else if fit_score >= 60 {
        "Good potential - consider for initial screening"
    } else if fit_score >= 40 {
        "Partial match - may need skill development"
    } else {
        "Limited match - consider for different role"
    };
    recommendations.push(verdict.to_string());

    if !missing.is_empty() {
        let top: Vec<&str> = missing.iter().take(3).map(String::as_str).collect();
        recommendations.push(format!("Missing skills: {}", top.join(", ")));
    }

    if matched as f64 >= required_count as f64 * 0.8 {
        recommendations.push("Excellent skills coverage".to_string());
    }

    recommendations
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn job(required: &[&str], min_years: u32) -> JobRequirement {
        JobRequirement {
            title: "Backend Engineer".to_string(),
            required_skills: strings(required),
            min_experience_years: min_years,
            ..Default::default()
        }
    }

    fn candidate(talent_id: &str, skills: &[&str], years: f64) -> CandidateData {
        CandidateData {
            talent_id: talent_id.to_string(),
            name: talent_id.to_uppercase(),
            skills: strings(skills),
            experience_years: years,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_score_example() {
        let job = JobRequirement {
            title: "Data Engineer".to_string(),
            required_skills: strings(&["Python", "SQL"]),
            preferred_skills: strings(&["Docker"]),
            min_experience_years: 4,
            education_requirements: strings(&["Bachelor"]),
            ..Default::default()
        };
        let mut c = candidate("t1", &["python", "SQL"], 5.0);
        c.education = strings(&["Bachelor of Science"]);

        let result = WeightedFitScorer::default().score("t1", "j1", &job, &c);

        // 70×0.4 + 100×0.3 + 100×0.15 + 75×0.15 = 84.25
        assert_eq!(result.fit_score, 84);
        assert_eq!(result.breakdown.skills_match, 70.0);
        assert_eq!(result.breakdown.culture_fit, 75.0);
        assert_eq!(result.matched_skills, strings(&["python", "SQL"]));
        assert!(result.missing_skills.is_empty());
        assert_eq!(
            result.recommendations,
            strings(&[
                "Strong candidate - recommend for interview",
                "Excellent skills coverage"
            ])
        );
    }

    #[test]
    fn test_no_required_skills_scores_full_skills_axis() {
        assert_eq!(skills_score(&[], &strings(&["Go"]), &[]), 100.0);
    }

    #[test]
    fn test_preferred_counts_full_when_absent() {
        let score = skills_score(&strings(&["Rust", "Go"]), &[], &strings(&["rust"]));
        assert_eq!(score, 50.0 * 0.7 + 100.0 * 0.3);
    }

    #[test]
    fn test_experience_steps() {
        assert_eq!(experience_score(0, 0.0), 100.0);
        assert_eq!(experience_score(4, 4.0), 100.0);
        assert_eq!(experience_score(4, 3.0), 85.0);
        assert_eq!(experience_score(4, 2.0), 70.0);
        assert_eq!(experience_score(4, 1.0), 50.0);
        assert_eq!(experience_score(4, 0.5), 30.0);
    }

    #[test]
    fn test_education_substring_match() {
        let reqs = strings(&["bachelor", "MBA"]);
        let edu = strings(&["Bachelor of Engineering"]);
        assert_eq!(education_score(&reqs, &edu), 50.0);
        assert_eq!(education_score(&[], &edu), 100.0);
    }

    #[test]
    fn test_culture_neutral_default_and_cap() {
        assert_eq!(culture_score(&[], &strings(&["Rust"])), 75.0);
        assert_eq!(
            culture_score(&strings(&["collaborative", "python"]), &strings(&["Python"])),
            100.0
        );
        assert_eq!(
            culture_score(&strings(&["agile", "remote"]), &strings(&["Python"])),
            50.0
        );
    }

    #[test]
    fn test_missing_skills_callout_lists_at_most_three() {
        let job = job(&["A", "B", "C", "D"], 0);
        let result = WeightedFitScorer::default().score("t", "j", &job, &candidate("t", &[], 0.0));
        assert_eq!(result.missing_skills.len(), 4);
        assert!(result
            .recommendations
            .contains(&"Missing skills: A, B, C".to_string()));
        assert!(!result
            .recommendations
            .contains(&"Excellent skills coverage".to_string()));
    }

    #[test]
    fn test_score_is_idempotent() {
        let scorer = WeightedFitScorer::default();
        let job = job(&["Rust", "Kafka"], 3);
        let c = candidate("t1", &["Rust"], 2.0);
        let first = scorer.score("t1", "j1", &job, &c);
        let second = scorer.score("t1", "j1", &job, &c);
        assert_eq!(first, second);
    }

    #[test]
    fn test_explainability_contribution_is_score_times_weight() {
        let result = WeightedFitScorer::default().score(
            "t",
            "j",
            &job(&[], 0),
            &candidate("t", &[], 0.0),
        );
        let names: Vec<&str> = result
            .explainability
            .iter()
            .map(|f| f.factor.as_str())
            .collect();
        assert_eq!(names, ["Skills Match", "Experience", "Education", "Culture Fit"]);
        let culture = &result.explainability[3];
        assert!((culture.contribution - 75.0 * 0.15).abs() < 1e-9);
        assert_eq!(
            culture.description.as_deref(),
            Some("Culture alignment: 75%")
        );
    }

    #[test]
    fn test_rank_is_descending_and_stable_on_ties() {
        let scorer = WeightedFitScorer::default();
        let job = job(&["Rust"], 0);
        let candidates = vec![
            candidate("a", &[], 0.0),
            candidate("b", &["Rust"], 0.0),
            candidate("c", &[], 0.0),
        ];

        let ranked = scorer.rank_candidates("j1", &job, &candidates);

        let order: Vec<(&str, usize, u8)> = ranked
            .iter()
            .map(|r| (r.result.talent_id.as_str(), r.rank, r.result.fit_score))
            .collect();
        assert_eq!(order, [("b", 1, 96), ("a", 2, 68), ("c", 3, 68)]);
    }

    #[test]
    fn test_parallel_batch_preserves_input_order() {
        let scorer = WeightedFitScorer::default();
        let job = job(&["Rust"], 5);
        let candidates: Vec<CandidateData> = (0..PARALLEL_BATCH_THRESHOLD * 2)
            .map(|i| candidate(&format!("t{i}"), &["Rust"], (i % 7) as f64))
            .collect();

        let results = scorer.batch_score("j1", &job, &candidates);

        assert_eq!(results.len(), candidates.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.talent_id, format!("t{i}"));
            assert_eq!(result.job_id, "j1");
        }
        let sequential = scorer.score("t3", "j1", &job, &candidates[3]);
        assert_eq!(results[3], sequential);
    }

    #[test]
    fn test_custom_weights_are_applied() {
        let scorer = WeightedFitScorer::new(ScoringWeights {
            skills: 1.0,
            experience: 0.0,
            education: 0.0,
            culture: 0.0,
        });
        let result = scorer.score(
            "t",
            "j",
            &job(&["Rust", "Go"], 10),
            &candidate("t", &["Go"], 0.0),
        );
        // 50×0.7 + 100×0.3
        assert_eq!(result.fit_score, 65);
    }
}
