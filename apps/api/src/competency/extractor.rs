//! Evidence Extractor: turns each raw source into `Evidence` attached to
//! CV-seeded signals.
//!
//! A skill must be listed in the CV to exist at all; auxiliary sources only
//! ever append evidence to existing signals. Sources are applied in a fixed
//! order (PR, V.Cert, TAPI, Ref, work samples) so `verified_by` is
//! deterministic.

use std::collections::HashSet;

use crate::competency::models::{CompetencySignal, Evidence, EvidenceSource};
use crate::competency::sources::{
    CvData, PerformanceRecord, ProfessionalRecommendation, SourcePayload, VerifiedCertification,
    WorkReference, WorkSample,
};

const CV_CONFIDENCE: f64 = 0.7;
const RECOMMENDATION_CONFIDENCE: f64 = 0.9;
const CERTIFICATION_CONFIDENCE: f64 = 1.0;
const REFERENCE_CONFIDENCE: f64 = 0.85;
const WORK_SAMPLE_CONFIDENCE: f64 = 0.85;

/// Runs steps 1 and 2 of the pipeline: seed from CV, then enhance.
/// Returned signals are unscored.
pub fn extract_signals(payload: &SourcePayload) -> Vec<CompetencySignal> {
    let mut signals = match &payload.cv_data {
        Some(cv) => seed_from_cv(cv),
        None => return Vec::new(),
    };

    add_recommendation_evidence(&mut signals, &payload.professional_recommendations);
    add_certification_evidence(&mut signals, &payload.verified_certifications);
    add_performance_evidence(&mut signals, &payload.performance_intelligence);
    add_reference_evidence(&mut signals, &payload.work_references);
    add_work_sample_evidence(&mut signals, &payload.work_samples);

    signals
}

/// One signal per distinct CV skill. Identity is case-insensitive: the first
/// spelling wins and later duplicates ("python" after "Python") are dropped.
pub fn seed_from_cv(cv: &CvData) -> Vec<CompetencySignal> {
    let mut seen = HashSet::new();
    let mut signals = Vec::new();

    for entry in &cv.skills {
        let skill = entry.name().trim();
        if skill.is_empty() || !seen.insert(skill.to_lowercase()) {
            continue;
        }

        let mut signal = CompetencySignal::seed(skill);
        for exp in &cv.work_experience {
            for item in exp.bullets() {
                if contains_ci(item, skill) {
                    signal.push_evidence(Evidence::new(EvidenceSource::Cv, CV_CONFIDENCE, item));
                }
            }
        }
        signals.push(signal);
    }

    signals
}

pub fn add_recommendation_evidence(
    signals: &mut [CompetencySignal],
    recommendations: &[ProfessionalRecommendation],
) {
    for signal in signals.iter_mut() {
        for rec in recommendations {
            let text = rec.body();
            if contains_ci(text, &signal.skill) {
                signal.push_evidence(Evidence::new(
                    EvidenceSource::ProfessionalRecommendation,
                    RECOMMENDATION_CONFIDENCE,
                    text,
                ));
                // Last matching recommendation wins.
                signal.verified_by = Some(rec.issuer().to_string());
            }
        }
    }
}

pub fn add_certification_evidence(
    signals: &mut [CompetencySignal],
    certifications: &[VerifiedCertification],
) {
    for signal in signals.iter_mut() {
        for cert in certifications {
            let matched = contains_ci(&cert.name, &signal.skill)
                || cert.skills.iter().any(|s| s == &signal.skill);
            if matched {
                signal.push_evidence(Evidence::new(
                    EvidenceSource::VerifiedCertification,
                    CERTIFICATION_CONFIDENCE,
                    format!("{} - {}", cert.name, cert.issuer()),
                ));
            }
        }
    }
}

pub fn add_performance_evidence(signals: &mut [CompetencySignal], records: &[PerformanceRecord]) {
    for signal in signals.iter_mut() {
        for record in records {
            let matched = record.skills_demonstrated.iter().any(|s| s == &signal.skill)
                || contains_ci(&record.summary, &signal.skill);
            if matched {
                signal.push_evidence(Evidence::new(
                    EvidenceSource::PerformanceIntelligence,
                    record.performance_score / 100.0,
                    &record.summary,
                ));
            }
        }
    }
}

pub fn add_reference_evidence(signals: &mut [CompetencySignal], references: &[WorkReference]) {
    for signal in signals.iter_mut() {
        for reference in references {
            let text = reference.body();
            if contains_ci(text, &signal.skill) {
                signal.push_evidence(Evidence::new(
                    EvidenceSource::WorkReference,
                    REFERENCE_CONFIDENCE,
                    text,
                ));
            }
        }
    }
}

/// Work samples feed the CV bucket rather than a bucket of their own.
pub fn add_work_sample_evidence(signals: &mut [CompetencySignal], samples: &[WorkSample]) {
    for signal in signals.iter_mut() {
        for sample in samples {
            let matched = contains_ci(&sample.description, &signal.skill)
                || sample.technologies.iter().any(|t| t == &signal.skill);
            if matched {
                signal.push_evidence(Evidence::new(
                    EvidenceSource::Cv,
                    WORK_SAMPLE_CONFIDENCE,
                    &sample.description,
                ));
            }
        }
    }
}

/// Case-insensitive substring test. Plain substring semantics: "Java" matches
/// inside "JavaScript".
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
