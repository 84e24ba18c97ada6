//! Source Aggregator: per-skill, per-source bucket contributions.
//!
//! bucket_score = max_weight × mean(confidence) × min(1, count / saturation)

use serde::Serialize;

use crate::competency::models::{Evidence, EvidenceSource};
use crate::competency::weights::SourceWeight;

/// Contribution of one source bucket to one skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketScore {
    pub source: EvidenceSource,
    pub count: usize,
    pub mean_confidence: f64,
    pub strength: f64,
    pub score: f64,
}

impl BucketScore {
    fn empty(source: EvidenceSource) -> Self {
        Self {
            source,
            count: 0,
            mean_confidence: 0.0,
            strength: 0.0,
            score: 0.0,
        }
    }
}

/// Scores the bucket of `evidence` tagged with `source`. Items from other
/// sources are ignored. An empty bucket scores 0.
pub fn score_bucket(evidence: &[Evidence], source: EvidenceSource, weight: SourceWeight) -> BucketScore {
    let (count, confidence_sum) = evidence
        .iter()
        .filter(|e| e.source == source)
        .fold((0usize, 0.0_f64), |(n, sum), e| (n + 1, sum + e.confidence));

    if count == 0 {
        return BucketScore::empty(source);
    }

    let mean_confidence = confidence_sum / count as f64;
    let strength = saturation(count, weight.saturation);

    BucketScore {
        source,
        count,
        mean_confidence,
        strength,
        score: weight.max_weight * mean_confidence * strength,
    }
}

/// min(1, count / threshold). A zero threshold saturates immediately.
pub fn saturation(count: usize, threshold: u32) -> f64 {
    if threshold == 0 {
        return 1.0;
    }
    (count as f64 / threshold as f64).min(1.0)
}

/// Mean confidence over all evidence, 0.0 when there is none.
pub fn mean_confidence(evidence: &[Evidence]) -> f64 {
    if evidence.is_empty() {
        return 0.0;
    }
    evidence.iter().map(|e| e.confidence).sum::<f64>() / evidence.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(n: usize) -> Vec<Evidence> {
        (0..n)
            .map(|_| Evidence::new(EvidenceSource::VerifiedCertification, 1.0, "cert"))
            .collect()
    }

    #[test]
    fn test_empty_bucket_scores_zero() {
        let b = score_bucket(&[], EvidenceSource::Cv, SourceWeight::new(15.0, 3));
        assert_eq!(b.score, 0.0);
        assert_eq!(b.count, 0);
    }

    #[test]
    fn test_single_cert_is_half_strength() {
        let b = score_bucket(
            &cert(1),
            EvidenceSource::VerifiedCertification,
            SourceWeight::new(20.0, 2),
        );
        assert!((b.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_saturation_caps_at_max_weight() {
        let w = SourceWeight::new(20.0, 2);
        let mut previous = 0.0;
        for n in 1..=6 {
            let b = score_bucket(&cert(n), EvidenceSource::VerifiedCertification, w);
            assert!(b.score >= previous, "bucket score decreased at n={n}");
            assert!(b.score <= w.max_weight + 1e-9);
            previous = b.score;
        }
        assert!((previous - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_bucket_ignores_other_sources() {
        let mut evidence = cert(2);
        evidence.push(Evidence::new(EvidenceSource::Cv, 0.7, "cv"));
        let b = score_bucket(&evidence, EvidenceSource::Cv, SourceWeight::new(15.0, 3));
        assert_eq!(b.count, 1);
        assert!((b.score - 15.0 * 0.7 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_confidence_of_mixed_bucket() {
        let evidence = vec![
            Evidence::new(EvidenceSource::Cv, 0.7, "a"),
            Evidence::new(EvidenceSource::Cv, 0.85, "b"),
            Evidence::new(EvidenceSource::Cv, 0.7, "c"),
        ];
        let b = score_bucket(&evidence, EvidenceSource::Cv, SourceWeight::new(15.0, 3));
        assert!((b.mean_confidence - 0.75).abs() < 1e-9);
        assert_eq!(b.strength, 1.0);
        assert!((b.score - 11.25).abs() < 1e-9);
    }

    #[test]
    fn test_zero_threshold_saturates() {
        assert_eq!(saturation(1, 0), 1.0);
    }

    #[test]
    fn test_mean_confidence_empty_is_zero() {
        assert_eq!(mean_confidence(&[]), 0.0);
    }
}
