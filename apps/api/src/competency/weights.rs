use serde::{Deserialize, Serialize};

use crate::competency::models::EvidenceSource;

/// Cap and saturation point for one evidence bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceWeight {
    /// Most points the bucket can contribute.
    pub max_weight: f64,
    /// Item count at which the bucket reaches full strength.
    pub saturation: u32,
}

impl SourceWeight {
    pub const fn new(max_weight: f64, saturation: u32) -> Self {
        Self {
            max_weight,
            saturation,
        }
    }
}

/// Per-source caps for competency signal scoring.
///
/// | Source | Max | Saturation |
/// |---|---|---|
/// | CV | 15 | 3 |
/// | Professional Recommendation | 15 | 2 |
/// | Verified Certification | 20 | 2 |
/// | Performance Intelligence | 20 | 3 |
/// | Work Reference | 20 | 2 |
/// | Base signal | 10 | - |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub cv: SourceWeight,
    pub professional_recommendations: SourceWeight,
    pub verified_certifications: SourceWeight,
    pub performance_intelligence: SourceWeight,
    pub work_references: SourceWeight,
    pub base_signal: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            cv: SourceWeight::new(15.0, 3),
            professional_recommendations: SourceWeight::new(15.0, 2),
            verified_certifications: SourceWeight::new(20.0, 2),
            performance_intelligence: SourceWeight::new(20.0, 3),
            work_references: SourceWeight::new(20.0, 2),
            base_signal: 10.0,
        }
    }
}

impl SignalWeights {
    pub fn for_source(&self, source: EvidenceSource) -> SourceWeight {
        match source {
            EvidenceSource::Cv => self.cv,
            EvidenceSource::ProfessionalRecommendation => self.professional_recommendations,
            EvidenceSource::VerifiedCertification => self.verified_certifications,
            EvidenceSource::PerformanceIntelligence => self.performance_intelligence,
            EvidenceSource::WorkReference => self.work_references,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_caps_sum_to_100() {
        let w = SignalWeights::default();
        let total: f64 = EvidenceSource::ALL
            .iter()
            .map(|s| w.for_source(*s).max_weight)
            .sum::<f64>()
            + w.base_signal;
        assert!((total - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_saturation_points() {
        let w = SignalWeights::default();
        assert_eq!(w.for_source(EvidenceSource::Cv).saturation, 3);
        assert_eq!(w.for_source(EvidenceSource::ProfessionalRecommendation).saturation, 2);
        assert_eq!(w.for_source(EvidenceSource::VerifiedCertification).saturation, 2);
        assert_eq!(w.for_source(EvidenceSource::PerformanceIntelligence).saturation, 3);
        assert_eq!(w.for_source(EvidenceSource::WorkReference).saturation, 2);
    }
}
