//! Weighted Score Composer: turns bucket contributions into the final
//! score, level, confidence and per-evidence weight contribution.

use crate::competency::aggregator::{mean_confidence, score_bucket};
use crate::competency::models::{CompetencySignal, EvidenceSource, SignalLevel, SourceBreakdown};
use crate::competency::weights::SignalWeights;

/// Scores one signal in place.
///
/// The base signal is applied unconditionally: every signal reaching this
/// stage was seeded from a CV listing. The sum is clamped to [0, 100] and
/// floored.
pub fn compose_signal(signal: &mut CompetencySignal, weights: &SignalWeights) {
    let mut breakdown = SourceBreakdown {
        base_signal: weights.base_signal,
        ..SourceBreakdown::default()
    };

    for source in EvidenceSource::ALL {
        let bucket = score_bucket(&signal.evidence, source, weights.for_source(source));
        breakdown.set(source, bucket.score);
    }

    let score = breakdown.total().clamp(0.0, 100.0).floor() as u8;

    signal.score = score;
    signal.level = SignalLevel::from_score(score);
    signal.confidence = mean_confidence(&signal.evidence);

    // Every item in a bucket carries the whole bucket's contribution.
    for evidence in signal.evidence.iter_mut() {
        evidence.weight_contribution = breakdown.get(evidence.source);
    }

    signal.source_breakdown = breakdown;
}

pub fn compose_all(signals: &mut [CompetencySignal], weights: &SignalWeights) {
    for signal in signals.iter_mut() {
        compose_signal(signal, weights);
    }
}
