//! Competency Signal Generator: runs the full pipeline for one talent.
//!
//! Flow: seed from CV → enhance (PR, V.Cert, TAPI, Ref, work samples) →
//!       compose weighted scores.
//!
//! Pure and synchronous: no I/O, no shared state. Persistence is the caller's
//! job.

use tracing::debug;

use crate::competency::composer::compose_all;
use crate::competency::extractor::extract_signals;
use crate::competency::models::CompetencySignal;
use crate::competency::sources::SourcePayload;
use crate::competency::weights::SignalWeights;

#[derive(Debug, Clone, Default)]
pub struct CompetencySignalGenerator {
    weights: SignalWeights,
}

impl CompetencySignalGenerator {
    pub fn new(weights: SignalWeights) -> Self {
        Self { weights }
    }

    /// One scored signal per distinct CV skill. No input at all yields an
    /// empty list.
    pub fn generate(&self, talent_id: &str, payload: &SourcePayload) -> Vec<CompetencySignal> {
        if payload.is_empty() {
            debug!("No source data for talent {}", talent_id);
            return Vec::new();
        }

        let mut signals = extract_signals(payload);
        compose_all(&mut signals, &self.weights);

        debug!(
            "Generated {} competency signals for talent {}",
            signals.len(),
            talent_id
        );
        signals
    }
}
