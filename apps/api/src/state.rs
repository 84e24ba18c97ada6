use std::sync::Arc;

use crate::competency::generator::CompetencySignalGenerator;
use crate::competency::models::CompetencySignal;
use crate::competency::sources::SourcePayload;
use crate::config::Config;
use crate::cv_parser::CvParser;
use crate::documents::BlobFetcher;
use crate::fit_scoring::models::FitScoreResult;
use crate::fit_scoring::scorer::FitScorer;
use crate::llm_client::TextGenerator;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: Arc<dyn TextGenerator>,
    pub signal_generator: CompetencySignalGenerator,
    /// Pluggable fit scorer. Default: WeightedFitScorer.
    pub fit_scorer: Arc<dyn FitScorer>,
    pub cv_parser: CvParser,
    pub blobs: Arc<dyn BlobFetcher>,
    /// Latest signals per talent id.
    pub signals: Arc<dyn Store<Vec<CompetencySignal>>>,
    /// Last source payload per talent id, replayed on refresh.
    pub payloads: Arc<dyn Store<SourcePayload>>,
    /// Keyed by `fit_score_key(talent_id, job_id)`.
    pub fit_scores: Arc<dyn Store<FitScoreResult>>,
}
