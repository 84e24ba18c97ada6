mod ai_operations;
mod competency;
mod config;
mod cv_parser;
mod db;
mod documents;
mod errors;
mod fit_scoring;
mod llm_client;
mod routes;
mod state;
mod store;

use anyhow::Result;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::competency::generator::CompetencySignalGenerator;
use crate::competency::models::CompetencySignal;
use crate::competency::sources::SourcePayload;
use crate::competency::weights::SignalWeights;
use crate::config::Config;
use crate::cv_parser::CvParser;
use crate::db::{create_pool, ensure_schema};
use crate::documents::blob::build_s3_client;
use crate::documents::{BlobClient, TextExtractor};
use crate::fit_scoring::models::{FitScoreResult, ScoringWeights};
use crate::fit_scoring::scorer::WeightedFitScorer;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};

type Stores = (
    Arc<dyn Store<Vec<CompetencySignal>>>,
    Arc<dyn Store<SourcePayload>>,
    Arc<dyn Store<FitScoreResult>>,
);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting signals API v{}", env!("CARGO_PKG_VERSION"));

    let (signals, payloads, fit_scores) = build_stores(&config).await?;

    // Initialize S3 / MinIO (optional) and the blob fetcher
    let s3 = match &config.s3 {
        Some(s3_config) => {
            info!("S3 client initialized ({})", s3_config.endpoint);
            Some(build_s3_client(s3_config).await)
        }
        None => None,
    };
    let blobs = Arc::new(BlobClient::new(s3, config.max_cv_size_bytes())?);

    // Initialize LLM client
    let llm_client = LlmClient::new(
        config.azure_ai_endpoint.clone(),
        config.azure_ai_api_key.clone(),
        config.azure_ai_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm_client.model());
    let llm: Arc<dyn TextGenerator> = Arc::new(llm_client);

    let cv_parser = CvParser::new(
        llm.clone(),
        Arc::new(TextExtractor),
        config.max_cv_size_bytes(),
    );

    let signal_weights = SignalWeights::default();
    let scoring_weights = ScoringWeights::default();
    info!("Signal weights: {signal_weights:?}");
    info!("Fit scoring weights: {scoring_weights:?}");

    let cors = build_cors(&config.allowed_origins);

    // Build app state
    let state = AppState {
        config: config.clone(),
        llm,
        signal_generator: CompetencySignalGenerator::new(signal_weights),
        fit_scorer: Arc::new(WeightedFitScorer::new(scoring_weights)),
        cv_parser,
        blobs,
        signals,
        payloads,
        fit_scores,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Postgres-backed stores when `DATABASE_URL` is set, in-memory otherwise.
async fn build_stores(config: &Config) -> Result<Stores> {
    let stores: Stores = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            info!("Using PostgreSQL stores");
            (
                Arc::new(PgStore::<Vec<CompetencySignal>>::new(pool.clone(), "signals")),
                Arc::new(PgStore::<SourcePayload>::new(pool.clone(), "payloads")),
                Arc::new(PgStore::<FitScoreResult>::new(pool, "fit_scores")),
            )
        }
        None => {
            warn!("DATABASE_URL not set; results are kept in memory only");
            (
                Arc::new(MemoryStore::<Vec<CompetencySignal>>::new()),
                Arc::new(MemoryStore::<SourcePayload>::new()),
                Arc::new(MemoryStore::<FitScoreResult>::new()),
            )
        }
    };
    Ok(stores)
}

/// `*` allows any origin; otherwise only the listed origins.
fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{o}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
