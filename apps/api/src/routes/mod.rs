pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::ai_operations::{auth::require_api_key, handlers as ai};
use crate::competency::handlers as competency;
use crate::cv_parser::handlers as cv;
use crate::fit_scoring::handlers as screening;
use crate::state::AppState;

/// Headroom for multipart framing on top of the document itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_cv_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    // Backend integration (API-key guarded)
    let backend = Router::new()
        .route("/api/ai/process", post(ai::handle_process))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/ai/health", get(ai::handle_ai_health))
        .merge(backend)
        // CV Parser
        .route(
            "/ai/cv/parse",
            post(cv::handle_parse_cv).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/ai/cv/parse-text", post(cv::handle_parse_cv_text))
        // Competency signals
        .route(
            "/ai/competency/signals",
            post(competency::handle_generate_signals),
        )
        .route(
            "/ai/competency/signals/:talent_id",
            get(competency::handle_get_signals),
        )
        .route(
            "/ai/competency/signals/:talent_id/refresh",
            post(competency::handle_refresh_signals),
        )
        .route(
            "/ai/competency/skills/taxonomy",
            get(competency::handle_skills_taxonomy),
        )
        // Fit scoring
        .route("/ai/screening/score", post(screening::handle_score))
        .route(
            "/ai/screening/batch-score",
            post(screening::handle_batch_score),
        )
        .route("/ai/screening/rank", post(screening::handle_rank))
        .route(
            "/ai/screening/score/:talent_id/:job_id",
            get(screening::handle_get_score),
        )
        .route(
            "/ai/screening/scores/:talent_id",
            get(screening::handle_list_scores),
        )
        .with_state(state)
}
