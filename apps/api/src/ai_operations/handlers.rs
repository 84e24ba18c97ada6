//! Axum handlers for the backend integration surface (`/api/ai/*`).
//!
//! Every response, success or failure, is a `BackendResponse` envelope whose
//! HTTP status mirrors its `status` field.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::ai_operations::models::{AiRequest, BackendResponse, OperationType};
use crate::ai_operations::operations;
use crate::errors::AppError;
use crate::state::AppState;

type Envelope = (StatusCode, Json<BackendResponse>);

/// POST /api/ai/process
pub async fn handle_process(
    State(state): State<AppState>,
    Json(request): Json<AiRequest>,
) -> Envelope {
    let Some(operation) = OperationType::parse(&request.operation_type) else {
        let supported: Vec<&str> = OperationType::SUPPORTED.iter().map(|op| op.as_str()).collect();
        return failure(AppError::Validation(format!(
            "Unsupported operation type '{}'. Supported: {}",
            request.operation_type,
            supported.join(", ")
        )));
    };

    info!(
        "Processing {} for user {}",
        operation.as_str(),
        request.meta_data.user_id
    );

    match operation {
        OperationType::ResumeParse => match operations::resume_parse(&state, &request).await {
            Ok(result) => success("CV parsed successfully", &result),
            Err(e) => failure(e),
        },
        OperationType::JobMatch => {
            let result = operations::job_match(state.llm.as_ref(), &request).await;
            success("Job match calculated successfully", &result)
        }
        OperationType::ScreeningScore => {
            let result = operations::screening_score(&state, &request).await;
            success("Screening score calculated successfully", &result)
        }
    }
}

/// GET /api/ai/health
pub async fn handle_ai_health() -> Json<BackendResponse> {
    let supported: Vec<&str> = OperationType::SUPPORTED.iter().map(|op| op.as_str()).collect();
    Json(BackendResponse::ok(
        "AI service is healthy and ready for backend integration",
        json!({
            "status": "healthy",
            "supported_operations": supported,
        }),
    ))
}

fn success<T: Serialize>(message: &str, result: &T) -> Envelope {
    match serde_json::to_value(result) {
        Ok(data) => (StatusCode::OK, Json(BackendResponse::ok(message, data))),
        Err(e) => failure(AppError::Internal(e.into())),
    }
}

fn failure(err: AppError) -> Envelope {
    let status = err.status();
    let (message, errors): (String, Value) = match &err {
        AppError::Validation(msg) => (msg.clone(), json!({ "validation_error": msg })),
        other => {
            error!("AI operation failed: {other:?}");
            ("AI processing failed".to_string(), json!({ "error": other.to_string() }))
        }
    };
    (
        status,
        Json(BackendResponse::error(message, status.as_u16(), errors)),
    )
}
