use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::anomaly::types::AnomalyAssessment;
use crate::payment::PaymentRecord;
use crate::pipeline::PaymentReport;

use super::types::*;
use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: msg.into(),
        }),
    )
}

// ============================================================
// Health & Rules
// ============================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn rules(State(state): State<Arc<AppState>>) -> Json<RulesResponse> {
    let engine = &state.pipeline.engine;
    Json(RulesResponse {
        rules: engine.rule_table(),
        suspicious_payment_modes: engine.config().suspicious_payment_modes.clone(),
    })
}

// ============================================================
// Assessment
// ============================================================

pub async fn assess(
    State(state): State<Arc<AppState>>,
    Json(payment): Json<PaymentRecord>,
) -> Json<AnomalyAssessment> {
    Json(state.pipeline.engine.assess(&payment))
}

pub async fn assess_batch(
    State(state): State<Arc<AppState>>,
    Json(payments): Json<Vec<PaymentRecord>>,
) -> ApiResult<PaymentReport> {
    if payments.len() > state.max_batch_size {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!(
                "Batch of {} payments exceeds the limit of {}",
                payments.len(),
                state.max_batch_size
            ),
        ));
    }
    Ok(Json(state.pipeline.run(&payments)))
}
