use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use storefront_core::error_builder::{bad_request, internal_server_error, not_found};
use storefront_core::problemdetails::Problem;
use storefront_core::RequestMetadata;
use tracing::{error, warn};

use super::AppState;
use crate::types::{ClientInfo, HealthResponse, TrackRequest, TrackResponse, TrackingError};

impl From<TrackingError> for Problem {
    fn from(error: TrackingError) -> Self {
        match error {
            TrackingError::Validation(detail) => bad_request()
                .title("Invalid Tracking Payload")
                .detail(detail)
                .build(),
            TrackingError::WebsiteNotFound(id) => not_found()
                .title("Website Not Found")
                .detail(format!("Website {} does not exist", id))
                .build(),
            TrackingError::Database(e) => {
                error!("Tracking query failed: {}", e);
                internal_server_error().build()
            }
        }
    }
}

/// Record a page view or custom event
#[utoipa::path(
    tag = "Tracking",
    post,
    path = "/track",
    request_body = TrackRequest,
    responses(
        (status = 200, description = "Hit recorded", body = TrackResponse),
        (status = 400, description = "Malformed payload", body = storefront_core::ProblemDetails),
        (status = 404, description = "Unknown website", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn track(
    State(state): State<Arc<AppState>>,
    metadata: RequestMetadata,
    payload: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<TrackResponse>, Problem> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected tracking payload: {}", rejection.body_text());
        bad_request()
            .title("Invalid Tracking Payload")
            .detail(rejection.body_text())
            .build()
    })?;

    let client = ClientInfo::from_request(metadata, &payload);
    let response = state.tracking_service.record(payload, client).await?;
    Ok(Json(response))
}

/// Liveness and database connectivity
#[utoipa::path(
    tag = "Tracking",
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, database) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            error!("Health check database ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    let body = HealthResponse {
        status: if status == StatusCode::OK { "ok" } else { "degraded" }.to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (status, Json(body))
}
