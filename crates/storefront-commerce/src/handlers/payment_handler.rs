use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use storefront_core::problemdetails::Problem;
use tracing::warn;

use super::order_handler::json_body;
use super::AppState;
use crate::types::{SepayWebhookPayload, SepayWebhookResponse};

/// SePay transaction callback.
///
/// Answers 200 with `success: true` for every authenticated, well-formed
/// notification so SePay does not retry; `outcome` tells what happened.
#[utoipa::path(
    tag = "Payments",
    post,
    path = "/payments/sepay/webhook",
    request_body = SepayWebhookPayload,
    responses(
        (status = 200, description = "Notification processed", body = SepayWebhookResponse),
        (status = 400, description = "Malformed notification", body = storefront_core::ProblemDetails),
        (status = 401, description = "Missing or wrong API key", body = storefront_core::ProblemDetails),
        (status = 503, description = "No API key configured", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn sepay_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<SepayWebhookPayload>, JsonRejection>,
) -> Result<Json<SepayWebhookResponse>, Problem> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if let Err(e) = state.sepay_service.verify(authorization) {
        warn!("Rejected SePay webhook: {}", e);
        return Err(e.into());
    }

    let payload = json_body(payload)?;
    Ok(Json(state.sepay_service.handle(payload).await?))
}
