use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storefront_core::error_builder::{
    bad_request, conflict, internal_server_error, not_found, unauthorized, ErrorBuilder,
};
use storefront_core::problemdetails::Problem;
use tracing::error;
use utoipa::IntoParams;

use super::AppState;
use crate::lifecycle::{actions_for, Viewer};
use crate::types::{
    CreateOrderRequest, OrderActionsResponse, OrderError, OrderFilter, OrderListResponse,
    OrderResponse, UpdatePaymentStatusRequest, UpdateShippingStatusRequest,
};

impl From<OrderError> for Problem {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::NotFound(id) => not_found()
                .title("Order Not Found")
                .detail(format!("Order {} does not exist", id))
                .build(),
            OrderError::Validation(detail) => bad_request()
                .title("Invalid Order")
                .detail(detail)
                .build(),
            OrderError::InvalidTransition { field, from, to } => conflict()
                .title("Invalid Status Transition")
                .detail(format!("{} cannot change from {} to {}", field, from, to))
                .value("field", field)
                .value("from", from)
                .value("to", to)
                .build(),
            OrderError::Conflict(id) => conflict()
                .title("Order Modified")
                .detail(format!(
                    "Order {} changed while it was being updated, reload and retry",
                    id
                ))
                .build(),
            OrderError::Unauthorized(detail) => unauthorized().detail(detail).build(),
            OrderError::WebhookDisabled => ErrorBuilder::new(StatusCode::SERVICE_UNAVAILABLE)
                .title("Payment Webhook Disabled")
                .detail("Set STOREFRONT_SEPAY_API_KEY to accept payment notifications")
                .value("error_code", "WEBHOOK_DISABLED")
                .build(),
            OrderError::Database(e) => {
                error!("Order query failed: {}", e);
                internal_server_error().build()
            }
        }
    }
}

pub(super) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Problem> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        bad_request()
            .title("Invalid Request Body")
            .detail(rejection.body_text())
            .build()
    })
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActionsQuery {
    /// `admin` (default) or `customer`
    #[serde(default)]
    #[param(value_type = Option<Viewer>)]
    pub viewer: Viewer,
}

/// List orders, newest first
#[utoipa::path(
    tag = "Orders",
    get,
    path = "/orders",
    params(OrderFilter),
    responses(
        (status = 200, description = "Page of orders", body = OrderListResponse),
        (status = 400, description = "Invalid filter", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<OrderFilter>, QueryRejection>,
) -> Result<Json<OrderListResponse>, Problem> {
    let Query(filter) = filter.map_err(|rejection| {
        bad_request()
            .title("Invalid Order Filter")
            .detail(rejection.body_text())
            .build()
    })?;
    Ok(Json(state.order_service.list_orders(filter).await?))
}

/// Place an order
#[utoipa::path(
    tag = "Orders",
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid order", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), Problem> {
    let request = json_body(payload)?;
    let order = state.order_service.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Order with its line items
#[utoipa::path(
    tag = "Orders",
    get,
    path = "/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Order not found", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, Problem> {
    Ok(Json(state.order_service.get_order(id).await?))
}

/// Buttons the admin dashboard or the storefront should render
#[utoipa::path(
    tag = "Orders",
    get,
    path = "/orders/{id}/actions",
    params(("id" = i32, Path, description = "Order ID"), ActionsQuery),
    responses(
        (status = 200, description = "Available actions", body = OrderActionsResponse),
        (status = 404, description = "Order not found", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_order_actions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<ActionsQuery>,
) -> Result<Json<OrderActionsResponse>, Problem> {
    let order = state.order_service.get_order(id).await?;
    Ok(Json(OrderActionsResponse {
        order_id: order.id,
        payment_status: order.payment_status,
        shipping_status: order.shipping_status,
        actions: actions_for(
            order.shipping_status,
            order.payment_status,
            order.payment_method,
            query.viewer,
        ),
    }))
}

#[utoipa::path(
    tag = "Orders",
    patch,
    path = "/orders/{id}/shipping-status",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdateShippingStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 404, description = "Order not found", body = storefront_core::ProblemDetails),
        (status = 409, description = "Transition not allowed", body = storefront_core::ProblemDetails)
    )
)]
pub async fn update_shipping_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateShippingStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, Problem> {
    let request = json_body(payload)?;
    let order = state
        .order_service
        .update_shipping_status(id, request.status)
        .await?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    tag = "Orders",
    patch,
    path = "/orders/{id}/payment-status",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 404, description = "Order not found", body = storefront_core::ProblemDetails),
        (status = 409, description = "Transition not allowed", body = storefront_core::ProblemDetails)
    )
)]
pub async fn update_payment_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdatePaymentStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, Problem> {
    let request = json_body(payload)?;
    let order = state
        .order_service
        .update_payment_status(id, request.status)
        .await?;
    Ok(Json(order.into()))
}

/// Cancel an order that has not shipped yet
#[utoipa::path(
    tag = "Orders",
    post,
    path = "/orders/{id}/cancel",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Cancelled order", body = OrderResponse),
        (status = 404, description = "Order not found", body = storefront_core::ProblemDetails),
        (status = 409, description = "Order already shipped or closed", body = storefront_core::ProblemDetails)
    )
)]
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, Problem> {
    let order = state.order_service.cancel_order(id).await?;
    Ok(Json(order.into()))
}
