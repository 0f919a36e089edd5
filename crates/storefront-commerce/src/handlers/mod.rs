mod order_handler;
mod payment_handler;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use utoipa::OpenApi;

use crate::lifecycle::{OrderAction, Viewer};
use crate::services::{OrderService, SepayService};
use crate::types::{
    CreateOrderRequest, OrderActionsResponse, OrderItemRequest, OrderItemResponse,
    OrderListResponse, OrderResponse, PaymentOutcome, SepayWebhookPayload, SepayWebhookResponse,
    UpdatePaymentStatusRequest, UpdateShippingStatusRequest,
};

pub use order_handler::{
    cancel_order, create_order, get_order, get_order_actions, list_orders,
    update_payment_status, update_shipping_status,
};
pub use payment_handler::sepay_webhook;

pub struct AppState {
    pub order_service: Arc<OrderService>,
    pub sepay_service: Arc<SepayService>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/actions", get(get_order_actions))
        .route("/orders/{id}/shipping-status", patch(update_shipping_status))
        .route("/orders/{id}/payment-status", patch(update_payment_status))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/payments/sepay/webhook", post(sepay_webhook))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        order_handler::list_orders,
        order_handler::create_order,
        order_handler::get_order,
        order_handler::get_order_actions,
        order_handler::update_shipping_status,
        order_handler::update_payment_status,
        order_handler::cancel_order,
        payment_handler::sepay_webhook,
    ),
    components(schemas(
        CreateOrderRequest,
        OrderItemRequest,
        OrderItemResponse,
        OrderResponse,
        OrderListResponse,
        OrderActionsResponse,
        OrderAction,
        Viewer,
        UpdateShippingStatusRequest,
        UpdatePaymentStatusRequest,
        SepayWebhookPayload,
        SepayWebhookResponse,
        PaymentOutcome,
        storefront_entities::types::PaymentStatus,
        storefront_entities::types::ShippingStatus,
        storefront_entities::types::PaymentMethod,
    )),
    tags(
        (name = "Orders", description = "Checkout orders and their status lifecycle"),
        (name = "Payments", description = "Payment gateway callbacks")
    )
)]
pub struct CommerceApiDoc;
