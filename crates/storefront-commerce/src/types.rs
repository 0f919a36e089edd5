use serde::{Deserialize, Serialize};
use storefront_core::UtcDateTime;
use storefront_entities::types::{PaymentMethod, PaymentStatus, ShippingStatus};
use storefront_entities::{order_details, orders};
use thiserror::Error;
use utoipa::ToSchema;

use crate::lifecycle::OrderAction;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Order {0} not found")]
    NotFound(i32),
    #[error("Invalid order: {0}")]
    Validation(String),
    #[error("Cannot change {field} from {from} to {to}")]
    InvalidTransition {
        field: &'static str,
        from: String,
        to: String,
    },
    /// The row changed between read and conditional update
    #[error("Order {0} was modified concurrently")]
    Conflict(i32),
    #[error("Webhook rejected: {0}")]
    Unauthorized(String),
    #[error("Payment webhook is disabled until an API key is configured")]
    WebhookDisabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    /// Smallest currency unit
    pub unit_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub note: Option<String>,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub payment_status: Option<PaymentStatus>,
    pub shipping_status: Option<ShippingStatus>,
    /// Matches customer name or phone
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateShippingStatusRequest {
    pub status: ShippingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
}

impl From<order_details::Model> for OrderItemResponse {
    fn from(item: order_details::Model) -> Self {
        Self {
            line_total: item.unit_price * i64::from(item.quantity),
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub note: Option<String>,
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_status: ShippingStatus,
    pub payment_reference: Option<String>,
    /// Empty in list responses
    pub items: Vec<OrderItemResponse>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: UtcDateTime,
}

impl OrderResponse {
    pub fn new(order: orders::Model, items: Vec<order_details::Model>) -> Self {
        Self {
            id: order.id,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_email: order.customer_email,
            shipping_address: order.shipping_address,
            note: order.note,
            total_amount: order.total_amount,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            shipping_status: order.shipping_status,
            payment_reference: order.payment_reference,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl From<orders::Model> for OrderResponse {
    fn from(order: orders::Model) -> Self {
        Self::new(order, Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderActionsResponse {
    pub order_id: i32,
    pub payment_status: PaymentStatus,
    pub shipping_status: ShippingStatus,
    pub actions: Vec<OrderAction>,
}

/// Transaction notification posted by SePay
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SepayWebhookPayload {
    pub id: i64,
    pub gateway: String,
    pub transaction_date: String,
    pub account_number: Option<String>,
    /// Payment code SePay extracted from the content, if configured
    pub code: Option<String>,
    pub content: String,
    /// `in` for incoming transfers, `out` for outgoing
    pub transfer_type: String,
    pub transfer_amount: i64,
    pub accumulated: Option<i64>,
    pub sub_account: Option<String>,
    pub reference_code: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// Order moved to PAID
    Paid,
    /// The same transfer was already applied
    AlreadyPaid,
    /// Outgoing transfer or no order reference in the content
    Ignored,
    OrderNotFound,
    InsufficientAmount,
    /// Order is in a state that cannot accept payment
    NotPayable,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SepayWebhookResponse {
    pub success: bool,
    pub outcome: PaymentOutcome,
    pub order_id: Option<i32>,
}
