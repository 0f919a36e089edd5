//! Order status rules.
//!
//! Shipping and payment move independently, each along its own transition
//! table. [`available_actions`] combines both into the buttons a viewer may
//! press on an order.

use serde::{Deserialize, Serialize};
use storefront_entities::orders;
use storefront_entities::types::{PaymentMethod, PaymentStatus, ShippingStatus};
use utoipa::ToSchema;

pub fn can_transition_shipping(from: ShippingStatus, to: ShippingStatus) -> bool {
    use ShippingStatus::*;
    matches!(
        (from, to),
        (Processing, Shipped)
            | (Processing, Cancelled)
            | (Shipped, Delivered)
            | (Shipped, Returned)
            | (Delivered, Received)
            | (Delivered, Returned)
            | (Received, Returned)
    )
}

pub fn can_transition_payment(from: PaymentStatus, to: PaymentStatus) -> bool {
    use PaymentStatus::*;
    matches!(
        (from, to),
        (Pending, Paid)
            | (Pending, Failed)
            | (Pending, Expired)
            | (Paid, Refunded)
            | (Failed, Pending)
    )
}

pub fn is_terminal_shipping(status: ShippingStatus) -> bool {
    matches!(status, ShippingStatus::Cancelled | ShippingStatus::Returned)
}

/// Who is looking at the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Viewer {
    #[default]
    Admin,
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Ship,
    MarkDelivered,
    ConfirmReceived,
    Cancel,
    RequestReturn,
    Refund,
    RetryPayment,
}

/// Status change an action performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Shipping(ShippingStatus),
    Payment(PaymentStatus),
}

impl OrderAction {
    pub fn change(self) -> StatusChange {
        match self {
            OrderAction::Ship => StatusChange::Shipping(ShippingStatus::Shipped),
            OrderAction::MarkDelivered => StatusChange::Shipping(ShippingStatus::Delivered),
            OrderAction::ConfirmReceived => StatusChange::Shipping(ShippingStatus::Received),
            OrderAction::Cancel => StatusChange::Shipping(ShippingStatus::Cancelled),
            OrderAction::RequestReturn => StatusChange::Shipping(ShippingStatus::Returned),
            OrderAction::Refund => StatusChange::Payment(PaymentStatus::Refunded),
            OrderAction::RetryPayment => StatusChange::Payment(PaymentStatus::Pending),
        }
    }
}

/// Transition table plus the payment gate on shipping
pub fn can_change_shipping(order: &orders::Model, to: ShippingStatus) -> bool {
    can_transition_shipping(order.shipping_status, to)
        && (to != ShippingStatus::Shipped
            || ready_to_ship(order.payment_method, order.payment_status))
}

/// Transition table plus the shipping gate on payment: refunds wait for a
/// cancelled or returned shipment, retries need one still in flight.
pub fn can_change_payment(order: &orders::Model, to: PaymentStatus) -> bool {
    if !can_transition_payment(order.payment_status, to) {
        return false;
    }
    match to {
        PaymentStatus::Refunded => is_terminal_shipping(order.shipping_status),
        PaymentStatus::Pending => !is_terminal_shipping(order.shipping_status),
        _ => true,
    }
}

/// Bank-transfer orders ship only once paid; cash on delivery ships unpaid.
fn ready_to_ship(payment_method: PaymentMethod, payment_status: PaymentStatus) -> bool {
    match payment_method {
        PaymentMethod::Cod => matches!(payment_status, PaymentStatus::Pending | PaymentStatus::Paid),
        PaymentMethod::Sepay => payment_status == PaymentStatus::Paid,
    }
}

/// Actions to render for `viewer`, in display order
pub fn available_actions(order: &orders::Model, viewer: Viewer) -> Vec<OrderAction> {
    actions_for(
        order.shipping_status,
        order.payment_status,
        order.payment_method,
        viewer,
    )
}

pub fn actions_for(
    shipping: ShippingStatus,
    payment: PaymentStatus,
    method: PaymentMethod,
    viewer: Viewer,
) -> Vec<OrderAction> {
    use ShippingStatus::*;

    let mut actions = Vec::new();
    match viewer {
        Viewer::Admin => {
            if shipping == Processing && ready_to_ship(method, payment) {
                actions.push(OrderAction::Ship);
            }
            if shipping == Shipped {
                actions.push(OrderAction::MarkDelivered);
            }
            if shipping == Processing {
                actions.push(OrderAction::Cancel);
            }
            if matches!(shipping, Shipped | Delivered | Received) {
                actions.push(OrderAction::RequestReturn);
            }
            if payment == PaymentStatus::Paid && is_terminal_shipping(shipping) {
                actions.push(OrderAction::Refund);
            }
        }
        Viewer::Customer => {
            if shipping == Delivered {
                actions.push(OrderAction::ConfirmReceived);
            }
            if shipping == Processing {
                actions.push(OrderAction::Cancel);
            }
            if matches!(shipping, Delivered | Received) {
                actions.push(OrderAction::RequestReturn);
            }
            if payment == PaymentStatus::Failed
                && method == PaymentMethod::Sepay
                && !is_terminal_shipping(shipping)
            {
                actions.push(OrderAction::RetryPayment);
            }
        }
    }
    actions
}
