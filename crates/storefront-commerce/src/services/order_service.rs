use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use storefront_core::PaginationParams;
use storefront_entities::types::{PaymentStatus, ShippingStatus};
use storefront_entities::{order_details, orders};
use tracing::{info, warn};

use crate::lifecycle::{
    can_change_payment, can_change_shipping, can_transition_payment, can_transition_shipping,
};
use crate::types::{
    CreateOrderRequest, OrderError, OrderFilter, OrderListResponse, OrderResponse, PaymentOutcome,
};

pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert the order and its lines in one transaction. New orders start
    /// as PENDING / PROCESSING.
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, OrderError> {
        let total_amount = validate_order(&request)?;

        let txn = self.db.begin().await?;

        let order = orders::ActiveModel {
            customer_name: Set(request.customer_name.trim().to_string()),
            customer_phone: Set(request.customer_phone.trim().to_string()),
            customer_email: Set(non_blank(request.customer_email)),
            shipping_address: Set(request.shipping_address.trim().to_string()),
            note: Set(non_blank(request.note)),
            total_amount: Set(total_amount),
            payment_method: Set(request.payment_method),
            payment_status: Set(PaymentStatus::Pending),
            shipping_status: Set(ShippingStatus::Processing),
            payment_reference: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(request.items.len());
        for item in request.items {
            let line = order_details::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name.trim().to_string()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(line);
        }

        txn.commit().await?;

        info!(
            "Created order {} ({} lines, total {}, {})",
            order.id,
            items.len(),
            order.total_amount,
            order.payment_method
        );
        Ok(OrderResponse::new(order, items))
    }

    pub async fn get_order(&self, id: i32) -> Result<OrderResponse, OrderError> {
        let order = self.find_order(id).await?;
        let items = order_details::Entity::find()
            .filter(order_details::Column::OrderId.eq(id))
            .order_by_asc(order_details::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(OrderResponse::new(order, items))
    }

    /// Newest first, without line items
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<OrderListResponse, OrderError> {
        let (limit, offset) = PaginationParams::new(filter.limit, filter.offset).normalize();

        let mut query = orders::Entity::find();
        if let Some(status) = filter.payment_status {
            query = query.filter(orders::Column::PaymentStatus.eq(status));
        }
        if let Some(status) = filter.shipping_status {
            query = query.filter(orders::Column::ShippingStatus.eq(status));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(orders::Column::CustomerName.contains(search))
                    .add(orders::Column::CustomerPhone.contains(search)),
            );
        }

        let total = query.clone().count(self.db.as_ref()).await?;
        let rows = query
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?;

        Ok(OrderListResponse {
            orders: rows.into_iter().map(OrderResponse::from).collect(),
            total,
            limit,
            offset,
        })
    }

    /// Moving to CANCELLED goes through [`Self::cancel_order`]
    pub async fn update_shipping_status(
        &self,
        id: i32,
        next: ShippingStatus,
    ) -> Result<orders::Model, OrderError> {
        let order = self.find_order(id).await?;
        if next == ShippingStatus::Cancelled {
            return self.cancel(order).await;
        }
        if !can_change_shipping(&order, next) {
            return Err(OrderError::InvalidTransition {
                field: "shipping_status",
                from: order.shipping_status.to_string(),
                to: next.to_string(),
            });
        }

        let payment = order.payment_status;
        self.write_statuses(order, next, payment, None).await
    }

    pub async fn update_payment_status(
        &self,
        id: i32,
        next: PaymentStatus,
    ) -> Result<orders::Model, OrderError> {
        let order = self.find_order(id).await?;
        if !can_change_payment(&order, next) {
            return Err(OrderError::InvalidTransition {
                field: "payment_status",
                from: order.payment_status.to_string(),
                to: next.to_string(),
            });
        }

        let shipping = order.shipping_status;
        self.write_statuses(order, shipping, next, None).await
    }

    pub async fn cancel_order(&self, id: i32) -> Result<orders::Model, OrderError> {
        let order = self.find_order(id).await?;
        self.cancel(order).await
    }

    /// Settle an order from a bank transfer. Never errors on business
    /// conditions; those are reported through the outcome.
    pub async fn confirm_transfer(
        &self,
        order_id: i32,
        amount: i64,
        reference: &str,
    ) -> Result<PaymentOutcome, OrderError> {
        let Some(order) = orders::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
        else {
            warn!("Transfer {} references unknown order {}", reference, order_id);
            return Ok(PaymentOutcome::OrderNotFound);
        };

        if order.payment_status == PaymentStatus::Paid {
            if order.payment_reference.as_deref() != Some(reference) {
                warn!(
                    "Order {} already paid by {:?}, second transfer {} needs manual review",
                    order.id, order.payment_reference, reference
                );
            }
            return Ok(PaymentOutcome::AlreadyPaid);
        }

        if !can_transition_payment(order.payment_status, PaymentStatus::Paid)
            || order.shipping_status == ShippingStatus::Cancelled
        {
            warn!(
                "Transfer {} for order {} in state {} / {} was not applied",
                reference, order.id, order.payment_status, order.shipping_status
            );
            return Ok(PaymentOutcome::NotPayable);
        }

        if amount < order.total_amount {
            warn!(
                "Transfer {} for order {} is short: {} < {}",
                reference, order.id, amount, order.total_amount
            );
            return Ok(PaymentOutcome::InsufficientAmount);
        }

        let shipping = order.shipping_status;
        match self
            .write_statuses(order, shipping, PaymentStatus::Paid, Some(reference.to_string()))
            .await
        {
            Ok(order) => {
                info!("Order {} paid by transfer {}", order.id, reference);
                Ok(PaymentOutcome::Paid)
            }
            Err(OrderError::Conflict(id)) => self.outcome_after_conflict(id, reference).await,
            Err(e) => Err(e),
        }
    }

    /// The order changed between read and write; report where it ended up
    async fn outcome_after_conflict(
        &self,
        order_id: i32,
        reference: &str,
    ) -> Result<PaymentOutcome, OrderError> {
        let current = orders::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?;
        match current {
            Some(order) if order.payment_status == PaymentStatus::Paid => {
                warn!(
                    "Order {} was paid concurrently by {:?}, transfer {} not applied",
                    order.id, order.payment_reference, reference
                );
                Ok(PaymentOutcome::AlreadyPaid)
            }
            Some(order) => {
                warn!(
                    "Order {} moved to {} / {} while applying transfer {}",
                    order.id, order.payment_status, order.shipping_status, reference
                );
                Ok(PaymentOutcome::NotPayable)
            }
            None => Ok(PaymentOutcome::OrderNotFound),
        }
    }

    async fn find_order(&self, id: i32) -> Result<orders::Model, OrderError> {
        orders::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Cancelling an unpaid order also expires its payment so a late
    /// transfer is not applied.
    async fn cancel(&self, order: orders::Model) -> Result<orders::Model, OrderError> {
        if !can_transition_shipping(order.shipping_status, ShippingStatus::Cancelled) {
            return Err(OrderError::InvalidTransition {
                field: "shipping_status",
                from: order.shipping_status.to_string(),
                to: ShippingStatus::Cancelled.to_string(),
            });
        }

        let payment = if order.payment_status == PaymentStatus::Pending {
            PaymentStatus::Expired
        } else {
            order.payment_status
        };
        let order = self
            .write_statuses(order, ShippingStatus::Cancelled, payment, None)
            .await?;
        info!("Order {} cancelled (payment {})", order.id, order.payment_status);
        Ok(order)
    }

    /// Compare-and-set on both status columns; zero affected rows means the
    /// order changed after it was read.
    async fn write_statuses(
        &self,
        order: orders::Model,
        shipping: ShippingStatus,
        payment: PaymentStatus,
        payment_reference: Option<String>,
    ) -> Result<orders::Model, OrderError> {
        let now = Utc::now();

        let mut update = orders::Entity::update_many()
            .col_expr(orders::Column::ShippingStatus, Expr::value(shipping))
            .col_expr(orders::Column::PaymentStatus, Expr::value(payment))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now));
        if let Some(reference) = payment_reference.clone() {
            update = update.col_expr(orders::Column::PaymentReference, Expr::value(reference));
        }

        let result = update
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::ShippingStatus.eq(order.shipping_status))
            .filter(orders::Column::PaymentStatus.eq(order.payment_status))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(OrderError::Conflict(order.id));
        }

        Ok(orders::Model {
            shipping_status: shipping,
            payment_status: payment,
            payment_reference: payment_reference.or(order.payment_reference),
            updated_at: now,
            ..order
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks the request and returns the order total
fn validate_order(request: &CreateOrderRequest) -> Result<i64, OrderError> {
    let required = [
        ("customer_name", &request.customer_name),
        ("customer_phone", &request.customer_phone),
        ("shipping_address", &request.shipping_address),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(OrderError::Validation(format!("{} is required", field)));
        }
    }

    if request.items.is_empty() {
        return Err(OrderError::Validation(
            "an order needs at least one item".to_string(),
        ));
    }

    let mut total: i64 = 0;
    for (index, item) in request.items.iter().enumerate() {
        if item.quantity <= 0 {
            return Err(OrderError::Validation(format!(
                "items[{}].quantity must be positive",
                index
            )));
        }
        if item.unit_price < 0 {
            return Err(OrderError::Validation(format!(
                "items[{}].unit_price must not be negative",
                index
            )));
        }
        if item.product_name.trim().is_empty() {
            return Err(OrderError::Validation(format!(
                "items[{}].product_name is required",
                index
            )));
        }
        total = item
            .unit_price
            .checked_mul(i64::from(item.quantity))
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| OrderError::Validation("order total overflows".to_string()))?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderItemRequest;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};
    use storefront_entities::types::PaymentMethod;

    fn order(shipping: ShippingStatus, payment: PaymentStatus) -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: 7,
            customer_name: "Tran Thi B".to_string(),
            customer_phone: "0912345678".to_string(),
            customer_email: Some("b@example.com".to_string()),
            shipping_address: "1 Nguyen Hue, HCMC".to_string(),
            note: None,
            total_amount: 250_000,
            payment_method: PaymentMethod::Cod,
            payment_status: payment,
            shipping_status: shipping,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(items: Vec<OrderItemRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: " Tran Thi B ".to_string(),
            customer_phone: "0912345678".to_string(),
            customer_email: Some("  ".to_string()),
            shipping_address: "1 Nguyen Hue, HCMC".to_string(),
            note: None,
            payment_method: PaymentMethod::Cod,
            items,
        }
    }

    fn item(product_id: i32, quantity: i32, unit_price: i64) -> OrderItemRequest {
        OrderItemRequest {
            product_id,
            product_name: format!("Product {}", product_id),
            quantity,
            unit_price,
        }
    }

    fn updated(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn log_of(service: OrderService) -> Vec<Transaction> {
        let Ok(db) = Arc::try_unwrap(service.db) else {
            panic!("connection still shared");
        };
        db.into_transaction_log()
    }

    #[test]
    fn test_validate_computes_total() {
        let total = validate_order(&request(vec![item(1, 2, 100_000), item(2, 1, 50_000)])).unwrap();
        assert_eq!(total, 250_000);
    }

    #[test]
    fn test_validate_rejects_bad_lines() {
        assert!(matches!(
            validate_order(&request(vec![])),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            validate_order(&request(vec![item(1, 0, 100)])),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            validate_order(&request(vec![item(1, 1, -1)])),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            validate_order(&request(vec![item(1, i32::MAX, i64::MAX / 2)])),
            Err(OrderError::Validation(_))
        ));

        let mut missing_phone = request(vec![item(1, 1, 100)]);
        missing_phone.customer_phone = " ".to_string();
        let Err(OrderError::Validation(message)) = validate_order(&missing_phone) else {
            panic!("expected validation error");
        };
        assert_eq!(message, "customer_phone is required");
    }

    #[tokio::test]
    async fn test_create_order_inserts_lines_in_transaction() {
        let created = order(ShippingStatus::Processing, PaymentStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![created.clone()]])
            .append_query_results([vec![order_details::Model {
                id: 1,
                order_id: 7,
                product_id: 1,
                product_name: "Product 1".to_string(),
                quantity: 2,
                unit_price: 100_000,
            }]])
            .append_query_results([vec![order_details::Model {
                id: 2,
                order_id: 7,
                product_id: 2,
                product_name: "Product 2".to_string(),
                quantity: 1,
                unit_price: 50_000,
            }]]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let response = service
            .create_order(request(vec![item(1, 2, 100_000), item(2, 1, 50_000)]))
            .await
            .unwrap();

        assert_eq!(response.id, 7);
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].line_total, 200_000);
        assert_eq!(response.payment_status, PaymentStatus::Pending);
        assert_eq!(response.shipping_status, ShippingStatus::Processing);

        let log = format!("{:?}", log_of(service));
        assert!(log.contains("BEGIN"));
        assert!(log.contains("COMMIT"));
        assert!(log.contains("Tran Thi B"));
        assert!(!log.contains(" Tran Thi B "));
    }

    #[tokio::test]
    async fn test_invalid_order_never_touches_database() {
        let service = OrderService::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));

        let result = service.create_order(request(vec![])).await;

        assert!(matches!(result, Err(OrderError::Validation(_))));
        assert!(log_of(service).is_empty());
    }

    #[tokio::test]
    async fn test_illegal_shipping_transition_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![order(
            ShippingStatus::Processing,
            PaymentStatus::Pending,
        )]]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let result = service
            .update_shipping_status(7, ShippingStatus::Delivered)
            .await;

        let Err(OrderError::InvalidTransition { field, from, to }) = result else {
            panic!("expected invalid transition");
        };
        assert_eq!(field, "shipping_status");
        assert_eq!(from, "PROCESSING");
        assert_eq!(to, "DELIVERED");
    }

    #[tokio::test]
    async fn test_ship_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(ShippingStatus::Processing, PaymentStatus::Pending)]])
            .append_exec_results([updated(1)]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let shipped = service
            .update_shipping_status(7, ShippingStatus::Shipped)
            .await
            .unwrap();

        assert_eq!(shipped.shipping_status, ShippingStatus::Shipped);
        assert_eq!(shipped.payment_status, PaymentStatus::Pending);

        let log = format!("{:?}", log_of(service));
        assert!(log.contains("UPDATE \\\"orders\\\""));
        assert!(log.contains("SHIPPED"));
    }

    #[tokio::test]
    async fn test_concurrent_change_is_a_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(ShippingStatus::Shipped, PaymentStatus::Paid)]])
            .append_exec_results([updated(0)]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let result = service
            .update_shipping_status(7, ShippingStatus::Delivered)
            .await;

        assert!(matches!(result, Err(OrderError::Conflict(7))));
    }

    #[tokio::test]
    async fn test_cancel_unpaid_order_expires_payment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(ShippingStatus::Processing, PaymentStatus::Pending)]])
            .append_exec_results([updated(1)]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let cancelled = service.cancel_order(7).await.unwrap();

        assert_eq!(cancelled.shipping_status, ShippingStatus::Cancelled);
        assert_eq!(cancelled.payment_status, PaymentStatus::Expired);
    }

    #[tokio::test]
    async fn test_cancel_paid_order_keeps_payment_for_refund() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(ShippingStatus::Processing, PaymentStatus::Paid)]])
            .append_exec_results([updated(1)]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let cancelled = service
            .update_shipping_status(7, ShippingStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(cancelled.shipping_status, ShippingStatus::Cancelled);
        assert_eq!(cancelled.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_cannot_cancel_shipped_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order(ShippingStatus::Shipped, PaymentStatus::Paid)]]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        assert!(matches!(
            service.cancel_order(7).await,
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_refund_requires_paid() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![order(
            ShippingStatus::Cancelled,
            PaymentStatus::Expired,
        )]]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        assert!(matches!(
            service
                .update_payment_status(7, PaymentStatus::Refunded)
                .await,
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    fn transfer_order(shipping: ShippingStatus, payment: PaymentStatus) -> orders::Model {
        orders::Model {
            payment_method: PaymentMethod::Sepay,
            ..order(shipping, payment)
        }
    }

    #[tokio::test]
    async fn test_unpaid_transfer_order_cannot_ship() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            transfer_order(ShippingStatus::Processing, PaymentStatus::Pending),
        ]]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let result = service
            .update_shipping_status(7, ShippingStatus::Shipped)
            .await;

        let Err(OrderError::InvalidTransition { field, from, to }) = result else {
            panic!("expected invalid transition");
        };
        assert_eq!(field, "shipping_status");
        assert_eq!(from, "PROCESSING");
        assert_eq!(to, "SHIPPED");
        assert!(!format!("{:?}", log_of(service)).contains("UPDATE"));
    }

    #[tokio::test]
    async fn test_paid_transfer_order_ships() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![transfer_order(
                ShippingStatus::Processing,
                PaymentStatus::Paid,
            )]])
            .append_exec_results([updated(1)]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let shipped = service
            .update_shipping_status(7, ShippingStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.shipping_status, ShippingStatus::Shipped);
    }

    #[tokio::test]
    async fn test_refund_waits_for_cancel_or_return() {
        for shipping in [ShippingStatus::Processing, ShippingStatus::Shipped] {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![transfer_order(shipping, PaymentStatus::Paid)]]);
            let service = OrderService::new(Arc::new(db.into_connection()));

            let result = service
                .update_payment_status(7, PaymentStatus::Refunded)
                .await;
            assert!(
                matches!(result, Err(OrderError::InvalidTransition { field: "payment_status", .. })),
                "refund allowed while {}",
                shipping
            );
        }

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![transfer_order(
                ShippingStatus::Cancelled,
                PaymentStatus::Paid,
            )]])
            .append_exec_results([updated(1)]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let refunded = service
            .update_payment_status(7, PaymentStatus::Refunded)
            .await
            .unwrap();
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn test_transfer_racing_another_payment_reports_already_paid() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![transfer_order(
                ShippingStatus::Processing,
                PaymentStatus::Pending,
            )]])
            .append_exec_results([updated(0)])
            .append_query_results([vec![orders::Model {
                payment_reference: Some("FT2401".to_string()),
                ..transfer_order(ShippingStatus::Processing, PaymentStatus::Paid)
            }]]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let outcome = service.confirm_transfer(7, 250_000, "FT2402").await.unwrap();
        assert_eq!(outcome, PaymentOutcome::AlreadyPaid);
    }

    #[tokio::test]
    async fn test_transfer_racing_a_cancel_reports_not_payable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![transfer_order(
                ShippingStatus::Processing,
                PaymentStatus::Pending,
            )]])
            .append_exec_results([updated(0)])
            .append_query_results([vec![transfer_order(
                ShippingStatus::Cancelled,
                PaymentStatus::Expired,
            )]]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let outcome = service.confirm_transfer(7, 250_000, "FT2403").await.unwrap();
        assert_eq!(outcome, PaymentOutcome::NotPayable);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<orders::Model>::new()]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        assert!(matches!(
            service.get_order(99).await,
            Err(OrderError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_applies_filters() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(3)),
            }]])
            .append_query_results([vec![order(ShippingStatus::Shipped, PaymentStatus::Paid)]]);
        let service = OrderService::new(Arc::new(db.into_connection()));

        let list = service
            .list_orders(OrderFilter {
                shipping_status: Some(ShippingStatus::Shipped),
                search: Some("0912".to_string()),
                limit: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(list.total, 3);
        assert_eq!(list.limit, 100);
        assert_eq!(list.orders.len(), 1);
        assert!(list.orders[0].items.is_empty());

        let log = format!("{:?}", log_of(service));
        assert!(log.contains("LIKE"));
        assert!(log.contains("%0912%"));
    }
}
