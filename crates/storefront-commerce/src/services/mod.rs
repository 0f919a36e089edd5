mod order_service;
mod sepay;

pub use order_service::OrderService;
pub use sepay::{OrderReferenceParser, SepayService, ORDER_REFERENCE_PREFIX};
