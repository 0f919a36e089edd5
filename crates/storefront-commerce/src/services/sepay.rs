use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use super::OrderService;
use crate::types::{OrderError, PaymentOutcome, SepayWebhookPayload, SepayWebhookResponse};

/// Customers put `DH<order id>` in the transfer description
pub const ORDER_REFERENCE_PREFIX: &str = "DH";

/// Finds the order id in free-form bank transfer text
pub struct OrderReferenceParser {
    pattern: Regex,
}

impl OrderReferenceParser {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?i){}(\d{{1,9}})", regex::escape(prefix)))?;
        Ok(Self { pattern })
    }

    /// First `<prefix><digits>` match, e.g. `"CK DH1042 thanh toan"` -> 1042
    pub fn parse(&self, text: &str) -> Option<i32> {
        self.pattern
            .captures_iter(text)
            .find_map(|caps| caps.get(1)?.as_str().parse::<i32>().ok())
            .filter(|id| *id > 0)
    }
}

/// Applies SePay transfer notifications to orders
pub struct SepayService {
    orders: Arc<OrderService>,
    parser: OrderReferenceParser,
    api_key: Option<String>,
}

impl SepayService {
    pub fn new(
        orders: Arc<OrderService>,
        parser: OrderReferenceParser,
        api_key: Option<String>,
    ) -> Self {
        Self {
            orders,
            parser,
            api_key,
        }
    }

    /// SePay sends `Authorization: Apikey <key>`. Without a configured key
    /// every call is refused.
    pub fn verify(&self, authorization: Option<&str>) -> Result<(), OrderError> {
        let Some(expected) = self.api_key.as_deref() else {
            return Err(OrderError::WebhookDisabled);
        };

        let provided = authorization
            .and_then(|value| value.trim().split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("apikey"))
            .map(|(_, key)| key.trim());

        match provided {
            Some(key) if key == expected => Ok(()),
            Some(_) => Err(OrderError::Unauthorized("API key mismatch".to_string())),
            None => Err(OrderError::Unauthorized(
                "missing Apikey authorization".to_string(),
            )),
        }
    }

    pub async fn handle(
        &self,
        payload: SepayWebhookPayload,
    ) -> Result<SepayWebhookResponse, OrderError> {
        if !payload.transfer_type.eq_ignore_ascii_case("in") {
            debug!("Ignoring outgoing SePay transaction {}", payload.id);
            return Ok(ignored());
        }

        let order_id = payload
            .code
            .as_deref()
            .and_then(|code| self.parser.parse(code))
            .or_else(|| self.parser.parse(&payload.content));
        let Some(order_id) = order_id else {
            warn!(
                "SePay transaction {} has no order reference: {:?}",
                payload.id, payload.content
            );
            return Ok(ignored());
        };

        let reference = payload
            .reference_code
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| format!("SEPAY-{}", payload.id));

        let outcome = self
            .orders
            .confirm_transfer(order_id, payload.transfer_amount, &reference)
            .await?;

        Ok(SepayWebhookResponse {
            success: true,
            outcome,
            order_id: Some(order_id),
        })
    }
}

fn ignored() -> SepayWebhookResponse {
    SepayWebhookResponse {
        success: true,
        outcome: PaymentOutcome::Ignored,
        order_id: None,
    }
}
