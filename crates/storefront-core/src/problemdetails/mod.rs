use std::collections::BTreeMap;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// RFC 7807 problem body, as documented in the OpenAPI schema
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "type": "https://storefront.dev/probs/conflict",
    "title": "Invalid Order Transition",
    "detail": "Cannot ship an order that is CANCELLED",
    "instance": "/error/conflict",
    "error_code": "CONFLICT"
}))]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_url: Option<String>,
    /// A short, human-readable summary of the problem type
    pub title: String,
    /// A human-readable explanation specific to this occurrence of the problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// A URI reference that identifies the specific occurrence of the problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Additional properties of the problem
    #[schema(additional_properties = true)]
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A problem response on its way to the client.
#[derive(Debug, Clone)]
pub struct Problem {
    pub status_code: StatusCode,
    pub body: BTreeMap<String, Value>,
}

/// Create an empty `Problem` for the given status.
pub fn new<S>(status_code: S) -> Problem
where
    S: Into<StatusCode>,
{
    Problem {
        status_code: status_code.into(),
        body: BTreeMap::new(),
    }
}

impl Problem {
    pub fn with_type<S: Into<String>>(self, value: S) -> Self {
        self.with_text("type", value.into())
    }

    pub fn with_title<S: Into<String>>(self, value: S) -> Self {
        self.with_text("title", value.into())
    }

    pub fn with_detail<S: Into<String>>(self, value: S) -> Self {
        self.with_text("detail", value.into())
    }

    pub fn with_instance<S: Into<String>>(self, value: S) -> Self {
        self.with_text("instance", value.into())
    }

    /// Insert an arbitrary member into the problem body.
    pub fn with_value<V>(mut self, key: &str, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.body.insert(key.to_owned(), value.into());
        self
    }

    // Empty standard members are omitted rather than sent as ""
    fn with_text(self, key: &str, value: String) -> Self {
        if value.is_empty() {
            self
        } else {
            self.with_value(key, value)
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.body.get("title").and_then(Value::as_str)
    }

    pub fn detail(&self) -> Option<&str> {
        self.body.get("detail").and_then(Value::as_str)
    }
}

impl<S> From<S> for Problem
where
    S: Into<StatusCode>,
{
    fn from(status_code: S) -> Self {
        new(status_code.into())
    }
}

/// Result type where the error is always a `Problem`.
pub type Result<T> = std::result::Result<T, Problem>;

impl IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        if self.body.is_empty() {
            return self.status_code.into_response();
        }

        let mut response = (self.status_code, Json(self.body)).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
