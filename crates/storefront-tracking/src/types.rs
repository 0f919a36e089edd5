use serde::{Deserialize, Serialize};
use storefront_core::{GeoHeaders, RequestMetadata, UtcDateTime};
use thiserror::Error;
use utoipa::ToSchema;

pub const MAX_EVENT_NAME_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Website {0} not found")]
    WebsiteNotFound(i32),
    #[error("Invalid payload: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum WebsiteError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Website {0} not found")]
    NotFound(i32),
    #[error("Invalid website: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Pageview,
    Event,
}

/// Body of `POST /track`, sent by the storefront tracker script
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackRequest {
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub website_id: i32,
    /// Page URL, absolute or site-relative
    #[schema(example = "https://shop.example.com/products/42?utm_source=facebook")]
    pub url: String,
    pub referrer: Option<String>,
    pub title: Option<String>,
    /// Required when `type` is `event`
    pub event_name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub event_data: Option<serde_json::Value>,
    /// Identifier of a logged-in customer, mixed into the session hash
    pub distinct_id: Option<String>,
    pub language: Option<String>,
    #[schema(example = "1920x1080")]
    pub screen: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackResponse {
    /// Deterministic visitor hash of the session the hit was attributed to
    pub session_id: String,
    pub new_session: bool,
}

/// Everything known about the caller that is not part of the payload
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
    pub geo: GeoHeaders,
    pub language: Option<String>,
    pub screen: Option<String>,
}

impl ClientInfo {
    pub fn from_request(metadata: RequestMetadata, payload: &TrackRequest) -> Self {
        Self {
            ip_address: metadata.ip_address,
            user_agent: metadata.user_agent,
            geo: metadata.geo,
            language: payload.language.clone(),
            screen: payload.screen.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWebsiteRequest {
    #[schema(example = "Main storefront")]
    pub name: String,
    #[schema(example = "shop.example.com")]
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebsiteResponse {
    pub id: i32,
    pub name: String,
    pub domain: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
}

impl From<storefront_entities::websites::Model> for WebsiteResponse {
    fn from(model: storefront_entities::websites::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            domain: model.domain,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}
