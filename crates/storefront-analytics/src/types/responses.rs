use serde::{Deserialize, Serialize};
use storefront_core::UtcDateTime;
use storefront_entities::page_views;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Overview {
    pub page_views: i64,
    pub sessions: i64,
    pub visitors: i64,
    pub events: i64,
    /// Percentage of sessions with a single page view
    pub bounce_rate: f64,
    pub views_per_session: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageStat {
    pub path: String,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferrerStat {
    pub domain: String,
    pub views: i64,
}

/// One row of a device/browser/os/location/utm/event breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BreakdownItem {
    pub name: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelinePoint {
    #[schema(value_type = String, format = DateTime)]
    pub bucket: UtcDateTime,
    pub page_views: i64,
    pub sessions: i64,
}

/// `GET /metrics` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricPoint {
    pub x: String,
    pub y: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageViewRecord {
    pub id: i64,
    pub session_id: i64,
    pub url_path: String,
    pub url_query: Option<String>,
    pub page_title: Option<String>,
    pub referrer_domain: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
}

impl From<page_views::Model> for PageViewRecord {
    fn from(view: page_views::Model) -> Self {
        Self {
            id: view.id,
            session_id: view.session_id,
            url_path: view.url_path,
            url_query: view.url_query,
            page_title: view.page_title,
            referrer_domain: view.referrer_domain,
            utm_source: view.utm_source,
            utm_medium: view.utm_medium,
            utm_campaign: view.utm_campaign,
            created_at: view.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageViewList {
    pub items: Vec<PageViewRecord>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Everything the dashboard home renders, fetched in one round
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dashboard {
    pub overview: Overview,
    pub top_pages: Vec<PageStat>,
    pub top_referrers: Vec<ReferrerStat>,
    pub devices: Vec<BreakdownItem>,
    pub browsers: Vec<BreakdownItem>,
    pub countries: Vec<BreakdownItem>,
    pub timeline: Vec<TimelinePoint>,
}
