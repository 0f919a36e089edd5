use crate::types::{requests::*, responses::*, DateRange, DEFAULT_REPORT_LIMIT, MAX_REPORT_LIMIT};
use crate::{Analytics, AnalyticsError};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use storefront_core::error_builder::{bad_request, internal_server_error};
use storefront_core::problemdetails::Problem;
use storefront_core::{clamp_limit, PaginationParams};
use tracing::error;
use utoipa::OpenApi;

pub struct AppState {
    pub analytics_service: Arc<dyn Analytics>,
}

impl From<AnalyticsError> for Problem {
    fn from(error: AnalyticsError) -> Self {
        match error {
            AnalyticsError::InvalidRange(detail) => bad_request()
                .title("Invalid Date Range")
                .detail(detail)
                .build(),
            AnalyticsError::InvalidParameter(detail) => bad_request()
                .title("Invalid Parameter")
                .detail(detail)
                .build(),
            AnalyticsError::DatabaseError(e) => {
                error!("Analytics query failed: {}", e);
                internal_server_error().build()
            }
        }
    }
}

fn query_params<T: DeserializeOwned>(
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, Problem> {
    query.map(|Query(params)| params).map_err(|rejection| {
        bad_request()
            .title("Invalid Query Parameters")
            .detail(rejection.body_text())
            .build()
    })
}

fn report_limit(limit: Option<i64>) -> i64 {
    clamp_limit(limit, DEFAULT_REPORT_LIMIT, MAX_REPORT_LIMIT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_overview,
        get_dashboard,
        get_top_pages,
        get_top_referrers,
        get_devices,
        get_browsers,
        get_operating_systems,
        get_locations,
        get_utm,
        get_events,
        get_page_views_over_time,
        get_metrics,
        list_page_views,
    ),
    components(schemas(
        Overview,
        Dashboard,
        PageStat,
        ReferrerStat,
        BreakdownItem,
        TimelinePoint,
        MetricPoint,
        PageViewRecord,
        PageViewList,
        LocationGranularity,
        UtmField,
        TimeBucket,
        MetricType,
    )),
    tags((name = "Analytics", description = "Traffic reports per website"))
)]
pub struct AnalyticsApiDoc;

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analytics/overview", get(get_overview))
        .route("/analytics/dashboard", get(get_dashboard))
        .route("/analytics/top-pages", get(get_top_pages))
        .route("/analytics/referrers", get(get_top_referrers))
        .route("/analytics/devices", get(get_devices))
        .route("/analytics/browsers", get(get_browsers))
        .route("/analytics/os", get(get_operating_systems))
        .route("/analytics/locations", get(get_locations))
        .route("/analytics/utm", get(get_utm))
        .route("/analytics/events", get(get_events))
        .route(
            "/analytics/page-views-over-time",
            get(get_page_views_over_time),
        )
        .route("/metrics", get(get_metrics))
        .route("/page-views", get(list_page_views))
}

/// Headline numbers for the window
#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/overview",
    params(RangeQuery),
    responses(
        (status = 200, description = "Overview", body = Overview),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_overview(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Overview>, Problem> {
    let query = query_params(query)?;
    let overview = app_state
        .analytics_service
        .get_overview(query.website_id, query.range()?)
        .await?;
    Ok(Json(overview))
}

/// All dashboard widgets in one response
#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_dashboard(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Dashboard>, Problem> {
    let query = query_params(query)?;
    let dashboard = app_state
        .analytics_service
        .get_dashboard(query.website_id, query.range()?)
        .await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/top-pages",
    params(RankedQuery),
    responses(
        (status = 200, description = "Most viewed paths", body = Vec<PageStat>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_top_pages(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<RankedQuery>, QueryRejection>,
) -> Result<Json<Vec<PageStat>>, Problem> {
    let query = query_params(query)?;
    let pages = app_state
        .analytics_service
        .get_top_pages(query.website_id, query.range()?, report_limit(query.limit))
        .await?;
    Ok(Json(pages))
}

#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/referrers",
    params(RankedQuery),
    responses(
        (status = 200, description = "External referrer domains", body = Vec<ReferrerStat>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_top_referrers(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<RankedQuery>, QueryRejection>,
) -> Result<Json<Vec<ReferrerStat>>, Problem> {
    let query = query_params(query)?;
    let referrers = app_state
        .analytics_service
        .get_top_referrers(query.website_id, query.range()?, report_limit(query.limit))
        .await?;
    Ok(Json(referrers))
}

#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/devices",
    params(RangeQuery),
    responses(
        (status = 200, description = "Sessions per device class", body = Vec<BreakdownItem>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_devices(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<BreakdownItem>>, Problem> {
    let query = query_params(query)?;
    let devices = app_state
        .analytics_service
        .get_device_breakdown(query.website_id, query.range()?)
        .await?;
    Ok(Json(devices))
}

#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/browsers",
    params(RankedQuery),
    responses(
        (status = 200, description = "Sessions per browser", body = Vec<BreakdownItem>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_browsers(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<RankedQuery>, QueryRejection>,
) -> Result<Json<Vec<BreakdownItem>>, Problem> {
    let query = query_params(query)?;
    let browsers = app_state
        .analytics_service
        .get_browser_breakdown(query.website_id, query.range()?, report_limit(query.limit))
        .await?;
    Ok(Json(browsers))
}

#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/os",
    params(RankedQuery),
    responses(
        (status = 200, description = "Sessions per operating system", body = Vec<BreakdownItem>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_operating_systems(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<RankedQuery>, QueryRejection>,
) -> Result<Json<Vec<BreakdownItem>>, Problem> {
    let query = query_params(query)?;
    let systems = app_state
        .analytics_service
        .get_os_breakdown(query.website_id, query.range()?, report_limit(query.limit))
        .await?;
    Ok(Json(systems))
}

/// Sessions per country, region or city (country by default)
#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/locations",
    params(LocationsQuery),
    responses(
        (status = 200, description = "Sessions per location", body = Vec<BreakdownItem>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_locations(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<LocationsQuery>, QueryRejection>,
) -> Result<Json<Vec<BreakdownItem>>, Problem> {
    let query = query_params(query)?;
    let range = DateRange::new(*query.start_date, *query.end_date)?;
    let locations = app_state
        .analytics_service
        .get_location_breakdown(
            query.website_id,
            range,
            query.granularity.unwrap_or(LocationGranularity::Country),
            report_limit(query.limit),
        )
        .await?;
    Ok(Json(locations))
}

#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/utm",
    params(UtmQuery),
    responses(
        (status = 200, description = "Page views per campaign value", body = Vec<BreakdownItem>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_utm(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<UtmQuery>, QueryRejection>,
) -> Result<Json<Vec<BreakdownItem>>, Problem> {
    let query = query_params(query)?;
    let range = DateRange::new(*query.start_date, *query.end_date)?;
    let rows = app_state
        .analytics_service
        .get_utm_breakdown(query.website_id, range, query.field, report_limit(query.limit))
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/events",
    params(RankedQuery),
    responses(
        (status = 200, description = "Custom event counts", body = Vec<BreakdownItem>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_events(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<RankedQuery>, QueryRejection>,
) -> Result<Json<Vec<BreakdownItem>>, Problem> {
    let query = query_params(query)?;
    let events = app_state
        .analytics_service
        .get_event_counts(query.website_id, query.range()?, report_limit(query.limit))
        .await?;
    Ok(Json(events))
}

#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/analytics/page-views-over-time",
    params(TimelineQuery),
    responses(
        (status = 200, description = "Zero-filled page view series", body = Vec<TimelinePoint>),
        (status = 400, description = "Invalid parameters or too many buckets", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_page_views_over_time(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<TimelineQuery>, QueryRejection>,
) -> Result<Json<Vec<TimelinePoint>>, Problem> {
    let query = query_params(query)?;
    let range = DateRange::new(*query.start_date, *query.end_date)?;
    let bucket = query.bucket.unwrap_or_else(|| TimeBucket::for_range(&range));
    let points = app_state
        .analytics_service
        .get_page_views_over_time(query.website_id, range, bucket)
        .await?;
    Ok(Json(points))
}

/// Generic `[{x, y}]` ranking for one dimension
#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/metrics",
    params(MetricsQuery),
    responses(
        (status = 200, description = "Ranked values", body = Vec<MetricPoint>),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_metrics(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<MetricsQuery>, QueryRejection>,
) -> Result<Json<Vec<MetricPoint>>, Problem> {
    let query = query_params(query)?;
    let range = DateRange::new(*query.start_date, *query.end_date)?;
    let points = app_state
        .analytics_service
        .get_metrics(
            query.website_id,
            range,
            query.metric_type,
            report_limit(query.limit),
        )
        .await?;
    Ok(Json(points))
}

/// Raw page views, newest first
#[utoipa::path(
    tag = "Analytics",
    get,
    path = "/page-views",
    params(PageViewsQuery),
    responses(
        (status = 200, description = "Page of page views", body = PageViewList),
        (status = 400, description = "Invalid parameters", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn list_page_views(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<PageViewsQuery>, QueryRejection>,
) -> Result<Json<PageViewList>, Problem> {
    let query = query_params(query)?;
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some(DateRange::new(*start, *end)?),
        (None, None) => None,
        _ => {
            return Err(AnalyticsError::InvalidParameter(
                "start_date and end_date must be given together".to_string(),
            )
            .into())
        }
    };

    let (limit, offset) = PaginationParams::new(query.limit, query.offset).normalize();
    let list = app_state
        .analytics_service
        .list_page_views(query.website_id, range, limit, offset)
        .await?;
    Ok(Json(list))
}
