use async_trait::async_trait;

use crate::types::requests::{LocationGranularity, MetricType, TimeBucket, UtmField};
use crate::types::responses::{
    BreakdownItem, Dashboard, MetricPoint, Overview, PageStat, PageViewList, ReferrerStat,
    TimelinePoint,
};
use crate::types::{AnalyticsError, DateRange};

/// Read-only reports over one website's tracking data.
///
/// Ranked reports clamp `limit` to `1..=MAX_REPORT_LIMIT`.
#[async_trait]
pub trait Analytics: Send + Sync {
    async fn get_overview(
        &self,
        website_id: i32,
        range: DateRange,
    ) -> Result<Overview, AnalyticsError>;

    async fn get_top_pages(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<PageStat>, AnalyticsError>;

    /// Self-referrals and direct visits (null domain) are excluded
    async fn get_top_referrers(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<ReferrerStat>, AnalyticsError>;

    /// Summed from the daily device counters
    async fn get_device_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError>;

    async fn get_browser_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError>;

    async fn get_os_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError>;

    async fn get_location_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
        granularity: LocationGranularity,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError>;

    async fn get_utm_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
        field: UtmField,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError>;

    async fn get_event_counts(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError>;

    /// Zero-filled series, one point per bucket in the range
    async fn get_page_views_over_time(
        &self,
        website_id: i32,
        range: DateRange,
        bucket: TimeBucket,
    ) -> Result<Vec<TimelinePoint>, AnalyticsError>;

    async fn get_metrics(
        &self,
        website_id: i32,
        range: DateRange,
        metric_type: MetricType,
        limit: i64,
    ) -> Result<Vec<MetricPoint>, AnalyticsError>;

    async fn list_page_views(
        &self,
        website_id: i32,
        range: Option<DateRange>,
        limit: u64,
        offset: u64,
    ) -> Result<PageViewList, AnalyticsError>;

    /// Fails as a whole if any of the underlying reports fails
    async fn get_dashboard(
        &self,
        website_id: i32,
        range: DateRange,
    ) -> Result<Dashboard, AnalyticsError>;
}
