use chrono::TimeDelta;
use serde::Deserialize;
use storefront_core::{DateTime, EndDateTime};
use utoipa::{IntoParams, ToSchema};

use super::{AnalyticsError, DateRange};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationGranularity {
    Country,
    Region,
    City,
}

impl LocationGranularity {
    pub(crate) fn column(self) -> &'static str {
        match self {
            LocationGranularity::Country => "country",
            LocationGranularity::Region => "region",
            LocationGranularity::City => "city",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UtmField {
    Source,
    Medium,
    Campaign,
    Content,
    Term,
}

impl UtmField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            UtmField::Source => "utm_source",
            UtmField::Medium => "utm_medium",
            UtmField::Campaign => "utm_campaign",
            UtmField::Content => "utm_content",
            UtmField::Term => "utm_term",
        }
    }
}

/// Timeline granularity
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Hour,
    Day,
}

impl TimeBucket {
    /// Hourly for windows up to two days, daily beyond that
    pub fn for_range(range: &DateRange) -> Self {
        if range.span() <= TimeDelta::hours(48) {
            TimeBucket::Hour
        } else {
            TimeBucket::Day
        }
    }

    pub(crate) fn unit(self) -> &'static str {
        match self {
            TimeBucket::Hour => "hour",
            TimeBucket::Day => "day",
        }
    }

    pub(crate) fn step(self) -> TimeDelta {
        match self {
            TimeBucket::Hour => TimeDelta::hours(1),
            TimeBucket::Day => TimeDelta::days(1),
        }
    }
}

/// Dimension reported by `GET /metrics`
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Url,
    Referrer,
    Browser,
    Os,
    Device,
    Country,
    Event,
    UtmSource,
    UtmMedium,
    UtmCampaign,
}

impl MetricType {
    /// Table and column the dimension is grouped on
    pub(crate) fn source(self) -> (&'static str, &'static str) {
        match self {
            MetricType::Url => ("page_views", "url_path"),
            MetricType::Referrer => ("page_views", "referrer_domain"),
            MetricType::Browser => ("user_sessions", "browser"),
            MetricType::Os => ("user_sessions", "os"),
            MetricType::Device => ("user_sessions", "device"),
            MetricType::Country => ("user_sessions", "country"),
            MetricType::Event => ("events", "event_name"),
            MetricType::UtmSource => ("page_views", "utm_source"),
            MetricType::UtmMedium => ("page_views", "utm_medium"),
            MetricType::UtmCampaign => ("page_views", "utm_campaign"),
        }
    }
}

/// Website and date window shared by every report
#[derive(Debug, Deserialize, Clone, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    pub website_id: i32,
    /// Accepts RFC 3339 or YYYY-MM-DD; a bare end date includes that whole day
    #[param(value_type = String)]
    pub start_date: DateTime,
    #[param(value_type = String)]
    pub end_date: EndDateTime,
}

impl RangeQuery {
    pub fn range(&self) -> Result<DateRange, AnalyticsError> {
        DateRange::new(*self.start_date, *self.end_date)
    }
}

#[derive(Debug, Deserialize, Clone, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RankedQuery {
    pub website_id: i32,
    #[param(value_type = String)]
    pub start_date: DateTime,
    #[param(value_type = String)]
    pub end_date: EndDateTime,
    /// Defaults to 10, capped at 100
    pub limit: Option<i64>,
}

impl RankedQuery {
    pub fn range(&self) -> Result<DateRange, AnalyticsError> {
        DateRange::new(*self.start_date, *self.end_date)
    }
}

#[derive(Debug, Deserialize, Clone, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationsQuery {
    pub website_id: i32,
    #[param(value_type = String)]
    pub start_date: DateTime,
    #[param(value_type = String)]
    pub end_date: EndDateTime,
    pub granularity: Option<LocationGranularity>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Clone, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UtmQuery {
    pub website_id: i32,
    #[param(value_type = String)]
    pub start_date: DateTime,
    #[param(value_type = String)]
    pub end_date: EndDateTime,
    pub field: UtmField,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Clone, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimelineQuery {
    pub website_id: i32,
    #[param(value_type = String)]
    pub start_date: DateTime,
    #[param(value_type = String)]
    pub end_date: EndDateTime,
    /// Chosen from the window length when omitted
    pub bucket: Option<TimeBucket>,
}

#[derive(Debug, Deserialize, Clone, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MetricsQuery {
    pub website_id: i32,
    #[param(value_type = String)]
    pub start_date: DateTime,
    #[param(value_type = String)]
    pub end_date: EndDateTime,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Clone, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageViewsQuery {
    pub website_id: i32,
    #[param(value_type = Option<String>)]
    pub start_date: Option<DateTime>,
    #[param(value_type = Option<String>)]
    pub end_date: Option<EndDateTime>,
    /// Defaults to 50, capped at 100
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_bucket_follows_window_length() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let two_days = DateRange::new(start, start + TimeDelta::hours(48)).unwrap();
        let week = DateRange::new(start, start + TimeDelta::days(7)).unwrap();

        assert_eq!(TimeBucket::for_range(&two_days), TimeBucket::Hour);
        assert_eq!(TimeBucket::for_range(&week), TimeBucket::Day);
    }

    #[test]
    fn test_metrics_query_reads_type_parameter() {
        let query: MetricsQuery = serde_json::from_value(serde_json::json!({
            "website_id": 3,
            "start_date": "2024-05-01",
            "end_date": "2024-05-07T23:59:59Z",
            "type": "utm_source",
        }))
        .unwrap();

        assert_eq!(query.metric_type, MetricType::UtmSource);
        assert_eq!(query.metric_type.source(), ("page_views", "utm_source"));
        assert_eq!(query.limit, None);
    }

    #[test]
    fn test_single_day_range_includes_that_day() {
        let query: RangeQuery = serde_json::from_value(serde_json::json!({
            "website_id": 3,
            "start_date": "2024-05-07",
            "end_date": "2024-05-07",
        }))
        .unwrap();

        let range = query.range().unwrap();
        let view = Utc.with_ymd_and_hms(2024, 5, 7, 10, 0, 0).unwrap();
        assert!(range.start <= view && view <= range.end);
        assert_eq!(range.end.date_naive(), range.start.date_naive());
        assert_eq!(TimeBucket::for_range(&range), TimeBucket::Hour);
    }
}
