use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseBackend, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement, Value,
};
use storefront_core::UtcDateTime;
use storefront_entities::page_views;
use tracing::debug;

use crate::traits::Analytics;
use crate::types::requests::{LocationGranularity, MetricType, TimeBucket, UtmField};
use crate::types::responses::{
    BreakdownItem, Dashboard, MetricPoint, Overview, PageStat, PageViewList, PageViewRecord,
    ReferrerStat, TimelinePoint,
};
use crate::types::{
    AnalyticsError, DateRange, DEFAULT_REPORT_LIMIT, MAX_REPORT_LIMIT, MAX_TIMELINE_BUCKETS,
};

/// Positional `$n` parameters for a raw Postgres statement
#[derive(Default)]
struct SqlParams {
    values: Vec<Value>,
}

impl SqlParams {
    fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    fn into_statement(self, sql: &str) -> Statement {
        Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, self.values)
    }
}

/// Placeholders for the website and date window, bound once and reusable
/// across subqueries.
struct Scope {
    website_id: String,
    start: String,
    end: String,
}

impl Scope {
    fn bind(params: &mut SqlParams, website_id: i32, range: &DateRange) -> Self {
        Self {
            website_id: params.bind(website_id),
            start: params.bind(range.start),
            end: params.bind(range.end),
        }
    }

    fn clause(&self, alias: &str) -> String {
        format!(
            "{alias}.website_id = {} AND {alias}.created_at >= {} AND {alias}.created_at <= {}",
            self.website_id, self.start, self.end
        )
    }
}

#[derive(Debug, FromQueryResult)]
struct OverviewRow {
    page_views: i64,
    sessions: i64,
    visitors: i64,
    bounces: i64,
    events: i64,
}

impl From<OverviewRow> for Overview {
    fn from(row: OverviewRow) -> Self {
        let (bounce_rate, views_per_session) = if row.sessions > 0 {
            (
                round2(row.bounces as f64 * 100.0 / row.sessions as f64),
                round2(row.page_views as f64 / row.sessions as f64),
            )
        } else {
            (0.0, 0.0)
        };

        Overview {
            page_views: row.page_views,
            sessions: row.sessions,
            visitors: row.visitors,
            events: row.events,
            bounce_rate,
            views_per_session,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    x: String,
    y: i64,
}

#[derive(Debug, FromQueryResult)]
struct BreakdownRow {
    name: String,
    count: i64,
    percentage: f64,
}

impl From<BreakdownRow> for BreakdownItem {
    fn from(row: BreakdownRow) -> Self {
        BreakdownItem {
            name: row.name,
            count: row.count,
            percentage: row.percentage,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct DeviceRow {
    name: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct TimelineRow {
    bucket: UtcDateTime,
    page_views: i64,
    sessions: i64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn clamp_report_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_REPORT_LIMIT)
}

/// Share of each row in the total, rounded to two decimals
fn with_percentages(rows: Vec<DeviceRow>) -> Vec<BreakdownItem> {
    let total: i64 = rows.iter().map(|r| r.count).sum();
    rows.into_iter()
        .map(|r| BreakdownItem {
            percentage: if total > 0 {
                round2(r.count as f64 * 100.0 / total as f64)
            } else {
                0.0
            },
            name: r.name,
            count: r.count,
        })
        .collect()
}

pub struct AnalyticsService {
    db: Arc<DatabaseConnection>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        AnalyticsService { db }
    }

    /// `column -> COUNT(*)` over one tracking table, nulls dropped.
    /// `table` and `column` only ever come from the closed enums above.
    async fn count_by(
        &self,
        table: &'static str,
        column: &'static str,
        website_id: i32,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<CountRow>, AnalyticsError> {
        let mut params = SqlParams::default();
        let scope = Scope::bind(&mut params, website_id, range);
        let limit = params.bind(clamp_report_limit(limit));

        let sql = format!(
            r#"
            SELECT t.{column} AS x, COUNT(*) AS y
            FROM {table} t
            WHERE {scope} AND t.{column} IS NOT NULL
            GROUP BY t.{column}
            ORDER BY y DESC, x ASC
            LIMIT {limit}
            "#,
            scope = scope.clause("t"),
        );

        Ok(CountRow::find_by_statement(params.into_statement(&sql))
            .all(self.db.as_ref())
            .await?)
    }

    /// Like `count_by` but with each row's share of the whole window.
    /// Missing values are grouped as `Unknown` unless `skip_null` is set.
    async fn breakdown_by(
        &self,
        table: &'static str,
        column: &'static str,
        skip_null: bool,
        website_id: i32,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError> {
        let mut params = SqlParams::default();
        let scope = Scope::bind(&mut params, website_id, range);
        let limit = params.bind(clamp_report_limit(limit));
        let null_filter = if skip_null {
            format!(" AND t.{column} IS NOT NULL")
        } else {
            String::new()
        };

        let sql = format!(
            r#"
            SELECT
                COALESCE(t.{column}, 'Unknown') AS name,
                COUNT(*) AS count,
                ROUND(COUNT(*) * 100.0 / SUM(COUNT(*)) OVER (), 2)::float8 AS percentage
            FROM {table} t
            WHERE {scope}{null_filter}
            GROUP BY COALESCE(t.{column}, 'Unknown')
            ORDER BY count DESC, name ASC
            LIMIT {limit}
            "#,
            scope = scope.clause("t"),
        );

        let rows = BreakdownRow::find_by_statement(params.into_statement(&sql))
            .all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().map(BreakdownItem::from).collect())
    }
}

#[async_trait]
impl Analytics for AnalyticsService {
    async fn get_overview(
        &self,
        website_id: i32,
        range: DateRange,
    ) -> Result<Overview, AnalyticsError> {
        let mut params = SqlParams::default();
        let scope = Scope::bind(&mut params, website_id, &range);

        // Sessions count only if they produced a page view in the window
        let sql = format!(
            r#"
            WITH views AS (
                SELECT pv.session_id, COUNT(*) AS views
                FROM page_views pv
                WHERE {pv_scope}
                GROUP BY pv.session_id
            )
            SELECT
                COALESCE(SUM(v.views), 0)::BIGINT AS page_views,
                COUNT(*) AS sessions,
                COUNT(DISTINCT COALESCE(s.distinct_id, s.session_id)) AS visitors,
                COUNT(*) FILTER (WHERE v.views = 1) AS bounces,
                (SELECT COUNT(*) FROM events e WHERE {e_scope}) AS events
            FROM views v
            JOIN user_sessions s ON s.id = v.session_id
            "#,
            pv_scope = scope.clause("pv"),
            e_scope = scope.clause("e"),
        );

        let row = OverviewRow::find_by_statement(params.into_statement(&sql))
            .one(self.db.as_ref())
            .await?;

        Ok(row.map(Overview::from).unwrap_or(Overview {
            page_views: 0,
            sessions: 0,
            visitors: 0,
            events: 0,
            bounce_rate: 0.0,
            views_per_session: 0.0,
        }))
    }

    async fn get_top_pages(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<PageStat>, AnalyticsError> {
        let (table, column) = MetricType::Url.source();
        let rows = self
            .count_by(table, column, website_id, &range, limit)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| PageStat {
                path: r.x,
                views: r.y,
            })
            .collect())
    }

    async fn get_top_referrers(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<ReferrerStat>, AnalyticsError> {
        let (table, column) = MetricType::Referrer.source();
        let rows = self
            .count_by(table, column, website_id, &range, limit)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| ReferrerStat {
                domain: r.x,
                views: r.y,
            })
            .collect())
    }

    async fn get_device_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError> {
        let mut params = SqlParams::default();
        let website = params.bind(website_id);
        let start = params.bind(range.start.date_naive());
        let end = params.bind(range.end.date_naive());

        let sql = format!(
            r#"
            SELECT d.device AS name, SUM(d.count)::BIGINT AS count
            FROM device_info d
            WHERE d.website_id = {website} AND d.date >= {start} AND d.date <= {end}
            GROUP BY d.device
            ORDER BY count DESC, name ASC
            "#
        );

        let rows = DeviceRow::find_by_statement(params.into_statement(&sql))
            .all(self.db.as_ref())
            .await?;
        Ok(with_percentages(rows))
    }

    async fn get_browser_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError> {
        self.breakdown_by("user_sessions", "browser", false, website_id, &range, limit)
            .await
    }

    async fn get_os_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError> {
        self.breakdown_by("user_sessions", "os", false, website_id, &range, limit)
            .await
    }

    async fn get_location_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
        granularity: LocationGranularity,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError> {
        self.breakdown_by(
            "user_sessions",
            granularity.column(),
            false,
            website_id,
            &range,
            limit,
        )
        .await
    }

    async fn get_utm_breakdown(
        &self,
        website_id: i32,
        range: DateRange,
        field: UtmField,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError> {
        self.breakdown_by("page_views", field.column(), true, website_id, &range, limit)
            .await
    }

    async fn get_event_counts(
        &self,
        website_id: i32,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<BreakdownItem>, AnalyticsError> {
        self.breakdown_by("events", "event_name", true, website_id, &range, limit)
            .await
    }

    async fn get_page_views_over_time(
        &self,
        website_id: i32,
        range: DateRange,
        bucket: TimeBucket,
    ) -> Result<Vec<TimelinePoint>, AnalyticsError> {
        let step_seconds = bucket.step().num_seconds();
        let buckets = range.span().num_seconds() / step_seconds + 1;
        if buckets > MAX_TIMELINE_BUCKETS {
            return Err(AnalyticsError::InvalidRange(format!(
                "{} {} buckets requested, at most {} allowed",
                buckets,
                bucket.unit(),
                MAX_TIMELINE_BUCKETS
            )));
        }

        let mut params = SqlParams::default();
        let scope = Scope::bind(&mut params, website_id, &range);
        let unit = bucket.unit();

        let sql = format!(
            r#"
            WITH buckets AS (
                SELECT generate_series(
                    date_trunc('{unit}', {start}::timestamptz, 'UTC'),
                    date_trunc('{unit}', {end}::timestamptz, 'UTC'),
                    interval '1 {unit}'
                ) AS bucket
            ),
            counts AS (
                SELECT
                    date_trunc('{unit}', pv.created_at, 'UTC') AS bucket,
                    COUNT(*) AS page_views,
                    COUNT(DISTINCT pv.session_id) AS sessions
                FROM page_views pv
                WHERE {scope}
                GROUP BY 1
            )
            SELECT
                b.bucket,
                COALESCE(c.page_views, 0) AS page_views,
                COALESCE(c.sessions, 0) AS sessions
            FROM buckets b
            LEFT JOIN counts c ON c.bucket = b.bucket
            ORDER BY b.bucket
            "#,
            start = scope.start,
            end = scope.end,
            scope = scope.clause("pv"),
        );

        let rows = TimelineRow::find_by_statement(params.into_statement(&sql))
            .all(self.db.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| TimelinePoint {
                bucket: r.bucket,
                page_views: r.page_views,
                sessions: r.sessions,
            })
            .collect())
    }

    async fn get_metrics(
        &self,
        website_id: i32,
        range: DateRange,
        metric_type: MetricType,
        limit: i64,
    ) -> Result<Vec<MetricPoint>, AnalyticsError> {
        let (table, column) = metric_type.source();
        let rows = self
            .count_by(table, column, website_id, &range, limit)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| MetricPoint { x: r.x, y: r.y })
            .collect())
    }

    async fn list_page_views(
        &self,
        website_id: i32,
        range: Option<DateRange>,
        limit: u64,
        offset: u64,
    ) -> Result<PageViewList, AnalyticsError> {
        let mut query =
            page_views::Entity::find().filter(page_views::Column::WebsiteId.eq(website_id));
        if let Some(range) = range {
            query = query
                .filter(page_views::Column::CreatedAt.gte(range.start))
                .filter(page_views::Column::CreatedAt.lte(range.end));
        }

        let total = query.clone().count(self.db.as_ref()).await?;
        let items = query
            .order_by_desc(page_views::Column::CreatedAt)
            .order_by_desc(page_views::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?;

        Ok(PageViewList {
            items: items.into_iter().map(PageViewRecord::from).collect(),
            total,
            limit,
            offset,
        })
    }

    async fn get_dashboard(
        &self,
        website_id: i32,
        range: DateRange,
    ) -> Result<Dashboard, AnalyticsError> {
        let bucket = TimeBucket::for_range(&range);
        debug!(
            "Building dashboard for website {} ({:?} buckets)",
            website_id, bucket
        );

        let (overview, top_pages, top_referrers, devices, browsers, countries, timeline) = tokio::try_join!(
            self.get_overview(website_id, range),
            self.get_top_pages(website_id, range, DEFAULT_REPORT_LIMIT),
            self.get_top_referrers(website_id, range, DEFAULT_REPORT_LIMIT),
            self.get_device_breakdown(website_id, range),
            self.get_browser_breakdown(website_id, range, DEFAULT_REPORT_LIMIT),
            self.get_location_breakdown(
                website_id,
                range,
                LocationGranularity::Country,
                DEFAULT_REPORT_LIMIT
            ),
            self.get_page_views_over_time(website_id, range, bucket),
        )?;

        Ok(Dashboard {
            overview,
            top_pages,
            top_referrers,
            devices,
            browsers,
            countries,
            timeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use sea_orm::{MockDatabase, Transaction};
    use std::collections::BTreeMap;

    fn week() -> DateRange {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        DateRange::new(start, start + TimeDelta::days(7)).unwrap()
    }

    fn service(db: MockDatabase) -> AnalyticsService {
        AnalyticsService::new(Arc::new(db.into_connection()))
    }

    fn transaction_log(service: AnalyticsService) -> Vec<Transaction> {
        let Ok(db) = Arc::try_unwrap(service.db) else {
            panic!("connection still shared");
        };
        db.into_transaction_log()
    }

    fn empty() -> Vec<BTreeMap<&'static str, Value>> {
        Vec::new()
    }

    #[tokio::test]
    async fn test_overview_derives_rates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            maplit::btreemap! {
                "page_views" => Value::from(30i64),
                "sessions" => Value::from(8i64),
                "visitors" => Value::from(6i64),
                "bounces" => Value::from(3i64),
                "events" => Value::from(11i64),
            },
        ]]);

        let overview = service(db).get_overview(1, week()).await.unwrap();

        assert_eq!(overview.page_views, 30);
        assert_eq!(overview.visitors, 6);
        assert_eq!(overview.events, 11);
        assert_eq!(overview.bounce_rate, 37.5);
        assert_eq!(overview.views_per_session, 3.75);
    }

    #[tokio::test]
    async fn test_overview_without_sessions_has_zero_rates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            maplit::btreemap! {
                "page_views" => Value::from(0i64),
                "sessions" => Value::from(0i64),
                "visitors" => Value::from(0i64),
                "bounces" => Value::from(0i64),
                "events" => Value::from(2i64),
            },
        ]]);

        let overview = service(db).get_overview(1, week()).await.unwrap();

        assert_eq!(overview.sessions, 0);
        assert_eq!(overview.events, 2);
        assert_eq!(overview.bounce_rate, 0.0);
        assert_eq!(overview.views_per_session, 0.0);
    }

    #[tokio::test]
    async fn test_top_pages_clamps_limit() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            maplit::btreemap! { "x" => Value::from("/"), "y" => Value::from(42i64) },
            maplit::btreemap! { "x" => Value::from("/products"), "y" => Value::from(17i64) },
        ]]);
        let service = service(db);

        let pages = service.get_top_pages(7, week(), 5000).await.unwrap();

        assert_eq!(
            pages,
            vec![
                PageStat {
                    path: "/".to_string(),
                    views: 42
                },
                PageStat {
                    path: "/products".to_string(),
                    views: 17
                },
            ]
        );

        let log = format!("{:?}", transaction_log(service));
        assert!(log.contains("FROM page_views t"));
        assert!(log.contains("GROUP BY t.url_path"));
        assert!(log.contains("LIMIT $4"));
        assert!(log.contains("BigInt(Some(100))"));
    }

    #[tokio::test]
    async fn test_metrics_use_dimension_source() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            maplit::btreemap! { "x" => Value::from("add_to_cart"), "y" => Value::from(9i64) },
        ]]);
        let service = service(db);

        let points = service
            .get_metrics(1, week(), MetricType::Event, 10)
            .await
            .unwrap();

        assert_eq!(
            points,
            vec![MetricPoint {
                x: "add_to_cart".to_string(),
                y: 9
            }]
        );
        let log = format!("{:?}", transaction_log(service));
        assert!(log.contains("FROM events t"));
        assert!(log.contains("t.event_name IS NOT NULL"));
    }

    #[tokio::test]
    async fn test_device_breakdown_sums_counters() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            maplit::btreemap! { "name" => Value::from("Mobile"), "count" => Value::from(6i64) },
            maplit::btreemap! { "name" => Value::from("Desktop"), "count" => Value::from(3i64) },
            maplit::btreemap! { "name" => Value::from("Tablet"), "count" => Value::from(1i64) },
        ]]);
        let service = service(db);

        let devices = service.get_device_breakdown(1, week()).await.unwrap();

        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].name, "Mobile");
        assert_eq!(devices[0].percentage, 60.0);
        assert_eq!(devices[1].percentage, 30.0);
        assert_eq!(devices[2].percentage, 10.0);

        let log = format!("{:?}", transaction_log(service));
        assert!(log.contains("FROM device_info d"));
        assert!(log.contains("SUM(d.count)"));
    }

    #[tokio::test]
    async fn test_location_breakdown_groups_unknown() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            maplit::btreemap! {
                "name" => Value::from("Hanoi"),
                "count" => Value::from(4i64),
                "percentage" => Value::from(80.0f64),
            },
            maplit::btreemap! {
                "name" => Value::from("Unknown"),
                "count" => Value::from(1i64),
                "percentage" => Value::from(20.0f64),
            },
        ]]);
        let service = service(db);

        let cities = service
            .get_location_breakdown(1, week(), LocationGranularity::City, 10)
            .await
            .unwrap();

        assert_eq!(cities[1].name, "Unknown");
        let log = format!("{:?}", transaction_log(service));
        assert!(log.contains("COALESCE(t.city, 'Unknown')"));
        assert!(!log.contains("t.city IS NOT NULL"));
    }

    #[tokio::test]
    async fn test_utm_breakdown_skips_untagged_views() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([empty()]);
        let service = service(db);

        let rows = service
            .get_utm_breakdown(1, week(), UtmField::Campaign, 10)
            .await
            .unwrap();

        assert!(rows.is_empty());
        let log = format!("{:?}", transaction_log(service));
        assert!(log.contains("t.utm_campaign IS NOT NULL"));
    }

    #[tokio::test]
    async fn test_timeline_rejects_too_many_buckets() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let range = DateRange::new(start, start + TimeDelta::days(365)).unwrap();
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .get_page_views_over_time(1, range, TimeBucket::Hour)
            .await;

        assert!(matches!(result, Err(AnalyticsError::InvalidRange(_))));
        assert!(transaction_log(service).is_empty());
    }

    #[tokio::test]
    async fn test_timeline_maps_buckets() {
        let day = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            maplit::btreemap! {
                "bucket" => Value::from(day),
                "page_views" => Value::from(12i64),
                "sessions" => Value::from(4i64),
            },
            maplit::btreemap! {
                "bucket" => Value::from(day + TimeDelta::days(1)),
                "page_views" => Value::from(0i64),
                "sessions" => Value::from(0i64),
            },
        ]]);
        let service = service(db);

        let points = service
            .get_page_views_over_time(1, week(), TimeBucket::Day)
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].bucket, day);
        assert_eq!(points[0].page_views, 12);
        assert_eq!(points[1].sessions, 0);

        let log = format!("{:?}", transaction_log(service));
        assert!(log.contains("generate_series"));
        assert!(log.contains("interval '1 day'"));
    }

    #[tokio::test]
    async fn test_list_page_views_pages_results() {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 2, 8, 30, 0).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "num_items" => Value::BigInt(Some(41)),
            }]])
            .append_query_results([vec![page_views::Model {
                id: 90,
                session_id: 12,
                website_id: 1,
                url_path: "/checkout".to_string(),
                url_query: None,
                page_title: Some("Checkout".to_string()),
                referrer_path: None,
                referrer_query: None,
                referrer_domain: Some("google.com".to_string()),
                utm_source: None,
                utm_medium: None,
                utm_campaign: None,
                utm_content: None,
                utm_term: None,
                created_at,
            }]]);

        let list = service(db)
            .list_page_views(1, Some(week()), 20, 40)
            .await
            .unwrap();

        assert_eq!(list.total, 41);
        assert_eq!(list.limit, 20);
        assert_eq!(list.offset, 40);
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].url_path, "/checkout");
        assert_eq!(list.items[0].referrer_domain.as_deref(), Some("google.com"));
    }

    #[tokio::test]
    async fn test_dashboard_combines_reports() {
        let day = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "page_views" => Value::from(4i64),
                "sessions" => Value::from(2i64),
                "visitors" => Value::from(2i64),
                "bounces" => Value::from(1i64),
                "events" => Value::from(0i64),
            }]])
            .append_query_results([vec![
                maplit::btreemap! { "x" => Value::from("/"), "y" => Value::from(4i64) },
            ]])
            .append_query_results([empty()])
            .append_query_results([vec![
                maplit::btreemap! { "name" => Value::from("Desktop"), "count" => Value::from(2i64) },
            ]])
            .append_query_results([vec![maplit::btreemap! {
                "name" => Value::from("Firefox"),
                "count" => Value::from(2i64),
                "percentage" => Value::from(100.0f64),
            }]])
            .append_query_results([empty()])
            .append_query_results([vec![maplit::btreemap! {
                "bucket" => Value::from(day),
                "page_views" => Value::from(4i64),
                "sessions" => Value::from(2i64),
            }]]);

        let dashboard = service(db).get_dashboard(1, week()).await.unwrap();

        assert_eq!(dashboard.overview.bounce_rate, 50.0);
        assert_eq!(dashboard.top_pages[0].path, "/");
        assert!(dashboard.top_referrers.is_empty());
        assert_eq!(dashboard.devices[0].percentage, 100.0);
        assert_eq!(dashboard.browsers[0].name, "Firefox");
        assert!(dashboard.countries.is_empty());
        assert_eq!(dashboard.timeline.len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_fails_when_any_report_fails() {
        // Only the overview has a result; the second report hits an empty mock
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            maplit::btreemap! {
                "page_views" => Value::from(0i64),
                "sessions" => Value::from(0i64),
                "visitors" => Value::from(0i64),
                "bounces" => Value::from(0i64),
                "events" => Value::from(0i64),
            },
        ]]);

        let result = service(db).get_dashboard(1, week()).await;

        assert!(matches!(result, Err(AnalyticsError::DatabaseError(_))));
    }
}
