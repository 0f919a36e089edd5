use chrono::TimeDelta;
use sea_orm::DbErr;
use storefront_core::UtcDateTime;
use thiserror::Error;

/// Default number of rows for ranked reports
pub const DEFAULT_REPORT_LIMIT: i64 = 10;
/// Upper bound for any ranked report
pub const MAX_REPORT_LIMIT: i64 = 100;
/// Upper bound on the number of points a timeline may produce
pub const MAX_TIMELINE_BUCKETS: i64 = 2000;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Inclusive reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: UtcDateTime,
    pub end: UtcDateTime,
}

impl DateRange {
    pub fn new(start: UtcDateTime, end: UtcDateTime) -> Result<Self, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::InvalidRange(format!(
                "start_date {} is after end_date {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }
}
