use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeDelta, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sha2::{Digest, Sha256};
use storefront_entities::{device_info, events, page_views, user_sessions, websites};
use tracing::{debug, info};

use crate::channel::{parse_referrer, PageUrl};
use crate::types::{
    ClientInfo, TrackKind, TrackRequest, TrackResponse, TrackingError, MAX_EVENT_NAME_LEN,
};
use crate::user_agent::ClientDevice;

/// Result of [`TrackingService::create_session`]
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session: user_sessions::Model,
    /// `false` when an existing session inside the window was reused
    pub created: bool,
}

/// Deterministic visitor hash: SHA-256 over website, client address and user
/// agent, plus the tracker's `distinct_id` when one is supplied.
pub fn session_hash(
    website_id: i32,
    client_ip: &str,
    user_agent: &str,
    distinct_id: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(website_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(client_ip.as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.as_bytes());
    if let Some(id) = distinct_id.map(str::trim).filter(|id| !id.is_empty()) {
        hasher.update(b"|");
        hasher.update(id.as_bytes());
    }
    hex::encode(hasher.finalize())
}

pub struct TrackingService {
    db: Arc<DatabaseConnection>,
    session_window: TimeDelta,
}

impl TrackingService {
    pub fn new(db: Arc<DatabaseConnection>, session_window: Duration) -> Self {
        let session_window =
            TimeDelta::from_std(session_window).unwrap_or_else(|_| TimeDelta::minutes(30));
        Self { db, session_window }
    }

    /// Reuse the visitor's session if one was created inside the window,
    /// otherwise insert a new one and bump the daily device counter.
    pub async fn create_session(
        &self,
        website_id: i32,
        client: &ClientInfo,
        distinct_id: Option<&str>,
    ) -> Result<SessionOutcome, TrackingError> {
        let hash = session_hash(website_id, &client.ip_address, &client.user_agent, distinct_id);
        let now = Utc::now();
        let cutoff = now - self.session_window;

        let existing = user_sessions::Entity::find()
            .filter(user_sessions::Column::SessionId.eq(hash.as_str()))
            .filter(user_sessions::Column::CreatedAt.gte(cutoff))
            .order_by_desc(user_sessions::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?;

        if let Some(session) = existing {
            debug!("Reusing session {} for website {}", session.id, website_id);
            return Ok(SessionOutcome {
                session,
                created: false,
            });
        }

        let device = ClientDevice::from_user_agent(&client.user_agent);
        let session = user_sessions::ActiveModel {
            session_id: Set(hash),
            website_id: Set(website_id),
            browser: Set(Some(device.browser.clone())),
            os: Set(Some(device.os.clone())),
            device: Set(Some(device.device.clone())),
            distinct_id: Set(distinct_id.map(str::to_string)),
            country: Set(client.geo.country.clone()),
            region: Set(client.geo.region.clone()),
            city: Set(client.geo.city.clone()),
            language: Set(client.language.clone()),
            screen: Set(client.screen.clone()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        self.update_device_info(
            website_id,
            &device.browser,
            &device.os,
            &device.device,
            now.date_naive(),
        )
        .await?;

        info!(
            "New session {} for website {} ({} / {} / {})",
            session.id, website_id, device.browser, device.os, device.device
        );

        Ok(SessionOutcome {
            session,
            created: true,
        })
    }

    pub async fn track_page_view(
        &self,
        session: &user_sessions::Model,
        page: &PageUrl,
        referrer: Option<&str>,
        title: Option<&str>,
        site_host: Option<&str>,
    ) -> Result<page_views::Model, TrackingError> {
        let utm = page.utm();
        let page_host = page.host.as_deref().or(site_host);
        let referrer = parse_referrer(referrer, page_host);

        let view = page_views::ActiveModel {
            session_id: Set(session.id),
            website_id: Set(session.website_id),
            url_path: Set(page.path.clone()),
            url_query: Set(page.query.clone()),
            page_title: Set(title.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)),
            referrer_path: Set(referrer.path),
            referrer_query: Set(referrer.query),
            referrer_domain: Set(referrer.domain),
            utm_source: Set(utm.utm_source),
            utm_medium: Set(utm.utm_medium),
            utm_campaign: Set(utm.utm_campaign),
            utm_content: Set(utm.utm_content),
            utm_term: Set(utm.utm_term),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(view)
    }

    pub async fn track_event(
        &self,
        session: &user_sessions::Model,
        page: &PageUrl,
        event_name: &str,
        event_data: Option<serde_json::Value>,
    ) -> Result<events::Model, TrackingError> {
        let event = events::ActiveModel {
            session_id: Set(session.id),
            website_id: Set(session.website_id),
            url_path: Set(page.path.clone()),
            event_name: Set(event_name.to_string()),
            event_data: Set(event_data),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(event)
    }

    /// Atomic `INSERT ... ON CONFLICT DO UPDATE SET count = count + 1` on the
    /// daily device row.
    pub async fn update_device_info(
        &self,
        website_id: i32,
        browser: &str,
        os: &str,
        device: &str,
        date: NaiveDate,
    ) -> Result<(), TrackingError> {
        let row = device_info::ActiveModel {
            website_id: Set(website_id),
            browser: Set(browser.to_string()),
            os: Set(os.to_string()),
            device: Set(device.to_string()),
            date: Set(date),
            count: Set(1),
            ..Default::default()
        };

        device_info::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    device_info::Column::WebsiteId,
                    device_info::Column::Browser,
                    device_info::Column::Os,
                    device_info::Column::Device,
                    device_info::Column::Date,
                ])
                .value(
                    device_info::Column::Count,
                    Expr::col((device_info::Entity, device_info::Column::Count)).add(1),
                )
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(())
    }

    /// Entry point of `POST /track`
    pub async fn record(
        &self,
        payload: TrackRequest,
        client: ClientInfo,
    ) -> Result<TrackResponse, TrackingError> {
        let page = validate(&payload)?;

        let website = websites::Entity::find_by_id(payload.website_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(TrackingError::WebsiteNotFound(payload.website_id))?;

        let outcome = self
            .create_session(website.id, &client, payload.distinct_id.as_deref())
            .await?;

        match payload.kind {
            TrackKind::Pageview => {
                self.track_page_view(
                    &outcome.session,
                    &page,
                    payload.referrer.as_deref(),
                    payload.title.as_deref(),
                    Some(website.domain.as_str()),
                )
                .await?;
            }
            TrackKind::Event => {
                let name = payload.event_name.as_deref().unwrap_or_default().trim();
                self.track_event(&outcome.session, &page, name, payload.event_data)
                    .await?;
            }
        }

        Ok(TrackResponse {
            session_id: outcome.session.session_id,
            new_session: outcome.created,
        })
    }
}

fn validate(payload: &TrackRequest) -> Result<PageUrl, TrackingError> {
    if payload.website_id <= 0 {
        return Err(TrackingError::Validation(
            "website_id must be a positive integer".to_string(),
        ));
    }

    let page = PageUrl::parse(&payload.url)
        .map_err(|e| TrackingError::Validation(format!("url '{}' is invalid: {}", payload.url, e)))?;

    if payload.kind == TrackKind::Event {
        let name = payload.event_name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(TrackingError::Validation(
                "event_name is required for events".to_string(),
            ));
        }
        if name.chars().count() > MAX_EVENT_NAME_LEN {
            return Err(TrackingError::Validation(format!(
                "event_name must be at most {} characters",
                MAX_EVENT_NAME_LEN
            )));
        }
    }

    Ok(page)
}
