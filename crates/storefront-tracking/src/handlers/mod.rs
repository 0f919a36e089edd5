mod tracking_handler;
mod website_handler;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use sea_orm::DatabaseConnection;
use utoipa::OpenApi;

use crate::services::{TrackingService, WebsiteService};
use crate::types::{
    CreateWebsiteRequest, HealthResponse, TrackKind, TrackRequest, TrackResponse, WebsiteResponse,
};

pub use tracking_handler::{health, track};
pub use website_handler::{create_website, delete_website, get_website, list_websites};

pub struct AppState {
    pub tracking_service: Arc<TrackingService>,
    pub website_service: Arc<WebsiteService>,
    pub db: Arc<DatabaseConnection>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/track", post(track))
        .route("/health", get(health))
        .route("/websites", get(list_websites).post(create_website))
        .route("/websites/{id}", get(get_website).delete(delete_website))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        tracking_handler::track,
        tracking_handler::health,
        website_handler::list_websites,
        website_handler::create_website,
        website_handler::get_website,
        website_handler::delete_website,
    ),
    components(schemas(
        TrackRequest,
        TrackKind,
        TrackResponse,
        HealthResponse,
        CreateWebsiteRequest,
        WebsiteResponse,
        storefront_core::ProblemDetails,
    )),
    tags(
        (name = "Tracking", description = "Visitor hit ingestion"),
        (name = "Websites", description = "Tracked storefront sites")
    )
)]
pub struct TrackingApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::time::Duration;
    use storefront_entities::{page_views, user_sessions, websites};
    use tower::ServiceExt;

    fn app(db: MockDatabase) -> Router {
        let db = Arc::new(db.into_connection());
        let state = Arc::new(AppState {
            tracking_service: Arc::new(TrackingService::new(
                db.clone(),
                Duration::from_secs(1800),
            )),
            website_service: Arc::new(WebsiteService::new(db.clone())),
            db,
        });
        configure_routes().with_state(state)
    }

    fn post_track(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/track")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "198.51.100.20")
            .header("user-agent", "Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_track_rejects_malformed_json() {
        let response = app(MockDatabase::new(DatabaseBackend::Postgres))
            .oneshot(post_track("{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
    }

    #[tokio::test]
    async fn test_track_rejects_missing_fields() {
        let response = app(MockDatabase::new(DatabaseBackend::Postgres))
            .oneshot(post_track(r#"{"type":"pageview","website_id":1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["title"], "Invalid Tracking Payload");
    }

    #[tokio::test]
    async fn test_track_rejects_unknown_type() {
        let response = app(MockDatabase::new(DatabaseBackend::Postgres))
            .oneshot(post_track(r#"{"type":"click","website_id":1,"url":"/"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_track_pageview_creates_session() {
        let now = Utc::now();
        let session = user_sessions::Model {
            id: 5,
            session_id: "abc".to_string(),
            website_id: 1,
            browser: Some("Firefox".to_string()),
            os: Some("Linux".to_string()),
            device: Some("Desktop".to_string()),
            distinct_id: None,
            country: None,
            region: None,
            city: None,
            language: None,
            screen: None,
            created_at: now,
        };
        let view = page_views::Model {
            id: 1,
            session_id: 5,
            website_id: 1,
            url_path: "/".to_string(),
            url_query: None,
            page_title: None,
            referrer_path: None,
            referrer_query: None,
            referrer_domain: None,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            utm_content: None,
            utm_term: None,
            created_at: now,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![websites::Model {
                id: 1,
                name: "Shop".to_string(),
                domain: "shop.example.com".to_string(),
                created_at: now,
            }]])
            .append_query_results([Vec::<user_sessions::Model>::new()])
            .append_query_results([vec![session]])
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![view]]);

        let response = app(db)
            .oneshot(post_track(
                r#"{"type":"pageview","website_id":1,"url":"https://shop.example.com/","referrer":"https://google.com/"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["session_id"], "abc");
        assert_eq!(body["new_session"], true);
    }

    #[tokio::test]
    async fn test_get_missing_website_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<websites::Model>::new()]);

        let response = app(db)
            .oneshot(Request::builder().uri("/websites/77").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error_code"], "NOT_FOUND");
    }
}
