use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error_builder::{bad_request, internal_server_error, not_found};
use storefront_core::problemdetails::Problem;
use tracing::error;

use super::AppState;
use crate::types::{CreateWebsiteRequest, WebsiteError, WebsiteResponse};

impl From<WebsiteError> for Problem {
    fn from(error: WebsiteError) -> Self {
        match error {
            WebsiteError::NotFound(id) => not_found()
                .title("Website Not Found")
                .detail(format!("Website {} does not exist", id))
                .build(),
            WebsiteError::Validation(detail) => bad_request()
                .title("Invalid Website")
                .detail(detail)
                .build(),
            WebsiteError::Database(e) => {
                error!("Website query failed: {}", e);
                internal_server_error().build()
            }
        }
    }
}

/// List tracked websites
#[utoipa::path(
    tag = "Websites",
    get,
    path = "/websites",
    responses(
        (status = 200, description = "All websites", body = Vec<WebsiteResponse>),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn list_websites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WebsiteResponse>>, Problem> {
    let websites = state.website_service.list_websites().await?;
    Ok(Json(websites.into_iter().map(WebsiteResponse::from).collect()))
}

/// Register a website for tracking
#[utoipa::path(
    tag = "Websites",
    post,
    path = "/websites",
    request_body = CreateWebsiteRequest,
    responses(
        (status = 201, description = "Website created", body = WebsiteResponse),
        (status = 400, description = "Invalid name or domain", body = storefront_core::ProblemDetails),
        (status = 500, description = "Internal server error", body = storefront_core::ProblemDetails)
    )
)]
pub async fn create_website(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateWebsiteRequest>,
) -> Result<(StatusCode, Json<WebsiteResponse>), Problem> {
    let website = state.website_service.create_website(request).await?;
    Ok((StatusCode::CREATED, Json(website.into())))
}

/// Get a website by id
#[utoipa::path(
    tag = "Websites",
    get,
    path = "/websites/{id}",
    params(("id" = i32, Path, description = "Website ID")),
    responses(
        (status = 200, description = "Website", body = WebsiteResponse),
        (status = 404, description = "Website not found", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_website(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<WebsiteResponse>, Problem> {
    let website = state.website_service.get_website(id).await?;
    Ok(Json(website.into()))
}

/// Delete a website and all of its tracking data
#[utoipa::path(
    tag = "Websites",
    delete,
    path = "/websites/{id}",
    params(("id" = i32, Path, description = "Website ID")),
    responses(
        (status = 204, description = "Website deleted"),
        (status = 404, description = "Website not found", body = storefront_core::ProblemDetails)
    )
)]
pub async fn delete_website(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, Problem> {
    state.website_service.delete_website(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
