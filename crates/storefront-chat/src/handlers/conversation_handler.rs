use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error_builder::{bad_request, conflict, internal_server_error, not_found};
use storefront_core::problemdetails::Problem;
use tracing::error;

use super::AppState;
use crate::types::{
    ConversationError, ConversationFilter, ConversationListResponse, ConversationResponse,
    CreateConversationRequest, MessageListResponse, MessageQuery, MessageResponse,
    PostMessageRequest, UpdateConversationStatusRequest,
};

impl From<ConversationError> for Problem {
    fn from(error: ConversationError) -> Self {
        match error {
            ConversationError::NotFound(id) => not_found()
                .title("Conversation Not Found")
                .detail(format!("Conversation {} does not exist", id))
                .build(),
            ConversationError::Validation(detail) => bad_request()
                .title("Invalid Message")
                .detail(detail)
                .build(),
            ConversationError::InvalidTransition { from, to } => conflict()
                .title("Invalid Status Transition")
                .detail(format!("Conversation cannot change from {} to {}", from, to))
                .value("from", from.as_str())
                .value("to", to.as_str())
                .build(),
            ConversationError::Closed(id) => conflict()
                .title("Conversation Closed")
                .detail(format!("Conversation {} is closed, reopen it first", id))
                .build(),
            ConversationError::Conflict(id) => conflict()
                .title("Conversation Modified")
                .detail(format!(
                    "Conversation {} changed while it was being updated, reload and retry",
                    id
                ))
                .build(),
            ConversationError::Database(e) => {
                error!("Conversation query failed: {}", e);
                internal_server_error().build()
            }
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Problem> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        bad_request()
            .title("Invalid Request Body")
            .detail(rejection.body_text())
            .build()
    })
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Problem> {
    query.map(|Query(params)| params).map_err(|rejection| {
        bad_request()
            .title("Invalid Query Parameters")
            .detail(rejection.body_text())
            .build()
    })
}

/// Support inbox, most recently active first
#[utoipa::path(
    tag = "Chat",
    get,
    path = "/conversations",
    params(ConversationFilter),
    responses(
        (status = 200, description = "Page of conversations", body = ConversationListResponse),
        (status = 400, description = "Invalid filter", body = storefront_core::ProblemDetails)
    )
)]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<ConversationFilter>, QueryRejection>,
) -> Result<Json<ConversationListResponse>, Problem> {
    let filter = query_params(filter)?;
    Ok(Json(
        state.conversation_service.list_conversations(filter).await?,
    ))
}

#[utoipa::path(
    tag = "Chat",
    post,
    path = "/conversations",
    request_body = CreateConversationRequest,
    responses(
        (status = 201, description = "Conversation opened", body = ConversationResponse),
        (status = 400, description = "Invalid request", body = storefront_core::ProblemDetails)
    )
)]
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateConversationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConversationResponse>), Problem> {
    let request = json_body(payload)?;
    let conversation = state
        .conversation_service
        .create_conversation(request)
        .await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

#[utoipa::path(
    tag = "Chat",
    get,
    path = "/conversations/{id}",
    params(("id" = i32, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Conversation", body = ConversationResponse),
        (status = 404, description = "Conversation not found", body = storefront_core::ProblemDetails)
    )
)]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ConversationResponse>, Problem> {
    Ok(Json(state.conversation_service.get_conversation(id).await?))
}

/// Take over, close or reopen a conversation
#[utoipa::path(
    tag = "Chat",
    patch,
    path = "/conversations/{id}/status",
    params(("id" = i32, Path, description = "Conversation ID")),
    request_body = UpdateConversationStatusRequest,
    responses(
        (status = 200, description = "Updated conversation", body = ConversationResponse),
        (status = 404, description = "Conversation not found", body = storefront_core::ProblemDetails),
        (status = 409, description = "Transition not allowed", body = storefront_core::ProblemDetails)
    )
)]
pub async fn update_conversation_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateConversationStatusRequest>, JsonRejection>,
) -> Result<Json<ConversationResponse>, Problem> {
    let request = json_body(payload)?;
    Ok(Json(
        state
            .conversation_service
            .update_status(id, request.status)
            .await?,
    ))
}

#[utoipa::path(
    tag = "Chat",
    get,
    path = "/conversations/{id}/messages",
    params(("id" = i32, Path, description = "Conversation ID"), MessageQuery),
    responses(
        (status = 200, description = "Messages, oldest first", body = MessageListResponse),
        (status = 404, description = "Conversation not found", body = storefront_core::ProblemDetails)
    )
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    query: Result<Query<MessageQuery>, QueryRejection>,
) -> Result<Json<MessageListResponse>, Problem> {
    let query = query_params(query)?;
    Ok(Json(
        state.conversation_service.list_messages(id, query).await?,
    ))
}

#[utoipa::path(
    tag = "Chat",
    post,
    path = "/conversations/{id}/messages",
    params(("id" = i32, Path, description = "Conversation ID")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message stored and pushed to subscribers", body = MessageResponse),
        (status = 400, description = "Invalid message", body = storefront_core::ProblemDetails),
        (status = 404, description = "Conversation not found", body = storefront_core::ProblemDetails),
        (status = 409, description = "Conversation closed", body = storefront_core::ProblemDetails)
    )
)]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), Problem> {
    let request = json_body(payload)?;
    let message = state.conversation_service.post_message(id, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
