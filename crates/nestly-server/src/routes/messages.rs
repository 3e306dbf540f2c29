use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use nestly_core::AppError;
use nestly_core::models::{NewMessage, NewNotification};

use crate::auth::Session;
use crate::dto::{DirectMessageResponse, SendMessageRequest};
use crate::error::{ApiError, ApiJson};
use crate::routes::acting_user;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/messages",
    responses(
        (status = 200, description = "Messages sent or received by the caller, newest first", body = Vec<DirectMessageResponse>),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    let messages = state.db.messages().list_for_user(user.id).await?;

    let response: Vec<DirectMessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok(axum::Json(response))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent and receiver notified", body = DirectMessageResponse),
        (status = 400, description = "Missing content or receiver, or messaging oneself", body = crate::dto::ErrorResponse),
        (status = 404, description = "Receiver or property not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let receiver_id = body
        .receiver_id
        .ok_or_else(|| AppError::validation("receiverId is required"))?;
    let sender = acting_user(&state, &session).await?;

    let message = NewMessage {
        sender_id: sender.id,
        receiver_id,
        property_id: body.property_id,
        content: body.content.unwrap_or_default(),
    };
    message.validate()?;

    if state.db.users().find_by_id(receiver_id).await?.is_none() {
        return Err(AppError::not_found("Receiver").into());
    }
    if let Some(property_id) = message.property_id {
        if state.db.properties().get(property_id).await?.is_none() {
            return Err(AppError::not_found("Property").into());
        }
    }

    let notification = NewNotification::message_received(receiver_id, &sender.display_name());
    let created = state
        .db
        .messages()
        .create_with_notification(&message, &notification)
        .await?;

    Ok((StatusCode::CREATED, axum::Json(DirectMessageResponse::from(created))))
}
