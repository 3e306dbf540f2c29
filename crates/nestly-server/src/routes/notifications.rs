use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use nestly_core::AppError;

use crate::auth::Session;
use crate::dto::{MarkAllReadResponse, NotificationResponse, UpdateNotificationsRequest};
use crate::error::{ApiError, ApiJson};
use crate::routes::acting_user;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = Vec<NotificationResponse>),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    let notifications = state.db.notifications().list_for_user(user.id).await?;

    let response: Vec<NotificationResponse> =
        notifications.into_iter().map(Into::into).collect();
    Ok(axum::Json(response))
}

/// Either marks every notification read (`markAllRead: true`) or the single
/// notification named by `notificationId`.
#[utoipa::path(
    patch,
    path = "/api/notifications",
    request_body = UpdateNotificationsRequest,
    responses(
        (status = 200, description = "Notification(s) marked read", body = NotificationResponse),
        (status = 400, description = "Neither markAllRead nor notificationId given", body = crate::dto::ErrorResponse),
        (status = 403, description = "Notification belongs to someone else", body = crate::dto::ErrorResponse),
        (status = 404, description = "Notification not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "notifications"
)]
pub async fn update_notifications(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<UpdateNotificationsRequest>,
) -> Result<Response, ApiError> {
    let user = acting_user(&state, &session).await?;
    let notifications = state.db.notifications();

    if body.mark_all_read {
        let updated = notifications.mark_all_read(user.id).await?;
        return Ok(axum::Json(MarkAllReadResponse {
            success: true,
            message: "All notifications marked as read".into(),
            updated,
        })
        .into_response());
    }

    let id = body
        .notification_id
        .ok_or_else(|| AppError::validation("Notification ID is required"))?;

    let existing = notifications
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Notification"))?;
    if existing.user_id != user.id {
        return Err(AppError::Forbidden("Not authorized to update this notification".into()).into());
    }

    let updated = notifications
        .mark_read(id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Notification"))?;

    Ok(axum::Json(NotificationResponse::from(updated)).into_response())
}
