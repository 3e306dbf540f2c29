use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use chrono::Utc;

use nestly_core::AppError;
use nestly_core::webhook::{IdentityEvent, WebhookHeaders, parse_event};

use crate::dto::WebhookResponse;
use crate::error::ApiError;
use crate::state::AppState;

fn svix_headers(headers: &HeaderMap) -> Option<WebhookHeaders> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    Some(WebhookHeaders {
        id: get("svix-id")?,
        timestamp: get("svix-timestamp")?,
        signature: get("svix-signature")?,
    })
}

/// Keeps local users in step with the identity provider.
#[utoipa::path(
    post,
    path = "/api/webhooks/clerk",
    request_body(content = String, content_type = "application/json", description = "Signed identity event"),
    responses(
        (status = 200, description = "Event applied or ignored", body = WebhookResponse),
        (status = 400, description = "Missing headers, bad signature or malformed event", body = crate::dto::ErrorResponse),
        (status = 500, description = "Webhook secret not configured", body = crate::dto::ErrorResponse),
    ),
    tag = "webhooks"
)]
pub async fn clerk_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let verifier = state
        .webhook
        .as_ref()
        .ok_or_else(|| AppError::ConfigError("CLERK_WEBHOOK_SECRET is not set".into()))?;

    let headers = svix_headers(&headers)
        .ok_or_else(|| AppError::WebhookError("Missing svix headers".into()))?;

    let body = std::str::from_utf8(&body)
        .map_err(|_| AppError::WebhookError("Payload is not valid UTF-8".into()))?;

    if let Err(e) = verifier.verify(&headers, body, Utc::now()) {
        tracing::warn!(svix_id = %headers.id, error = %e, "Rejected webhook delivery");
        return Err(e.into());
    }

    let response = match parse_event(body)? {
        IdentityEvent::UserUpserted(profile) => {
            let user = state.db.users().upsert_identity(&profile).await?;
            tracing::info!(user_id = %user.id, clerk_id = %user.clerk_id, "Synced user from webhook");
            WebhookResponse {
                success: true,
                user_id: Some(user.id),
            }
        }
        IdentityEvent::UserDeleted { clerk_id } => {
            let removed = state.db.users().delete_by_clerk_id(&clerk_id).await?;
            tracing::info!(clerk_id = %clerk_id, removed, "Processed user deletion");
            WebhookResponse {
                success: true,
                user_id: None,
            }
        }
        IdentityEvent::Ignored(event_type) => {
            tracing::debug!(event_type = %event_type, "Ignoring webhook event");
            WebhookResponse {
                success: true,
                user_id: None,
            }
        }
    };

    Ok(axum::Json(response))
}
