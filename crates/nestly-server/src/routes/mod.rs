//! HTTP handlers, grouped by resource.

use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use nestly_core::AppError;
use nestly_core::models::User;
use nestly_core::uploads::MAX_IMAGE_BYTES;

use crate::auth::{Session, require_session};
use crate::dto::HealthResponse;
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod dashboard;
pub mod favorites;
pub mod inquiries;
pub mod messages;
pub mod notifications;
pub mod properties;
pub mod reviews;
pub mod uploads;
pub mod users;
pub mod webhooks;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/properties", post(properties::create_property))
        .route("/api/properties/user", get(properties::list_user_properties))
        .route(
            "/api/properties/{id}",
            patch(properties::update_property).delete(properties::delete_property),
        )
        .route("/api/properties/{id}/reviews", post(reviews::create_review))
        .route("/api/inquiries", get(inquiries::list_inquiries))
        .route(
            "/api/inquiries/{id}",
            patch(inquiries::update_inquiry).delete(inquiries::delete_inquiry),
        )
        .route(
            "/api/notifications",
            get(notifications::list_notifications).patch(notifications::update_notifications),
        )
        .route(
            "/api/users/me",
            get(users::get_me).post(users::update_me).put(users::sync_me),
        )
        .route("/api/dashboard/overview", get(dashboard::overview))
        .route(
            "/api/favorites",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route(
            "/api/favorites/{property_id}",
            delete(favorites::remove_favorite),
        )
        .route(
            "/api/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/api/uploads", post(uploads::upload_image))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .route("/api/properties", get(properties::search_properties))
        .route("/api/properties/{id}", get(properties::get_property))
        .route("/api/inquiries", post(inquiries::create_inquiry))
        .route("/api/webhooks/clerk", post(webhooks::clerk_webhook))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public
        .merge(protected)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_IMAGE_BYTES))
        .with_state(state)
}

/// The caller's local user record.
pub(crate) async fn acting_user(state: &AppState, session: &Session) -> Result<User, ApiError> {
    state
        .db
        .users()
        .find_by_clerk_id(&session.clerk_id)
        .await?
        .ok_or_else(|| AppError::not_found("User").into())
}

/// The caller's user record, which must have the landlord role.
pub(crate) async fn acting_landlord(
    state: &AppState,
    session: &Session,
    action: &str,
) -> Result<User, ApiError> {
    match state.db.users().find_by_clerk_id(&session.clerk_id).await? {
        Some(user) if user.is_landlord() => Ok(user),
        _ => Err(AppError::Forbidden(format!("Only landlords can {action}")).into()),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(HealthResponse {
                status: "healthy".into(),
                database: "ok".into(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(HealthResponse {
                    status: "unhealthy".into(),
                    database: "unreachable".into(),
                }),
            )
        }
    }
}
