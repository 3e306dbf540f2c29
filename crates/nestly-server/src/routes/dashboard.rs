use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;

use nestly_core::dashboard::{LATEST_INQUIRY_COUNT, summarize};

use crate::auth::Session;
use crate::dto::DashboardOverviewResponse;
use crate::error::ApiError;
use crate::routes::acting_user;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    responses(
        (status = 200, description = "Listing and inquiry metrics for the caller", body = DashboardOverviewResponse),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;

    let properties = state.db.properties().stats_for_owner(user.id).await?;
    let inquiries = state.db.inquiries();
    let stamps = inquiries.stamps_for_owner(user.id).await?;
    let latest = inquiries
        .latest_for_owner(user.id, LATEST_INQUIRY_COUNT)
        .await?;

    let overview = summarize(properties, &stamps, latest, Utc::now());
    Ok(axum::Json(DashboardOverviewResponse::from(overview)))
}
