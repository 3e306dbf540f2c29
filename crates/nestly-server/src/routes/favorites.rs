use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use nestly_core::AppError;

use crate::auth::Session;
use crate::dto::{AddFavoriteRequest, FavoriteResponse, SuccessResponse};
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::routes::acting_user;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/favorites",
    responses(
        (status = 200, description = "Saved listings, most recently saved first", body = Vec<FavoriteResponse>),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "favorites"
)]
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    let favorites = state.db.favorites().list_for_user(user.id).await?;

    let response: Vec<FavoriteResponse> = favorites.into_iter().map(Into::into).collect();
    Ok(axum::Json(response))
}

#[utoipa::path(
    post,
    path = "/api/favorites",
    request_body = AddFavoriteRequest,
    responses(
        (status = 201, description = "Listing saved (repeat saves are no-ops)", body = FavoriteResponse),
        (status = 400, description = "propertyId missing", body = crate::dto::ErrorResponse),
        (status = 404, description = "Property not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "favorites"
)]
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<AddFavoriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let property_id = body
        .property_id
        .ok_or_else(|| AppError::validation("propertyId is required"))?;
    let user = acting_user(&state, &session).await?;

    if state.db.properties().get(property_id).await?.is_none() {
        return Err(AppError::not_found("Property").into());
    }

    let favorite = state.db.favorites().add(user.id, property_id).await?;
    Ok((StatusCode::CREATED, axum::Json(FavoriteResponse::from(favorite))))
}

#[utoipa::path(
    delete,
    path = "/api/favorites/{property_id}",
    params(("property_id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Listing removed from favorites", body = SuccessResponse),
        (status = 404, description = "Favorite not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "favorites"
)]
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiPath(property_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;

    if !state.db.favorites().remove(user.id, property_id).await? {
        return Err(AppError::not_found("Favorite").into());
    }
    Ok(axum::Json(SuccessResponse { success: true }))
}
