use std::sync::Arc;

use axum::Extension;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use nestly_core::AppError;
use nestly_core::models::{NewProperty, Property, PropertyChanges, User};
use nestly_core::search::PropertySearch;

use crate::auth::Session;
use crate::dto::{
    CreatePropertyRequest, MessageResponse, PropertyDetailResponse, PropertyResponse,
    SearchQuery, UpdatePropertyRequest,
};
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::routes::{acting_landlord, acting_user};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/properties",
    params(SearchQuery),
    responses(
        (status = 200, description = "Active listings, newest first", body = Vec<PropertyResponse>),
        (status = 400, description = "Malformed filter", body = crate::dto::ErrorResponse),
    ),
    tag = "properties"
)]
pub async fn search_properties(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, ApiError> {
    let search = PropertySearch::from_query(query.as_deref())?;
    let listings = state.db.properties().search(&search).await?;

    let response: Vec<PropertyResponse> = listings.into_iter().map(Into::into).collect();
    Ok(axum::Json(response))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Listing with owner contact and reviews", body = PropertyDetailResponse),
        (status = 404, description = "Property not found", body = crate::dto::ErrorResponse),
    ),
    tag = "properties"
)]
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .db
        .properties()
        .get_detail(id)
        .await?
        .ok_or_else(|| AppError::not_found("Property"))?;

    Ok(axum::Json(PropertyDetailResponse::from(detail)))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Listing created", body = PropertyResponse),
        (status = 400, description = "Invalid listing", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a landlord", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "properties"
)]
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<CreatePropertyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = acting_landlord(&state, &session, "create properties").await?;
    let property = NewProperty::try_from(body)?;

    let listing = state.db.properties().create(owner.id, &property).await?;

    Ok((StatusCode::CREATED, axum::Json(PropertyResponse::from(listing))))
}

#[utoipa::path(
    patch,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = UpdatePropertyRequest,
    responses(
        (status = 200, description = "Listing updated", body = PropertyResponse),
        (status = 400, description = "Invalid change", body = crate::dto::ErrorResponse),
        (status = 403, description = "Caller does not own the listing", body = crate::dto::ErrorResponse),
        (status = 404, description = "Property not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "properties"
)]
pub async fn update_property(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdatePropertyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    owned_property(&state, &user, id, "update").await?;
    let changes = PropertyChanges::try_from(body)?;

    let listing = state
        .db
        .properties()
        .update(id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Property"))?;

    Ok(axum::Json(PropertyResponse::from(listing)))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Listing deleted", body = MessageResponse),
        (status = 403, description = "Caller does not own the listing", body = crate::dto::ErrorResponse),
        (status = 404, description = "Property not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "properties"
)]
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    owned_property(&state, &user, id, "delete").await?;

    if !state.db.properties().delete(id).await? {
        return Err(AppError::not_found("Property").into());
    }
    tracing::info!(property_id = %id, owner_id = %user.id, "Property deleted");

    Ok(axum::Json(MessageResponse {
        message: "Property deleted successfully".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/properties/user",
    responses(
        (status = 200, description = "Caller's listings, newest first", body = Vec<PropertyResponse>),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "properties"
)]
pub async fn list_user_properties(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    let listings = state.db.properties().list_by_owner(user.id, None).await?;

    let response: Vec<PropertyResponse> = listings.into_iter().map(Into::into).collect();
    Ok(axum::Json(response))
}

/// Fetch a listing the user owns: 404 when missing, 403 when someone else's.
async fn owned_property(
    state: &AppState,
    user: &User,
    id: Uuid,
    action: &str,
) -> Result<Property, ApiError> {
    let property = state
        .db
        .properties()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Property"))?;

    if property.owner_id != user.id {
        return Err(AppError::Forbidden(format!("Not authorized to {action} this property")).into());
    }
    Ok(property)
}
