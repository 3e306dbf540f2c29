use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::response::IntoResponse;

use nestly_core::AppError;
use nestly_core::identity::resolve_profile;
use nestly_core::models::{IdentityProfile, ProfileChanges, User, UserProfile};

use crate::auth::Session;
use crate::dto::{UpdateProfileRequest, UserProfileResponse, UserResponse};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Listings shown alongside the profile.
const PROFILE_PROPERTY_PREVIEW: usize = 5;

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller's profile with a preview of their listings", body = UserProfileResponse),
        (status = 404, description = "No profile data available for the session", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = match state.db.users().find_by_clerk_id(&session.clerk_id).await? {
        Some(user) => user,
        None => provision_user(&state, &session, |_| {}).await?,
    };

    let properties = state
        .db
        .properties()
        .list_by_owner(user.id, Some(PROFILE_PROPERTY_PREVIEW))
        .await?
        .into_iter()
        .map(|listing| listing.property)
        .collect();

    Ok(axum::Json(UserProfileResponse::from(UserProfile {
        user,
        properties,
    })))
}

#[utoipa::path(
    post,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let changes = ProfileChanges::try_from(UpdateProfileRequest { role: None, ..body })?;

    let user = state
        .db
        .users()
        .update_profile(&session.clerk_id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(axum::Json(UserResponse::from(user)))
}

/// Create-or-sync: the user is provisioned from the identity provider when
/// missing, then the body (role included) is applied on top.
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile created or synced", body = UserResponse),
        (status = 400, description = "Unknown role", body = crate::dto::ErrorResponse),
        (status = 404, description = "No profile data available for the session", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn sync_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let changes = ProfileChanges::try_from(body)?;
    let users = state.db.users();

    if users.find_by_clerk_id(&session.clerk_id).await?.is_none() {
        provision_user(&state, &session, |profile| {
            if let Some(first_name) = &changes.first_name {
                profile.first_name = Some(first_name.clone());
            }
            if let Some(last_name) = &changes.last_name {
                profile.last_name = Some(last_name.clone());
            }
            if changes.role.is_some() {
                profile.role = changes.role;
            }
        })
        .await?;
    }

    let user = users
        .update_profile(&session.clerk_id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(axum::Json(UserResponse::from(user)))
}

/// Insert a local record for a session user, using the identity directory
/// when configured and the session claims otherwise.
async fn provision_user(
    state: &AppState,
    session: &Session,
    adjust: impl FnOnce(&mut IdentityProfile),
) -> Result<User, ApiError> {
    let mut profile = resolve_profile(
        state.directory.as_ref(),
        &session.clerk_id,
        session.claims.clone(),
    )
    .await
    .ok_or_else(|| AppError::not_found("User"))?;
    adjust(&mut profile);

    let user = state.db.users().upsert_identity(&profile).await?;
    tracing::info!(user_id = %user.id, clerk_id = %user.clerk_id, "Provisioned user from session");
    Ok(user)
}
