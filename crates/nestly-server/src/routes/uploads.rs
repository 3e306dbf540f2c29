use std::sync::Arc;

use axum::Extension;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;

use nestly_core::AppError;
use nestly_core::uploads::store_property_image;

use crate::auth::Session;
use crate::dto::{UploadQuery, UploadResponse};
use crate::error::{ApiError, ApiQuery};
use crate::routes::acting_landlord;
use crate::state::AppState;

/// Accepts a raw image body and stores it under a unique key.
#[utoipa::path(
    post,
    path = "/api/uploads",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "image/*", description = "Raw image bytes"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Empty body or not an image", body = crate::dto::ErrorResponse),
        (status = 403, description = "Caller is not a landlord", body = crate::dto::ErrorResponse),
        (status = 413, description = "Body larger than 10 MiB"),
        (status = 503, description = "Storage not configured", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "uploads"
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiQuery(query): ApiQuery<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    acting_landlord(&state, &session, "upload images").await?;

    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Image storage is not configured".into()))?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let filename = query.filename.as_deref().unwrap_or("image");

    let stored = store_property_image(storage, filename, content_type, body.to_vec()).await?;

    Ok((
        StatusCode::CREATED,
        axum::Json(UploadResponse {
            path: stored.path,
            url: stored.url,
        }),
    ))
}
