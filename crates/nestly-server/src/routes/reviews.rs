use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use nestly_core::AppError;
use nestly_core::models::{NewNotification, NewReview};

use crate::auth::Session;
use crate::dto::{CreateReviewRequest, ReviewResponse};
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::routes::acting_user;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/properties/{id}/reviews",
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored and owner notified", body = ReviewResponse),
        (status = 400, description = "Rating missing or outside 1..=5", body = crate::dto::ErrorResponse),
        (status = 403, description = "Reviewing one's own listing", body = crate::dto::ErrorResponse),
        (status = 404, description = "Property not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiPath(property_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rating = body
        .rating
        .ok_or_else(|| AppError::validation("rating is required"))?;
    let author = acting_user(&state, &session).await?;

    let review = NewReview {
        property_id,
        author_id: author.id,
        rating,
        comment: body.comment.filter(|c| !c.trim().is_empty()),
    };
    review.validate()?;

    let property = state
        .db
        .properties()
        .get(property_id)
        .await?
        .ok_or_else(|| AppError::not_found("Property"))?;
    if property.owner_id == author.id {
        return Err(AppError::Forbidden("You cannot review your own property".into()).into());
    }

    let notification = NewNotification::review_received(property.owner_id, &property.title, rating);
    let created = state
        .db
        .reviews()
        .create_with_notification(&review, &notification)
        .await?;

    Ok((StatusCode::CREATED, axum::Json(ReviewResponse::from(created))))
}
