use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use nestly_core::models::{Inquiry, NewInquiry, NewNotification, User};
use nestly_core::{AppError, InquiryStatus};

use crate::auth::Session;
use crate::dto::{
    CreateInquiryRequest, InquiryResponse, PropertySummaryResponse, SuccessResponse,
    UpdateInquiryRequest,
};
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::routes::acting_user;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/inquiries",
    request_body = CreateInquiryRequest,
    responses(
        (status = 201, description = "Inquiry recorded and owner notified", body = InquiryResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::dto::ErrorResponse),
        (status = 404, description = "Property not found", body = crate::dto::ErrorResponse),
    ),
    tag = "inquiries"
)]
pub async fn create_inquiry(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateInquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(property_id), Some(tenant_name), Some(tenant_email)) = (
        body.property_id,
        non_blank(body.tenant_name),
        non_blank(body.tenant_email),
    ) else {
        return Err(
            AppError::validation("propertyId, tenantName, and tenantEmail are required").into(),
        );
    };

    let inquiry = NewInquiry {
        property_id,
        tenant_name,
        tenant_email,
        tenant_phone: body.tenant_phone,
        message: body.message,
    };
    inquiry.validate()?;

    let property = state
        .db
        .properties()
        .get(property_id)
        .await?
        .ok_or_else(|| AppError::not_found("Property"))?;

    let notification = NewNotification::inquiry_received(
        property.owner_id,
        &property.title,
        inquiry.tenant_name.trim(),
    );
    let created = state
        .db
        .inquiries()
        .create_with_notification(&inquiry, &notification)
        .await?;

    let response = InquiryResponse {
        property: Some(PropertySummaryResponse::from(&property)),
        ..created.into()
    };
    Ok((StatusCode::CREATED, axum::Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/inquiries",
    responses(
        (status = 200, description = "Inquiries on the caller's listings, newest first", body = Vec<InquiryResponse>),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "inquiries"
)]
pub async fn list_inquiries(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    let inquiries = state.db.inquiries().list_for_owner(user.id).await?;

    let response: Vec<InquiryResponse> = inquiries.into_iter().map(Into::into).collect();
    Ok(axum::Json(response))
}

#[utoipa::path(
    patch,
    path = "/api/inquiries/{id}",
    params(("id" = Uuid, Path, description = "Inquiry ID")),
    request_body = UpdateInquiryRequest,
    responses(
        (status = 200, description = "Status changed", body = InquiryResponse),
        (status = 400, description = "Missing or unknown status", body = crate::dto::ErrorResponse),
        (status = 403, description = "Inquiry is on someone else's listing", body = crate::dto::ErrorResponse),
        (status = 404, description = "Inquiry not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "inquiries"
)]
pub async fn update_inquiry(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateInquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    owned_inquiry(&state, &user, id).await?;

    let status: InquiryStatus = body
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::validation("status is required"))?
        .parse()?;

    let updated = state
        .db
        .inquiries()
        .update_status(id, status)
        .await?
        .ok_or_else(|| AppError::not_found("Inquiry"))?;

    Ok(axum::Json(InquiryResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/inquiries/{id}",
    params(("id" = Uuid, Path, description = "Inquiry ID")),
    responses(
        (status = 200, description = "Inquiry deleted", body = SuccessResponse),
        (status = 403, description = "Inquiry is on someone else's listing", body = crate::dto::ErrorResponse),
        (status = 404, description = "Inquiry not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "inquiries"
)]
pub async fn delete_inquiry(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &session).await?;
    owned_inquiry(&state, &user, id).await?;

    state.db.inquiries().delete(id).await?;

    Ok(axum::Json(SuccessResponse { success: true }))
}

async fn owned_inquiry(state: &AppState, user: &User, id: Uuid) -> Result<Inquiry, ApiError> {
    let (inquiry, owner_id) = state
        .db
        .inquiries()
        .get_with_owner(id)
        .await?
        .ok_or_else(|| AppError::not_found("Inquiry"))?;

    if owner_id != user.id {
        return Err(AppError::Forbidden("Not authorized to manage this inquiry".into()).into());
    }
    Ok(inquiry)
}
