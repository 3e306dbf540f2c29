use utoipa::OpenApi;

use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nestly API",
        version = "0.3.0",
        description = "Property rental marketplace: listings, inquiries, favorites and landlord dashboards."
    ),
    paths(
        routes::health,
        routes::properties::search_properties,
        routes::properties::get_property,
        routes::properties::create_property,
        routes::properties::update_property,
        routes::properties::delete_property,
        routes::properties::list_user_properties,
        routes::reviews::create_review,
        routes::inquiries::create_inquiry,
        routes::inquiries::list_inquiries,
        routes::inquiries::update_inquiry,
        routes::inquiries::delete_inquiry,
        routes::notifications::list_notifications,
        routes::notifications::update_notifications,
        routes::users::get_me,
        routes::users::update_me,
        routes::users::sync_me,
        routes::dashboard::overview,
        routes::favorites::list_favorites,
        routes::favorites::add_favorite,
        routes::favorites::remove_favorite,
        routes::messages::list_messages,
        routes::messages::send_message,
        routes::uploads::upload_image,
        routes::webhooks::clerk_webhook,
    ),
    components(schemas(
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
        crate::dto::MessageResponse,
        crate::dto::SuccessResponse,
        crate::dto::OwnerSummaryResponse,
        crate::dto::OwnerContactResponse,
        crate::dto::PropertyFields,
        crate::dto::PropertyResponse,
        crate::dto::PropertyDetailResponse,
        crate::dto::CreatePropertyRequest,
        crate::dto::UpdatePropertyRequest,
        crate::dto::PropertySummaryResponse,
        crate::dto::InquiryResponse,
        crate::dto::CreateInquiryRequest,
        crate::dto::UpdateInquiryRequest,
        crate::dto::NotificationResponse,
        crate::dto::UpdateNotificationsRequest,
        crate::dto::MarkAllReadResponse,
        crate::dto::UserResponse,
        crate::dto::UserProfileResponse,
        crate::dto::UpdateProfileRequest,
        crate::dto::LatestInquiryPropertyResponse,
        crate::dto::LatestInquiryResponse,
        crate::dto::DashboardPropertyResponse,
        crate::dto::DashboardOverviewResponse,
        crate::dto::AddFavoriteRequest,
        crate::dto::FavoriteResponse,
        crate::dto::CreateReviewRequest,
        crate::dto::AuthorResponse,
        crate::dto::ReviewResponse,
        crate::dto::SendMessageRequest,
        crate::dto::DirectMessageResponse,
        crate::dto::UploadResponse,
        crate::dto::WebhookResponse,
    )),
    tags(
        (name = "properties", description = "Listings and search"),
        (name = "inquiries", description = "Tenant contact requests"),
        (name = "notifications", description = "In-app notifications"),
        (name = "users", description = "Profile of the signed-in user"),
        (name = "dashboard", description = "Landlord metrics"),
        (name = "favorites", description = "Saved listings"),
        (name = "reviews", description = "Listing reviews"),
        (name = "messages", description = "Direct messages"),
        (name = "uploads", description = "Listing images"),
        (name = "webhooks", description = "Identity provider events"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Identity-provider session token. Also accepted from the __session cookie.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
