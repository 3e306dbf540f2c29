use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nestly_core::AppError;
use nestly_core::dashboard::{DashboardOverview, LatestInquiry, PropertyRow};
use nestly_core::models::{
    Favorite, FavoriteListing, Inquiry, InquiryWithProperty, ListingType, Message, NewProperty,
    Notification, OwnerContact, OwnerSummary, ProfileChanges, Property, PropertyChanges,
    PropertyDetail, PropertyListing, PropertyStatus, PropertySummary, PropertyType, Review,
    ReviewWithAuthor, User, UserProfile,
};

fn parse_field<T>(value: Option<String>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = AppError>,
{
    value.map(|v| v.parse()).transpose()
}

/// Keeps an explicit JSON `null` apart from an absent key: absent stays
/// `None` through `#[serde(default)]`, `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Common
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummaryResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

impl From<OwnerSummary> for OwnerSummaryResponse {
    fn from(o: OwnerSummary) -> Self {
        Self {
            id: o.id,
            first_name: o.first_name,
            last_name: o.last_name,
            avatar: o.avatar,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerContactResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub email: String,
}

impl From<OwnerContact> for OwnerContactResponse {
    fn from(o: OwnerContact) -> Self {
        Self {
            id: o.id,
            first_name: o.first_name,
            last_name: o.last_name,
            avatar: o.avatar,
            phone: o.phone,
            email: o.email,
        }
    }
}

/// Listing columns as exposed over the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFields {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub address: String,
    pub location: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "type")]
    pub property_type: String,
    pub listing_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub sqft: i32,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
    pub available: bool,
    pub available_from: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Property> for PropertyFields {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            title: p.title,
            description: p.description,
            price: p.price,
            currency: p.currency,
            address: p.address,
            location: p.location,
            city: p.city,
            state: p.state,
            zip_code: p.zip_code,
            country: p.country,
            latitude: p.latitude,
            longitude: p.longitude,
            property_type: p.property_type.to_string(),
            listing_type: p.listing_type.to_string(),
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            sqft: p.sqft,
            amenities: p.amenities,
            images: p.images,
            thumbnail: p.thumbnail,
            available: p.available,
            available_from: p.available_from,
            status: p.status.to_string(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PropertyResponse {
    #[serde(flatten)]
    pub property: PropertyFields,
    pub owner: OwnerSummaryResponse,
}

impl From<PropertyListing> for PropertyResponse {
    fn from(l: PropertyListing) -> Self {
        Self {
            property: l.property.into(),
            owner: l.owner.into(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PropertyDetailResponse {
    #[serde(flatten)]
    pub property: PropertyFields,
    pub owner: OwnerContactResponse,
    pub reviews: Vec<ReviewResponse>,
}

impl From<PropertyDetail> for PropertyDetailResponse {
    fn from(d: PropertyDetail) -> Self {
        Self {
            property: d.property.into(),
            owner: d.owner.into(),
            reviews: d.reviews.into_iter().map(ReviewResponse::from).collect(),
        }
    }
}

/// Query parameters accepted by the listing search. Parsed from the raw
/// query string so `amenities` may repeat.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct SearchQuery {
    /// Case-insensitive substring of city, title or location.
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Property type, e.g. `APARTMENT`.
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    /// `RENT` or `SALE`.
    pub listing_type: Option<String>,
    /// `N` for exactly N, `N+` for at least N.
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    /// Repeatable and/or comma separated; listings must have all of them.
    pub amenities: Option<Vec<String>>,
    /// Default 50, at most 100.
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[schema(required = true)]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(required = true)]
    pub price: Option<f64>,
    pub currency: Option<String>,
    #[schema(required = true)]
    pub address: Option<String>,
    pub location: Option<String>,
    #[schema(required = true)]
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub sqft: Option<i32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
    pub available: Option<bool>,
    pub available_from: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl TryFrom<CreatePropertyRequest> for NewProperty {
    type Error = AppError;

    fn try_from(r: CreatePropertyRequest) -> Result<Self, AppError> {
        let text = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        let property = NewProperty {
            title: text(r.title),
            description: r.description,
            price: r.price.ok_or_else(|| AppError::validation("price is required"))?,
            currency: r.currency.unwrap_or_else(|| "$".to_string()),
            address: text(r.address),
            location: r.location,
            city: text(r.city),
            state: r.state,
            zip_code: r.zip_code,
            country: r.country,
            latitude: r.latitude,
            longitude: r.longitude,
            property_type: parse_field(r.property_type)?.unwrap_or(PropertyType::Apartment),
            listing_type: parse_field(r.listing_type)?.unwrap_or(ListingType::Rent),
            bedrooms: r.bedrooms.unwrap_or(0),
            bathrooms: r.bathrooms.unwrap_or(0),
            sqft: r.sqft.unwrap_or(0),
            amenities: r.amenities,
            images: r.images,
            thumbnail: r.thumbnail,
            available: r.available.unwrap_or(true),
            available_from: r.available_from,
            status: parse_field(r.status)?.unwrap_or(PropertyStatus::Active),
        };
        property.validate()?;
        Ok(property)
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    pub city: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub zip_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<f64>)]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<f64>)]
    pub longitude: Option<Option<f64>>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub sqft: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub thumbnail: Option<Option<String>>,
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub available_from: Option<Option<DateTime<Utc>>>,
    pub status: Option<String>,
}

impl TryFrom<UpdatePropertyRequest> for PropertyChanges {
    type Error = AppError;

    fn try_from(r: UpdatePropertyRequest) -> Result<Self, AppError> {
        let changes = PropertyChanges {
            title: r.title,
            description: r.description,
            price: r.price,
            currency: r.currency,
            address: r.address,
            location: r.location,
            city: r.city,
            state: r.state,
            zip_code: r.zip_code,
            country: r.country,
            latitude: r.latitude,
            longitude: r.longitude,
            property_type: parse_field(r.property_type)?,
            listing_type: parse_field(r.listing_type)?,
            bedrooms: r.bedrooms,
            bathrooms: r.bathrooms,
            sqft: r.sqft,
            amenities: r.amenities,
            images: r.images,
            thumbnail: r.thumbnail,
            available: r.available,
            available_from: r.available_from,
            status: parse_field(r.status)?,
        };
        changes.validate()?;
        Ok(changes)
    }
}

// ---------------------------------------------------------------------------
// Inquiries
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub price: f64,
    pub currency: String,
    pub address: String,
    pub city: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub listing_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub sqft: i32,
}

impl From<PropertySummary> for PropertySummaryResponse {
    fn from(p: PropertySummary) -> Self {
        Self {
            id: p.id,
            title: p.title,
            thumbnail: p.thumbnail,
            images: p.images,
            price: p.price,
            currency: p.currency,
            address: p.address,
            city: p.city,
            property_type: p.property_type.to_string(),
            listing_type: p.listing_type.to_string(),
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            sqft: p.sqft,
        }
    }
}

impl From<&Property> for PropertySummaryResponse {
    fn from(p: &Property) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            thumbnail: p.thumbnail.clone(),
            images: p.images.clone(),
            price: p.price,
            currency: p.currency.clone(),
            address: p.address.clone(),
            city: p.city.clone(),
            property_type: p.property_type.to_string(),
            listing_type: p.listing_type.to_string(),
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            sqft: p.sqft,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_name: String,
    pub tenant_email: String,
    pub tenant_phone: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertySummaryResponse>,
}

impl From<Inquiry> for InquiryResponse {
    fn from(i: Inquiry) -> Self {
        Self {
            id: i.id,
            property_id: i.property_id,
            tenant_name: i.tenant_name,
            tenant_email: i.tenant_email,
            tenant_phone: i.tenant_phone,
            message: i.message,
            status: i.status.to_string(),
            created_at: i.created_at,
            updated_at: i.updated_at,
            property: None,
        }
    }
}

impl From<InquiryWithProperty> for InquiryResponse {
    fn from(i: InquiryWithProperty) -> Self {
        Self {
            property: Some(i.property.into()),
            ..i.inquiry.into()
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryRequest {
    pub property_id: Option<Uuid>,
    pub tenant_name: Option<String>,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateInquiryRequest {
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            title: n.title,
            message: n.message,
            kind: n.kind.to_string(),
            link: n.link,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationsRequest {
    #[serde(default)]
    pub mark_all_read: bool,
    pub notification_id: Option<Uuid>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MarkAllReadResponse {
    pub success: bool,
    pub message: String,
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub clerk_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            clerk_id: u.clerk_id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role.to_string(),
            phone: u.phone,
            bio: u.bio,
            avatar: u.avatar,
            email_notifications: u.email_notifications,
            sms_notifications: u.sms_notifications,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub properties: Vec<PropertyFields>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            user: p.user.into(),
            properties: p.properties.into_iter().map(PropertyFields::from).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub avatar: Option<Option<String>>,
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    /// Only honoured by `PUT /api/users/me`.
    pub role: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileChanges {
    type Error = AppError;

    fn try_from(r: UpdateProfileRequest) -> Result<Self, AppError> {
        Ok(ProfileChanges {
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            bio: r.bio,
            avatar: r.avatar,
            email_notifications: r.email_notifications,
            sms_notifications: r.sms_notifications,
            role: parse_field(r.role)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LatestInquiryPropertyResponse {
    pub id: Uuid,
    pub title: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestInquiryResponse {
    pub id: Uuid,
    pub tenant_name: String,
    pub tenant_email: String,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub property: LatestInquiryPropertyResponse,
}

impl From<LatestInquiry> for LatestInquiryResponse {
    fn from(i: LatestInquiry) -> Self {
        Self {
            id: i.id,
            tenant_name: i.tenant_name,
            tenant_email: i.tenant_email,
            message: i.message,
            status: i.status.to_string(),
            created_at: i.created_at,
            property: LatestInquiryPropertyResponse {
                id: i.property_id,
                title: i.property_title,
                thumbnail: i.property_thumbnail,
                images: i.property_images,
            },
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPropertyResponse {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub currency: String,
    pub status: String,
    pub listing_type: String,
    pub thumbnail: Option<String>,
    pub address: String,
    pub city: String,
    pub inquiry_count: i64,
    pub favorite_count: i64,
}

impl From<PropertyRow> for DashboardPropertyResponse {
    fn from(p: PropertyRow) -> Self {
        Self {
            id: p.id,
            title: p.title,
            price: p.price,
            currency: p.currency,
            status: p.status.to_string(),
            listing_type: p.listing_type.to_string(),
            thumbnail: p.thumbnail,
            address: p.address,
            city: p.city,
            inquiry_count: p.inquiry_count,
            favorite_count: p.favorite_count,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverviewResponse {
    pub total_properties: usize,
    pub active_properties: usize,
    pub rented_properties: usize,
    pub vacant_properties: usize,
    pub total_monthly_revenue: f64,
    /// Rented share of all listings, as a rounded percentage.
    pub occupancy_rate: u32,
    pub total_inquiries: usize,
    pub pending_inquiries: usize,
    /// Inquiries received in the last 7 days.
    pub recent_inquiries: usize,
    pub total_favorites: i64,
    pub for_rent_count: usize,
    pub for_sale_count: usize,
    pub latest_inquiries: Vec<LatestInquiryResponse>,
    pub properties: Vec<DashboardPropertyResponse>,
}

impl From<DashboardOverview> for DashboardOverviewResponse {
    fn from(d: DashboardOverview) -> Self {
        Self {
            total_properties: d.total_properties,
            active_properties: d.active_properties,
            rented_properties: d.rented_properties,
            vacant_properties: d.vacant_properties,
            total_monthly_revenue: d.total_monthly_revenue,
            occupancy_rate: d.occupancy_rate,
            total_inquiries: d.total_inquiries,
            pending_inquiries: d.pending_inquiries,
            recent_inquiries: d.recent_inquiries,
            total_favorites: d.total_favorites,
            for_rent_count: d.for_rent_count,
            for_sale_count: d.for_sale_count,
            latest_inquiries: d
                .latest_inquiries
                .into_iter()
                .map(LatestInquiryResponse::from)
                .collect(),
            properties: d
                .properties
                .into_iter()
                .map(DashboardPropertyResponse::from)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyResponse>,
}

impl From<Favorite> for FavoriteResponse {
    fn from(f: Favorite) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            property_id: f.property_id,
            created_at: f.created_at,
            property: None,
        }
    }
}

impl From<FavoriteListing> for FavoriteResponse {
    fn from(f: FavoriteListing) -> Self {
        Self {
            property: Some(f.listing.into()),
            ..f.favorite.into()
        }
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorResponse>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            property_id: r.property_id,
            author_id: r.author_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            author: None,
        }
    }
}

impl From<ReviewWithAuthor> for ReviewResponse {
    fn from(r: ReviewWithAuthor) -> Self {
        Self {
            author: Some(AuthorResponse {
                first_name: r.author.first_name,
                last_name: r.author.last_name,
                avatar: r.author.avatar,
            }),
            ..r.review.into()
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub property_id: Option<Uuid>,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for DirectMessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            property_id: m.property_id,
            content: m.content,
            is_read: m.is_read,
            created_at: m.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Uploads & webhooks
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Original file name; sanitized before use.
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub path: String,
    pub url: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}
