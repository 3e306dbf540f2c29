use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Declares a closed set of upper-case string values stored as `TEXT` columns.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(AppError::ValidationError(format!(
                        "Unknown {}: {}",
                        $label, s
                    ))),
                }
            }
        }
    };
}

text_enum! {
    /// Role of a marketplace user.
    UserRole, "user role" {
        Tenant => "TENANT",
        Landlord => "LANDLORD",
    }
}

text_enum! {
    PropertyType, "property type" {
        Apartment => "APARTMENT",
        House => "HOUSE",
        Studio => "STUDIO",
        Condo => "CONDO",
        Townhouse => "TOWNHOUSE",
        Villa => "VILLA",
        Commercial => "COMMERCIAL",
    }
}

text_enum! {
    /// Whether a listing is offered for rent or for sale.
    ListingType, "listing type" {
        Rent => "RENT",
        Sale => "SALE",
    }
}

text_enum! {
    /// Lifecycle of a listing. Only `Active` listings appear in search.
    PropertyStatus, "property status" {
        Active => "ACTIVE",
        Rented => "RENTED",
        Inactive => "INACTIVE",
    }
}

text_enum! {
    InquiryStatus, "inquiry status" {
        Pending => "PENDING",
        Contacted => "CONTACTED",
        Accepted => "ACCEPTED",
        Rejected => "REJECTED",
    }
}

text_enum! {
    NotificationType, "notification type" {
        Info => "INFO",
        Success => "SUCCESS",
        Warning => "WARNING",
        Error => "ERROR",
        Inquiry => "INQUIRY",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Tenant
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    /// Identity-provider user id.
    pub clerk_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_landlord(&self) -> bool {
        self.role == UserRole::Landlord
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A user together with a preview of their listings.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Property {
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
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub sqft: i32,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
    pub available: bool,
    pub available_from: Option<DateTime<Utc>>,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Explicit thumbnail, else the first image.
pub(crate) fn cover_image<'a>(thumbnail: Option<&'a str>, images: &'a [String]) -> Option<&'a str> {
    thumbnail
        .filter(|t| !t.is_empty())
        .or_else(|| images.first().map(String::as_str))
}

/// Public owner fields shown on listing cards.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

/// Owner fields shown on the listing detail page.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerContact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyListing {
    pub property: Property,
    pub owner: OwnerSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetail {
    pub property: Property,
    pub owner: OwnerContact,
    pub reviews: Vec<ReviewWithAuthor>,
}

/// Listing fields embedded in inquiry responses.
#[derive(Debug, Clone, Serialize)]
pub struct PropertySummary {
    pub id: Uuid,
    pub title: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub price: f64,
    pub currency: String,
    pub address: String,
    pub city: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub sqft: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Inquiry {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_name: String,
    pub tenant_email: String,
    pub tenant_phone: Option<String>,
    pub message: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InquiryWithProperty {
    pub inquiry: Inquiry,
    pub property: PropertySummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteListing {
    pub favorite: Favorite,
    pub listing: PropertyListing,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub property_id: Option<Uuid>,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub property_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub author: AuthorSummary,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Profile data for a user as known to the identity provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityProfile {
    pub clerk_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
}

/// Fields a user may change on their own profile.
///
/// `None` leaves a field unchanged. For the nullable fields, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone)]
pub struct NewProperty {
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
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub sqft: i32,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
    pub available: bool,
    pub available_from: Option<DateTime<Utc>>,
    pub status: PropertyStatus,
}

impl NewProperty {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("title", &self.title)?;
        require_text("address", &self.address)?;
        require_text("city", &self.city)?;
        validate_price(self.price)?;
        validate_counts(Some(self.bedrooms), Some(self.bathrooms), Some(self.sqft))
    }
}

/// Partial listing update. `None` leaves the column unchanged and
/// `Some(None)` sets a nullable column to `NULL`.
#[derive(Debug, Clone, Default)]
pub struct PropertyChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub address: Option<String>,
    pub location: Option<Option<String>>,
    pub city: Option<String>,
    pub state: Option<Option<String>>,
    pub zip_code: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub sqft: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub thumbnail: Option<Option<String>>,
    pub available: Option<bool>,
    pub available_from: Option<Option<DateTime<Utc>>>,
    pub status: Option<PropertyStatus>,
}

impl PropertyChanges {
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("title", &self.title),
            ("address", &self.address),
            ("city", &self.city),
        ] {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        validate_counts(self.bedrooms, self.bathrooms, self.sqft)
    }
}

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub property_id: Uuid,
    pub tenant_name: String,
    pub tenant_email: String,
    pub tenant_phone: Option<String>,
    pub message: Option<String>,
}

impl NewInquiry {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("tenantName", &self.tenant_name)?;
        require_text("tenantEmail", &self.tenant_email)?;
        if !looks_like_email(&self.tenant_email) {
            return Err(AppError::validation(format!(
                "tenantEmail is not a valid email address: {}",
                self.tenant_email
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub link: Option<String>,
}

impl NewNotification {
    /// Notice sent to a landlord when a tenant asks about one of their listings.
    pub fn inquiry_received(owner_id: Uuid, property_title: &str, tenant_name: &str) -> Self {
        Self {
            user_id: owner_id,
            title: "New Inquiry Received".to_string(),
            message: format!(
                "You have a new inquiry for \"{property_title}\" from {tenant_name}."
            ),
            kind: NotificationType::Inquiry,
            link: Some("/dashboard/inquiries".to_string()),
        }
    }

    pub fn review_received(owner_id: Uuid, property_title: &str, rating: i32) -> Self {
        Self {
            user_id: owner_id,
            title: "New Review".to_string(),
            message: format!("\"{property_title}\" received a {rating}-star review."),
            kind: NotificationType::Info,
            link: Some("/dashboard/properties".to_string()),
        }
    }

    pub fn message_received(receiver_id: Uuid, sender_name: &str) -> Self {
        Self {
            user_id: receiver_id,
            title: "New Message".to_string(),
            message: format!("You have a new message from {sender_name}."),
            kind: NotificationType::Info,
            link: Some("/dashboard".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub property_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::validation(format!(
                "rating must be between 1 and 5, got {}",
                self.rating
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub property_id: Option<Uuid>,
    pub content: String,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("content", &self.content)?;
        if self.sender_id == self.receiver_id {
            return Err(AppError::validation("Cannot send a message to yourself"));
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation(format!(
            "price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}

fn validate_counts(
    bedrooms: Option<i32>,
    bathrooms: Option<i32>,
    sqft: Option<i32>,
) -> Result<(), AppError> {
    for (field, value) in [("bedrooms", bedrooms), ("bathrooms", bathrooms), ("sqft", sqft)] {
        if let Some(v) = value
            && v < 0
        {
            return Err(AppError::validation(format!(
                "{field} must not be negative, got {v}"
            )));
        }
    }
    Ok(())
}

fn looks_like_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
