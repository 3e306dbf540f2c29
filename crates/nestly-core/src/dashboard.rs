use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{InquiryStatus, ListingType, PropertyStatus, cover_image};

/// Window for the "recent inquiries" counter.
pub const RECENT_INQUIRY_WINDOW: TimeDelta = TimeDelta::days(7);

/// Number of newest inquiries listed on the overview.
pub const LATEST_INQUIRY_COUNT: usize = 5;

/// A landlord's listing with its engagement counters.
#[derive(Debug, Clone)]
pub struct PropertyStats {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub currency: String,
    pub status: PropertyStatus,
    pub listing_type: ListingType,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub address: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub inquiry_count: i64,
    pub favorite_count: i64,
}

/// Minimal inquiry row used for counting.
#[derive(Debug, Clone)]
pub struct InquiryStamp {
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestInquiry {
    pub id: Uuid,
    pub tenant_name: String,
    pub tenant_email: String,
    pub message: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub property_id: Uuid,
    pub property_title: String,
    pub property_thumbnail: Option<String>,
    pub property_images: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyRow {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub currency: String,
    pub status: PropertyStatus,
    pub listing_type: ListingType,
    pub thumbnail: Option<String>,
    pub address: String,
    pub city: String,
    pub inquiry_count: i64,
    pub favorite_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub total_properties: usize,
    pub active_properties: usize,
    pub rented_properties: usize,
    pub vacant_properties: usize,
    pub total_monthly_revenue: f64,
    pub occupancy_rate: u32,
    pub total_inquiries: usize,
    pub pending_inquiries: usize,
    pub recent_inquiries: usize,
    pub total_favorites: i64,
    pub for_rent_count: usize,
    pub for_sale_count: usize,
    pub latest_inquiries: Vec<LatestInquiry>,
    pub properties: Vec<PropertyRow>,
}

/// Aggregate a landlord's listings and inquiries into dashboard metrics.
///
/// Revenue counts listings that are either active or rented. Vacant equals
/// active. Occupancy is rented / total as a rounded percentage.
pub fn summarize(
    properties: Vec<PropertyStats>,
    inquiries: &[InquiryStamp],
    latest_inquiries: Vec<LatestInquiry>,
    now: DateTime<Utc>,
) -> DashboardOverview {
    let total_properties = properties.len();
    let count_status = |status: PropertyStatus| {
        properties.iter().filter(|p| p.status == status).count()
    };
    let active_properties = count_status(PropertyStatus::Active);
    let rented_properties = count_status(PropertyStatus::Rented);

    let total_monthly_revenue = properties
        .iter()
        .filter(|p| matches!(p.status, PropertyStatus::Active | PropertyStatus::Rented))
        .map(|p| p.price)
        .sum();

    let occupancy_rate = if total_properties > 0 {
        ((rented_properties as f64 / total_properties as f64) * 100.0).round() as u32
    } else {
        0
    };

    let since = now - RECENT_INQUIRY_WINDOW;

    DashboardOverview {
        total_properties,
        active_properties,
        rented_properties,
        vacant_properties: active_properties,
        total_monthly_revenue,
        occupancy_rate,
        total_inquiries: inquiries.len(),
        pending_inquiries: inquiries
            .iter()
            .filter(|i| i.status == InquiryStatus::Pending)
            .count(),
        recent_inquiries: inquiries.iter().filter(|i| i.created_at >= since).count(),
        total_favorites: properties.iter().map(|p| p.favorite_count).sum(),
        for_rent_count: properties
            .iter()
            .filter(|p| p.listing_type == ListingType::Rent)
            .count(),
        for_sale_count: properties
            .iter()
            .filter(|p| p.listing_type == ListingType::Sale)
            .count(),
        latest_inquiries: latest_inquiries
            .into_iter()
            .take(LATEST_INQUIRY_COUNT)
            .collect(),
        properties: properties.into_iter().map(PropertyRow::from).collect(),
    }
}

impl From<PropertyStats> for PropertyRow {
    fn from(p: PropertyStats) -> Self {
        let thumbnail = cover_image(p.thumbnail.as_deref(), &p.images).map(str::to_string);
        Self {
            id: p.id,
            title: p.title,
            price: p.price,
            currency: p.currency,
            status: p.status,
            listing_type: p.listing_type,
            thumbnail,
            address: p.address,
            city: p.city,
            inquiry_count: p.inquiry_count,
            favorite_count: p.favorite_count,
        }
    }
}
