use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use nestly_core::dashboard::{InquiryStamp, LatestInquiry};
use nestly_core::error::AppError;
use nestly_core::models::{
    Inquiry, InquiryStatus, InquiryWithProperty, ListingType, NewInquiry, NewNotification,
    PropertySummary, PropertyType,
};

use crate::db_err;
use crate::notification_repository::insert_notification;

/// Inquiry columns plus the listing summary, aliased to match
/// [`InquiryWithPropertyRow`]. Expects inquiries as `i` and properties as `p`.
const INQUIRY_WITH_PROPERTY_COLUMNS: &str = r#"
    i.*,
    p.title AS property_title, p.thumbnail AS property_thumbnail,
    p.images AS property_images, p.price AS property_price,
    p.currency AS property_currency, p.address AS property_address,
    p.city AS property_city, p.property_type AS property_property_type,
    p.listing_type AS property_listing_type, p.bedrooms AS property_bedrooms,
    p.bathrooms AS property_bathrooms, p.sqft AS property_sqft
"#;

/// Repository for tenant inquiries on listings.
#[derive(Clone)]
pub struct InquiryRepository {
    pool: Pool<Postgres>,
}

impl InquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store an inquiry and notify the listing owner in one transaction.
    pub async fn create_with_notification(
        &self,
        inquiry: &NewInquiry,
        notification: &NewNotification,
    ) -> Result<Inquiry, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, InquiryRow>(
            r#"
            INSERT INTO inquiries (property_id, tenant_name, tenant_email, tenant_phone, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(inquiry.property_id)
        .bind(inquiry.tenant_name.trim())
        .bind(inquiry.tenant_email.trim())
        .bind(&inquiry.tenant_phone)
        .bind(&inquiry.message)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        insert_notification(&mut *tx, notification).await?;
        tx.commit().await.map_err(db_err)?;

        tracing::info!(
            inquiry_id = %row.id,
            property_id = %row.property_id,
            owner_id = %notification.user_id,
            "Inquiry created"
        );
        Ok(row.into())
    }

    /// Inquiries on every listing the owner has, newest first.
    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<InquiryWithProperty>, AppError> {
        let sql = format!(
            "SELECT {INQUIRY_WITH_PROPERTY_COLUMNS} FROM inquiries i \
             JOIN properties p ON p.id = i.property_id \
             WHERE p.owner_id = $1 ORDER BY i.created_at DESC"
        );
        let rows = sqlx::query_as::<_, InquiryWithPropertyRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Fetch an inquiry together with the owner of the listing it targets.
    pub async fn get_with_owner(&self, id: Uuid) -> Result<Option<(Inquiry, Uuid)>, AppError> {
        let row = sqlx::query_as::<_, OwnedInquiryRow>(
            r#"
            SELECT i.*, p.owner_id
            FROM inquiries i
            JOIN properties p ON p.id = i.property_id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| (r.inquiry.into(), r.owner_id)))
    }

    /// Change an inquiry's status, returning it with its listing summary.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: InquiryStatus,
    ) -> Result<Option<InquiryWithProperty>, AppError> {
        let sql = format!(
            "WITH i AS (UPDATE inquiries SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *) \
             SELECT {INQUIRY_WITH_PROPERTY_COLUMNS} FROM i \
             JOIN properties p ON p.id = i.property_id"
        );
        let row = sqlx::query_as::<_, InquiryWithPropertyRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM inquiries WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    /// Status and timestamp of every inquiry on the owner's listings.
    pub async fn stamps_for_owner(&self, owner_id: Uuid) -> Result<Vec<InquiryStamp>, AppError> {
        let rows: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT i.status, i.created_at
            FROM inquiries i
            JOIN properties p ON p.id = i.property_id
            WHERE p.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(status, created_at)| InquiryStamp {
                status: status.parse().unwrap_or(InquiryStatus::Pending),
                created_at,
            })
            .collect())
    }

    pub async fn latest_for_owner(
        &self,
        owner_id: Uuid,
        limit: usize,
    ) -> Result<Vec<LatestInquiry>, AppError> {
        let rows = sqlx::query_as::<_, LatestInquiryRow>(
            r#"
            SELECT i.id, i.tenant_name, i.tenant_email, i.message, i.status, i.created_at,
                   p.id AS property_id, p.title AS property_title,
                   p.thumbnail AS property_thumbnail, p.images AS property_images
            FROM inquiries i
            JOIN properties p ON p.id = i.property_id
            WHERE p.owner_id = $1
            ORDER BY i.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct InquiryRow {
    id: Uuid,
    property_id: Uuid,
    tenant_name: String,
    tenant_email: String,
    tenant_phone: Option<String>,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InquiryRow> for Inquiry {
    fn from(row: InquiryRow) -> Self {
        Inquiry {
            id: row.id,
            property_id: row.property_id,
            tenant_name: row.tenant_name,
            tenant_email: row.tenant_email,
            tenant_phone: row.tenant_phone,
            message: row.message,
            status: row.status.parse().unwrap_or(InquiryStatus::Pending),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OwnedInquiryRow {
    #[sqlx(flatten)]
    inquiry: InquiryRow,
    owner_id: Uuid,
}

#[derive(sqlx::FromRow)]
struct InquiryWithPropertyRow {
    #[sqlx(flatten)]
    inquiry: InquiryRow,
    property_title: String,
    property_thumbnail: Option<String>,
    property_images: Vec<String>,
    property_price: f64,
    property_currency: String,
    property_address: String,
    property_city: String,
    property_property_type: String,
    property_listing_type: String,
    property_bedrooms: i32,
    property_bathrooms: i32,
    property_sqft: i32,
}

impl From<InquiryWithPropertyRow> for InquiryWithProperty {
    fn from(row: InquiryWithPropertyRow) -> Self {
        let property = PropertySummary {
            id: row.inquiry.property_id,
            title: row.property_title,
            thumbnail: row.property_thumbnail,
            images: row.property_images,
            price: row.property_price,
            currency: row.property_currency,
            address: row.property_address,
            city: row.property_city,
            property_type: row
                .property_property_type
                .parse()
                .unwrap_or(PropertyType::Apartment),
            listing_type: row.property_listing_type.parse().unwrap_or(ListingType::Rent),
            bedrooms: row.property_bedrooms,
            bathrooms: row.property_bathrooms,
            sqft: row.property_sqft,
        };
        InquiryWithProperty {
            inquiry: row.inquiry.into(),
            property,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LatestInquiryRow {
    id: Uuid,
    tenant_name: String,
    tenant_email: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    property_id: Uuid,
    property_title: String,
    property_thumbnail: Option<String>,
    property_images: Vec<String>,
}

impl From<LatestInquiryRow> for LatestInquiry {
    fn from(row: LatestInquiryRow) -> Self {
        LatestInquiry {
            id: row.id,
            tenant_name: row.tenant_name,
            tenant_email: row.tenant_email,
            message: row.message,
            status: row.status.parse().unwrap_or(InquiryStatus::Pending),
            created_at: row.created_at,
            property_id: row.property_id,
            property_title: row.property_title,
            property_thumbnail: row.property_thumbnail,
            property_images: row.property_images,
        }
    }
}
