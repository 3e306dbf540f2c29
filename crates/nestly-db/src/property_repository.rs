use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use nestly_core::dashboard::PropertyStats;
use nestly_core::error::AppError;
use nestly_core::models::{
    ListingType, NewProperty, OwnerContact, OwnerSummary, Property, PropertyChanges,
    PropertyDetail, PropertyListing, PropertyStatus, PropertyType,
};
use nestly_core::search::{CountFilter, PropertySearch};

use crate::db_err;
use crate::review_repository::ReviewRepository;

/// Owner columns joined onto listing queries, aliased to match [`ListingRow`].
pub(crate) const OWNER_SUMMARY_COLUMNS: &str =
    "u.first_name AS owner_first_name, u.last_name AS owner_last_name, u.avatar AS owner_avatar";

/// Repository for property listings.
#[derive(Clone)]
pub struct PropertyRepository {
    pool: Pool<Postgres>,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the public listing search. Only active listings are returned,
    /// newest first.
    pub async fn search(&self, search: &PropertySearch) -> Result<Vec<PropertyListing>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT p.*, {OWNER_SUMMARY_COLUMNS} FROM properties p \
             JOIN users u ON u.id = p.owner_id WHERE p.status = "
        ));
        qb.push_bind(PropertyStatus::Active.as_str());

        if let Some(pattern) = search.text_pattern() {
            qb.push(" AND (p.city ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.location ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(min) = search.min_price {
            qb.push(" AND p.price >= ").push_bind(min);
        }
        if let Some(max) = search.max_price {
            qb.push(" AND p.price <= ").push_bind(max);
        }
        if let Some(property_type) = search.property_type {
            qb.push(" AND p.property_type = ")
                .push_bind(property_type.as_str());
        }
        if let Some(listing_type) = search.listing_type {
            qb.push(" AND p.listing_type = ")
                .push_bind(listing_type.as_str());
        }
        push_count_filter(&mut qb, "p.bedrooms", search.bedrooms);
        push_count_filter(&mut qb, "p.bathrooms", search.bathrooms);
        if !search.amenities.is_empty() {
            qb.push(" AND p.amenities @> ")
                .push_bind(search.amenities.clone());
        }

        qb.push(" ORDER BY p.created_at DESC LIMIT ")
            .push_bind(search.limit as i64);

        let rows = qb
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        tracing::debug!(results = rows.len(), "Property search completed");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let row = sqlx::query_as::<_, PropertyRow>(r#"SELECT * FROM properties WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Listing with owner contact details and reviews, for the detail page.
    pub async fn get_detail(&self, id: Uuid) -> Result<Option<PropertyDetail>, AppError> {
        let row = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT p.*,
                   u.first_name AS owner_first_name, u.last_name AS owner_last_name,
                   u.avatar AS owner_avatar, u.phone AS owner_phone, u.email AS owner_email
            FROM properties p
            JOIN users u ON u.id = p.owner_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviews = ReviewRepository::new(self.pool.clone())
            .list_for_property(id)
            .await?;

        let owner = OwnerContact {
            id: row.property.owner_id,
            first_name: row.owner_first_name,
            last_name: row.owner_last_name,
            avatar: row.owner_avatar,
            phone: row.owner_phone,
            email: row.owner_email,
        };

        Ok(Some(PropertyDetail {
            property: row.property.into(),
            owner,
            reviews,
        }))
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        property: &NewProperty,
    ) -> Result<PropertyListing, AppError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO properties (
                    owner_id, title, description, price, currency, address, location, city,
                    state, zip_code, country, latitude, longitude, property_type, listing_type,
                    bedrooms, bathrooms, sqft, amenities, images, thumbnail, available,
                    available_from, status
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                        $16, $17, $18, $19, $20, $21, $22, $23, $24)
                RETURNING *
            )
            SELECT p.*, {OWNER_SUMMARY_COLUMNS}
            FROM inserted p
            JOIN users u ON u.id = p.owner_id
            "#
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(owner_id)
            .bind(&property.title)
            .bind(&property.description)
            .bind(property.price)
            .bind(&property.currency)
            .bind(&property.address)
            .bind(&property.location)
            .bind(&property.city)
            .bind(&property.state)
            .bind(&property.zip_code)
            .bind(&property.country)
            .bind(property.latitude)
            .bind(property.longitude)
            .bind(property.property_type.as_str())
            .bind(property.listing_type.as_str())
            .bind(property.bedrooms)
            .bind(property.bathrooms)
            .bind(property.sqft)
            .bind(&property.amenities)
            .bind(&property.images)
            .bind(&property.thumbnail)
            .bind(property.available)
            .bind(property.available_from)
            .bind(property.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        tracing::info!(property_id = %row.property.id, %owner_id, "Property created");
        Ok(row.into())
    }

    /// Apply a partial update. Returns `None` if the listing does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        changes: &PropertyChanges,
    ) -> Result<Option<PropertyListing>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "WITH updated AS (UPDATE properties SET updated_at = NOW()",
        );

        macro_rules! set {
            ($column:literal, $value:expr) => {
                if let Some(value) = $value {
                    qb.push(concat!(", ", $column, " = ")).push_bind(value);
                }
            };
        }

        set!("title", changes.title.clone());
        set!("description", changes.description.clone());
        set!("price", changes.price);
        set!("currency", changes.currency.clone());
        set!("address", changes.address.clone());
        set!("location", changes.location.clone());
        set!("city", changes.city.clone());
        set!("state", changes.state.clone());
        set!("zip_code", changes.zip_code.clone());
        set!("country", changes.country.clone());
        set!("latitude", changes.latitude);
        set!("longitude", changes.longitude);
        set!("property_type", changes.property_type.map(|t| t.as_str()));
        set!("listing_type", changes.listing_type.map(|t| t.as_str()));
        set!("bedrooms", changes.bedrooms);
        set!("bathrooms", changes.bathrooms);
        set!("sqft", changes.sqft);
        set!("amenities", changes.amenities.clone());
        set!("images", changes.images.clone());
        set!("thumbnail", changes.thumbnail.clone());
        set!("available", changes.available);
        set!("available_from", changes.available_from);
        set!("status", changes.status.map(|s| s.as_str()));

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(
            " RETURNING *) SELECT p.*, {OWNER_SUMMARY_COLUMNS} FROM updated p \
             JOIN users u ON u.id = p.owner_id"
        ));

        let row = qb
            .build_query_as::<ListingRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Delete a listing (inquiries, favorites and reviews cascade).
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM properties WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    /// An owner's listings, newest first, optionally capped.
    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<PropertyListing>, AppError> {
        let sql = format!(
            "SELECT p.*, {OWNER_SUMMARY_COLUMNS} FROM properties p \
             JOIN users u ON u.id = p.owner_id \
             WHERE p.owner_id = $1 \
             ORDER BY p.created_at DESC \
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(owner_id)
            .bind(limit.map(|l| l as i64))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// An owner's listings with inquiry and favorite counts.
    pub async fn stats_for_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyStats>, AppError> {
        let rows = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT p.id, p.title, p.price, p.currency, p.status, p.listing_type,
                   p.thumbnail, p.images, p.address, p.city, p.created_at,
                   (SELECT COUNT(*) FROM inquiries i WHERE i.property_id = p.id) AS inquiry_count,
                   (SELECT COUNT(*) FROM favorites f WHERE f.property_id = p.id) AS favorite_count
            FROM properties p
            WHERE p.owner_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn push_count_filter(qb: &mut QueryBuilder<'_, Postgres>, column: &str, filter: Option<CountFilter>) {
    match filter {
        Some(CountFilter::Exactly(n)) => {
            qb.push(format!(" AND {column} = ")).push_bind(n);
        }
        Some(CountFilter::AtLeast(n)) => {
            qb.push(format!(" AND {column} >= ")).push_bind(n);
        }
        None => {}
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
pub(crate) struct PropertyRow {
    pub(crate) id: Uuid,
    pub(crate) owner_id: Uuid,
    title: String,
    description: Option<String>,
    price: f64,
    currency: String,
    address: String,
    location: Option<String>,
    city: String,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    property_type: String,
    listing_type: String,
    bedrooms: i32,
    bathrooms: i32,
    sqft: i32,
    amenities: Vec<String>,
    images: Vec<String>,
    thumbnail: Option<String>,
    available: bool,
    available_from: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            price: row.price,
            currency: row.currency,
            address: row.address,
            location: row.location,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
            latitude: row.latitude,
            longitude: row.longitude,
            property_type: row.property_type.parse().unwrap_or(PropertyType::Apartment),
            listing_type: row.listing_type.parse().unwrap_or(ListingType::Rent),
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            sqft: row.sqft,
            amenities: row.amenities,
            images: row.images,
            thumbnail: row.thumbnail,
            available: row.available,
            available_from: row.available_from,
            status: row.status.parse().unwrap_or(PropertyStatus::Inactive),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ListingRow {
    #[sqlx(flatten)]
    pub(crate) property: PropertyRow,
    owner_first_name: String,
    owner_last_name: String,
    owner_avatar: Option<String>,
}

impl From<ListingRow> for PropertyListing {
    fn from(row: ListingRow) -> Self {
        let owner = OwnerSummary {
            id: row.property.owner_id,
            first_name: row.owner_first_name,
            last_name: row.owner_last_name,
            avatar: row.owner_avatar,
        };
        PropertyListing {
            property: row.property.into(),
            owner,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    property: PropertyRow,
    owner_first_name: String,
    owner_last_name: String,
    owner_avatar: Option<String>,
    owner_phone: Option<String>,
    owner_email: String,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    id: Uuid,
    title: String,
    price: f64,
    currency: String,
    status: String,
    listing_type: String,
    thumbnail: Option<String>,
    images: Vec<String>,
    address: String,
    city: String,
    created_at: DateTime<Utc>,
    inquiry_count: i64,
    favorite_count: i64,
}

impl From<StatsRow> for PropertyStats {
    fn from(row: StatsRow) -> Self {
        PropertyStats {
            id: row.id,
            title: row.title,
            price: row.price,
            currency: row.currency,
            status: row.status.parse().unwrap_or(PropertyStatus::Inactive),
            listing_type: row.listing_type.parse().unwrap_or(ListingType::Rent),
            thumbnail: row.thumbnail,
            images: row.images,
            address: row.address,
            city: row.city,
            created_at: row.created_at,
            inquiry_count: row.inquiry_count,
            favorite_count: row.favorite_count,
        }
    }
}
