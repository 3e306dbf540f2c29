use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use nestly_core::error::AppError;
use nestly_core::models::{Favorite, FavoriteListing};

use crate::db_err;
use crate::property_repository::{ListingRow, OWNER_SUMMARY_COLUMNS};

/// Repository for a user's saved listings.
#[derive(Clone)]
pub struct FavoriteRepository {
    pool: Pool<Postgres>,
}

impl FavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saved listings with owner summaries, most recently saved first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FavoriteListing>, AppError> {
        let sql = format!(
            "SELECT f.id AS favorite_id, f.user_id AS favorite_user_id, \
                    f.created_at AS favorited_at, p.*, {OWNER_SUMMARY_COLUMNS} \
             FROM favorites f \
             JOIN properties p ON p.id = f.property_id \
             JOIN users u ON u.id = p.owner_id \
             WHERE f.user_id = $1 \
             ORDER BY f.created_at DESC"
        );
        let rows = sqlx::query_as::<_, FavoriteListingRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Save a listing. Saving the same listing twice returns the existing
    /// favorite unchanged.
    pub async fn add(&self, user_id: Uuid, property_id: Uuid) -> Result<Favorite, AppError> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            r#"
            INSERT INTO favorites (user_id, property_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, property_id)
            DO UPDATE SET created_at = favorites.created_at
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    pub async fn remove(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query(r#"DELETE FROM favorites WHERE user_id = $1 AND property_id = $2"#)
                .bind(user_id)
                .bind(property_id)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    id: Uuid,
    user_id: Uuid,
    property_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Favorite {
            id: row.id,
            user_id: row.user_id,
            property_id: row.property_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FavoriteListingRow {
    favorite_id: Uuid,
    favorite_user_id: Uuid,
    favorited_at: DateTime<Utc>,
    #[sqlx(flatten)]
    listing: ListingRow,
}

impl From<FavoriteListingRow> for FavoriteListing {
    fn from(row: FavoriteListingRow) -> Self {
        let favorite = Favorite {
            id: row.favorite_id,
            user_id: row.favorite_user_id,
            property_id: row.listing.property.id,
            created_at: row.favorited_at,
        };
        FavoriteListing {
            favorite,
            listing: row.listing.into(),
        }
    }
}
