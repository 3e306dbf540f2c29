use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use nestly_core::error::AppError;
use nestly_core::models::{AuthorSummary, NewNotification, NewReview, Review, ReviewWithAuthor};

use crate::db_err;
use crate::notification_repository::insert_notification;

#[derive(Clone)]
pub struct ReviewRepository {
    pool: Pool<Postgres>,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a review and notify the listing owner in one transaction.
    pub async fn create_with_notification(
        &self,
        review: &NewReview,
        notification: &NewNotification,
    ) -> Result<Review, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (property_id, author_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(review.property_id)
        .bind(review.author_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        insert_notification(&mut *tx, notification).await?;
        tx.commit().await.map_err(db_err)?;

        tracing::info!(review_id = %row.id, property_id = %row.property_id, "Review created");
        Ok(row.into())
    }

    /// Reviews on a listing with author names, newest first.
    pub async fn list_for_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, AppError> {
        let rows = sqlx::query_as::<_, ReviewWithAuthorRow>(
            r#"
            SELECT r.*,
                   u.first_name AS author_first_name, u.last_name AS author_last_name,
                   u.avatar AS author_avatar
            FROM reviews r
            JOIN users u ON u.id = r.author_id
            WHERE r.property_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| ReviewWithAuthor {
                author: AuthorSummary {
                    first_name: row.author_first_name,
                    last_name: row.author_last_name,
                    avatar: row.author_avatar,
                },
                review: row.review.into(),
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    property_id: Uuid,
    author_id: Uuid,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            property_id: row.property_id,
            author_id: row.author_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewWithAuthorRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    author_first_name: String,
    author_last_name: String,
    author_avatar: Option<String>,
}
