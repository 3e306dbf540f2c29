use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Pool, Postgres};
use uuid::Uuid;

use nestly_core::error::AppError;
use nestly_core::models::{NewNotification, Notification, NotificationType};

use crate::db_err;

/// Repository for in-app notifications.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: Pool<Postgres>,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A user's notifications, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(count.0)
    }

    pub async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError> {
        insert_notification(&self.pool, notification).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let row =
            sqlx::query_as::<_, NotificationRow>(r#"SELECT * FROM notifications WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Mark one of the user's notifications read. Returns `None` when the
    /// notification does not exist or belongs to someone else.
    pub async fn mark_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Mark every unread notification for the user read. Returns how many changed.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE"#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}

/// Insert a notification on any executor, so callers can enlist it in
/// the transaction that produced the event.
pub(crate) async fn insert_notification<'e, E>(
    executor: E,
    notification: &NewNotification,
) -> Result<Notification, AppError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, NotificationRow>(
        r#"
        INSERT INTO notifications (user_id, title, message, kind, link)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(notification.user_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.kind.as_str())
    .bind(&notification.link)
    .fetch_one(executor)
    .await
    .map_err(db_err)?;

    Ok(row.into())
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    message: String,
    kind: String,
    link: Option<String>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            kind: row.kind.parse().unwrap_or(NotificationType::Info),
            link: row.link,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}
