use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use nestly_core::error::AppError;
use nestly_core::models::{Message, NewMessage, NewNotification};

use crate::db_err;
use crate::notification_repository::insert_notification;

/// Repository for direct messages between users.
#[derive(Clone)]
pub struct MessageRepository {
    pool: Pool<Postgres>,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a message and notify the receiver in one transaction.
    pub async fn create_with_notification(
        &self,
        message: &NewMessage,
        notification: &NewNotification,
    ) -> Result<Message, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, property_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.property_id)
        .bind(message.content.trim())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        insert_notification(&mut *tx, notification).await?;
        tx.commit().await.map_err(db_err)?;

        tracing::debug!(message_id = %row.id, "Message stored");
        Ok(row.into())
    }

    /// Messages the user sent or received, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT * FROM messages
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    property_id: Option<Uuid>,
    content: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            property_id: row.property_id,
            content: row.content,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}
