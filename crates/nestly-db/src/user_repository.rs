use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use nestly_core::error::AppError;
use nestly_core::models::{IdentityProfile, ProfileChanges, User, UserRole};

use crate::db_err;

/// Repository for marketplace users, keyed locally by UUID and externally
/// by identity-provider id.
#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE clerk_id = $1"#)
            .bind(clerk_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Insert or refresh a user from identity-provider data.
    ///
    /// On update, names and role are only overwritten when the profile
    /// carries them; email is always refreshed.
    pub async fn upsert_identity(&self, profile: &IdentityProfile) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (clerk_id, email, first_name, last_name, role)
            VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, ''), COALESCE($5, 'TENANT'))
            ON CONFLICT (clerk_id) DO UPDATE
            SET email = EXCLUDED.email,
                first_name = COALESCE($3, users.first_name),
                last_name = COALESCE($4, users.last_name),
                role = COALESCE($5, users.role),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&profile.clerk_id)
        .bind(&profile.email)
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(profile.role.map(|r| r.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    /// Apply profile changes. Returns `None` if the user does not exist.
    ///
    /// Each nullable column is bound as a `(present, value)` pair so an
    /// explicit clear can be told apart from "leave unchanged".
    pub async fn update_profile(
        &self,
        clerk_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = CASE WHEN $4 THEN $5 ELSE phone END,
                bio = CASE WHEN $6 THEN $7 ELSE bio END,
                avatar = CASE WHEN $8 THEN $9 ELSE avatar END,
                email_notifications = COALESCE($10, email_notifications),
                sms_notifications = COALESCE($11, sms_notifications),
                role = COALESCE($12, role),
                updated_at = NOW()
            WHERE clerk_id = $1
            RETURNING *
            "#,
        )
        .bind(clerk_id)
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.phone.is_some())
        .bind(changes.phone.clone().flatten())
        .bind(changes.bio.is_some())
        .bind(changes.bio.clone().flatten())
        .bind(changes.avatar.is_some())
        .bind(changes.avatar.clone().flatten())
        .bind(changes.email_notifications)
        .bind(changes.sms_notifications)
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Delete a user and, through cascades, everything they own.
    /// Returns whether a row was removed.
    pub async fn delete_by_clerk_id(&self, clerk_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM users WHERE clerk_id = $1"#)
            .bind(clerk_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    clerk_id: String,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    phone: Option<String>,
    bio: Option<String>,
    avatar: Option<String>,
    email_notifications: bool,
    sms_notifications: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            clerk_id: row.clerk_id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role.parse().unwrap_or(UserRole::Tenant),
            phone: row.phone,
            bio: row.bio,
            avatar: row.avatar,
            email_notifications: row.email_notifications,
            sms_notifications: row.sms_notifications,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
