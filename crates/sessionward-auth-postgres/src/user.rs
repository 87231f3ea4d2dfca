//! User storage.

use sessionward_auth::{OwnerId, User};
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::{PgPool, StorageResult, map_unique_violation};

type UserTuple = (Uuid, String, String, OffsetDateTime, OffsetDateTime);

fn from_tuple(row: UserTuple) -> User {
    User {
        id: OwnerId::from_uuid(row.0),
        username: row.1,
        password_hash: row.2,
        created_at: row.3,
        updated_at: row.4,
    }
}

/// User storage operations.
pub struct UserStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> UserStorage<'a> {
    /// Create a new user storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the username is taken, or a database error.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn create(&self, user: &User) -> StorageResult<User> {
        let row: UserTuple = query_as(
            r#"
            INSERT INTO users (id, username, hashed_password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, hashed_password, created_at, updated_at
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "User"))?;

        Ok(from_tuple(row))
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, username, hashed_password, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_tuple))
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<User>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, username, hashed_password, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_tuple))
    }
}
