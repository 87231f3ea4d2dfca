//! Credential bundle storage.
//!
//! One row per user in `auth_tokens`. Upserts are a single
//! `INSERT .. ON CONFLICT (user_id) DO UPDATE`, so a bundle is replaced as a
//! whole and readers never see a mix of old and new secrets.

use sessionward_auth::{CredentialBundle, OwnerId};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::{PgPool, StorageResult, map_unique_violation};

type BundleTuple = (Uuid, String, String, String, OffsetDateTime, OffsetDateTime);

fn from_tuple(row: BundleTuple) -> CredentialBundle {
    CredentialBundle {
        owner_id: OwnerId::from_uuid(row.0),
        access_secret: row.1,
        refresh_secret: row.2,
        anti_forgery_secret: row.3,
        expires_at: row.4,
        created_at: row.5,
    }
}

/// Credential bundle storage operations.
pub struct BundleStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> BundleStorage<'a> {
    /// Create a new bundle storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces the bundle of `bundle.owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a secret is already held by another user, or a
    /// database error.
    #[instrument(skip(self, bundle), fields(owner_id = %bundle.owner_id))]
    pub async fn upsert(&self, bundle: &CredentialBundle) -> StorageResult<()> {
        query(
            r#"
            INSERT INTO auth_tokens
                (user_id, access_token, refresh_token, csrf_token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                csrf_token = EXCLUDED.csrf_token,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(bundle.owner_id.as_uuid())
        .bind(&bundle.access_secret)
        .bind(&bundle.refresh_secret)
        .bind(&bundle.anti_forgery_secret)
        .bind(bundle.expires_at)
        .bind(bundle.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Credential secret"))?;

        Ok(())
    }

    /// Swaps in a rotated bundle while the user still holds its refresh
    /// secret. Returns `false` if no row matched.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the new access secret is held by another user,
    /// or a database error.
    #[instrument(skip(self, bundle), fields(owner_id = %bundle.owner_id))]
    pub async fn replace_rotated(&self, bundle: &CredentialBundle) -> StorageResult<bool> {
        let result = query(
            r#"
            UPDATE auth_tokens SET
                access_token = $2,
                csrf_token = $4,
                expires_at = $5,
                created_at = $6
            WHERE user_id = $1 AND refresh_token = $3
            "#,
        )
        .bind(bundle.owner_id.as_uuid())
        .bind(&bundle.access_secret)
        .bind(&bundle.refresh_secret)
        .bind(&bundle.anti_forgery_secret)
        .bind(bundle.expires_at)
        .bind(bundle.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Credential secret"))?;

        Ok(result.rows_affected() == 1)
    }

    /// Finds the bundle holding an access secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip_all)]
    pub async fn find_by_access_token(
        &self,
        access_token: &str,
    ) -> StorageResult<Option<CredentialBundle>> {
        let row: Option<BundleTuple> = query_as(
            r#"
            SELECT user_id, access_token, refresh_token, csrf_token, expires_at, created_at
            FROM auth_tokens
            WHERE access_token = $1
            "#,
        )
        .bind(access_token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_tuple))
    }

    /// Finds the bundle holding a refresh secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip_all)]
    pub async fn find_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StorageResult<Option<CredentialBundle>> {
        let row: Option<BundleTuple> = query_as(
            r#"
            SELECT user_id, access_token, refresh_token, csrf_token, expires_at, created_at
            FROM auth_tokens
            WHERE refresh_token = $1
            "#,
        )
        .bind(refresh_token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_tuple))
    }

    /// Finds the bundle of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn find_by_user_id(&self, user_id: Uuid) -> StorageResult<Option<CredentialBundle>> {
        let row: Option<BundleTuple> = query_as(
            r#"
            SELECT user_id, access_token, refresh_token, csrf_token, expires_at, created_at
            FROM auth_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_tuple))
    }

    /// Deletes the bundle of a user. Deleting a missing bundle succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    #[instrument(skip(self))]
    pub async fn delete_by_user_id(&self, user_id: Uuid) -> StorageResult<()> {
        query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
