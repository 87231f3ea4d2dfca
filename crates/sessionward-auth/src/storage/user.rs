//! User storage trait.
//!
//! Defines the interface for user persistence operations. The token core
//! only ever reads users; registration is the sole writer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::types::OwnerId;

// =============================================================================
// User Type
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier, used as the bundle owner.
    pub id: OwnerId,

    /// Unique login name, also used as display name.
    pub username: String,

    /// Argon2 PHC hash of the password.
    ///
    /// Never expose this field through an API.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Builds a new user record with a fresh identity.
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: OwnerId::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Storage trait for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user.
    ///
    /// # Errors
    ///
    /// Returns `UserExists` if the username is taken, or a store error.
    async fn create(&self, user: &User) -> AuthResult<User>;

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Finds a user by identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: OwnerId) -> AuthResult<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("alice_smith", "$argon2id$v=19$secret");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice_smith");
        assert!(json.get("passwordHash").is_none());
    }
}
