//! System-of-record contract consumed by the gateway.
//!
//! The gateway only ever reads two things: a user by numeric identity and a
//! role by name. Both are expressed through the [`Store`] trait so the
//! resolver and role authority can be exercised against in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

mod pg;

pub use pg::PgStore;

/// Privilege tier attached to every user. Levels form a total order;
/// `level >= required.level` is the sole privilege test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub description: Option<String>,
}

/// Identity record resolved for a request. Once attached to request context
/// it is shared read-only; handlers never mutate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable")]
    Unavailable(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch a user (with embedded role) by numeric identity.
    ///
    /// # Errors
    /// `StoreError::NotFound` when no such identity exists,
    /// `StoreError::Unavailable` when the backend cannot answer.
    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError>;

    /// Fetch a role by its unique name.
    ///
    /// # Errors
    /// `StoreError::NotFound` when the role does not exist,
    /// `StoreError::Unavailable` when the backend cannot answer.
    async fn get_role_by_name(&self, name: &str) -> Result<Role, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_snapshot_round_trips_as_json() -> anyhow::Result<()> {
        let user = User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role {
                id: 1,
                name: "user".to_string(),
                level: 1,
                description: None,
            },
        };
        let encoded = serde_json::to_string(&user)?;
        let decoded: User = serde_json::from_str(&encoded)?;
        assert_eq!(decoded, user);
        Ok(())
    }

    #[test]
    fn store_error_display_hides_backend_detail() {
        let err = StoreError::Unavailable(sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), "store unavailable");
    }
}
