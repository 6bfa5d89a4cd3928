//! `PostgreSQL` implementation of the store contract.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::{Role, Store, StoreError, User};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        let query = "
            SELECT users.id, users.username, users.email,
                   roles.id AS role_id, roles.name AS role_name,
                   roles.level AS role_level, roles.description AS role_description
            FROM users
            JOIN roles ON users.role_id = roles.id
            WHERE users.id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            role: Role {
                id: row.get("role_id"),
                name: row.get("role_name"),
                level: row.get("role_level"),
                description: row.get("role_description"),
            },
        })
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Role, StoreError> {
        let query = "SELECT id, name, level, description FROM roles WHERE name = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(name)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(Role {
            id: row.get("id"),
            name: row.get("name"),
            level: row.get("level"),
            description: row.get("description"),
        })
    }
}
