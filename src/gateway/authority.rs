//! Ownership and role-precedence authorization.
//!
//! One decision function combines the two grant paths: owning the resource
//! permits unconditionally (no role lookup), otherwise the principal's level
//! must reach the required role's level. Role levels form a total order.

use std::sync::Arc;

use super::error::GatewayError;
use crate::store::{Store, User};

pub struct RoleAuthority {
    store: Arc<dyn Store>,
}

impl RoleAuthority {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Decide whether `principal` may act on a resource owned by
    /// `resource_owner`, requiring `required_role` for non-owners.
    ///
    /// # Errors
    /// `RoleLookupFailure` when the required role cannot be fetched; the
    /// failure is an internal error, never an authorization verdict.
    pub async fn authorize(
        &self,
        principal: &User,
        resource_owner: i64,
        required_role: &str,
    ) -> Result<bool, GatewayError> {
        if principal.id == resource_owner {
            return Ok(true);
        }

        let required = self
            .store
            .get_role_by_name(required_role)
            .await
            .map_err(|err| GatewayError::RoleLookupFailure(err.into()))?;

        Ok(principal.role.level >= required.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::store::{Role, StoreError};

    struct RoleStore {
        roles: HashMap<String, Role>,
    }

    impl RoleStore {
        fn standard() -> Self {
            let roles = [("user", 1), ("moderator", 2), ("admin", 3)]
                .into_iter()
                .enumerate()
                .map(|(idx, (name, level))| {
                    (
                        name.to_string(),
                        Role {
                            id: idx as i64 + 1,
                            name: name.to_string(),
                            level,
                            description: None,
                        },
                    )
                })
                .collect();
            Self { roles }
        }
    }

    #[async_trait]
    impl Store for RoleStore {
        async fn get_user_by_id(&self, _id: i64) -> Result<User, StoreError> {
            Err(StoreError::NotFound)
        }

        async fn get_role_by_name(&self, name: &str) -> Result<Role, StoreError> {
            self.roles.get(name).cloned().ok_or(StoreError::NotFound)
        }
    }

    fn principal(id: i64, level: i32) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            role: Role {
                id: i64::from(level),
                name: format!("level{level}"),
                level,
                description: None,
            },
        }
    }

    #[tokio::test]
    async fn owner_is_permitted_regardless_of_role() -> Result<()> {
        let authority = RoleAuthority::new(Arc::new(RoleStore::standard()));
        let lowly = principal(42, 1);
        assert!(authority.authorize(&lowly, 42, "admin").await?);
        Ok(())
    }

    #[tokio::test]
    async fn ownership_bypass_skips_the_role_lookup() -> Result<()> {
        // The store knows no roles at all; ownership must still permit.
        let authority = RoleAuthority::new(Arc::new(RoleStore {
            roles: HashMap::new(),
        }));
        let owner = principal(7, 1);
        assert!(authority.authorize(&owner, 7, "missing-role").await?);
        Ok(())
    }

    #[tokio::test]
    async fn role_precedence_is_a_total_order() -> Result<()> {
        let authority = RoleAuthority::new(Arc::new(RoleStore::standard()));

        let user = principal(1, 1);
        let moderator = principal(2, 2);
        let admin = principal(3, 3);

        assert!(!authority.authorize(&user, 99, "moderator").await?);
        assert!(authority.authorize(&moderator, 99, "moderator").await?);
        assert!(authority.authorize(&admin, 99, "moderator").await?);
        Ok(())
    }

    #[tokio::test]
    async fn missing_role_is_an_internal_failure_not_a_denial() {
        let authority = RoleAuthority::new(Arc::new(RoleStore {
            roles: HashMap::new(),
        }));
        let user = principal(1, 3);
        assert!(matches!(
            authority.authorize(&user, 99, "moderator").await,
            Err(GatewayError::RoleLookupFailure(_))
        ));
    }
}
