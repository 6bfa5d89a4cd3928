//! Cache-aside identity resolution.
//!
//! Flow Overview:
//! 1) With caching disabled, fetch straight from the system of record.
//! 2) Otherwise consult the identity cache; a hit never touches the store.
//! 3) On a miss, fetch from the store and populate the cache before
//!    returning. A failed population write fails the whole resolution: the
//!    cache is part of the consistency contract, not a best-effort layer.
//!
//! Repeated resolutions of the same identity therefore converge to at most
//! one store read per cache-freshness window.

use std::sync::Arc;
use tracing::debug;

use super::cache::ProfileCache;
use super::error::GatewayError;
use crate::store::{Store, StoreError, User};

pub struct IdentityResolver {
    store: Arc<dyn Store>,
    cache: Arc<dyn ProfileCache>,
    cache_enabled: bool,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, cache: Arc<dyn ProfileCache>, cache_enabled: bool) -> Self {
        Self {
            store,
            cache,
            cache_enabled,
        }
    }

    /// Resolve a principal by numeric identity.
    ///
    /// # Errors
    /// `NotFound` when the store has no such identity, `CacheUnavailable`
    /// when the cache cannot be read or populated, `StoreUnavailable` when
    /// the system of record cannot answer.
    pub async fn resolve(&self, id: i64) -> Result<User, GatewayError> {
        if !self.cache_enabled {
            return self.fetch(id).await;
        }

        let cached = self
            .cache
            .get(id)
            .await
            .map_err(GatewayError::CacheUnavailable)?;
        if let Some(user) = cached {
            return Ok(user);
        }

        let user = self.fetch(id).await?;
        self.cache
            .set(&user)
            .await
            .map_err(GatewayError::CacheUnavailable)?;
        debug!(id, "profile cache populated");
        Ok(user)
    }

    async fn fetch(&self, id: i64) -> Result<User, GatewayError> {
        self.store.get_user_by_id(id).await.map_err(|err| match err {
            StoreError::NotFound => GatewayError::NotFound,
            other => GatewayError::StoreUnavailable(other.into()),
        })
    }
}
