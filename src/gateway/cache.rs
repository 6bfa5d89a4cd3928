//! Identity cache backed by a remote cache store.
//!
//! Profiles are cached as JSON snapshots under `user:{id}` with a TTL, one
//! entry per identity, last-writer-wins. The capability is a trait so the
//! resolver can run against an in-memory fake in tests; when caching is
//! administratively disabled the wiring installs [`NullProfileCache`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tracing::debug;

use crate::store::User;

#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// Look up a cached profile snapshot.
    ///
    /// # Errors
    /// Returns an error when the cache store cannot be reached or the cached
    /// payload cannot be decoded.
    async fn get(&self, id: i64) -> Result<Option<User>>;

    /// Write (or overwrite) the snapshot for `user.id`.
    ///
    /// # Errors
    /// Returns an error when the cache store rejects the write.
    async fn set(&self, user: &User) -> Result<()>;
}

/// Redis-backed profile cache.
#[derive(Clone)]
pub struct RedisProfileCache {
    manager: ConnectionManager,
    ttl: Duration,
}

impl RedisProfileCache {
    /// Connect to the cache store. Supports `redis://` and `rediss://` URLs.
    ///
    /// # Errors
    /// Returns an error when the URL is invalid or the initial connection
    /// cannot be established.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(url).context("invalid cache store URL")?;
        let manager = ConnectionManager::new(client)
            .await
            .context("failed to connect to cache store")?;
        Ok(Self { manager, ttl })
    }

    fn key(id: i64) -> String {
        format!("user:{id}")
    }
}

#[async_trait]
impl ProfileCache for RedisProfileCache {
    async fn get(&self, id: i64) -> Result<Option<User>> {
        let mut conn = self.manager.clone();
        let payload: Option<String> = conn
            .get(Self::key(id))
            .await
            .context("cache read failed")?;

        match payload {
            Some(raw) => {
                let user = serde_json::from_str(&raw).context("corrupt cached profile")?;
                Ok(Some(user))
            }
            None => {
                debug!(id, "profile cache miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, user: &User) -> Result<()> {
        let payload = serde_json::to_string(user).context("failed to encode profile")?;
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(Self::key(user.id), payload, self.ttl.as_secs())
            .await
            .context("cache write failed")?;
        Ok(())
    }
}

/// Stand-in used when caching is administratively disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProfileCache;

#[async_trait]
impl ProfileCache for NullProfileCache {
    async fn get(&self, _id: i64) -> Result<Option<User>> {
        Ok(None)
    }

    async fn set(&self, _user: &User) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_are_namespaced_by_identity() {
        assert_eq!(RedisProfileCache::key(42), "user:42");
        assert_eq!(RedisProfileCache::key(-1), "user:-1");
    }

    #[tokio::test]
    async fn null_cache_never_hits_and_accepts_writes() -> Result<()> {
        let cache = NullProfileCache;
        let user = crate::store::User {
            id: 7,
            username: "ghost".to_string(),
            email: "ghost@example.com".to_string(),
            role: crate::store::Role {
                id: 1,
                name: "user".to_string(),
                level: 1,
                description: None,
            },
        };
        cache.set(&user).await?;
        assert!(cache.get(7).await?.is_none());
        Ok(())
    }
}
