//! Typed request-scoped identity context.
//!
//! The resolved principal travels as a [`CurrentUser`] extension: a
//! collision-resistant typed key, not a string. Handlers extract it directly;
//! later stages read it without re-resolving. [`ResourceOwner`] marks the
//! identity owning the resource a route operates on, attached by the route's
//! resource middleware ahead of the role guard.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use super::error::GatewayError;
use crate::store::User;

/// Principal resolved for the current request. Immutable once attached;
/// cloning shares the same snapshot.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Arc<User>);

impl CurrentUser {
    #[must_use]
    pub fn user(&self) -> &User {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(GatewayError::MissingHeader)
    }
}

/// Identity owning the resource targeted by the current route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceOwner(pub i64);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    use crate::store::Role;

    fn user() -> User {
        User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role {
                id: 1,
                name: "user".to_string(),
                level: 1,
                description: None,
            },
        }
    }

    #[tokio::test]
    async fn extractor_returns_the_attached_principal() -> anyhow::Result<()> {
        let request = Request::builder().uri("/").body(())?;
        let (mut parts, ()) = request.into_parts();
        parts.extensions.insert(CurrentUser(Arc::new(user())));

        let current = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .map_err(|err| anyhow::anyhow!("expected a principal: {err}"))?;
        assert_eq!(current.user().id, 42);
        Ok(())
    }

    #[tokio::test]
    async fn extractor_rejects_when_nothing_was_attached() -> anyhow::Result<()> {
        let request = Request::builder().uri("/").body(())?;
        let (mut parts, ()) = request.into_parts();

        let current = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(current, Err(GatewayError::MissingHeader)));
        Ok(())
    }
}
