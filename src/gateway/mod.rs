//! Request gateway: admission, credential verification, identity
//! resolution, and authorization, wired as an ordered middleware chain.
//!
//! Flow Overview per request: admission gate → credential extraction
//! (bearer or basic depending on the route class) → claims or static
//! credential verification → cache-aside identity resolution (bearer flow)
//! → typed context attachment → ownership/role guard on sensitive routes →
//! handler. The orchestrator only sequences; each stage owns its decision.

use axum::{
    extract::{ConnectInfo, Extension, Path, Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use crate::config::GatewayConfig;
use crate::store::Store;

pub mod admission;
pub mod authority;
pub mod basic;
pub mod cache;
pub mod claims;
pub mod error;
pub mod principal;
pub mod resolve;

pub use admission::{AdmissionDecision, AdmissionGate, AdmissionSettings, Clock, SystemClock};
pub use basic::StaticCredentials;
pub use cache::{NullProfileCache, ProfileCache, RedisProfileCache};
pub use claims::{Claims, TokenVerifier};
pub use error::GatewayError;
pub use principal::{CurrentUser, ResourceOwner};

const BEARER_SCHEME: &str = "Bearer ";
const BASIC_CHALLENGE: &str = "Basic realm=\"restricted\", charset=\"UTF-8\"";

/// The assembled gateway: explicitly constructed services, injected into the
/// router as one extension. No process-wide state.
#[derive(Clone)]
pub struct Gateway {
    verifier: Arc<TokenVerifier>,
    credentials: Arc<StaticCredentials>,
    resolver: Arc<resolve::IdentityResolver>,
    authority: Arc<authority::RoleAuthority>,
    admission: Arc<AdmissionGate>,
}

impl Gateway {
    #[must_use]
    pub fn new(
        config: &GatewayConfig,
        store: Arc<dyn Store>,
        cache: Arc<dyn ProfileCache>,
    ) -> Self {
        Self {
            verifier: Arc::new(TokenVerifier::new(
                config.token_secret(),
                config.token_issuer().to_string(),
                config.token_audience().to_string(),
                config.token_ttl_seconds(),
            )),
            credentials: Arc::new(StaticCredentials::new(
                config.basic_username().to_string(),
                config.basic_password().clone(),
            )),
            resolver: Arc::new(resolve::IdentityResolver::new(
                store.clone(),
                cache,
                config.cache_enabled(),
            )),
            authority: Arc::new(authority::RoleAuthority::new(store)),
            admission: Arc::new(AdmissionGate::new(config.admission_settings())),
        }
    }

    /// Replace the admission gate, keeping everything else. Used to inject a
    /// deterministic clock.
    #[must_use]
    pub fn with_admission_gate(mut self, gate: AdmissionGate) -> Self {
        self.admission = Arc::new(gate);
        self
    }

    #[must_use]
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn resolver(&self) -> &resolve::IdentityResolver {
        &self.resolver
    }

    #[must_use]
    pub fn authority(&self) -> &authority::RoleAuthority {
        &self.authority
    }
}

/// Admission middleware: every request passes here first, identity unknown.
pub async fn admit(
    Extension(gateway): Extension<Gateway>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let key = client_key(request.headers(), connect_info.map(|info| info.0));
    let decision = gateway.admission.allow(&key);
    if !decision.permitted {
        warn!(client_key = %key, "admission denied");
        return Err(GatewayError::AdmissionDenied {
            retry_after: decision.retry_after,
        });
    }
    Ok(next.run(request).await)
}

/// Bearer authentication middleware: verify the credential, resolve the
/// principal, attach it to request context for everything downstream.
pub async fn authenticate(
    Extension(gateway): Extension<Gateway>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = bearer_token(request.headers())?;
    let claims = gateway.verifier.verify(&token)?;
    let user = match gateway.resolver.resolve(claims.sub).await {
        Ok(user) => user,
        // A validly signed token for an unknown identity must not reveal
        // whether the identity ever existed.
        Err(GatewayError::NotFound) => return Err(GatewayError::InvalidCredentials),
        Err(other) => return Err(other),
    };

    request.extensions_mut().insert(CurrentUser(Arc::new(user)));
    Ok(next.run(request).await)
}

/// Static credential middleware for the ops route class. 401 responses carry
/// a basic-auth challenge.
pub async fn require_basic(
    Extension(gateway): Extension<Gateway>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match gateway.credentials.verify(header) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            let mut response = err.into_response();
            if response.status() == StatusCode::UNAUTHORIZED {
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_CHALLENGE));
            }
            response
        }
    }
}

/// Mark the path identity as the resource owner for profile routes.
pub async fn attach_profile_owner(
    Path(id): Path<i64>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(ResourceOwner(id));
    next.run(request).await
}

/// Ownership/role guard. Reads the typed context attached by earlier stages
/// and asks the role authority for a verdict.
pub async fn enforce_role(
    State((gateway, required_role)): State<(Gateway, &'static str)>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(GatewayError::MissingHeader)?;
    let owner = request
        .extensions()
        .get::<ResourceOwner>()
        .copied()
        .ok_or_else(|| {
            GatewayError::RoleLookupFailure(anyhow::anyhow!(
                "resource owner was not attached ahead of the role guard"
            ))
        })?;

    let permitted = gateway
        .authority
        .authorize(current.user(), owner.0, required_role)
        .await?;

    if permitted {
        Ok(next.run(request).await)
    } else {
        Err(GatewayError::InsufficientPrivilege)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, GatewayError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(GatewayError::MissingHeader)?
        .to_str()
        .map_err(|_| GatewayError::MalformedHeader)?;

    let token = header
        .strip_prefix(BEARER_SCHEME)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(GatewayError::MalformedHeader)?;

    Ok(token.to_string())
}

/// Partition key for admission control: proxy-reported client address when
/// present, otherwise the peer address.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    peer.map_or_else(|| "unknown".to_string(), |addr| addr.ip().to_string())
}
