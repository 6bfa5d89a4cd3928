//! HTTP surface: router assembly and server lifecycle.
//!
//! The router is built separately from the listener so tests can drive the
//! full middleware chain in-process with injected fakes.

use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    routing::get,
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::gateway::{self, Gateway, NullProfileCache, ProfileCache, RedisProfileCache};
use crate::store::PgStore;

pub mod handlers;
mod openapi;

pub use openapi::ApiDoc;

/// Role required to read another user's profile.
const PROFILE_MODERATION_ROLE: &str = "moderator";

/// Outer request deadline; elapsed deadlines drop in-flight cache/store
/// calls along with the handler future.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Assemble the full middleware chain around the gateway.
#[must_use]
pub fn router(gateway: Gateway, frontend_origin: Option<HeaderValue>) -> Router {
    let protected = Router::new()
        .route("/me", get(handlers::users::me))
        .route(
            "/users/:id",
            get(handlers::users::profile)
                .route_layer(middleware::from_fn_with_state(
                    (gateway.clone(), PROFILE_MODERATION_ROLE),
                    gateway::enforce_role,
                ))
                .route_layer(middleware::from_fn(gateway::attach_profile_owner)),
        )
        .route_layer(middleware::from_fn(gateway::authenticate));

    let ops = Router::new()
        .route("/health", get(handlers::health::health))
        .route_layer(middleware::from_fn(gateway::require_basic));

    let mut cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET])
        .allow_credentials(true);
    if let Some(origin) = frontend_origin {
        cors = cors.allow_origin(AllowOrigin::exact(origin));
    }

    Router::new()
        .route("/", get(handlers::root::root))
        .nest("/v1", protected.merge(ops))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(cors)
                .layer(Extension(gateway))
                .layer(middleware::from_fn(gateway::admit)),
        )
}

/// Connect the collaborators, assemble the gateway and serve it.
///
/// # Errors
/// Returns an error if the store or cache store cannot be reached, the
/// frontend origin is invalid, or the listener cannot bind.
pub async fn serve(port: u16, config: GatewayConfig) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(config.dsn())
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgStore::new(pool));

    let cache: Arc<dyn ProfileCache> = if config.cache_enabled() {
        Arc::new(
            RedisProfileCache::connect(config.redis_url(), config.cache_ttl())
                .await
                .context("Failed to connect to cache store")?,
        )
    } else {
        Arc::new(NullProfileCache)
    };

    let gateway = Gateway::new(&config, store, cache);
    let origin = frontend_origin(config.frontend_url())?;
    let app = router(gateway, Some(origin));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Gracefully shutdown");
    })
    .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_url)
        .with_context(|| format!("Invalid frontend URL: {frontend_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Frontend URL must include a valid host: {frontend_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_strips_paths_and_keeps_ports() -> Result<()> {
        let origin = frontend_origin("https://app.pordisto.dev:4443/login?next=/")?;
        assert_eq!(origin.to_str()?, "https://app.pordisto.dev:4443");

        let origin = frontend_origin("http://localhost:4000")?;
        assert_eq!(origin.to_str()?, "http://localhost:4000");
        Ok(())
    }

    #[test]
    fn frontend_origin_rejects_hostless_urls() {
        assert!(frontend_origin("not a url").is_err());
        assert!(frontend_origin("file:///tmp/x").is_err());
    }
}
