//! Generated API documentation.

use utoipa::OpenApi;

use super::handlers;
use crate::gateway::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::users::me,
        handlers::users::profile,
    ),
    components(schemas(handlers::users::ProfileResponse, ErrorResponse)),
    tags(
        (name = "users", description = "Authenticated profile surface"),
        (name = "ops", description = "Operator surface behind static credentials"),
    ),
    info(
        title = "pordisto",
        description = "Authenticating request gateway for a multi-tenant HTTP API",
    )
)]
pub struct ApiDoc;
