//! Profile endpoints behind the bearer pipeline.

use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gateway::{CurrentUser, Gateway, GatewayError};
use crate::store::User;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.name.clone(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/me",
    responses(
        (status = 200, description = "The authenticated principal", body = ProfileResponse),
        (status = 401, description = "Missing, malformed, invalid or expired credential"),
    ),
    tag = "users"
)]
pub async fn me(current: CurrentUser) -> Json<ProfileResponse> {
    // Resolved once by the pipeline; handlers only read the snapshot.
    Json(ProfileResponse::from(current.user()))
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = i64, Path, description = "Profile identity")),
    responses(
        (status = 200, description = "The requested profile", body = ProfileResponse),
        (status = 401, description = "Missing, malformed, invalid or expired credential"),
        (status = 403, description = "Caller is neither the owner nor privileged enough"),
        (status = 404, description = "No such profile"),
    ),
    tag = "users"
)]
pub async fn profile(
    Extension(gateway): Extension<Gateway>,
    Path(id): Path<i64>,
) -> Result<Json<ProfileResponse>, GatewayError> {
    let user = gateway.resolver().resolve(id).await?;
    Ok(Json(ProfileResponse::from(&user)))
}
