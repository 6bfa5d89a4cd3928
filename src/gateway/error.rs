//! Gateway error taxonomy and its HTTP mapping.
//!
//! Every failure in the pipeline is scoped to a single request. Credential
//! failures surface as 4xx with a generic body; the signature-vs-expiry
//! distinction (and any backend detail) is logged, never exposed.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("authorization header is missing")]
    MissingHeader,
    #[error("authorization header is malformed")]
    MalformedHeader,
    #[error("credential is malformed")]
    MalformedCredential,
    #[error("credential signature is invalid")]
    InvalidSignature,
    #[error("credential has expired")]
    ExpiredCredential,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not found")]
    NotFound,
    #[error("cache store unavailable")]
    CacheUnavailable(anyhow::Error),
    #[error("store unavailable")]
    StoreUnavailable(anyhow::Error),
    #[error("role lookup failed")]
    RoleLookupFailure(anyhow::Error),
    #[error("insufficient privilege")]
    InsufficientPrivilege,
    #[error("too many requests")]
    AdmissionDenied { retry_after: Duration },
}

/// JSON envelope for every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl GatewayError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingHeader
            | Self::MalformedHeader
            | Self::MalformedCredential
            | Self::InvalidSignature
            | Self::ExpiredCredential
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InsufficientPrivilege => StatusCode::FORBIDDEN,
            Self::AdmissionDenied { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::CacheUnavailable(_) | Self::StoreUnavailable(_) | Self::RoleLookupFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body shown to the caller. Internal failures share one generic message.
    fn public_message(&self) -> String {
        match self {
            Self::CacheUnavailable(_) | Self::StoreUnavailable(_) | Self::RoleLookupFailure(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            Self::CacheUnavailable(source)
            | Self::StoreUnavailable(source)
            | Self::RoleLookupFailure(source) => {
                error!("{self}: {source:#}");
            }
            _ => {}
        }

        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.public_message(),
        });

        let mut response = (status, body).into_response();
        if let Self::AdmissionDenied { retry_after } = self {
            let seconds = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}
