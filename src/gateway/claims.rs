//! Bearer credential verification and issuance.
//!
//! Flow Overview: tokens are HS256 JWTs carrying `{sub, exp, iat, iss, aud}`.
//! The subject is the numeric identity and is decoded into an `i64` straight
//! from the JSON payload, so large identifiers never round-trip through a
//! float. Expiry is checked with zero leeway and reported distinctly from a
//! bad signature.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::error::GatewayError;

/// Decoded payload of a bearer credential. Exists only during verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(deserialize_with = "deserialize_subject")]
    pub sub: i64,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// Accept the subject as a JSON integer or a numeric string; anything that
/// does not fit an `i64` is a malformed credential.
fn deserialize_subject<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Subject {
        Number(i64),
        Text(String),
    }

    match Subject::deserialize(deserializer)? {
        Subject::Number(id) => Ok(id),
        Subject::Text(raw) => raw.parse().map_err(serde::de::Error::custom),
    }
}

/// Verifies (and mints) bearer tokens against the configured key material.
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    token_ttl_seconds: i64,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(
        secret: &SecretString,
        issuer: String,
        audience: String,
        token_ttl_seconds: i64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No grace period: an expired credential is expired.
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);

        Self {
            encoding: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            issuer,
            audience,
            token_ttl_seconds,
        }
    }

    /// Validate a bearer token and return its claims.
    ///
    /// # Errors
    /// `ExpiredCredential` for a valid signature past its expiry,
    /// `InvalidSignature` for signature/algorithm failures, and
    /// `MalformedCredential` for anything that does not decode into the
    /// expected claims (including an issuer/audience mismatch).
    pub fn verify(&self, token: &str) -> Result<Claims, GatewayError> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => {
                debug!("token rejected: {err}");
                Err(match err.kind() {
                    ErrorKind::ExpiredSignature => GatewayError::ExpiredCredential,
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        GatewayError::InvalidSignature
                    }
                    _ => GatewayError::MalformedCredential,
                })
            }
        }
    }

    /// Mint a token for `subject` using the configured issuer, audience and
    /// time-to-live. Consumed by the login collaborator and by tests.
    ///
    /// # Errors
    /// Returns `MalformedCredential` if the claims cannot be encoded.
    pub fn issue(&self, subject: i64) -> Result<String, GatewayError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject,
            exp: now + self.token_ttl_seconds,
            iat: now,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|err| {
            debug!("token encoding failed: {err}");
            GatewayError::MalformedCredential
        })
    }
}
