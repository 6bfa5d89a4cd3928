//! Static administrator credentials for the ops surface.
//!
//! A single configured `username:password` pair, presented as
//! `Authorization: Basic <base64>`. Any mismatch collapses into one
//! `InvalidCredentials` outcome so callers cannot tell a bad username from a
//! bad password.

use base64ct::{Base64, Encoding};
use secrecy::{ExposeSecret, SecretString};

use super::error::GatewayError;

const BASIC_SCHEME: &str = "Basic ";

#[derive(Clone, Debug)]
pub struct StaticCredentials {
    username: String,
    password: SecretString,
}

impl StaticCredentials {
    #[must_use]
    pub const fn new(username: String, password: SecretString) -> Self {
        Self { username, password }
    }

    /// Validate a raw `Authorization` header value against the configured
    /// pair.
    ///
    /// # Errors
    /// `MissingHeader` when no header was presented, `MalformedHeader` when
    /// it is not `Basic <base64(user:pass)>`, and `InvalidCredentials` when
    /// either field mismatches.
    pub fn verify(&self, header: Option<&str>) -> Result<(), GatewayError> {
        let header = header.ok_or(GatewayError::MissingHeader)?;
        let encoded = header
            .strip_prefix(BASIC_SCHEME)
            .ok_or(GatewayError::MalformedHeader)?;

        let decoded =
            Base64::decode_vec(encoded.trim()).map_err(|_| GatewayError::MalformedHeader)?;
        let decoded = String::from_utf8(decoded).map_err(|_| GatewayError::MalformedHeader)?;

        // Split on the first colon only: passwords may contain colons.
        let (username, password) = decoded
            .split_once(':')
            .ok_or(GatewayError::MalformedHeader)?;

        // Non-short-circuiting: both fields are always compared.
        let username_matches = username == self.username;
        let password_matches = password == self.password.expose_secret();
        if username_matches & password_matches {
            Ok(())
        } else {
            Err(GatewayError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> StaticCredentials {
        StaticCredentials::new(
            "admin".to_string(),
            SecretString::from("adminpw".to_string()),
        )
    }

    fn header_for(user: &str, pass: &str) -> String {
        format!("Basic {}", Base64::encode_string(format!("{user}:{pass}").as_bytes()))
    }

    #[test]
    fn accepts_the_configured_pair() {
        let header = header_for("admin", "adminpw");
        assert!(credentials().verify(Some(&header)).is_ok());
    }

    #[test]
    fn missing_header_is_distinct() {
        assert!(matches!(
            credentials().verify(None),
            Err(GatewayError::MissingHeader)
        ));
    }

    #[test]
    fn rejects_other_schemes_as_malformed() {
        for header in ["Bearer abc", "basic abc", "Basic", ""] {
            assert!(matches!(
                credentials().verify(Some(header)),
                Err(GatewayError::MalformedHeader)
            ));
        }
    }

    #[test]
    fn rejects_payload_without_colon_as_malformed() {
        let header = format!("Basic {}", Base64::encode_string(b"no-colon-here"));
        assert!(matches!(
            credentials().verify(Some(&header)),
            Err(GatewayError::MalformedHeader)
        ));
    }

    #[test]
    fn rejects_invalid_base64_as_malformed() {
        assert!(matches!(
            credentials().verify(Some("Basic !!!not-base64!!!")),
            Err(GatewayError::MalformedHeader)
        ));
    }

    #[test]
    fn wrong_user_and_wrong_password_fail_identically() {
        let bad_pass = credentials()
            .verify(Some(&header_for("admin", "wrongpass")))
            .unwrap_err();
        let bad_user = credentials()
            .verify(Some(&header_for("wronguser", "adminpw")))
            .unwrap_err();
        assert!(matches!(bad_pass, GatewayError::InvalidCredentials));
        assert!(matches!(bad_user, GatewayError::InvalidCredentials));
        assert_eq!(bad_pass.to_string(), bad_user.to_string());
    }

    #[test]
    fn password_may_contain_colons() {
        let credentials = StaticCredentials::new(
            "admin".to_string(),
            SecretString::from("pw:with:colons".to_string()),
        );
        let header = header_for("admin", "pw:with:colons");
        assert!(credentials.verify(Some(&header)).is_ok());
    }
}
