//! Gateway configuration.
//!
//! Carries every recognized option: backing store and cache store locations,
//! the cache flag and freshness window, admission-control settings, the
//! static administrator credential pair, and the token key material with its
//! expected issuer/audience. Secrets never leave `SecretString`.

use secrecy::SecretString;
use std::time::Duration;

use crate::gateway::admission::AdmissionSettings;

const DEFAULT_CACHE_TTL_SECONDS: u64 = 60;
const DEFAULT_ADMISSION_WINDOW_SECONDS: u64 = 5;
const DEFAULT_ADMISSION_THRESHOLD: u32 = 20;
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    dsn: String,
    redis_url: String,
    cache_enabled: bool,
    cache_ttl_seconds: u64,
    admission_enabled: bool,
    admission_window_seconds: u64,
    admission_threshold: u32,
    basic_username: String,
    basic_password: SecretString,
    token_secret: SecretString,
    token_issuer: String,
    token_audience: String,
    token_ttl_seconds: i64,
    frontend_url: String,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(dsn: String, token_secret: SecretString) -> Self {
        Self {
            dsn,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cache_enabled: false,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            admission_enabled: false,
            admission_window_seconds: DEFAULT_ADMISSION_WINDOW_SECONDS,
            admission_threshold: DEFAULT_ADMISSION_THRESHOLD,
            basic_username: "admin".to_string(),
            basic_password: SecretString::default(),
            token_secret,
            token_issuer: "pordisto".to_string(),
            token_audience: "pordisto".to_string(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            frontend_url: "http://localhost:4000".to_string(),
        }
    }

    #[must_use]
    pub fn with_redis_url(mut self, url: String) -> Self {
        self.redis_url = url;
        self
    }

    #[must_use]
    pub const fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_cache_ttl_seconds(mut self, seconds: u64) -> Self {
        self.cache_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_admission_enabled(mut self, enabled: bool) -> Self {
        self.admission_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_admission_window_seconds(mut self, seconds: u64) -> Self {
        self.admission_window_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_admission_threshold(mut self, threshold: u32) -> Self {
        self.admission_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_basic_credentials(mut self, username: String, password: SecretString) -> Self {
        self.basic_username = username;
        self.basic_password = password;
        self
    }

    #[must_use]
    pub fn with_token_issuer(mut self, issuer: String) -> Self {
        self.token_issuer = issuer;
        self
    }

    #[must_use]
    pub fn with_token_audience(mut self, audience: String) -> Self {
        self.token_audience = audience;
        self
    }

    #[must_use]
    pub const fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_frontend_url(mut self, url: String) -> Self {
        self.frontend_url = url;
        self
    }

    #[must_use]
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    #[must_use]
    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    #[must_use]
    pub const fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    #[must_use]
    pub const fn admission_settings(&self) -> AdmissionSettings {
        AdmissionSettings {
            enabled: self.admission_enabled,
            window: Duration::from_secs(self.admission_window_seconds),
            threshold: self.admission_threshold,
        }
    }

    #[must_use]
    pub fn basic_username(&self) -> &str {
        &self.basic_username
    }

    #[must_use]
    pub const fn basic_password(&self) -> &SecretString {
        &self.basic_password
    }

    #[must_use]
    pub const fn token_secret(&self) -> &SecretString {
        &self.token_secret
    }

    #[must_use]
    pub fn token_issuer(&self) -> &str {
        &self.token_issuer
    }

    #[must_use]
    pub fn token_audience(&self) -> &str {
        &self.token_audience
    }

    #[must_use]
    pub const fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn frontend_url(&self) -> &str {
        &self.frontend_url
    }
}
