//! Search backend connection settings with builder and environment support.
//!
//! Resolution order: explicit values → environment variables → defaults.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Default host.
const DEFAULT_HOST: &str = "localhost";
/// Default port.
const DEFAULT_PORT: u16 = 9200;
/// Default scheme.
const DEFAULT_SCHEME: &str = "http";
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`ElasticsearchBackend`](super::ElasticsearchBackend).
#[derive(Clone)]
pub struct BackendConfig {
    /// Host name.
    pub host: String,
    /// Port.
    pub port: u16,
    /// `http` or `https`.
    pub scheme: String,
    /// Basic-auth user.
    pub user: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Verify TLS certificates.
    pub verify_certs: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Full base URL; when set, overrides scheme, host and port.
    pub url_override: Option<String>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url())
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("verify_certs", &self.verify_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BackendConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> BackendConfigBuilder {
        BackendConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::builder().from_env().build()
    }

    /// Base URL without credentials, e.g. `http://localhost:9200`.
    #[must_use]
    pub fn url(&self) -> String {
        self.url_override.as_ref().map_or_else(
            || format!("{}://{}:{}", self.scheme, self.host, self.port),
            |u| u.trim_end_matches('/').to_string(),
        )
    }

    /// Returns basic-auth credentials when both parts are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.user, &self.password) {
            (Some(u), Some(p)) => Some((u.as_str(), p.as_str())),
            _ => None,
        }
    }
}

/// Builder for [`BackendConfig`].
#[derive(Debug, Clone, Default)]
pub struct BackendConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    scheme: Option<String>,
    user: Option<String>,
    password: Option<String>,
    verify_certs: Option<bool>,
    timeout: Option<Duration>,
    url_override: Option<String>,
}

/// Reads and parses environment variable `name`.
pub(crate) fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    parse_env_value(name, std::env::var(name).ok())
}

/// Parses a raw environment value, warning when it is present but invalid.
fn parse_env_value<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    let value = raw.trim();
    let parsed = value.parse().ok();
    if parsed.is_none() {
        warn!(variable = name, value = %value, "ignoring unparseable environment value");
    }
    parsed
}

impl BackendConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.host.is_none() {
            self.host = std::env::var("ELASTICSEARCH_HOST").ok();
        }
        if self.port.is_none() {
            self.port = env_parse("ELASTICSEARCH_PORT");
        }
        if self.scheme.is_none() {
            self.scheme = std::env::var("ELASTICSEARCH_SCHEME").ok();
        }
        if self.user.is_none() {
            self.user = std::env::var("ELASTICSEARCH_USER").ok();
        }
        if self.password.is_none() {
            self.password = std::env::var("ELASTICSEARCH_PASSWORD").ok();
        }
        if self.verify_certs.is_none() {
            self.verify_certs = std::env::var("ELASTICSEARCH_VERIFY_CERTS")
                .ok()
                .map(|v| v.eq_ignore_ascii_case("true"));
        }
        if self.timeout.is_none() {
            self.timeout = env_parse("TIMEOUT").map(Duration::from_secs);
        }
        self
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Enables or disables TLS certificate verification.
    #[must_use]
    pub const fn verify_certs(mut self, verify: bool) -> Self {
        self.verify_certs = Some(verify);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets a full base URL, overriding scheme, host and port.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url_override = Some(url.into());
        self
    }

    /// Builds the [`BackendConfig`].
    #[must_use]
    pub fn build(self) -> BackendConfig {
        BackendConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            scheme: self.scheme.unwrap_or_else(|| DEFAULT_SCHEME.to_string()),
            user: self.user,
            password: self.password,
            verify_certs: self.verify_certs.unwrap_or(false),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            url_override: self.url_override,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_value() {
        assert_eq!(parse_env_value::<u16>("ELASTICSEARCH_PORT", None), None);
        assert_eq!(
            parse_env_value::<u16>("ELASTICSEARCH_PORT", Some(" 9201 ".into())),
            Some(9201)
        );
        assert_eq!(
            parse_env_value::<u16>("ELASTICSEARCH_PORT", Some("ninety".into())),
            None
        );
        assert_eq!(parse_env_value::<f32>("OPENAI_TEMPERATURE", Some("hot".into())), None);
        assert_eq!(
            parse_env_value::<f32>("OPENAI_TEMPERATURE", Some("0.5".into())),
            Some(0.5)
        );
    }

    #[test]
    fn test_builder_defaults() {
        let config = BackendConfig::builder().build();
        assert_eq!(config.url(), "http://localhost:9200");
        assert!(config.credentials().is_none());
        assert!(!config.verify_certs);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = BackendConfig::builder()
            .host("es.internal")
            .port(9243)
            .scheme("https")
            .credentials("elastic", "changeme")
            .verify_certs(true)
            .build();
        assert_eq!(config.url(), "https://es.internal:9243");
        assert_eq!(config.credentials(), Some(("elastic", "changeme")));
    }

    #[test]
    fn test_url_override_wins() {
        let config = BackendConfig::builder()
            .host("ignored")
            .url("http://127.0.0.1:9201/")
            .build();
        assert_eq!(config.url(), "http://127.0.0.1:9201");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = BackendConfig::builder()
            .credentials("elastic", "hunter2")
            .build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
