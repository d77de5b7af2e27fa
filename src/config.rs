//! Client configuration: service addresses, endpoint paths, deadline and locale.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HomevalError, Result};
use crate::render::Locale;

/// Environment variable overriding [`ClientConfig::valuation_base_url`].
pub const VALUATION_URL_ENV: &str = "HOMEVAL_VALUATION_URL";

/// Environment variable overriding [`ClientConfig::analytics_base_url`].
pub const ANALYTICS_URL_ENV: &str = "HOMEVAL_ANALYTICS_URL";

/// Configuration shared by the estimator and analysis clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address of the valuation service
    pub valuation_base_url: String,

    /// Base address of the analytics service
    pub analytics_base_url: String,

    /// Path of the prediction endpoint (POST)
    pub predict_path: String,

    /// Path of the statistics endpoint (GET)
    pub statistics_path: String,

    /// Path of the health endpoint on both services (GET)
    pub health_path: String,

    /// Path of the model metadata endpoint on the valuation service (GET)
    pub model_info_path: String,

    /// Deadline after which an in-flight request is failed with `Timeout`.
    /// None disables the deadline. The underlying call is not aborted.
    pub request_timeout_ms: Option<u64>,

    /// Per-call timeout handed to the HTTP client. Independent of the
    /// lifecycle deadline; None leaves calls unbounded.
    pub transport_timeout_ms: Option<u64>,

    /// Locale used when formatting currency values
    pub locale: Locale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            valuation_base_url: "http://localhost:8000".to_string(),
            analytics_base_url: "http://localhost:8080".to_string(),
            predict_path: "/predict".to_string(),
            statistics_path: "/statistics".to_string(),
            health_path: "/health".to_string(),
            model_info_path: "/model-info".to_string(),
            request_timeout_ms: None,
            transport_timeout_ms: None,
            locale: Locale::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the service addresses taken from the environment when set.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Override the base addresses from a variable lookup, then validate.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(VALUATION_URL_ENV) {
            tracing::debug!(url = %url, "Valuation base URL overridden from environment");
            self.valuation_base_url = url;
        }
        if let Some(url) = lookup(ANALYTICS_URL_ENV) {
            tracing::debug!(url = %url, "Analytics base URL overridden from environment");
            self.analytics_base_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check both base addresses are absolute http(s) URLs and the timeouts are non-zero.
    pub fn validate(&self) -> Result<()> {
        check_base_url("valuation_base_url", &self.valuation_base_url)?;
        check_base_url("analytics_base_url", &self.analytics_base_url)?;

        for (name, path) in [
            ("predict_path", &self.predict_path),
            ("statistics_path", &self.statistics_path),
            ("health_path", &self.health_path),
            ("model_info_path", &self.model_info_path),
        ] {
            if !path.starts_with('/') {
                return Err(HomevalError::Config(format!(
                    "{} must start with '/', got '{}'",
                    name, path
                )));
            }
        }

        for (name, timeout) in [
            ("request_timeout_ms", self.request_timeout_ms),
            ("transport_timeout_ms", self.transport_timeout_ms),
        ] {
            if timeout == Some(0) {
                return Err(HomevalError::Config(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }
}

fn check_base_url(name: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| HomevalError::Config(format!("{} '{}' is not a URL: {}", name, value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(HomevalError::Config(format!(
            "{} must use http or https, got '{}'",
            name, scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout_ms, None);
        assert_eq!(config.transport_timeout_ms, None);
    }

    #[test]
    fn test_env_overrides_only_base_urls() {
        let config = ClientConfig::default()
            .with_env_overrides(|key| match key {
                VALUATION_URL_ENV => Some("https://valuation.internal".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.valuation_base_url, "https://valuation.internal");
        assert_eq!(config.analytics_base_url, "http://localhost:8080");
    }

    #[test]
    fn test_toml_partial_document() {
        let config = ClientConfig::from_toml_str(
            r#"
            analytics_base_url = "http://stats:9000"
            request_timeout_ms = 2500
            locale = "de-DE"
            "#,
        )
        .unwrap();
        assert_eq!(config.analytics_base_url, "http://stats:9000");
        assert_eq!(config.request_timeout_ms, Some(2500));
        assert_eq!(config.locale, Locale::DeDe);
        assert_eq!(config.predict_path, "/predict");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_toml_str(r#"valuation_base_url = "not a url""#),
            Err(HomevalError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str(r#"analytics_base_url = "ftp://stats""#),
            Err(HomevalError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("request_timeout_ms = 0"),
            Err(HomevalError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("transport_timeout_ms = 0"),
            Err(HomevalError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("request_timeout_ms = \"soon\""),
            Err(HomevalError::ConfigParse(_))
        ));
    }
}
