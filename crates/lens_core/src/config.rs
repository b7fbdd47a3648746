//! Client configuration.
//!
//! Settings come from the environment:
//! - `LENS_API_URL` - base address of the analysis service (default `http://localhost:8000`)
//! - `LENS_TIMEOUT_SECS` - optional request timeout; unset means no timeout

use crate::error::LensError;

use reqwest::Url;
use std::time::Duration;

/// Default base address of the analysis service.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable holding the service base address.
pub const API_URL_ENV: &str = "LENS_API_URL";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "LENS_TIMEOUT_SECS";

/// Settings for the analysis client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service base address, without the endpoint path.
    pub base_url: Url,
    /// Per-request timeout. `None` waits for the transport to resolve.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base_url = parse_base_url(DEFAULT_API_URL).expect("default URL is valid");
        Self { base_url, timeout: None }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, LensError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a key lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LensError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = parse_base_url(&url)?;
        }

        if let Some(secs) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            config.timeout = Some(parse_timeout_secs(&secs)?);
        }

        tracing::debug!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.map(|t| t.as_secs()),
            "Client configuration loaded"
        );

        Ok(config)
    }

    /// Replace the base address.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, LensError> {
        self.base_url = parse_base_url(url)?;
        Ok(self)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full address of a service endpoint, e.g. `endpoint("analyze")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Parse and validate a service base address.
pub fn parse_base_url(url: &str) -> Result<Url, LensError> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| LensError::config(format!("Invalid service URL '{url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(LensError::config(format!(
            "Unsupported URL scheme '{other}' in '{url}' (expected http or https)"
        ))),
    }
}

fn parse_timeout_secs(value: &str) -> Result<Duration, LensError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| LensError::config(format!("Invalid {TIMEOUT_ENV} value '{value}'")))?;
    if secs == 0 {
        return Err(LensError::config(format!("{TIMEOUT_ENV} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert!(config.timeout.is_none());
        assert_eq!(config.endpoint("analyze"), "http://localhost:8000/analyze");
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://analyzer.internal:9000/"),
            (TIMEOUT_ENV, "30"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint("/analyze"), "https://analyzer.internal:9000/analyze");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config =
            ClientConfig::from_lookup(lookup(&[(API_URL_ENV, "  "), (TIMEOUT_ENV, "")])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let config = ClientConfig::default().with_base_url("http://gateway/sql-analyzer").unwrap();
        assert_eq!(config.endpoint("analyze"), "http://gateway/sql-analyzer/analyze");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(API_URL_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, LensError::Config { .. }));

        let err = ClientConfig::from_lookup(lookup(&[(API_URL_ENV, "ftp://host")])).unwrap_err();
        assert!(err.to_string().contains("Unsupported URL scheme"));

        let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(matches!(err, LensError::Config { .. }));

        let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, LensError::Config { .. }));
    }
}
