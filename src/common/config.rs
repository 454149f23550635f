//! Configuration for the ChatKit client.
//!
//! The configuration is injected into request building and into the HTTP
//! transport; nothing in the crate reads it from global state.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::common::errors::{ChatError, ChatResult};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "https://orcheo.ai-colleagues.com";
/// Default display name of the workflow.
pub const DEFAULT_WORKFLOW_NAME: &str = "Orcheo Bot";
/// Path of the ChatKit endpoint, relative to the base URL.
pub const CHATKIT_PATH: &str = "/api/chatkit";

/// Environment variable for the backend base URL.
const BASE_URL_ENV: &str = "CHATKIT_BASE_URL";
/// Environment variable for the workflow identifier.
const WORKFLOW_ID_ENV: &str = "CHATKIT_WORKFLOW_ID";
/// Environment variable for the workflow display name.
const WORKFLOW_NAME_ENV: &str = "CHATKIT_WORKFLOW_NAME";
/// Environment variable for the domain key sent as `X-Domain-Key`.
const DOMAIN_KEY_ENV: &str = "CHATKIT_DOMAIN_KEY";
/// Environment variable for the request timeout, in seconds.
const TIMEOUT_ENV: &str = "CHATKIT_TIMEOUT_SECS";

/// Backend and workflow settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, without the endpoint path.
    pub base_url: String,
    /// Workflow identifier sent with every request.
    pub workflow_id: String,
    /// Workflow display name sent in request metadata.
    pub workflow_name: String,
    /// Optional domain key for the `X-Domain-Key` header.
    pub domain_key: Option<String>,
    /// Whole-request timeout.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Connection timeout.
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workflow_id: String::new(),
            workflow_name: DEFAULT_WORKFLOW_NAME.to_string(),
            domain_key: None,
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    /// Create a config for a workflow with default settings.
    #[must_use]
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            ..Self::default()
        }
    }

    /// Load the config from `CHATKIT_*` environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable holds an invalid value or the result
    /// fails validation.
    pub fn from_env() -> ChatResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the config through an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error if a value is invalid or the result fails validation.
    pub fn from_lookup<F>(lookup: F) -> ChatResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(workflow_id) = lookup(WORKFLOW_ID_ENV) {
            config.workflow_id = workflow_id;
        }
        if let Some(workflow_name) = lookup(WORKFLOW_NAME_ENV) {
            config.workflow_name = workflow_name;
        }
        config.domain_key = lookup(DOMAIN_KEY_ENV).filter(|key| !key.is_empty());
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ChatError::InvalidConfig(format!("{TIMEOUT_ENV} must be a number of seconds: {e}"))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the backend base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the workflow display name.
    #[must_use]
    pub fn with_workflow_name(mut self, name: impl Into<String>) -> Self {
        self.workflow_name = name.into();
        self
    }

    /// Set the domain key.
    #[must_use]
    pub fn with_domain_key(mut self, key: impl Into<String>) -> Self {
        self.domain_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are empty, out of range, or invalid.
    pub fn validate(&self) -> ChatResult<()> {
        Url::parse(&self.base_url)?;

        if self.workflow_id.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "workflow_id must not be empty".to_string(),
            ));
        }

        if self.workflow_name.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "workflow_name must not be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(ChatError::InvalidConfig(
                "timeouts must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL of the ChatKit endpoint.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot be parsed.
    pub fn endpoint_url(&self) -> ChatResult<Url> {
        let raw = format!("{}{CHATKIT_PATH}", self.base_url.trim_end_matches('/'));
        Ok(Url::parse(&raw)?)
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_needs_workflow() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.workflow_name, DEFAULT_WORKFLOW_NAME);
        assert!(config.validate().is_err());
        assert!(ApiConfig::new("wf-1").validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ApiConfig::new("wf-1")
            .with_base_url("http://localhost:8000")
            .with_workflow_name("Support Bot")
            .with_domain_key("domain_pk_test")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.workflow_id, "wf-1");
        assert_eq!(config.workflow_name, "Support Bot");
        assert_eq!(config.domain_key.as_deref(), Some("domain_pk_test"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_endpoint_url() {
        let config = ApiConfig::new("wf-1").with_base_url("http://localhost:8000/");
        let url = config.endpoint_url().expect("valid url");
        assert_eq!(url.as_str(), "http://localhost:8000/api/chatkit");
    }

    #[test]
    fn test_from_lookup() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("CHATKIT_BASE_URL", "http://127.0.0.1:9000"),
            ("CHATKIT_WORKFLOW_ID", "wf-env"),
            ("CHATKIT_DOMAIN_KEY", ""),
            ("CHATKIT_TIMEOUT_SECS", "15"),
        ]))
        .expect("valid env config");

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.workflow_id, "wf-env");
        assert_eq!(config.workflow_name, DEFAULT_WORKFLOW_NAME);
        assert_eq!(config.domain_key, None);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(ApiConfig::from_lookup(lookup_from(&[])).is_err());
        assert!(
            ApiConfig::from_lookup(lookup_from(&[
                ("CHATKIT_WORKFLOW_ID", "wf"),
                ("CHATKIT_TIMEOUT_SECS", "soon"),
            ]))
            .is_err()
        );
        assert!(
            ApiConfig::from_lookup(lookup_from(&[
                ("CHATKIT_WORKFLOW_ID", "wf"),
                ("CHATKIT_BASE_URL", "not a url"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn test_config_serde_roundtrip_uses_seconds() {
        let config = ApiConfig::new("wf-1");
        let value = serde_json::to_value(&config).expect("serialize");
        assert_eq!(value["request_timeout"], 120);
        let back: ApiConfig = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, config);
    }
}
