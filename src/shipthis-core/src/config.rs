use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::ValidationError;

pub const DEFAULT_BASE_URL: &str = "https://api.shipthis.co/api/v3/";

/// Connection settings owned by a client.
///
/// Built once, then treated as read-only. Use [`ClientConfig::load`] for JSON
/// files, [`ClientConfig::from_env`] for `SHIPTHIS_*` variables, or
/// [`ClientConfig::new`] with the `with_*` setters.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub organisation: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_user_type")]
    pub user_type: String,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent on every request, overriding the library defaults
    #[serde(default)]
    pub custom_headers: BTreeMap<String, String>,
}

fn default_user_type() -> String {
    "employee".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(organisation: impl Into<String>) -> Self {
        Self {
            organisation: organisation.into(),
            api_key: None,
            user_type: default_user_type(),
            region_id: None,
            location_id: None,
            timeout_ms: default_timeout_ms(),
            base_url: default_base_url(),
            custom_headers: BTreeMap::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.user_type = user_type.into();
        self
    }

    pub fn with_region_location(
        mut self,
        region_id: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        self.region_id = Some(region_id.into());
        self.location_id = Some(location_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }

    /// Load configuration from a JSON file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        tracing::debug!(path, organisation = %config.organisation, "Loaded client configuration");
        Ok(config)
    }

    /// Build configuration from `SHIPTHIS_*` environment variables.
    ///
    /// `SHIPTHIS_ORGANISATION` is required. Optional: `SHIPTHIS_API_KEY`,
    /// `SHIPTHIS_USER_TYPE`, `SHIPTHIS_REGION`, `SHIPTHIS_LOCATION`,
    /// `SHIPTHIS_BASE_URL`, `SHIPTHIS_TIMEOUT_MS` and `SHIPTHIS_CUSTOM_HEADERS`
    /// (a JSON object of header name to value).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let organisation = lookup("SHIPTHIS_ORGANISATION").unwrap_or_default();
        let mut config = ClientConfig::new(organisation);
        config.api_key = lookup("SHIPTHIS_API_KEY").filter(|v| !v.is_empty());
        if let Some(user_type) = lookup("SHIPTHIS_USER_TYPE") {
            config.user_type = user_type;
        }
        config.region_id = lookup("SHIPTHIS_REGION").filter(|v| !v.is_empty());
        config.location_id = lookup("SHIPTHIS_LOCATION").filter(|v| !v.is_empty());
        if let Some(base_url) = lookup("SHIPTHIS_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup("SHIPTHIS_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => config.timeout_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid SHIPTHIS_TIMEOUT_MS"),
            }
        }
        if let Some(raw) = lookup("SHIPTHIS_CUSTOM_HEADERS") {
            config.custom_headers = serde_json::from_str(&raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.organisation.trim().is_empty() {
            return Err(ValidationError::MissingOrganisation);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL with exactly one trailing slash, ready for path concatenation
    pub fn api_root(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// Upload endpoint: the `upload.` host next to the API host
    pub fn upload_url(&self) -> String {
        let root = self.api_root();
        let host = root
            .trim_end_matches('/')
            .trim_end_matches("/api/v3")
            .replacen("api.", "upload.", 1);
        format!("{}/api/v3/file-upload", host)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("organisation", &self.organisation)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_type", &self.user_type)
            .field("region_id", &self.region_id)
            .field("location_id", &self.location_id)
            .field("timeout_ms", &self.timeout_ms)
            .field("base_url", &self.base_url)
            .field(
                "custom_headers",
                &self.custom_headers.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("demo");
        assert_eq!(config.user_type, "employee");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_organisation_rejected() {
        assert_eq!(
            ClientConfig::new("  ").validate(),
            Err(ValidationError::MissingOrganisation)
        );
    }

    #[test]
    fn test_base_url_scheme_required() {
        let config = ClientConfig::new("demo").with_base_url("api.shipthis.co/api/v3/");
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_load_from_json_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipthis.json");
        std::fs::write(
            &path,
            r#"{"organisation": "demo", "api_key": "secret", "custom_headers": {"x-trace": "1"}}"#,
        )
        .unwrap();

        let config = ClientConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.organisation, "demo");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.custom_headers.get("x-trace").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_load_rejects_missing_organisation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipthis.json");
        std::fs::write(&path, r#"{"organisation": ""}"#).unwrap();
        assert!(ClientConfig::load(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SHIPTHIS_ORGANISATION", "demo"),
            ("SHIPTHIS_API_KEY", "k"),
            ("SHIPTHIS_REGION", "usa"),
            ("SHIPTHIS_LOCATION", "new_york"),
            ("SHIPTHIS_TIMEOUT_MS", "1500"),
            ("SHIPTHIS_CUSTOM_HEADERS", r#"{"authorization": "Bearer t"}"#),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.region_id.as_deref(), Some("usa"));
        assert_eq!(config.location_id.as_deref(), Some("new_york"));
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert_eq!(
            config.custom_headers.get("authorization").map(String::as_str),
            Some("Bearer t")
        );
    }

    #[test]
    fn test_from_lookup_requires_organisation() {
        assert!(ClientConfig::from_lookup(|_| None).is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("demo").with_api_key("super-secret-key");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_api_root_normalises_slash() {
        let config = ClientConfig::new("demo").with_base_url("http://127.0.0.1:9000");
        assert_eq!(config.api_root(), "http://127.0.0.1:9000/");
        let config = ClientConfig::new("demo");
        assert_eq!(config.api_root(), "https://api.shipthis.co/api/v3/");
    }

    #[test]
    fn test_upload_url() {
        let config = ClientConfig::new("demo");
        assert_eq!(
            config.upload_url(),
            "https://upload.shipthis.co/api/v3/file-upload"
        );
        let config = ClientConfig::new("demo").with_base_url("http://127.0.0.1:9000/api/v3/");
        assert_eq!(config.upload_url(), "http://127.0.0.1:9000/api/v3/file-upload");

        for base_url in [
            "https://api.shipthis.co/api/v3",
            "https://api.shipthis.co/api/v3//",
            "https://api.shipthis.co",
        ] {
            let config = ClientConfig::new("demo").with_base_url(base_url);
            assert_eq!(
                config.upload_url(),
                "https://upload.shipthis.co/api/v3/file-upload",
                "base url {}",
                base_url
            );
        }
    }
}
