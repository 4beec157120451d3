//! Settings structures for Cardsales-RS configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub scrape: ScrapeSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (CARDSALES_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("CARDSALES_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("CARDSALES_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("CARDSALES_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("CARDSALES_STORE_URL") {
            self.store.url = val;
        }
        if let Ok(val) = std::env::var("CARDSALES_STORE_KEY") {
            self.store.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("CARDSALES_SCRAPE_URL") {
            self.scrape.base_url = val;
        }
    }

    /// Check that the settings describe a usable deployment
    pub fn validate(&self) -> Result<()> {
        if self.store.url.trim().is_empty() {
            bail!("store.url is not set (use settings.yml or CARDSALES_STORE_URL)");
        }
        Url::parse(&self.store.url)
            .map_err(|e| anyhow::anyhow!("store.url '{}' is invalid: {}", self.store.url, e))?;

        if self.scrape.base_url.trim().is_empty() {
            bail!("scrape.base_url is not set (use settings.yml or CARDSALES_SCRAPE_URL)");
        }
        Url::parse(&self.scrape.base_url).map_err(|e| {
            anyhow::anyhow!("scrape.base_url '{}' is invalid: {}", self.scrape.base_url, e)
        })?;

        if self.store.suggestion_limit == 0 {
            bail!("store.suggestion_limit must be at least 1");
        }
        if self.search.min_term_length == 0 {
            bail!("search.min_term_length must be at least 1");
        }

        for (key, secs) in [
            ("store.request_timeout", self.store.request_timeout),
            ("scrape.request_timeout", self.scrape.request_timeout),
            ("outgoing.request_timeout", self.outgoing.request_timeout),
        ] {
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                bail!("{} must be a positive number of seconds, got {}", key, secs);
            }
        }
        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name displayed in UI
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "Card Sales".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8888,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Lookup store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Base URL of the store (the REST API lives under `/rest/v1`)
    pub url: String,
    /// Credential sent as `apikey` header and bearer token
    pub api_key: Option<String>,
    /// Table holding card groups
    pub table: String,
    /// Maximum number of suggestions per lookup
    pub suggestion_limit: usize,
    /// Request timeout in seconds
    pub request_timeout: f64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            table: "cards".to_string(),
            suggestion_limit: crate::SUGGESTION_LIMIT,
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
        }
    }
}

impl StoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout)
    }
}

/// Scrape service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    /// Base URL of the scrape service
    pub base_url: String,
    /// Path of the scrape endpoint, appended to the base URL
    pub endpoint: String,
    /// Marketplace region passed with every scrape
    pub region: String,
    /// Result page passed with every scrape
    pub page: u32,
    /// Request timeout in seconds
    pub request_timeout: f64,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            endpoint: "/scrape_cards".to_string(),
            region: "uk".to_string(),
            page: 1,
            request_timeout: crate::SCRAPE_TIMEOUT as f64,
        }
    }
}

impl ScrapeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout)
    }
}

/// Search interaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Quiescence window before a typed term is looked up
    pub debounce_ms: u64,
    /// Shortest term that triggers a lookup or a scrape
    pub min_term_length: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: crate::DEBOUNCE_MS,
            min_term_length: crate::MIN_TERM_LENGTH,
        }
    }
}

impl SearchSettings {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// User agent string
    pub user_agent: String,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            pool_maxsize: 20,
            verify_ssl: true,
            user_agent: format!("cardsales-rs/{}", crate::VERSION),
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Settings {
        let mut settings = Settings::default();
        settings.store.url = "https://store.example.com".to_string();
        settings.scrape.base_url = "https://scrape.example.com/api/v1".to_string();
        settings
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8888);
        assert_eq!(settings.store.suggestion_limit, 20);
        assert_eq!(settings.search.debounce_ms, 500);
        assert_eq!(settings.search.min_term_length, 3);
        assert_eq!(settings.scrape.region, "uk");
        assert_eq!(settings.scrape.page, 1);
        assert!(settings.store.api_key.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
store:
  url: "https://store.example.com"
  api_key: "anon"
search:
  debounce_ms: 250
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.store.url, "https://store.example.com");
        assert_eq!(settings.store.api_key.as_deref(), Some("anon"));
        assert_eq!(settings.store.table, "cards");
        assert_eq!(settings.search.debounce_ms, 250);
        assert_eq!(settings.search.min_term_length, 3);
        assert_eq!(settings.scrape.endpoint, "/scrape_cards");
    }

    #[test]
    fn test_validate() {
        assert!(configured().validate().is_ok());
        assert!(Settings::default().validate().is_err());

        let mut bad_url = configured();
        bad_url.scrape.base_url = "not a url".to_string();
        assert!(bad_url.validate().is_err());

        let mut zero_limit = configured();
        zero_limit.store.suggestion_limit = 0;
        assert!(zero_limit.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unusable_timeouts() {
        let mut negative = configured();
        negative.store.request_timeout = -1.0;
        let err = negative.validate().unwrap_err();
        assert!(err.to_string().contains("store.request_timeout"));

        let mut nan = configured();
        nan.scrape.request_timeout = f64::NAN;
        assert!(nan.validate().is_err());

        let mut zero = configured();
        zero.outgoing.request_timeout = 0.0;
        assert!(zero.validate().is_err());

        let yaml = "scrape:\n  request_timeout: -5\n";
        let mut from_yaml: Settings = serde_yaml::from_str(yaml).unwrap();
        from_yaml.store.url = "https://store.example.com".to_string();
        from_yaml.scrape.base_url = "https://scrape.example.com".to_string();
        assert!(from_yaml.validate().is_err());
    }

    #[test]
    fn test_durations() {
        let settings = Settings::default();
        assert_eq!(settings.search.debounce_window(), Duration::from_millis(500));
        assert_eq!(settings.store.timeout(), Duration::from_secs(5));
        assert_eq!(settings.scrape.timeout(), Duration::from_secs(60));
    }
}
