//! Client Configuration
//!
//! Defines the configuration surface of the validation client:
//! - Per-job analysis options sent to the service (`ValidationConfig`)
//! - Connection and polling settings (`ClientSettings`)
//!
//! Settings resolve from defaults, then an optional TOML file, then
//! environment variables. CLI flags are applied last by the binary.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Smallest accepted competitor count
pub const MIN_COMPETITORS: u32 = 1;

/// Largest accepted competitor count
pub const MAX_COMPETITORS: u32 = 20;

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default interval between status polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Default consecutive poll failures tolerated before giving up
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Analysis options for a single validation job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allow the service to search the web for market signals
    pub include_web_search: bool,
    /// Run competitor discovery and analysis
    pub include_competitive_analysis: bool,
    /// Upper bound on competitors analyzed (1-20)
    pub max_competitors_to_analyze: u32,
    /// Reuse a previous result for an unchanged idea when available
    pub use_cached_results: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            include_web_search: true,
            include_competitive_analysis: true,
            max_competitors_to_analyze: 10,
            use_cached_results: true,
        }
    }
}

impl ValidationConfig {
    /// Reject options the service would refuse, before any request is sent
    pub fn validate(&self) -> Result<()> {
        if !(MIN_COMPETITORS..=MAX_COMPETITORS).contains(&self.max_competitors_to_analyze) {
            return Err(Error::InvalidInput(format!(
                "max_competitors_to_analyze must be between {} and {}, got {}",
                MIN_COMPETITORS, MAX_COMPETITORS, self.max_competitors_to_analyze
            )));
        }
        Ok(())
    }
}

/// Connection and polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the validation service
    pub api_url: String,
    /// Token forwarded as a bearer credential, if any
    pub api_key: Option<String>,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Connection establishment timeout
    pub connect_timeout_secs: u64,
    /// Seconds between status polls
    pub poll_interval_secs: u64,
    /// Consecutive poll failures before the job is marked failed locally
    pub max_consecutive_errors: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
        }
    }
}

impl ClientSettings {
    /// Overlay environment variables on top of `self`
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("IDEACHECK_API_URL") {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(key) = std::env::var("IDEACHECK_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        self.poll_interval_secs = env_parse("IDEACHECK_POLL_INTERVAL_SECS", self.poll_interval_secs);
        self.max_consecutive_errors =
            env_parse("IDEACHECK_MAX_POLL_ERRORS", self.max_consecutive_errors);
        self.request_timeout_secs =
            env_parse("IDEACHECK_REQUEST_TIMEOUT_SECS", self.request_timeout_secs);
        self
    }

    /// Defaults plus environment
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(Error::InvalidInput("api_url must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::InvalidInput(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.max_consecutive_errors == 0 {
            return Err(Error::InvalidInput(
                "max_consecutive_errors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(fallback)
}

/// On-disk configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub client: ClientSettings,
    /// Defaults for jobs started from the CLI
    pub validation: ValidationConfig,
}

impl ConfigFile {
    /// Default location: `<config dir>/ideacheck/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ideacheck").join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidInput(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
            .map_err(|e| Error::InvalidInput(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Load `path` if given, else the default location if it exists, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_validation_config_defaults() {
        let config = ValidationConfig::default();
        assert!(config.include_web_search);
        assert!(config.include_competitive_analysis);
        assert_eq!(config.max_competitors_to_analyze, 10);
        assert!(config.use_cached_results);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_competitor_bounds() {
        let mut config = ValidationConfig::default();
        for ok in [1, 20] {
            config.max_competitors_to_analyze = ok;
            assert!(config.validate().is_ok(), "{} should be accepted", ok);
        }
        for bad in [0, 21] {
            config.max_competitors_to_analyze = bad;
            assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_validation_config_partial_json() {
        let config: ValidationConfig =
            serde_json::from_str(r#"{"include_web_search": false}"#).unwrap();
        assert!(!config.include_web_search);
        assert_eq!(config.max_competitors_to_analyze, 10);
    }

    #[test]
    fn test_client_settings_rejects_zero_interval() {
        let settings = ClientSettings {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = ClientSettings {
            max_consecutive_errors: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_config_file_parse() {
        let raw = r#"
            [client]
            api_url = "https://validate.example.com"
            poll_interval_secs = 5

            [validation]
            include_web_search = false
            max_competitors_to_analyze = 4
        "#;
        let file = ConfigFile::parse(raw).unwrap();
        assert_eq!(file.client.api_url, "https://validate.example.com");
        assert_eq!(file.client.poll_interval_secs, 5);
        assert_eq!(file.client.max_consecutive_errors, 3);
        assert!(!file.validation.include_web_search);
        assert_eq!(file.validation.max_competitors_to_analyze, 4);
    }

    #[test]
    fn test_config_file_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\napi_key = \"secret\"\n").unwrap();

        let file = ConfigFile::resolve(Some(&path)).unwrap();
        assert_eq!(file.client.api_key.as_deref(), Some("secret"));
        assert_eq!(file.client.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_config_file_missing_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigFile::load(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("IDEACHECK_API_URL", "http://env.example:9000");
        std::env::set_var("IDEACHECK_POLL_INTERVAL_SECS", "7");
        std::env::set_var("IDEACHECK_MAX_POLL_ERRORS", "not-a-number");

        let settings = ClientSettings::from_env();
        assert_eq!(settings.api_url, "http://env.example:9000");
        assert_eq!(settings.poll_interval_secs, 7);
        assert_eq!(settings.max_consecutive_errors, 3);

        std::env::remove_var("IDEACHECK_API_URL");
        std::env::remove_var("IDEACHECK_POLL_INTERVAL_SECS");
        std::env::remove_var("IDEACHECK_MAX_POLL_ERRORS");
    }

    #[test]
    #[serial]
    fn test_env_absent_keeps_defaults() {
        for key in [
            "IDEACHECK_API_URL",
            "IDEACHECK_API_KEY",
            "IDEACHECK_POLL_INTERVAL_SECS",
            "IDEACHECK_MAX_POLL_ERRORS",
            "IDEACHECK_REQUEST_TIMEOUT_SECS",
        ] {
            std::env::remove_var(key);
        }
        let settings = ClientSettings::from_env();
        assert_eq!(settings, ClientSettings::default());
    }
}
