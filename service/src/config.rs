use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use lt_core::{Bodies, BodyId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::deserialize_vec_from_string_or_vec;
use std::collections::BTreeMap;
use std::time::Duration;

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with LT_ prefix (always wins)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub scorecard: ScorecardConfig,
    /// Data source per body, keyed by body id. Bodies without a source are
    /// not registered.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfig>,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error) or a full `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Maximum number of stale bills picked per run.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of refreshes in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// A bill checked more recently than this is not stale.
    #[serde(default = "default_freshness_window_secs")]
    pub freshness_window_secs: u64,

    /// Give up on an item that waits longer than this for a slot.
    /// Unset means wait as long as it takes.
    #[serde(default)]
    pub acquire_timeout_secs: Option<u64>,

    /// Restrict runs to these bodies. Empty means every registered body.
    /// Accepts either an array or comma-separated string.
    #[serde(default, deserialize_with = "deserialize_bodies")]
    pub bodies: Vec<String>,
}

impl RefreshConfig {
    #[must_use]
    pub const fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    #[must_use]
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScorecardConfig {
    /// Maximum number of per-item fetches in flight while assembling one scorecard.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Base URL of the normalized data API for the body.
    pub base_url: String,

    /// Sent as `X-API-Key` when non-empty.
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON snapshot the operator CLI loads and writes back.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

/// Deserialize body ids from comma-separated string or array, filtering empty values.
fn deserialize_bodies<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let bodies: Vec<String> = deserialize_vec_from_string_or_vec(deserializer)?;
    Ok(bodies
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_batch_size() -> usize {
    500
}

#[allow(clippy::missing_const_for_fn)]
fn default_concurrency() -> usize {
    5
}

#[allow(clippy::missing_const_for_fn)]
fn default_freshness_window_secs() -> u64 {
    6 * 60 * 60
}

#[allow(clippy::missing_const_for_fn)]
fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_snapshot_path() -> String {
    "legtrack-snapshot.json".to_string()
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            freshness_window_secs: default_freshness_window_secs(),
            acquire_timeout_secs: None,
            bodies: Vec::new(),
        }
    }
}

impl Default for ScorecardConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: default_log_level(),
            },
            refresh: RefreshConfig::default(),
            scorecard: ScorecardConfig::default(),
            sources: BTreeMap::new(),
            store: StoreConfig::default(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with LT_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("LT_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Source configuration for `body`.
    ///
    /// Environment variables cannot carry hyphens, so `ny_senate` also
    /// matches body `ny-senate`.
    #[must_use]
    pub fn source_for(&self, body: &BodyId) -> Option<&SourceConfig> {
        self.sources
            .get(body.as_str())
            .or_else(|| self.sources.get(&body.as_str().replace('-', "_")))
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh.batch_size == 0 {
            return Err(ConfigError::Validation(
                "refresh.batch_size cannot be 0".into(),
            ));
        }

        if self.refresh.concurrency == 0 {
            return Err(ConfigError::Validation(
                "refresh.concurrency cannot be 0".into(),
            ));
        }

        if self.refresh.freshness_window_secs == 0 {
            return Err(ConfigError::Validation(
                "refresh.freshness_window_secs cannot be 0".into(),
            ));
        }

        if self.scorecard.concurrency == 0 {
            return Err(ConfigError::Validation(
                "scorecard.concurrency cannot be 0".into(),
            ));
        }

        let bodies = Bodies::builtin();
        for body in &self.refresh.bodies {
            if bodies.get(&BodyId::new(body.as_str())).is_none() {
                return Err(ConfigError::Validation(format!(
                    "refresh.bodies contains unknown body '{body}'"
                )));
            }
        }

        // Source URLs must be http(s)
        for (body, source) in &self.sources {
            if !source.base_url.starts_with("http://") && !source.base_url.starts_with("https://")
            {
                return Err(ConfigError::Validation(format!(
                    "sources.{body}.base_url must start with http:// or https://, got '{}'",
                    source.base_url
                )));
            }
            if source.timeout_secs == 0 {
                return Err(ConfigError::Validation(format!(
                    "sources.{body}.timeout_secs cannot be 0"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base_url: &str) -> SourceConfig {
        SourceConfig {
            base_url: base_url.into(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.refresh.batch_size, 500);
        assert_eq!(config.refresh.concurrency, 5);
        assert_eq!(config.refresh.freshness_window(), Duration::from_secs(21_600));
        assert_eq!(config.refresh.acquire_timeout(), None);
        assert!(config.refresh.bodies.is_empty());
        assert_eq!(config.scorecard.concurrency, 5);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.refresh.batch_size = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("refresh.batch_size"));
    }

    #[test]
    fn test_validation_rejects_zero_scorecard_concurrency() {
        let mut config = Config::default();
        config.scorecard.concurrency = 0;
        let result = config.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("scorecard.concurrency"));
    }

    #[test]
    fn test_validation_rejects_unknown_body_filter() {
        let mut config = Config::default();
        config.refresh.bodies = vec!["atlantis-senate".into()];
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("atlantis-senate"));
    }

    #[test]
    fn test_source_lookup_accepts_underscored_keys() {
        let mut config = Config::default();
        config
            .sources
            .insert("ny_senate".into(), source("https://data.example.org/nys"));
        let found = config.source_for(&"ny-senate".into()).unwrap();
        assert_eq!(found.base_url, "https://data.example.org/nys");
        assert!(config.source_for(&"ny-assembly".into()).is_none());
    }

    #[test]
    fn test_bodies_deserialize_comma_separated_string() {
        let json = r#"{"bodies": "us-house, nyc-council,"}"#;
        let config: RefreshConfig = serde_json::from_str(json).expect("should parse");
        assert_eq!(config.bodies, vec!["us-house", "nyc-council"]);
        assert_eq!(config.batch_size, 500);
    }

    #[test]
    fn test_env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                refresh:
                  batch_size: 50
                sources:
                  nyc-council:
                    base_url: https://council.example.org
                ",
            )?;
            jail.set_env("LT_REFRESH__BATCH_SIZE", "25");
            jail.set_env("LT_SOURCES__US_HOUSE__BASE_URL", "https://house.example.org");

            let config = Config::load().expect("config loads");
            assert_eq!(config.refresh.batch_size, 25);
            assert!(config.source_for(&"nyc-council".into()).is_some());
            assert_eq!(
                config.source_for(&"us-house".into()).map(|s| s.base_url.as_str()),
                Some("https://house.example.org")
            );
            Ok(())
        });
    }

    // Table-driven boundary tests for validation rules

    #[test]
    fn concurrency_boundaries() {
        let cases = [
            (0usize, false, "zero"),
            (1, true, "minimum valid"),
            (5, true, "default value"),
            (64, true, "high value"),
        ];

        for (concurrency, should_pass, desc) in cases {
            let mut config = Config::default();
            config.refresh.concurrency = concurrency;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn source_url_boundaries() {
        let cases = [
            ("http://localhost:8080", true, "http localhost"),
            ("https://data.example.org/api", true, "https with path"),
            ("ftp://files.example.org", false, "ftp scheme"),
            ("data.example.org", false, "no scheme"),
            ("", false, "empty"),
        ];

        for (url, should_pass, desc) in cases {
            let mut config = Config::default();
            config.sources.insert("us-house".into(), source(url));
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }
}
