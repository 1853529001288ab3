//! Configuration file support for minishop.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/minishop/config.toml`.
//! The environment selects the base URL and timeouts; the `[api]` section
//! can override individual values.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Build/runtime environment the client talks to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(Error::Config(format!("Unknown environment: {}", other))),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub mock: MockConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

/// Optional overrides of the environment presets
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_timeout_ms: Option<u64>,
}

/// Development mock layer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    /// Fixed seed for fixture data; random when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            seed: None,
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Session persistence configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_upload_history_limit")]
    pub upload_history_limit: usize,

    /// Cached profile older than this is refetched
    #[serde(default = "default_profile_max_age_days")]
    pub profile_max_age_days: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            upload_history_limit: default_upload_history_limit(),
            profile_max_age_days: default_profile_max_age_days(),
        }
    }
}

/// Resolved request settings handed to the gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub upload_timeout: Duration,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_delay_min_ms() -> u64 {
    200
}

fn default_delay_max_ms() -> u64 {
    800
}

fn default_upload_history_limit() -> usize {
    20
}

fn default_profile_max_age_days() -> u32 {
    7
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| std::env::temp_dir())
    });
    base.join("minishop")
}

const DEV_BASE_URL: &str = "http://localhost:3000";
const PROD_BASE_URL: &str = "https://api.example.com";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_UPLOAD_TIMEOUT_MS: u64 = 30_000;

impl Environment {
    /// Preset request settings for this environment
    pub fn preset(self) -> ApiSettings {
        let base_url = match self {
            Environment::Development => DEV_BASE_URL,
            Environment::Production => PROD_BASE_URL,
        };
        ApiSettings {
            base_url: base_url.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            upload_timeout: Duration::from_millis(DEFAULT_UPLOAD_TIMEOUT_MS),
        }
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| std::env::temp_dir())
        });
        base.join("minishop").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings the gateway cannot work with
    pub fn validate(&self) -> Result<()> {
        let settings = self.api_settings();
        if settings.base_url.trim().is_empty() {
            return Err(Error::Config("api.base_url must not be empty".into()));
        }
        if settings.timeout.is_zero() || settings.upload_timeout.is_zero() {
            return Err(Error::Config("timeouts must be greater than zero".into()));
        }
        if self.mock.delay_min_ms > self.mock.delay_max_ms {
            return Err(Error::Config(format!(
                "mock.delay_min_ms ({}) exceeds mock.delay_max_ms ({})",
                self.mock.delay_min_ms, self.mock.delay_max_ms
            )));
        }
        if self.mock_active() && u128::from(self.mock.delay_max_ms) >= settings.timeout.as_millis() {
            tracing::warn!(
                "mock.delay_max_ms ({}) reaches the request timeout ({:?}); some mocked calls will time out",
                self.mock.delay_max_ms,
                settings.timeout
            );
        }
        Ok(())
    }

    /// Environment preset with any `[api]` overrides applied
    pub fn api_settings(&self) -> ApiSettings {
        let mut settings = self.environment.preset();
        if let Some(ref base_url) = self.api.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ms) = self.api.timeout_ms {
            settings.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.api.upload_timeout_ms {
            settings.upload_timeout = Duration::from_millis(ms);
        }
        settings
    }

    /// Whether requests go through the mock layer
    pub fn mock_active(&self) -> bool {
        self.environment == Environment::Development && self.mock.enabled
    }

    /// Age after which the cached profile is considered stale
    pub fn profile_max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.session.profile_max_age_days))
    }

    /// Location of the persisted session
    pub fn session_path(&self) -> PathBuf {
        self.data.data_dir.join("session.json")
    }
}
