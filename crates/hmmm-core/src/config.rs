use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::broadcast::{Pacing, ThreadTemplate};
use super::platform;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unable to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("[{0}] is required.")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,
    /// Categories listed when none are given on the command line.
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// OAuth2 user-context bearer token.
    #[serde(default)]
    pub access_token: String,
    /// Opening post of every thread.
    #[serde(default)]
    pub intro: String,
    /// Per-paper post; `%TITLE%` and `%URL%` are substituted.
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_closing")]
    pub closing: Option<String>,
    #[serde(default = "default_item_delay_secs")]
    pub item_delay_secs: u64,
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_backoff_every")]
    pub backoff_every: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory export files are written to.
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            default_categories: default_categories(),
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            access_token: String::new(),
            intro: String::new(),
            body: String::new(),
            closing: default_closing(),
            item_delay_secs: default_item_delay_secs(),
            backoff_secs: default_backoff_secs(),
            backoff_every: default_backoff_every(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

impl BroadcastConfig {
    pub fn template(&self) -> ThreadTemplate {
        ThreadTemplate {
            intro: self.intro.clone(),
            body: self.body.clone(),
            closing: self.closing.clone().filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            item_delay: Duration::from_secs(self.item_delay_secs),
            backoff: Duration::from_secs(self.backoff_secs),
            backoff_every: self.backoff_every,
        }
    }
}

fn default_feed_base_url() -> String {
    "https://arxiv.org".to_string()
}

fn default_categories() -> Vec<String> {
    ["q-fin", "cs.AI", "cs.LG", "cs.CV"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_api_base() -> String {
    "https://api.twitter.com".to_string()
}

fn default_closing() -> Option<String> {
    Some("@threadreaderapp unroll".to_string())
}

fn default_item_delay_secs() -> u64 {
    10
}

fn default_backoff_secs() -> u64 {
    3 * 60 * 60
}

fn default_backoff_every() -> usize {
    200
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load from the default location, apply `HMMM_*` environment overrides
    /// and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, writing the defaults there first when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let b = &mut self.broadcast;
        for (key, slot) in [
            ("HMMM_ACCESS_TOKEN", &mut b.access_token),
            ("HMMM_INTRO", &mut b.intro),
            ("HMMM_BODY", &mut b.body),
            ("HMMM_API_BASE", &mut b.api_base),
        ] {
            if let Some(value) = lookup(key) {
                *slot = value;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.broadcast;
        for (key, value) in [
            ("access_token", &b.access_token),
            ("intro", &b.intro),
            ("body", &b.body),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key));
            }
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
