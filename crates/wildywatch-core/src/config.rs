//! Configuration for Wildywatch — TOML file under `~/.wildywatch/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WildywatchError};

/// Top-level configuration, loaded once at startup and threaded through
/// the constructors of the store, feed client, channel, and scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WildywatchConfig {
    #[serde(default)]
    pub discord: DiscordSettings,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Discord credentials. The token can also come from `DISCORD_TOKEN`,
/// which takes precedence over the file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscordSettings {
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_feed_timeout_secs")]
    pub timeout_secs: u64,
    /// Payload key names — these drift across feed deployments, so they are
    /// configuration rather than code.
    #[serde(default)]
    pub fields: FeedFields,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: default_feed_timeout_secs(),
            fields: FeedFields::default(),
        }
    }
}

/// Key names for the three payload fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedFields {
    #[serde(default = "default_current_field")]
    pub current: String,
    #[serde(default = "default_next_field")]
    pub next: String,
    #[serde(default = "default_next_time_field")]
    pub next_time: String,
}

impl Default for FeedFields {
    fn default() -> Self {
        Self {
            current: default_current_field(),
            next: default_next_field(),
            next_time: default_next_time_field(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// UTC minute-of-hour the hourly broadcast fires at.
    #[serde(default = "default_broadcast_minute")]
    pub broadcast_minute: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            broadcast_minute: default_broadcast_minute(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Subscriptions file. Defaults to `~/.wildywatch/subscriptions.json`.
    pub subscriptions_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn subscriptions_path(&self) -> PathBuf {
        self.subscriptions_path
            .clone()
            .unwrap_or_else(|| WildywatchConfig::home_dir().join("subscriptions.json"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_host")]
    pub host: String,
    #[serde(default = "default_health_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            host: default_health_host(),
            port: default_health_port(),
        }
    }
}

fn default_feed_url() -> String {
    "https://wilderness.spegal.dev/api/events".into()
}
fn default_feed_timeout_secs() -> u64 {
    10
}
fn default_current_field() -> String {
    "current_event".into()
}
fn default_next_field() -> String {
    "next_event".into()
}
fn default_next_time_field() -> String {
    "next_event_time".into()
}
fn default_broadcast_minute() -> u32 {
    55
}
fn default_health_host() -> String {
    "0.0.0.0".into()
}
fn default_health_port() -> u16 {
    8080
}

impl WildywatchConfig {
    /// `~/.wildywatch`
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wildywatch")
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load from the default path, falling back to defaults when no config
    /// file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| WildywatchError::config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| WildywatchError::config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.schedule.broadcast_minute > 59 {
            return Err(WildywatchError::config(format!(
                "broadcast_minute must be 0-59, got {}",
                self.schedule.broadcast_minute
            )));
        }
        Ok(())
    }

    /// Resolve the bot token: `DISCORD_TOKEN` env wins, then the config
    /// file. Absence is fatal — the process must not proceed without it.
    pub fn resolve_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        if !self.discord.bot_token.is_empty() {
            return Ok(self.discord.bot_token.clone());
        }
        Err(WildywatchError::config(
            "no bot token: set DISCORD_TOKEN or [discord] bot_token in config.toml",
        ))
    }
}
