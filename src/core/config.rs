//! Bot configuration
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Explicit token override for YAML configs
//! - 1.1.0: YAML config files via `Config::load`
//! - 1.0.0: Environment configuration with `.env` support

use crate::core::error::CloudyError;
use crate::core::logger::{parse_level, Logger};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;

/// Gateway presence announced once the shards are ready
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    /// `online`, `idle`, `dnd` or `invisible`
    #[serde(default = "default_status")]
    pub status: String,

    /// Shown as "Playing ..." when set
    #[serde(default)]
    pub activity: Option<String>,
}

impl Default for Presence {
    fn default() -> Self {
        Self {
            status: default_status(),
            activity: None,
        }
    }
}

fn default_status() -> String {
    "online".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub token: String,

    /// Gateway intents bitmask
    #[serde(default)]
    pub intents: u64,

    #[serde(default)]
    pub presence: Presence,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Replaces the built-in "no description" texts for commands and options
    #[serde(default)]
    pub no_description_msg: Option<String>,

    /// When set, commands are registered to this guild instead of globally
    #[serde(default)]
    pub test_guild_id: Option<String>,
}

impl Config {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: 0,
            presence: Presence::default(),
            log_level: default_log_level(),
            no_description_msg: None,
            test_guild_id: None,
        }
    }

    /// Read configuration from the environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, CloudyError> {
        Self::from_env_with_token(None)
    }

    /// Like [`Config::from_env`], but an explicit token wins over `BOT_TOKEN`
    pub fn from_env_with_token(token: Option<String>) -> Result<Self, CloudyError> {
        let logger = Logger::default();

        let token = match token.or_else(|| non_empty_var("BOT_TOKEN")) {
            Some(token) => token,
            None => return Err(CloudyError::missing_token(&logger)),
        };

        let intents = match non_empty_var("BOT_INTENTS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                CloudyError::new(format!("BOT_INTENTS must be an integer bitmask, got '{raw}'"), &logger)
            })?,
            None => 0,
        };

        let presence = Presence {
            status: non_empty_var("BOT_STATUS").unwrap_or_else(default_status),
            activity: non_empty_var("BOT_ACTIVITY"),
        };

        let config = Self {
            token,
            intents,
            presence,
            log_level: non_empty_var("LOG_LEVEL").unwrap_or_else(default_log_level),
            no_description_msg: non_empty_var("NO_DESCRIPTION_MSG"),
            test_guild_id: non_empty_var("TEST_GUILD_ID"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: &str) -> Result<Self, CloudyError> {
        Self::load_with_token(path, None)
    }

    /// Like [`Config::load`], but an explicit token wins over the file's
    pub fn load_with_token(path: &str, token: Option<String>) -> Result<Self, CloudyError> {
        let logger = Logger::default();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CloudyError::new(format!("Failed to read config file {path}: {e}"), &logger)
        })?;
        Self::from_yaml_with_token(&contents, token)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, CloudyError> {
        Self::from_yaml_with_token(contents, None)
    }

    pub fn from_yaml_with_token(contents: &str, token: Option<String>) -> Result<Self, CloudyError> {
        let mut config: Config = serde_yaml::from_str(contents).map_err(|e| {
            CloudyError::new(format!("Invalid config: {e}"), &Logger::default())
        })?;
        if let Some(token) = token {
            config.token = token;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CloudyError> {
        let logger = Logger::default();
        if self.token.trim().is_empty() {
            return Err(CloudyError::missing_token(&logger));
        }
        if parse_level(&self.log_level).is_none() {
            return Err(CloudyError::new(
                format!("Unknown log level '{}'", self.log_level),
                &logger,
            ));
        }
        if let Some(guild_id) = &self.test_guild_id {
            if guild_id.parse::<u64>().is_err() {
                return Err(CloudyError::new(
                    format!("TEST_GUILD_ID must be a snowflake, got '{guild_id}'"),
                    &logger,
                ));
            }
        }
        Ok(())
    }

    pub fn level_filter(&self) -> LevelFilter {
        parse_level(&self.log_level).unwrap_or(LevelFilter::Warn)
    }

    pub fn with_intents(mut self, intents: u64) -> Self {
        self.intents = intents;
        self
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_no_description_msg(mut self, message: impl Into<String>) -> Self {
        self.no_description_msg = Some(message.into());
        self
    }

    pub fn with_test_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.test_guild_id = Some(guild_id.into());
        self
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("intents", &self.intents)
            .field("presence", &self.presence)
            .field("log_level", &self.log_level)
            .field("no_description_msg", &self.no_description_msg)
            .field("test_guild_id", &self.test_guild_id)
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
