//! Process configuration, read once at startup from the environment
//! (optionally seeded from a `.env` file).

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_MEDIA_URL_PREFIX: &str = "https://files.soundify.one/static/media/";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub media_url_prefix: String,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = setting("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let command_prefix =
            setting("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string());

        let media_url_prefix =
            setting("MEDIA_URL_PREFIX").unwrap_or_else(|| DEFAULT_MEDIA_URL_PREFIX.to_string());
        let parsed = Url::parse(&media_url_prefix).map_err(|e| ConfigError::Invalid {
            key: "MEDIA_URL_PREFIX",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "MEDIA_URL_PREFIX",
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let fetch_timeout = match setting("FETCH_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "FETCH_TIMEOUT_SECS",
                        reason: format!("expected a positive number of seconds, got {}", raw),
                    });
                }
            },
        };

        Ok(Self {
            discord_token,
            command_prefix,
            media_url_prefix,
            fetch_timeout,
        })
    }

    /// Loggable view of the configuration; never includes the token
    pub fn summary(&self) -> String {
        format!(
            "prefix={} media_url_prefix={} fetch_timeout={}s",
            self.command_prefix,
            self.media_url_prefix,
            self.fetch_timeout.as_secs()
        )
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("command_prefix", &self.command_prefix)
            .field("media_url_prefix", &self.media_url_prefix)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}
