use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::client::DEFAULT_POLL_INTERVAL;
use crate::utils::url::normalize_base_url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the companion server (e.g., "http://127.0.0.1:5000")
    pub server_url: Option<String>,
    /// Seconds between polls for unsolicited messages
    pub poll_interval_secs: Option<u64>,
}

/// Keys accepted by `companion set` / `companion unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ServerUrl,
    PollInterval,
}

impl ConfigKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "server-url" => Some(ConfigKey::ServerUrl),
            "poll-interval" => Some(ConfigKey::PollInterval),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ServerUrl => "server-url",
            ConfigKey::PollInterval => "poll-interval",
        }
    }
}

impl Config {
    pub fn effective_server_url(&self) -> String {
        let url = self
            .server_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_SERVER_URL);
        normalize_base_url(url)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let value = value.trim();
        match key {
            ConfigKey::ServerUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(format!(
                        "server-url must start with http:// or https:// (got '{value}')"
                    ));
                }
                self.server_url = Some(normalize_base_url(value));
            }
            ConfigKey::PollInterval => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        format!("poll-interval must be a positive number of seconds (got '{value}')")
                    })?;
                self.poll_interval_secs = Some(secs);
            }
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::ServerUrl => self.server_url = None,
            ConfigKey::PollInterval => self.poll_interval_secs = None,
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
