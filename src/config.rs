use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::constants::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_RECONNECT_DELAY_SECS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the dashboard backend, e.g. "https://studio.example.com"
    pub base_url: String,
    /// Bearer token for the dashboard API (None = unauthenticated)
    #[serde(default)]
    pub api_token: Option<String>,
}

impl ServerConfig {
    /// Push channel endpoint, derived from the base URL by swapping the
    /// scheme and appending the notification path.
    pub fn ws_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            format!("ws://{}", base)
        };
        format!("{}/ws/chats/", base)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Thread list pane width as a percentage of the terminal (20-60)
    #[serde(default = "default_split_ratio")]
    pub split_ratio: u16,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            split_ratio: default_split_ratio(),
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Polling fallback period while the push channel is down
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Fixed delay before each reconnect attempt
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

fn default_split_ratio() -> u16 {
    35
}

fn default_date_format() -> String {
    "%H:%M".to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_reconnect_delay_secs() -> u64 {
    DEFAULT_RECONNECT_DELAY_SECS
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("atelier");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dir = dirs::data_local_dir()
            .context("Could not find data directory")?
            .join("atelier");
        Ok(dir)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at {}\n\
                 Run `atelier setup` to create one, or write it yourself:\n\n\
                 [server]\n\
                 base_url = \"https://studio.example.com\"\n\
                 api_token = \"...\"\n\n\
                 [ui]\n\
                 split_ratio = 35",
                path.display()
            );
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = path.parent().context("Config path has no parent")?;

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        fs::create_dir_all(Self::data_dir()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            base_url = "https://studio.example.com"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.base_url, "https://studio.example.com");
        assert_eq!(config.server.api_token, None);
        assert_eq!(config.ui.split_ratio, 35);
        assert_eq!(config.sync.poll_interval_secs, 4);
        assert_eq!(config.sync.reconnect_delay_secs, 2);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            base_url = "http://localhost:8000/"
            api_token = "secret"

            [ui]
            split_ratio = 40
            date_format = "%d %b %H:%M"

            [sync]
            poll_interval_secs = 10
            reconnect_delay_secs = 5
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.api_token.as_deref(), Some("secret"));
        assert_eq!(config.ui.split_ratio, 40);
        assert_eq!(config.sync.poll_interval_secs, 10);
        assert_eq!(config.sync.reconnect_delay_secs, 5);
    }

    #[test]
    fn ws_url_swaps_scheme() {
        let https = ServerConfig {
            base_url: "https://studio.example.com".to_string(),
            api_token: None,
        };
        assert_eq!(https.ws_url(), "wss://studio.example.com/ws/chats/");

        let http = ServerConfig {
            base_url: "http://localhost:8000/".to_string(),
            api_token: None,
        };
        assert_eq!(http.ws_url(), "ws://localhost:8000/ws/chats/");
    }
}
