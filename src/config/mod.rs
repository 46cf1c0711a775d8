//! CLI configuration
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/hopsule/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! There is no global config singleton: `Config` is loaded once in `main`,
//! passed explicitly into the TUI and command handlers, and written back
//! with an explicit `save()` after login/logout mutate it.

mod project;

#[cfg(test)]
mod tests;

pub use project::{
    find_project_link, write_project_link, LinkedOrganization, LinkedProject, ProjectLink,
    PROJECT_LINK_FILE,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::api::types::User;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_WEB_URL: &str = "http://localhost:3000";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the decision-tracking API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the web app (device-auth landing page)
    #[serde(default = "default_web_url")]
    pub web_url: String,

    /// Bearer token from the last successful login; empty when logged out
    #[serde(default)]
    pub token: String,

    /// Default project id for non-interactive subcommands
    #[serde(default)]
    pub project: String,

    /// Default organization id
    #[serde(default)]
    pub organization: String,

    /// Cached identity of the logged-in user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_web_url() -> String {
    DEFAULT_WEB_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            token: String::new(),
            project: String::new(),
            organization: String::new(),
            user: None,
        }
    }
}

impl Config {
    /// Config file path: ~/.config/hopsule/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("hopsule").join("config.toml"))
    }

    /// Load configuration: env vars > file > defaults.
    ///
    /// A missing config file is fine (first run); a file that exists but
    /// cannot be parsed is an error the caller reports, not something to
    /// silently paper over with defaults.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var("HOPSULE_API_URL") {
            config.api_url = url;
        }
        if let Ok(url) = std::env::var("HOPSULE_WEB_URL") {
            config.web_url = url;
        }
        if let Ok(token) = std::env::var("HOPSULE_TOKEN") {
            config.token = token;
        }
        if let Ok(project) = std::env::var("HOPSULE_PROJECT") {
            config.project = project;
        }

        if config.api_url.is_empty() {
            config.api_url = DEFAULT_API_URL.to_string();
        }
        if config.web_url.is_empty() {
            config.web_url = DEFAULT_WEB_URL.to_string();
        }

        Ok(config)
    }

    /// Write the config back to disk, creating the directory on first save.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("could not determine config path")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = self.to_toml();
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Serialize with a short header so the file is self-describing.
    pub fn to_toml(&self) -> String {
        let body = toml::to_string_pretty(self).expect("config serializes to TOML");
        format!("# hopsule configuration\n# Managed by `hopsule login` / `hopsule config`\n\n{body}")
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Drop credentials and cached identity; org/project defaults survive.
    pub fn clear_auth(&mut self) {
        self.token.clear();
        self.user = None;
    }
}
