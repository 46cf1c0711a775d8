//! `hopsule config` - inspect or reset the stored configuration.

use anyhow::{Context, Result};

use crate::config::Config;

pub fn show(config: &Config) -> Result<()> {
    println!("api_url:      {}", config.api_url);
    println!("web_url:      {}", config.web_url);
    println!("project:      {}", non_empty(&config.project));
    println!("organization: {}", non_empty(&config.organization));
    println!("token:        {}", redact(&config.token));
    if let Some(user) = &config.user {
        println!("user:         {} ({})", user.name, user.email);
    }
    Ok(())
}

pub fn path() -> Result<()> {
    let path = Config::config_path().context("cannot determine home directory")?;
    println!("{}", path.display());
    Ok(())
}

pub fn reset() -> Result<()> {
    let path = Config::config_path().context("cannot determine home directory")?;
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
        println!("Removed {}", path.display());
    } else {
        println!("Nothing to remove; no config file at {}", path.display());
    }
    Ok(())
}

fn non_empty(s: &str) -> &str {
    if s.is_empty() {
        "(not set)"
    } else {
        s
    }
}

fn redact(token: &str) -> String {
    if token.is_empty() {
        return "(not set)".to_string();
    }
    let tail: String = token.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{tail}")
}
