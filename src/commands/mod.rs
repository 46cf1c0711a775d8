//! Non-interactive subcommand handlers.
//!
//! Each handler takes the loaded config (plus its own flags), talks to the
//! API, and prints plain text to stdout. Errors bubble up as anyhow and are
//! reported by main.

pub mod account;
pub mod config_cmd;
pub mod decisions;
pub mod init;
pub mod login;

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::{find_project_link, Config};

/// Project to operate on: explicit flag, then the `.hopsule.toml` link
/// found upward from the cwd, then the configured default.
pub fn resolve_project_id(config: &Config, flag: Option<&str>) -> Result<String> {
    let cwd = std::env::current_dir().unwrap_or_default();
    resolve_project_id_from(config, flag, &cwd)
}

fn resolve_project_id_from(config: &Config, flag: Option<&str>, start: &Path) -> Result<String> {
    if let Some(id) = flag {
        return Ok(id.to_string());
    }
    if let Some((link, _path)) = find_project_link(start) {
        return Ok(link.project.id);
    }
    if !config.project.is_empty() {
        return Ok(config.project.clone());
    }
    bail!("no project selected (use --project, run `hopsule init`, or set one in the config)")
}

/// Guard for commands that need a token.
pub fn require_auth(config: &Config) -> Result<()> {
    if config.is_authenticated() {
        return Ok(());
    }
    bail!("not logged in - run `hopsule login` first")
}

/// Column-clip long values the way the tables expect.
pub fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

/// Render rows as a left-aligned table with three spaces between columns.
pub fn print_table(header: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }
    let line = |cells: &[String]| {
        let mut out = String::new();
        for (i, cell) in cells.iter().enumerate() {
            out.push_str(cell);
            if i + 1 < cells.len() {
                let pad = widths[i].saturating_sub(cell.chars().count()) + 3;
                out.push_str(&" ".repeat(pad));
            }
        }
        out
    };
    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", line(&header));
    println!("{}", line(&rule));
    for row in rows {
        println!("{}", line(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keeps_short_values() {
        assert_eq!(clip("abc", 12), "abc");
    }

    #[test]
    fn clip_bounds_long_values() {
        let out = clip(&"x".repeat(50), 12);
        assert_eq!(out.chars().count(), 12);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn resolve_prefers_flag_over_config() {
        let mut config = Config::default();
        config.project = "from-config".into();
        let id = resolve_project_id(&config, Some("from-flag")).unwrap();
        assert_eq!(id, "from-flag");
    }

    #[test]
    fn resolve_without_anything_fails() {
        // explicit start dir, so a stray .hopsule.toml elsewhere can't interfere
        let dir = std::env::temp_dir().join("hopsule-resolve-empty");
        std::fs::create_dir_all(&dir).unwrap();
        let err = resolve_project_id_from(&Config::default(), None, &dir).unwrap_err();
        assert!(err.to_string().contains("no project selected"));
    }

    #[test]
    fn resolve_prefers_link_over_config() {
        use crate::config::{write_project_link, LinkedOrganization, LinkedProject, ProjectLink};

        let dir = std::env::temp_dir().join("hopsule-resolve-link");
        std::fs::create_dir_all(&dir).unwrap();
        let link = ProjectLink {
            version: 1,
            project: LinkedProject {
                id: "from-link".into(),
                slug: "demo".into(),
                name: "Demo".into(),
                organization: LinkedOrganization {
                    id: "org-1".into(),
                    slug: "acme".into(),
                    name: "Acme".into(),
                },
            },
        };
        write_project_link(&dir, &link).unwrap();

        let mut config = Config::default();
        config.project = "from-config".into();
        let id = resolve_project_id_from(&config, None, &dir).unwrap();
        assert_eq!(id, "from-link");
    }
}
