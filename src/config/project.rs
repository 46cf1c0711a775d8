//! Project link file
//!
//! `hopsule init` drops a `.hopsule.toml` into a repository to connect that
//! directory tree to a remote project. Commands run from any subdirectory
//! find it by walking toward the filesystem root, the same way git finds
//! `.git`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PROJECT_LINK_FILE: &str = ".hopsule.toml";

const LINK_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLink {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: LinkedProject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedProject {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    pub organization: LinkedOrganization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedOrganization {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

fn default_version() -> u32 {
    LINK_FILE_VERSION
}

/// Search for a project link file starting at `start` and walking up.
/// Returns the parsed link and the path it was found at.
pub fn find_project_link(start: &Path) -> Option<(ProjectLink, PathBuf)> {
    let mut dir = start;
    loop {
        let candidate = dir.join(PROJECT_LINK_FILE);
        if candidate.is_file() {
            let contents = std::fs::read_to_string(&candidate).ok()?;
            let link = toml::from_str(&contents).ok()?;
            return Some((link, candidate));
        }
        dir = dir.parent()?;
    }
}

/// Write the link file into `dir`.
pub fn write_project_link(dir: &Path, link: &ProjectLink) -> Result<PathBuf> {
    let mut link = link.clone();
    if link.version == 0 {
        link.version = LINK_FILE_VERSION;
    }

    let body = toml::to_string_pretty(&link).context("failed to serialize project link")?;
    let contents = format!(
        "# hopsule project link\n# Connects this directory to a remote project; created by `hopsule init`.\n\n{body}"
    );

    let path = dir.join(PROJECT_LINK_FILE);
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
