//! `hopsule init` - link the current directory to a project.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::api::types::{Identity, Project};
use crate::api::ApiClient;
use crate::config::{
    find_project_link, write_project_link, Config, LinkedOrganization, LinkedProject, ProjectLink,
};

pub async fn init(
    config: &Config,
    client: &ApiClient,
    project_flag: Option<String>,
    force: bool,
) -> Result<()> {
    if !config.is_authenticated() {
        println!("Not logged in. Run 'hopsule login' to sign in first.");
        return Ok(());
    }

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    if !force {
        if let Some((existing, path)) = find_project_link(&cwd) {
            println!("This directory is already linked:");
            println!("  Project: {} ({})", existing.project.name, existing.project.slug);
            println!(
                "  Org:     {} ({})",
                existing.project.organization.name, existing.project.organization.slug
            );
            println!("  Path:    {}", path.display());
            println!();
            println!("Use --force to relink.");
            return Ok(());
        }
    }

    let me = client.get_me().await.context("failed to fetch account")?;
    if me.projects.is_empty() {
        println!("You don't have any projects yet. Create one in the web app first.");
        return Ok(());
    }

    let project = match project_flag {
        Some(wanted) => me
            .projects
            .iter()
            .find(|p| p.id == wanted || p.slug == wanted)
            .cloned()
            .with_context(|| format!("no project matching '{wanted}'"))?,
        None => choose_project(&me)?,
    };

    let org = me
        .organizations
        .iter()
        .find(|o| o.id == project.organization_id);
    let link = ProjectLink {
        version: 1,
        project: LinkedProject {
            id: project.id.clone(),
            slug: project.slug.clone(),
            name: project.name.clone(),
            organization: LinkedOrganization {
                id: project.organization_id.clone(),
                slug: org.map(|o| o.slug.clone()).unwrap_or_default(),
                name: org.map(|o| o.name.clone()).unwrap_or_default(),
            },
        },
    };
    let path = write_project_link(&cwd, &link)?;
    println!("Linked to {} ({})", project.name, project.slug);
    println!("Wrote {}", path.display());
    Ok(())
}

/// Numbered prompt over the user's projects.
fn choose_project(me: &Identity) -> Result<Project> {
    println!("Select a project:");
    for (i, p) in me.projects.iter().enumerate() {
        let org = me
            .organizations
            .iter()
            .find(|o| o.id == p.organization_id)
            .map(|o| o.name.as_str())
            .unwrap_or("?");
        println!("  {}. {} ({}) - {}", i + 1, p.name, p.slug, org);
    }
    print!("Choice [1-{}]: ", me.projects.len());
    std::io::stdout().flush().ok();

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read selection")?;
    let choice: usize = line.trim().parse().context("not a number")?;
    if choice == 0 || choice > me.projects.len() {
        bail!("choice out of range");
    }
    Ok(me.projects[choice - 1].clone())
}
