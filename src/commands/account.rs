//! whoami / orgs / projects.

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::commands::{clip, print_table};
use crate::config::Config;

pub fn whoami(config: &Config) -> Result<()> {
    match &config.user {
        Some(user) if config.is_authenticated() => {
            println!("Name:  {}", user.name);
            println!("Email: {}", user.email);
            println!("ID:    {}", user.id);
            Ok(())
        }
        _ => {
            println!("Not logged in. Run 'hopsule login' to sign in.");
            Ok(())
        }
    }
}

pub async fn orgs(client: &ApiClient) -> Result<()> {
    let me = client.get_me().await.context("failed to fetch account")?;
    if me.organizations.is_empty() {
        println!("No organizations found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = me
        .organizations
        .iter()
        .map(|o| vec![clip(&o.id, 12), o.name.clone(), o.slug.clone()])
        .collect();
    print_table(&["ID", "NAME", "SLUG"], &rows);
    Ok(())
}

pub async fn projects(client: &ApiClient) -> Result<()> {
    let me = client.get_me().await.context("failed to fetch account")?;
    if me.projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }
    // org names keyed by id, for the table
    let rows: Vec<Vec<String>> = me
        .projects
        .iter()
        .map(|p| {
            let org = me
                .organizations
                .iter()
                .find(|o| o.id == p.organization_id)
                .map(|o| o.name.clone())
                .unwrap_or_else(|| clip(&p.organization_id, 12));
            vec![clip(&p.id, 12), p.name.clone(), p.slug.clone(), org]
        })
        .collect();
    print_table(&["ID", "NAME", "SLUG", "ORGANIZATION"], &rows);
    Ok(())
}
