//! Decision subcommands: list, get, create, accept, deprecate, status.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::api::types::CreateDecisionRequest;
use crate::api::ApiClient;
use crate::commands::{clip, print_table};

pub async fn list(client: &ApiClient, project_id: &str) -> Result<()> {
    let decisions = client
        .list_decisions(project_id)
        .await
        .context("failed to list decisions")?;
    if decisions.is_empty() {
        println!("No decisions found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = decisions
        .iter()
        .map(|d| {
            vec![
                clip(&d.id, 12),
                clip(&d.statement, 40),
                d.status.as_str().to_string(),
                clip(&d.created_at, 20),
            ]
        })
        .collect();
    print_table(&["ID", "STATEMENT", "STATUS", "CREATED"], &rows);
    Ok(())
}

pub async fn get(client: &ApiClient, project_id: &str, decision_id: &str) -> Result<()> {
    let d = client
        .get_decision(project_id, decision_id)
        .await
        .context("failed to fetch decision")?;
    println!("ID:        {}", d.id);
    println!("Status:    {}", d.status.as_str());
    println!("Statement: {}", d.statement);
    if !d.rationale.is_empty() {
        println!("Rationale:");
        for line in d.rationale.lines() {
            println!("  {line}");
        }
    }
    if !d.tags.is_empty() {
        println!("Tags:      {}", d.tags.join(", "));
    }
    if !d.created_at.is_empty() {
        println!("Created:   {}", d.created_at);
    }
    if let Some(accepted_at) = &d.accepted_at {
        println!("Accepted:  {accepted_at}");
    }
    if let Some(accepted_by) = &d.accepted_by {
        println!("By:        {accepted_by}");
    }
    Ok(())
}

pub async fn create(
    client: &ApiClient,
    project_id: &str,
    statement: Option<String>,
    rationale: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let statement = match statement {
        Some(s) if !s.trim().is_empty() => s,
        _ => prompt_line("Statement: ")?,
    };
    if statement.trim().is_empty() {
        bail!("statement is required");
    }
    let rationale = match rationale {
        Some(r) => r,
        None => prompt_multiline("Rationale (end with an empty line):")?,
    };

    let req = CreateDecisionRequest {
        statement: statement.trim().to_string(),
        rationale,
        scope_key: None,
        tags,
    };
    let d = client
        .create_decision(project_id, &req)
        .await
        .context("failed to create decision")?;
    println!("Created decision {} ({})", d.id, d.status.as_str());
    Ok(())
}

pub async fn accept(client: &ApiClient, project_id: &str, decision_id: &str) -> Result<()> {
    let d = client
        .accept_decision(project_id, decision_id)
        .await
        .context("failed to accept decision")?;
    println!("Accepted: {}", clip(&d.statement, 60));
    Ok(())
}

pub async fn deprecate(client: &ApiClient, project_id: &str, decision_id: &str) -> Result<()> {
    let d = client
        .deprecate_decision(project_id, decision_id)
        .await
        .context("failed to deprecate decision")?;
    println!("Deprecated: {}", clip(&d.statement, 60));
    Ok(())
}

pub async fn status(client: &ApiClient, project_id: &str) -> Result<()> {
    let s = client
        .project_status(project_id)
        .await
        .context("failed to fetch project status")?;
    println!("Project {}", s.project_id);
    println!("  Total:      {}", s.total_decisions);
    println!("  Accepted:   {}", s.accepted);
    println!("  Pending:    {}", s.pending);
    println!("  Draft:      {}", s.draft);
    println!("  Deprecated: {}", s.deprecated);
    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read input")?;
    Ok(line.trim().to_string())
}

fn prompt_multiline(prompt: &str) -> Result<String> {
    println!("{prompt}");
    let stdin = std::io::stdin();
    let mut lines = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}
