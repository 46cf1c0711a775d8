// hopsule - CLI client and terminal dashboard for the Hopsule
// decision-tracking service.

mod api;
mod cli;
mod commands;
mod config;
mod events;
mod logging;
mod tui;

use anyhow::{Context, Result};

use clap::Parser;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigAction};
use config::Config;
use logging::{CaptureLayer, LogBuffer};
use tui::app::FinalAction;

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hopsule=info"))
}

/// Whether the dashboard loop runs another round. Login and logout both
/// restart the TUI; only a plain quit ends it.
fn dashboard_continues(action: FinalAction) -> bool {
    action != FinalAction::None
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(url) = &args.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(token) = &args.token {
        config.token = token.clone();
    }

    match args.command {
        Some(command) => {
            // headless: plain fmt logging on stderr, stdout stays clean
            tracing_subscriber::fmt()
                .with_env_filter(default_filter())
                .with_writer(std::io::stderr)
                .init();
            run_command(command, config, args.project).await
        }
        None => run_dashboard(config).await,
    }
}

async fn run_command(command: Commands, mut config: Config, project: Option<String>) -> Result<()> {
    let client = api::ApiClient::new(&config);
    match command {
        Commands::Login {
            web_url,
            no_browser,
        } => commands::login::login(&mut config, web_url, no_browser).await,
        Commands::Logout => commands::login::logout(&mut config),
        Commands::Whoami => commands::account::whoami(&config),
        Commands::Orgs => {
            commands::require_auth(&config)?;
            commands::account::orgs(&client).await
        }
        Commands::Projects => {
            commands::require_auth(&config)?;
            commands::account::projects(&client).await
        }
        Commands::Init {
            project: project_flag,
            force,
        } => commands::init::init(&config, &client, project_flag.or(project), force).await,
        Commands::List => {
            commands::require_auth(&config)?;
            let project_id = commands::resolve_project_id(&config, project.as_deref())?;
            commands::decisions::list(&client, &project_id).await
        }
        Commands::Get { id } => {
            commands::require_auth(&config)?;
            let project_id = commands::resolve_project_id(&config, project.as_deref())?;
            commands::decisions::get(&client, &project_id, &id).await
        }
        Commands::Create {
            statement,
            rationale,
            tags,
        } => {
            commands::require_auth(&config)?;
            let project_id = commands::resolve_project_id(&config, project.as_deref())?;
            commands::decisions::create(&client, &project_id, statement, rationale, tags).await
        }
        Commands::Accept { id } => {
            commands::require_auth(&config)?;
            let project_id = commands::resolve_project_id(&config, project.as_deref())?;
            commands::decisions::accept(&client, &project_id, &id).await
        }
        Commands::Deprecate { id } => {
            commands::require_auth(&config)?;
            let project_id = commands::resolve_project_id(&config, project.as_deref())?;
            commands::decisions::deprecate(&client, &project_id, &id).await
        }
        Commands::Status => {
            commands::require_auth(&config)?;
            let project_id = commands::resolve_project_id(&config, project.as_deref())?;
            commands::decisions::status(&client, &project_id).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&config),
            ConfigAction::Path => commands::config_cmd::path(),
            ConfigAction::Reset => commands::config_cmd::reset(),
        },
    }
}

/// Run the interactive dashboard, restarting it around login/logout.
async fn run_dashboard(mut config: Config) -> Result<()> {
    // While the alternate screen is up, logs go to an in-memory buffer and
    // a rolling file next to the config; stdout/stderr must stay untouched.
    let log_buffer = LogBuffer::new();
    let _file_guard = match Config::config_path().and_then(|p| p.parent().map(|d| d.to_path_buf()))
    {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hopsule.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(default_filter())
                .with(CaptureLayer::new(log_buffer.clone()))
                .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(default_filter())
                .with(CaptureLayer::new(log_buffer.clone()))
                .init();
            None
        }
    };

    loop {
        let action = tui::run(&config).await?;
        if !dashboard_continues(action) {
            break;
        }
        if action == FinalAction::Logout {
            commands::login::logout(&mut config)?;
            // back to the login screen
            continue;
        }
        if let Err(e) = commands::login::login(&mut config, None, false).await {
            error!("login failed: {e:#}");
            eprintln!("Login failed: {e:#}");
        }
        // a failed or expired login lands back on the login screen,
        // a successful one on the organization list
    }

    // surface anything that went wrong while the TUI owned the screen
    for entry in log_buffer.warnings() {
        eprintln!(
            "[{} {}] {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.level,
            entry.message
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_a_plain_quit_ends_the_dashboard() {
        assert!(!dashboard_continues(FinalAction::None));
        assert!(dashboard_continues(FinalAction::Login));
        assert!(dashboard_continues(FinalAction::Logout));
    }
}
