//! Command-line argument definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "hopsule",
    version,
    about = "CLI and terminal dashboard for the Hopsule decision-tracking service",
    long_about = "Track, accept, and deprecate project decisions from the terminal.\n\
                  Run without a subcommand to open the interactive dashboard."
)]
pub struct Cli {
    /// Override the API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the stored auth token
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Project ID to operate on (defaults to the linked or configured project)
    #[arg(long, short = 'p', global = true, value_name = "ID")]
    pub project: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in through your browser (device-code flow)
    Login {
        /// Override the web app URL the browser is pointed at
        #[arg(long, value_name = "URL")]
        web_url: Option<String>,
        /// Print the URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Sign out and clear stored credentials
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your organizations
    Orgs,
    /// List your projects
    Projects,
    /// Link the current directory to a project (writes .hopsule.toml)
    Init {
        /// Skip selection and link this project ID
        #[arg(long, value_name = "ID")]
        project: Option<String>,
        /// Overwrite an existing link file
        #[arg(long)]
        force: bool,
    },
    /// List decisions for the current project
    List,
    /// Show one decision in full
    Get {
        /// Decision ID
        id: String,
    },
    /// Create a draft decision
    Create {
        /// Decision statement; prompted for interactively when omitted
        statement: Option<String>,
        /// Rationale text
        #[arg(long, short = 'r')]
        rationale: Option<String>,
        /// Tags (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Accept a DRAFT or PENDING decision
    Accept {
        /// Decision ID
        id: String,
    },
    /// Deprecate an ACCEPTED decision
    Deprecate {
        /// Decision ID
        id: String,
    },
    /// Show decision counts for the current project
    Status,
    /// Inspect or reset the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (token redacted)
    Show,
    /// Print the config file path
    Path,
    /// Delete the config file
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::parse_from(["hopsule"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_reach_subcommands() {
        let cli = Cli::parse_from(["hopsule", "list", "--project", "p1", "--token", "t"]);
        assert_eq!(cli.project.as_deref(), Some("p1"));
        assert_eq!(cli.token.as_deref(), Some("t"));
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn create_accepts_repeated_tags() {
        let cli = Cli::parse_from([
            "hopsule", "create", "use postgres", "--tag", "db", "--tag", "infra",
        ]);
        match cli.command {
            Some(Commands::Create { statement, tags, .. }) => {
                assert_eq!(statement.as_deref(), Some("use postgres"));
                assert_eq!(tags, vec!["db", "infra"]);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }
}
