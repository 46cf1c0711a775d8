//! Device-code login and logout.

use std::io::Write;
use std::process::Command;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::api::types::{DeviceAuthPoll, DeviceAuthStatus, User};
use crate::api::ApiClient;
use crate::config::Config;

const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// 10 minutes at one poll every 2 seconds.
const MAX_POLL_ATTEMPTS: u32 = 300;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub async fn login(config: &mut Config, web_url: Option<String>, no_browser: bool) -> Result<()> {
    if config.is_authenticated() {
        if let Some(user) = &config.user {
            println!("Already logged in as {} ({})", user.name, user.email);
        } else {
            println!("Already logged in.");
        }
        println!("Use 'hopsule logout' to sign out first.");
        return Ok(());
    }
    if let Some(url) = web_url {
        config.web_url = url;
    }

    let client = ApiClient::new(config);
    let device_name = device_name();

    print!("Initializing login... ");
    std::io::stdout().flush().ok();
    let init = client
        .device_auth_init(&device_name)
        .await
        .context("failed to initialize login")?;
    println!("✓");

    let auth_url = format!("{}/auth/device?code={}", config.web_url, init.code);
    println!();
    println!("Device code: {}", init.code);
    if let Some(expires) = &init.expires_at {
        println!("Code expires at: {expires}");
    }
    println!();
    if !no_browser {
        println!("Opening browser to complete sign-in...");
        if let Err(e) = open_browser(&auth_url) {
            debug!("browser launch failed: {e}");
            println!("Could not open browser automatically.");
        }
    }
    println!("If the browser doesn't open, visit this URL:");
    println!("  {auth_url}");
    println!();
    println!("Waiting for authentication... (press Ctrl+C to cancel)");

    let (token, user) = poll_until_complete(&client, &init.code).await?;
    config.token = token;
    config.user = Some(user.clone());
    config.save()?;

    println!();
    println!("✓ Login successful!");
    println!("Signed in as: {} ({})", user.name, user.email);
    println!();
    println!("Next steps:");
    println!("  • 'hopsule whoami' to see your account info");
    println!("  • 'hopsule projects' to list your projects");
    println!("  • 'hopsule init' to connect this directory to a project");
    Ok(())
}

pub fn logout(config: &mut Config) -> Result<()> {
    if !config.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    config.clear_auth();
    config.save()?;
    println!("Logged out.");
    Ok(())
}

async fn poll_until_complete(client: &ApiClient, code: &str) -> Result<(String, User)> {
    for attempt in 0..MAX_POLL_ATTEMPTS {
        print!(
            "\r{} Waiting for browser authentication... ({}s)",
            SPINNER[attempt as usize % SPINNER.len()],
            attempt * 2
        );
        std::io::stdout().flush().ok();

        let poll = client
            .device_auth_poll(code)
            .await
            .context("failed to check login status")?;
        match poll_outcome(poll)? {
            Some(done) => {
                println!("\r✓ Authentication complete!                    ");
                return Ok(done);
            }
            None => tokio::time::sleep(POLL_INTERVAL).await,
        }
    }
    println!();
    bail!("login timed out after 10 minutes")
}

/// One poll response folded into: finished (token + user), keep waiting,
/// or a terminal failure.
fn poll_outcome(poll: DeviceAuthPoll) -> Result<Option<(String, User)>> {
    match poll.status {
        DeviceAuthStatus::Pending => Ok(None),
        DeviceAuthStatus::Expired => bail!("login session expired - please try again"),
        DeviceAuthStatus::Complete => {
            let token = match poll.token {
                Some(t) if !t.is_empty() => t,
                _ => bail!("login completed but no token was returned"),
            };
            let user = User {
                id: poll.user_id.unwrap_or_default(),
                email: poll.email.unwrap_or_default(),
                name: poll.name.unwrap_or_default(),
                avatar_url: poll.avatar_url,
            };
            Ok(Some((token, user)))
        }
    }
}

fn open_browser(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("rundll32");
        c.arg("url.dll,FileProtocolHandler").arg(url);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };
    command.spawn().map(|_| ())
}

fn device_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "hopsule-cli".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(status: DeviceAuthStatus) -> DeviceAuthPoll {
        DeviceAuthPoll {
            status,
            token: None,
            user_id: None,
            email: None,
            name: None,
            avatar_url: None,
        }
    }

    #[test]
    fn pending_keeps_waiting() {
        assert!(poll_outcome(poll(DeviceAuthStatus::Pending))
            .unwrap()
            .is_none());
    }

    #[test]
    fn expired_is_a_terminal_error() {
        let err = poll_outcome(poll(DeviceAuthStatus::Expired)).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn complete_without_token_is_an_error() {
        let err = poll_outcome(poll(DeviceAuthStatus::Complete)).unwrap_err();
        assert!(err.to_string().contains("no token"));
    }

    #[test]
    fn complete_returns_token_and_user() {
        let mut p = poll(DeviceAuthStatus::Complete);
        p.token = Some("tok".into());
        p.email = Some("dev@example.com".into());
        p.name = Some("Dev".into());
        let (token, user) = poll_outcome(p).unwrap().unwrap();
        assert_eq!(token, "tok");
        assert_eq!(user.email, "dev@example.com");
    }
}
