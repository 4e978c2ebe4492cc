//! Account commands for the sync server.
//!
//! Logging in replaces the local copy with the server's; every later change
//! is pushed by [`Context::persist`].

use clap::{Args, Subcommand};
use routlin_core::sync::{normalize_username, MIN_PASSWORD_LEN, MIN_USERNAME_LEN};
use routlin_core::{check_server, SyncError};

use super::{confirm, prompt_line, Context};

#[derive(Args)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand)]
pub enum AccountSubcommand {
    /// Create an account; offline data is carried into it
    Signup {
        /// Username (at least 3 characters)
        username: String,

        /// Password (prompted for if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and download your data
    Login {
        /// Username
        username: String,

        /// Password (prompted for if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out; your data stays cached locally
    Logout,

    /// Push local data to the server now
    Sync,

    /// Change your password
    ChangePassword,

    /// Delete your account and all server data
    Delete {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show login and server status
    Status,
}

impl AccountCommand {
    pub async fn run(&self, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AccountSubcommand::Signup { username, password } => {
                let username = validate_username(username)?;
                let password = read_password(password.as_deref(), "Password: ")?;
                validate_password(&password)?;

                let client = ctx.api_client()?;
                let offline = if ctx.store.is_logged_in() {
                    None
                } else {
                    Some(ctx.data().clone())
                };
                let response = client.signup(&username, &password).await?;

                let data = offline.unwrap_or(response.user_data);
                let carried = data.tags.len();
                ctx.store.login(&response.username, &response.session_token, data);
                ctx.store.save()?;
                if carried > 0 {
                    client
                        .sync(&response.username, &response.session_token, ctx.data())
                        .await?;
                    println!("Uploaded {} tag(s) from offline data", carried);
                }

                tracing::info!(username = %response.username, "signed up");
                println!("{}", response.message);
                Ok(())
            }

            AccountSubcommand::Login { username, password } => {
                let username = validate_username(username)?;
                let password = read_password(password.as_deref(), "Password: ")?;

                let client = ctx.api_client()?;
                let response = client.login(&username, &password).await?;
                let tags = response.user_data.tags.len();
                let days = response.user_data.entries.len();

                ctx.store
                    .login(&response.username, &response.session_token, response.user_data);
                ctx.store.save()?;

                tracing::info!(username = %response.username, "logged in");
                println!("{}", response.message);
                println!("Downloaded {} tag(s) and {} day(s)", tags, days);
                Ok(())
            }

            AccountSubcommand::Logout => {
                match ctx.store.logout() {
                    Some(username) => {
                        ctx.store.save()?;
                        println!("Logged out {}", username);
                    }
                    None => println!("Not logged in"),
                }
                Ok(())
            }

            AccountSubcommand::Sync => {
                let (username, token) = ctx.store.session().ok_or(SyncError::NotLoggedIn)?;
                let client = ctx.api_client()?;
                let response = client.sync(username, token, ctx.data()).await?;
                println!("{}", response.message);
                Ok(())
            }

            AccountSubcommand::ChangePassword => {
                let (username, _) = ctx.store.session().ok_or(SyncError::NotLoggedIn)?;
                let current = read_password(None, "Current password: ")?;
                let new = read_password(None, "New password: ")?;
                validate_password(&new)?;
                let repeat = read_password(None, "Repeat new password: ")?;
                if new != repeat {
                    return Err("Passwords do not match".into());
                }

                let client = ctx.api_client()?;
                let response = client.change_password(username, &current, &new).await?;
                println!("{}", response.message);
                Ok(())
            }

            AccountSubcommand::Delete { force } => {
                let (username, token) = match ctx.store.session() {
                    Some((u, t)) => (u.to_string(), t.to_string()),
                    None => return Err(SyncError::NotLoggedIn.into()),
                };

                if !force {
                    let prompt = format!(
                        "Delete account '{}' and all of its data on the server?",
                        username
                    );
                    if !confirm(&prompt)? {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                let client = ctx.api_client()?;
                let response = client.delete_account(&username, &token).await?;
                ctx.store.remove_user(&username);
                ctx.store.save()?;

                tracing::info!(username = %username, "account deleted");
                println!("{}", response.message);
                Ok(())
            }

            AccountSubcommand::Status => {
                println!("Account");
                println!("=======");
                println!();

                match ctx.store.session() {
                    Some((username, _)) => println!("Logged in as: {}", username),
                    None => println!("Not logged in (working offline)"),
                }
                println!("Data file:    {}", ctx.store.path().display());

                let Some(url) = ctx.config.sync.server_url.as_deref() else {
                    println!("Server:       not configured");
                    println!();
                    println!("To enable sync, add to your config file:");
                    println!();
                    println!("  sync:");
                    println!("    server_url: \"http://localhost:8080\"");
                    println!();
                    println!("Or set ROUTLIN_SYNC_URL.");
                    return Ok(());
                };

                println!("Server:       {}", url);
                println!(
                    "Auto-sync:    {}",
                    if ctx.config.sync.auto_sync {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
                match check_server(url).await {
                    Ok(_) => println!("Status:       ✓ reachable"),
                    Err(SyncError::ConnectionError(_)) => println!("Status:       ✗ unreachable"),
                    Err(e) => println!("Status:       ✗ error: {}", e),
                }
                Ok(())
            }
        }
    }
}

fn validate_username(username: &str) -> Result<String, String> {
    let username = normalize_username(username);
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        ));
    }
    Ok(username)
}

fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    Ok(())
}

fn read_password(given: Option<&str>, prompt: &str) -> std::io::Result<String> {
    match given {
        Some(p) => Ok(p.to_string()),
        None => prompt_line(prompt),
    }
}
