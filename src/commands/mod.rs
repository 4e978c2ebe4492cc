mod account;
mod config_cmd;
mod day;
mod export;
mod goal;
mod health;
mod stats;
mod tag;

pub use account::AccountCommand;
pub use config_cmd::ConfigCommand;
pub use day::DayCommand;
pub use export::ExportCommand;
pub use goal::GoalCommand;
pub use health::HealthCommand;
pub use stats::StatsCommand;
pub use tag::TagCommand;

use chrono::NaiveDate;
use clap::ValueEnum;
use routlin_core::{parse_date, ApiClient, Tag, TrackerError, UserData};
use std::io::{self, Write};

use crate::config::Config;
use crate::store::Store;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything a command needs: the local store, configuration and the date
/// treated as today.
pub struct Context {
    pub store: Store,
    pub config: Config,
    pub today: NaiveDate,
}

impl Context {
    pub fn new(store: Store, config: Config, today: NaiveDate) -> Self {
        Self {
            store,
            config,
            today,
        }
    }

    pub fn data(&self) -> &UserData {
        self.store.data()
    }

    pub fn data_mut(&mut self) -> &mut UserData {
        self.store.data_mut()
    }

    /// Looks up a tag by ID or name.
    pub fn resolve_tag(&self, id_or_name: &str) -> Result<&Tag, TrackerError> {
        self.data()
            .find_tag(id_or_name)
            .ok_or_else(|| TrackerError::TagNotFound(id_or_name.to_string()))
    }

    /// Parses a date argument. Missing or "today" means [`Context::today`].
    pub fn date_arg(&self, arg: Option<&str>) -> Result<NaiveDate, TrackerError> {
        match arg {
            None => Ok(self.today),
            Some(s) if s.trim().eq_ignore_ascii_case("today") => Ok(self.today),
            Some(s) => parse_date(s),
        }
    }

    /// Client for the configured sync server.
    pub fn api_client(&self) -> Result<ApiClient, Box<dyn std::error::Error>> {
        match &self.config.sync.server_url {
            Some(url) => Ok(ApiClient::new(url.clone())),
            None => Err(
                "Sync server not configured. Set sync.server_url in config or ROUTLIN_SYNC_URL."
                    .into(),
            ),
        }
    }

    /// Saves locally, then pushes to the server when logged in with
    /// auto-sync on. A failed push only prints a warning.
    pub async fn persist(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.save()?;

        if !self.config.sync.auto_sync || !self.config.sync.is_configured() {
            return Ok(());
        }
        let Some((username, token)) = self.store.session() else {
            return Ok(());
        };

        let client = self.api_client()?;
        match client.sync(username, token, self.data()).await {
            Ok(_) => tracing::debug!(username, "pushed local changes"),
            Err(e) => {
                tracing::warn!(username, error = %e, "auto-sync failed");
                eprintln!("Warning: saved locally, but sync failed: {}", e);
            }
        }
        Ok(())
    }
}

/// Asks a yes/no question on stdin. Anything but "y" means no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Reads one line from stdin after printing `prompt`.
pub fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
