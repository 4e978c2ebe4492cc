use clap::{Args, Subcommand};
use routlin_core::models::{DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_DURATION};
use routlin_core::{HealthProfile, Period, TrackerError, DEFAULT_HISTORY_LIMIT};
use serde::Serialize;

use super::{confirm, Context, OutputFormat};

#[derive(Args)]
pub struct HealthCommand {
    #[command(subcommand)]
    pub command: HealthSubcommand,
}

#[derive(Subcommand)]
pub enum HealthSubcommand {
    /// Start cycle tracking from your last period
    Setup {
        /// Start date of the last period (YYYY-MM-DD)
        last_period: String,

        /// Average cycle length in days (21-45)
        #[arg(long, default_value_t = DEFAULT_CYCLE_LENGTH)]
        cycle_length: u32,

        /// Average period duration in days (3-10)
        #[arg(long, default_value_t = DEFAULT_PERIOD_DURATION)]
        period_duration: u32,
    },

    /// Log a new period
    Log {
        /// Start date (YYYY-MM-DD or "today")
        date: Option<String>,
    },

    /// Change the dates of a logged period
    Edit {
        /// Entry ID (see 'routlin health history')
        entry_id: String,

        /// New start date
        #[arg(long)]
        start: Option<String>,

        /// New end date
        #[arg(long)]
        end: Option<String>,
    },

    /// Delete a logged period
    Delete {
        /// Entry ID (see 'routlin health history')
        entry_id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show or change cycle settings
    Settings {
        /// Average cycle length in days (21-45)
        #[arg(long)]
        cycle_length: Option<u32>,

        /// Average period duration in days (3-10)
        #[arg(long)]
        period_duration: Option<u32>,
    },

    /// Current cycle day and the next predicted periods
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Recently logged periods, newest first
    History {
        /// Number of entries to show
        #[arg(long, short, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Logged and predicted period days in a period
    Days {
        /// Period (daily, weekly, monthly, yearly)
        #[arg(long, short, default_value = "monthly")]
        period: Period,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl HealthCommand {
    pub async fn run(&self, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            HealthSubcommand::Setup {
                last_period,
                cycle_length,
                period_duration,
            } => {
                let start = ctx.date_arg(Some(last_period.as_str()))?;
                let entry = ctx
                    .data_mut()
                    .health_mut()
                    .setup(start, *cycle_length, *period_duration)?
                    .clone();
                ctx.persist().await?;

                println!("Cycle tracking set up");
                println!("  Last period: {}", entry);
                print_status(ctx)?;
                Ok(())
            }

            HealthSubcommand::Log { date } => {
                let start = ctx.date_arg(date.as_deref())?;
                let entry = ctx.data_mut().health_mut().log_period(start)?.clone();
                ctx.persist().await?;

                println!("Logged period: {}", entry);
                if let Some(profile) = ctx.data().health.as_ref() {
                    println!("Average cycle length: {} days", profile.avg_cycle_length);
                }
                Ok(())
            }

            HealthSubcommand::Edit {
                entry_id,
                start,
                end,
            } => {
                if start.is_none() && end.is_none() {
                    return Err("Nothing to update. Provide --start or --end.".into());
                }

                let profile = require_profile(ctx)?;
                let current = profile
                    .entries
                    .iter()
                    .find(|e| e.id == *entry_id)
                    .ok_or_else(|| TrackerError::PeriodEntryNotFound(entry_id.clone()))?;
                let new_start = match start {
                    Some(s) => ctx.date_arg(Some(s.as_str()))?,
                    None => current.start_date,
                };
                let new_end = match end {
                    Some(s) => ctx.date_arg(Some(s.as_str()))?,
                    None => current.end_date,
                };

                let entry = ctx
                    .data_mut()
                    .health_mut()
                    .edit_entry(entry_id, new_start, new_end)?
                    .clone();
                ctx.persist().await?;
                println!("Updated period: {}", entry);
                Ok(())
            }

            HealthSubcommand::Delete { entry_id, force } => {
                let entry = require_profile(ctx)?
                    .entries
                    .iter()
                    .find(|e| e.id == *entry_id)
                    .cloned()
                    .ok_or_else(|| TrackerError::PeriodEntryNotFound(entry_id.clone()))?;

                if !force && !confirm(&format!("Delete period {}?", entry))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                ctx.data_mut().health_mut().delete_entry(entry_id)?;
                ctx.persist().await?;
                println!("Deleted period: {}", entry);
                Ok(())
            }

            HealthSubcommand::Settings {
                cycle_length,
                period_duration,
            } => {
                if cycle_length.is_none() && period_duration.is_none() {
                    let profile = ctx.data().health.clone().unwrap_or_default();
                    println!("Cycle length:    {} days", profile.avg_cycle_length);
                    println!("Period duration: {} days", profile.avg_period_duration);
                    return Ok(());
                }

                let profile = ctx.data_mut().health_mut();
                let cycle = cycle_length.unwrap_or(profile.avg_cycle_length);
                let duration = period_duration.unwrap_or(profile.avg_period_duration);
                profile.update_settings(cycle, duration)?;
                ctx.persist().await?;

                println!("Cycle length:    {} days", cycle);
                println!("Period duration: {} days", duration);
                Ok(())
            }

            HealthSubcommand::Status { format } => {
                match format {
                    OutputFormat::Json => {
                        let report = StatusReport::build(ctx);
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    }
                    OutputFormat::Text => print_status(ctx)?,
                }
                Ok(())
            }

            HealthSubcommand::History { limit, format } => {
                let profile = require_profile(ctx)?;
                let entries = profile.recent_history(*limit);

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<36}  PERIOD", "ID");
                        println!("{}", "-".repeat(80));
                        for entry in &entries {
                            println!("{:<36}  {}", entry.id, entry);
                        }
                        println!(
                            "\nShowing {} of {} period(s)",
                            entries.len(),
                            profile.entries.len()
                        );
                    }
                }
                Ok(())
            }

            HealthSubcommand::Days { period, format } => {
                let profile = require_profile(ctx)?;
                let range = period.range(ctx.today);
                let days = profile.period_days(ctx.today);
                let confirmed: Vec<_> = days
                    .confirmed
                    .range(range.start..=range.end)
                    .copied()
                    .collect();
                let predicted: Vec<_> = days
                    .predicted
                    .range(range.start..=range.end)
                    .filter(|d| !days.confirmed.contains(d))
                    .copied()
                    .collect();

                match format {
                    OutputFormat::Json => {
                        let value = serde_json::json!({
                            "range": range,
                            "confirmed": confirmed,
                            "predicted": predicted,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => {
                        println!("{} ({})", period, range);
                        for date in range.iter_days() {
                            let mark = if confirmed.contains(&date) {
                                "period"
                            } else if predicted.contains(&date) {
                                "predicted"
                            } else {
                                continue;
                            };
                            println!("  {}  {}", date, mark);
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    set_up: bool,
    status: Option<routlin_core::CycleStatus>,
    predictions: Vec<routlin_core::DateRange>,
    avg_period_duration: Option<u32>,
}

impl StatusReport {
    fn build(ctx: &Context) -> Self {
        match ctx.data().health.as_ref() {
            Some(profile) if profile.is_set_up() => Self {
                set_up: true,
                status: profile.status(ctx.today),
                predictions: profile.predictions(ctx.today),
                avg_period_duration: Some(profile.avg_period_duration),
            },
            _ => Self {
                set_up: false,
                status: None,
                predictions: Vec::new(),
                avg_period_duration: None,
            },
        }
    }
}

fn require_profile(ctx: &Context) -> Result<&HealthProfile, TrackerError> {
    ctx.data()
        .health
        .as_ref()
        .filter(|p| p.is_set_up())
        .ok_or(TrackerError::HealthNotSetUp)
}

fn print_status(ctx: &Context) -> Result<(), TrackerError> {
    let report = StatusReport::build(ctx);
    let Some(status) = report.status else {
        return Err(TrackerError::HealthNotSetUp);
    };

    println!("Cycle day {} of {}", status.current_day, status.cycle_length);
    match status.days_until_next {
        1 => println!("Next period: {} (tomorrow)", status.next_period),
        n => println!("Next period: {} (in {} days)", status.next_period, n),
    }
    println!();
    println!("Upcoming:");
    for window in &report.predictions {
        println!("  {}", window);
    }
    Ok(())
}
