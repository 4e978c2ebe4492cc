use chrono::NaiveDate;
use clap::{Args, Subcommand};
use routlin_core::{Period, UserData};
use serde::Serialize;

use super::{Context, OutputFormat};

#[derive(Args)]
pub struct DayCommand {
    #[command(subcommand)]
    pub command: DaySubcommand,
}

#[derive(Subcommand)]
pub enum DaySubcommand {
    /// Show the tags recorded on a day
    Show {
        /// Date (YYYY-MM-DD or "today")
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Replace the tags recorded on a day
    Set {
        /// Date (YYYY-MM-DD or "today")
        date: String,

        /// Tag IDs or names
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Add a tag to a day, or remove it if already recorded
    Toggle {
        /// Tag ID or name
        tag: String,

        /// Date (YYYY-MM-DD or "today")
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Remove every tag from a day
    Clear {
        /// Date (YYYY-MM-DD or "today")
        date: String,
    },

    /// List recorded days in a period
    List {
        /// Period to list (daily, weekly, monthly, yearly)
        #[arg(long, short, default_value = "monthly")]
        period: Period,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
struct DayRow {
    date: NaiveDate,
    tags: Vec<String>,
}

fn day_row(data: &UserData, date: NaiveDate) -> DayRow {
    let tags = data
        .entries
        .tags_on(date)
        .iter()
        .filter_map(|id| data.tag(id))
        .map(|t| t.name.clone())
        .collect();
    DayRow { date, tags }
}

impl DayCommand {
    pub async fn run(&self, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            DaySubcommand::Show { date, format } => {
                let date = ctx.date_arg(date.as_deref())?;
                let row = day_row(ctx.data(), date);

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&row)?);
                    }
                    OutputFormat::Text => {
                        if row.tags.is_empty() {
                            println!("{}: nothing recorded", date);
                        } else {
                            println!("{}: {}", date, row.tags.join(", "));
                        }
                    }
                }
                Ok(())
            }

            DaySubcommand::Set { date, tags } => {
                let date = ctx.date_arg(Some(date.as_str()))?;
                let mut ids: Vec<String> = Vec::with_capacity(tags.len());
                for tag in tags {
                    let id = ctx.resolve_tag(tag)?.id.clone();
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }

                ctx.data_mut().set_day(date, ids)?;
                ctx.persist().await?;

                let row = day_row(ctx.data(), date);
                println!("{}: {}", date, row.tags.join(", "));
                Ok(())
            }

            DaySubcommand::Toggle { tag, date } => {
                let date = ctx.date_arg(date.as_deref())?;
                let tag = ctx.resolve_tag(tag)?.clone();

                let mut ids = ctx.data().entries.tags_on(date).to_vec();
                let added = if let Some(pos) = ids.iter().position(|id| *id == tag.id) {
                    ids.remove(pos);
                    false
                } else {
                    ids.push(tag.id.clone());
                    true
                };

                ctx.data_mut().set_day(date, ids)?;
                ctx.persist().await?;

                if added {
                    println!("Added '{}' to {}", tag.name, date);
                } else {
                    println!("Removed '{}' from {}", tag.name, date);
                }
                Ok(())
            }

            DaySubcommand::Clear { date } => {
                let date = ctx.date_arg(Some(date.as_str()))?;
                if ctx.data().entries.tags_on(date).is_empty() {
                    println!("{}: nothing recorded", date);
                    return Ok(());
                }

                ctx.data_mut().set_day(date, Vec::new())?;
                ctx.persist().await?;
                println!("Cleared {}", date);
                Ok(())
            }

            DaySubcommand::List { period, format } => {
                let range = period.range(ctx.today);
                let data = ctx.data();
                let rows: Vec<DayRow> = data
                    .entries
                    .in_range(range)
                    .map(|(date, _)| day_row(data, date))
                    .collect();

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&rows)?);
                    }
                    OutputFormat::Text => {
                        println!("{} ({})", period, range);
                        if rows.is_empty() {
                            println!("No days recorded");
                            return Ok(());
                        }
                        for row in &rows {
                            println!("  {}  {}", row.date, row.tags.join(", "));
                        }
                        println!("\nTotal: {} day(s)", rows.len());
                    }
                }
                Ok(())
            }
        }
    }
}
