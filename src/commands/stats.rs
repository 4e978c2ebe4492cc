use clap::{Args, Subcommand};
use routlin_core::{build_trend, calculate_streaks, Period, UsageReport};
use serde::Serialize;

use super::{Context, OutputFormat};

#[derive(Args)]
pub struct StatsCommand {
    #[command(subcommand)]
    pub command: StatsSubcommand,
}

#[derive(Subcommand)]
pub enum StatsSubcommand {
    /// How often each tag was used in a period
    Usage {
        /// Period (daily, weekly, monthly, yearly)
        #[arg(long, short, default_value = "weekly")]
        period: Period,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Current streak of consecutive days for each tag
    Streaks {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Tags per day over the last seven days
    Trend {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreakRow<'a> {
    tag_id: &'a str,
    name: &'a str,
    color: &'a str,
    days: u32,
}

impl StatsCommand {
    pub fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            StatsSubcommand::Usage { period, format } => {
                let report = UsageReport::compute(ctx.data(), period.range(ctx.today));

                match format {
                    OutputFormat::Json => {
                        let value = serde_json::json!({
                            "period": period,
                            "report": &report,
                            "mostUsed": report.most_used(),
                            "leastUsed": report.least_used(),
                            "chart": report.chart(),
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => print_usage(*period, &report),
                }
                Ok(())
            }

            StatsSubcommand::Streaks { format } => {
                let data = ctx.data();
                let streaks = calculate_streaks(data, ctx.today);
                let rows: Vec<StreakRow> = streaks
                    .iter()
                    .filter_map(|s| {
                        let tag = data.tag(&s.tag_id)?;
                        Some(StreakRow {
                            tag_id: &tag.id,
                            name: &tag.name,
                            color: &tag.color,
                            days: s.count,
                        })
                    })
                    .collect();

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&rows)?);
                    }
                    OutputFormat::Text => {
                        if data.tags.is_empty() {
                            println!("No tags yet. Create one with 'routlin tag add <name>'.");
                            return Ok(());
                        }
                        if rows.is_empty() {
                            println!("No active streaks ({} tag(s))", data.tags.len());
                            return Ok(());
                        }
                        println!("Current streaks (as of {})", ctx.today);
                        for row in &rows {
                            println!("  {:<20}  {} day(s)", row.name, row.days);
                        }
                    }
                }
                Ok(())
            }

            StatsSubcommand::Trend { format } => {
                let trend = build_trend(ctx.data(), ctx.today);

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&trend)?);
                    }
                    OutputFormat::Text => {
                        let Some(trend) = trend else {
                            println!("No activity in the last 7 days");
                            return Ok(());
                        };
                        let widest = trend.points.iter().map(|p| p.count).max().unwrap_or(0);
                        for point in &trend.points {
                            let names: Vec<&str> =
                                point.tags.iter().map(|t| t.name.as_str()).collect();
                            println!(
                                "{:<5}  {:<width$}  {}",
                                point.label,
                                "#".repeat(point.count),
                                names.join(", "),
                                width = widest
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

fn print_usage(period: Period, report: &UsageReport) {
    println!("Tag usage, {} ({})", period, report.range);
    println!();

    if !report.has_activity() {
        println!("No activity in this period");
    } else {
        if let Some(most) = report.most_used() {
            println!("Most used:  {} ({} day(s))", most.name, most.count);
        }
        if let Some(least) = report.least_used() {
            println!("Least used: {} ({} day(s))", least.name, least.count);
        }
        println!();

        let chart = report.chart();
        let max = chart.values.iter().copied().max().unwrap_or(0);
        let label_width = chart.labels.iter().map(|l| l.len()).max().unwrap_or(0);
        for (label, value) in chart.labels.iter().zip(&chart.values) {
            println!(
                "  {:<width$}  {}",
                label,
                bar(*value, max),
                width = label_width
            );
        }
    }

    if !report.unused.is_empty() {
        let names: Vec<&str> = report.unused.iter().map(|t| t.name.as_str()).collect();
        println!();
        println!("Unused: {}", names.join(", "));
    }
}

const BAR_WIDTH: u32 = 30;

/// A bar scaled so the largest value fills [`BAR_WIDTH`].
fn bar(value: u32, max: u32) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (value * BAR_WIDTH).div_ceil(max);
    "#".repeat(len as usize)
}
