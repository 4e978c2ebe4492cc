use clap::{Args, Subcommand};
use routlin_core::{goal_progress, Goal, GoalPeriod, GoalProgress, UserData};

use super::{confirm, Context, OutputFormat};

#[derive(Args)]
pub struct GoalCommand {
    #[command(subcommand)]
    pub command: GoalSubcommand,
}

#[derive(Subcommand)]
pub enum GoalSubcommand {
    /// Show progress for every goal
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a goal, or change the target of an existing one
    Set {
        /// Tag ID or name
        tag: String,

        /// Number of days to hit in each period
        #[arg(allow_hyphen_values = true)]
        target: i64,

        /// Period the target applies to (week, month, year)
        #[arg(long, short, default_value = "week")]
        period: GoalPeriod,
    },

    /// Delete a goal
    Delete {
        /// Goal ID, or the tag ID or name of the goal
        identifier: String,

        /// Period, when the tag has goals for several periods
        #[arg(long, short)]
        period: Option<GoalPeriod>,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl GoalCommand {
    pub async fn run(&self, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            GoalSubcommand::List { format } => {
                let progress = goal_progress(ctx.data(), ctx.today);

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&progress)?);
                    }
                    OutputFormat::Text => {
                        if progress.is_empty() {
                            println!("No goals yet. Create one with 'routlin goal set <tag> <target>'.");
                            return Ok(());
                        }
                        for p in &progress {
                            print_progress(p);
                        }
                    }
                }
                Ok(())
            }

            GoalSubcommand::Set {
                tag,
                target,
                period,
            } => {
                let tag = ctx.resolve_tag(tag)?.clone();
                let goal = ctx.data_mut().save_goal(&tag.id, *target, *period)?.clone();
                ctx.persist().await?;

                println!(
                    "Goal: {} {} time(s) per {}",
                    tag.name, goal.target_count, goal.period
                );
                if let Some(p) = goal_progress(ctx.data(), ctx.today)
                    .into_iter()
                    .find(|p| p.goal.id == goal.id)
                {
                    print_progress(&p);
                }
                Ok(())
            }

            GoalSubcommand::Delete {
                identifier,
                period,
                force,
            } => {
                let goal = find_goal(ctx.data(), identifier, *period)?;
                let tag_name = ctx
                    .data()
                    .tag(&goal.tag_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| goal.tag_id.clone());

                if !force {
                    let prompt = format!("Delete {} goal for '{}'?", goal.period, tag_name);
                    if !confirm(&prompt)? {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                ctx.data_mut().delete_goal(&goal.id)?;
                ctx.persist().await?;
                println!("Deleted {} goal for '{}'", goal.period, tag_name);
                Ok(())
            }
        }
    }
}

fn print_progress(p: &GoalProgress) {
    let status = if p.achieved {
        "achieved".to_string()
    } else {
        format!("{} to go", p.remaining())
    };
    println!(
        "{:<20}  {:<10}  {}/{} ({:.0}%)  {}",
        p.tag.name,
        p.goal.period.label(),
        p.count,
        p.goal.target_count,
        p.progress,
        status
    );
}

/// Finds a goal by ID, or by tag plus optional period.
fn find_goal(
    data: &UserData,
    identifier: &str,
    period: Option<GoalPeriod>,
) -> Result<Goal, Box<dyn std::error::Error>> {
    if let Some(goal) = data.goals.iter().find(|g| g.id == identifier) {
        return Ok(goal.clone());
    }

    let tag = data
        .find_tag(identifier)
        .ok_or_else(|| format!("Goal not found: {}", identifier))?;
    let matches: Vec<&Goal> = data
        .goals
        .iter()
        .filter(|g| g.tag_id == tag.id && period.map_or(true, |p| g.period == p))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("No goal found for tag '{}'", tag.name).into()),
        [goal] => Ok((*goal).clone()),
        _ => Err(format!(
            "Tag '{}' has several goals. Use --period to pick one.",
            tag.name
        )
        .into()),
    }
}
