use clap::{Args, Subcommand};
use serde::Serialize;

use super::{confirm, Context, OutputFormat};

#[derive(Args)]
pub struct TagCommand {
    #[command(subcommand)]
    pub command: TagSubcommand,
}

#[derive(Subcommand)]
pub enum TagSubcommand {
    /// Create a new tag
    Add {
        /// Name of the tag
        name: String,

        /// Palette color (e.g. "#FF5252"); defaults to the first unused one
        #[arg(long)]
        color: Option<String>,
    },

    /// List all tags with how many days use them
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Rename or recolor a tag
    Edit {
        /// Tag ID or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New palette color
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a tag, removing it from every day and goal
    Delete {
        /// Tag ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show the color palette and which colors are free
    Colors,
}

#[derive(Serialize)]
struct TagRow<'a> {
    id: &'a str,
    name: &'a str,
    color: &'a str,
    days: usize,
}

impl TagCommand {
    pub async fn run(&self, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TagSubcommand::Add { name, color } => {
                let tag = ctx.data_mut().add_tag(name, color.as_deref())?.clone();
                ctx.persist().await?;
                println!("Created tag: {}", tag);
                Ok(())
            }

            TagSubcommand::List { format } => {
                let data = ctx.data();
                let rows: Vec<TagRow> = data
                    .tags
                    .iter()
                    .map(|t| TagRow {
                        id: &t.id,
                        name: &t.name,
                        color: &t.color,
                        days: data.entries.usage_count(&t.id),
                    })
                    .collect();

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&rows)?);
                    }
                    OutputFormat::Text => {
                        if rows.is_empty() {
                            println!("No tags yet. Create one with 'routlin tag add <name>'.");
                            return Ok(());
                        }
                        println!("{:<36}  {:<20}  {:<8}  DAYS", "ID", "NAME", "COLOR");
                        println!("{}", "-".repeat(76));
                        for row in &rows {
                            println!(
                                "{:<36}  {:<20}  {:<8}  {}",
                                row.id, row.name, row.color, row.days
                            );
                        }
                        println!("\nTotal: {} tag(s)", rows.len());
                    }
                }
                Ok(())
            }

            TagSubcommand::Edit {
                identifier,
                name,
                color,
            } => {
                if name.is_none() && color.is_none() {
                    return Err("Nothing to update. Provide --name or --color.".into());
                }

                let tag_id = ctx.resolve_tag(identifier)?.id.clone();
                let tag = ctx
                    .data_mut()
                    .edit_tag(&tag_id, name.as_deref(), color.as_deref())?
                    .clone();
                ctx.persist().await?;
                println!("Updated tag: {}", tag);
                Ok(())
            }

            TagSubcommand::Delete { identifier, force } => {
                let tag = ctx.resolve_tag(identifier)?.clone();
                let days = ctx.data().entries.usage_count(&tag.id);
                let goals = ctx
                    .data()
                    .goals
                    .iter()
                    .filter(|g| g.tag_id == tag.id)
                    .count();

                if !force {
                    let prompt = format!(
                        "Delete tag '{}'? It is used on {} day(s) and {} goal(s).",
                        tag.name, days, goals
                    );
                    if !confirm(&prompt)? {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                ctx.data_mut().delete_tag(&tag.id)?;
                ctx.persist().await?;
                println!("Deleted tag: {}", tag.name);
                Ok(())
            }

            TagSubcommand::Colors => {
                let data = ctx.data();
                for color in routlin_core::PALETTE {
                    match data.tags.iter().find(|t| t.has_color(color)) {
                        Some(tag) => println!("{}  used by {}", color, tag.name),
                        None => println!("{}  free", color),
                    }
                }
                Ok(())
            }
        }
    }
}
