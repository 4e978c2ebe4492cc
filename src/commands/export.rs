use chrono::{DateTime, Utc};
use clap::Args;
use routlin_core::{Entries, Goal, HealthProfile, Tag};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use super::Context;

/// Export the active user's data as JSON
#[derive(Args)]
pub struct ExportCommand {
    /// Write to a file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    username: &'a str,
    tags: &'a [Tag],
    entries: &'a Entries,
    goals: &'a [Goal],
    #[serde(skip_serializing_if = "Option::is_none")]
    health: Option<&'a HealthProfile>,
    export_date: DateTime<Utc>,
}

impl ExportCommand {
    pub fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let json = export_json(ctx, Utc::now())?;

        match &self.output {
            Some(path) => {
                fs::write(path, json)?;
                println!("Exported data to {}", path.display());
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}

fn export_json(ctx: &Context, exported_at: DateTime<Utc>) -> serde_json::Result<String> {
    let data = ctx.data();
    let doc = ExportDocument {
        username: ctx.store.active_user(),
        tags: &data.tags,
        entries: &data.entries,
        goals: &data.goals,
        health: data.health.as_ref(),
        export_date: exported_at,
    };
    serde_json::to_string_pretty(&doc)
}
