use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod store;

use commands::{
    AccountCommand, ConfigCommand, Context, DayCommand, ExportCommand, GoalCommand,
    HealthCommand, StatsCommand, TagCommand,
};
use config::Config;
use store::Store;

#[derive(Parser)]
#[command(name = "routlin")]
#[command(version)]
#[command(about = "A personal habit tracker", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true, hide = true, value_parser = parse_today)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tags
    Tag(TagCommand),

    /// Record tags on calendar days
    Day(DayCommand),

    /// Manage goals and view progress
    Goal(GoalCommand),

    /// Usage, streak and trend statistics
    Stats(StatsCommand),

    /// Cycle tracking
    Health(HealthCommand),

    /// Sync account management
    Account(AccountCommand),

    /// Export your data as JSON
    Export(ExportCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn parse_today(s: &str) -> Result<NaiveDate, String> {
    routlin_core::parse_date(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routlin=warn,routlin_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config, cli_config_path),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let store = Store::open(config.data_path.value.clone())?;
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut ctx = Context::new(store, config, today);

    match command {
        Commands::Tag(cmd) => cmd.run(&mut ctx).await,
        Commands::Day(cmd) => cmd.run(&mut ctx).await,
        Commands::Goal(cmd) => cmd.run(&mut ctx).await,
        Commands::Stats(cmd) => cmd.run(&ctx),
        Commands::Health(cmd) => cmd.run(&mut ctx).await,
        Commands::Account(cmd) => cmd.run(&mut ctx).await,
        Commands::Export(cmd) => cmd.run(&ctx),
        Commands::Config(_) => Ok(()),
    }
}
