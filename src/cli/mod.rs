pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "inventory-api")]
#[command(about = "Inventory API - users, items and locations behind bearer-token auth")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Create database tables and indexes")]
    Migrate,

    #[command(about = "Manage shared locations")]
    Location {
        #[command(subcommand)]
        cmd: commands::location::LocationCommands,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => commands::serve::handle(commands::serve::ServeArgs::default()).await,
        Some(Commands::Serve(args)) => commands::serve::handle(args).await,
        Some(Commands::Migrate) => commands::migrate::handle().await,
        Some(Commands::Location { cmd }) => commands::location::handle(cmd).await,
    }
}
