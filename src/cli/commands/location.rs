use clap::Subcommand;

use super::{connect_and_migrate, load_config};
use crate::database::models::NewLocation;
use crate::database::{LocationStore, PgStore};

#[derive(Subcommand)]
pub enum LocationCommands {
    #[command(about = "Create a public location readable by every user")]
    AddPublic {
        #[arg(long, help = "Location name")]
        name: String,
        #[arg(long, default_value = "", help = "Location description")]
        description: String,
        #[arg(long, default_value = "", help = "Image URL")]
        image_url: String,
    },
}

pub async fn handle(cmd: LocationCommands) -> anyhow::Result<()> {
    match cmd {
        LocationCommands::AddPublic {
            name,
            description,
            image_url,
        } => {
            let name = name.trim().to_string();
            anyhow::ensure!(!name.is_empty(), "--name cannot be empty");

            let config = load_config()?;
            let store = PgStore::new(connect_and_migrate(&config).await?);
            let location = store
                .create_location(NewLocation {
                    name,
                    description,
                    image_url,
                    owner_id: None,
                })
                .await?;

            println!("{}", serde_json::to_string_pretty(&location)?);
            store.pool().close().await;
            Ok(())
        }
    }
}
